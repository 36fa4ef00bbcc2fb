//! # Object and Event Store
//!
//! [`ObjectStore`] is the persistence contract the lifecycle engine runs
//! against. Every mutation is handed over as one [`Commit`]: the new event,
//! the objects it creates, the status changes it implies, and the
//! preconditions under which it is valid. The store applies the whole commit
//! or nothing.
//!
//! ## Concurrency Contract
//!
//! Preconditions are compare-and-swap guards checked, in order, under the
//! same lock as the write. Two racing mutations of one target both read
//! `ACTIVE`, both submit `Status { expected: ACTIVE }`, and exactly one
//! commits; the other gets [`StoreError::Conflict`] carrying the first guard
//! that failed. Every commit starts with an `Absent` guard on its event id,
//! followed by one per created object.
//!
//! ## MemoryStore
//!
//! [`MemoryStore`] keeps everything in `HashMap`s behind a
//! `parking_lot::RwLock`, with secondary indexes from object id to the
//! events that reference it and from agent id to the events it initiated.
//! An availability switch makes every call fail with
//! [`StoreError::Unavailable`], for exercising retry paths.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use rmap_core::{Agent, AgentContent, Disco, Event, Iri, RmapError, Status};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Errors ──────────────────────────────────────────────────────────

/// Store-level failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A commit precondition did not hold.
    #[error("commit precondition failed: {0}")]
    Conflict(Precondition),

    /// The commit is malformed (duplicate ids, unknown targets).
    #[error("commit rejected: {0}")]
    Rejected(String),

    /// Transient failure; the operation may be retried.
    #[error("{0}")]
    Unavailable(String),
}

impl From<StoreError> for RmapError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => RmapError::StoreUnavailable(msg),
            StoreError::Conflict(failed) => RmapError::IllegalState(failed.to_string()),
            StoreError::Rejected(msg) => RmapError::IllegalState(msg),
        }
    }
}

// ─── Commit ──────────────────────────────────────────────────────────

/// A guard that must hold at commit time. Displays as its violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// The DiSCO or Agent `id` currently has status `expected`.
    Status { id: Iri, expected: Status },
    /// No object or event uses `id`.
    Absent { id: Iri },
    /// Agent `id` still has exactly the fields in `expected`.
    AgentUnchanged { id: Iri, expected: AgentContent },
}

impl std::fmt::Display for Precondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { id, expected } => write!(f, "{id} is no longer {expected}"),
            Self::Absent { id } => write!(f, "{id} is already in use"),
            Self::AgentUnchanged { id, .. } => write!(f, "agent {id} was modified"),
        }
    }
}

/// Everything one mutation writes, applied atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub event: Event,
    pub new_discos: Vec<Disco>,
    pub new_agents: Vec<Agent>,
    pub status_changes: Vec<(Iri, Status)>,
    /// DiSCO whose content is purged.
    pub purge: Option<Iri>,
    /// Agent whose fields are overwritten in place.
    pub agent_replacement: Option<(Iri, AgentContent)>,
    pub preconditions: Vec<Precondition>,
}

impl Commit {
    /// A commit of `event`, guarded on the event id being unused.
    pub fn new(event: Event) -> Self {
        let preconditions = vec![Precondition::Absent {
            id: event.id.clone(),
        }];
        Self {
            event,
            new_discos: Vec::new(),
            new_agents: Vec::new(),
            status_changes: Vec::new(),
            purge: None,
            agent_replacement: None,
            preconditions,
        }
    }

    pub fn create_disco(mut self, disco: Disco) -> Self {
        self.preconditions.push(Precondition::Absent {
            id: disco.id.clone(),
        });
        self.new_discos.push(disco);
        self
    }

    pub fn create_agent(mut self, agent: Agent) -> Self {
        self.preconditions.push(Precondition::Absent {
            id: agent.id.clone(),
        });
        self.new_agents.push(agent);
        self
    }

    /// Move `id` from `from` to `to`, guarded on `from`.
    pub fn transition(mut self, id: Iri, from: Status, to: Status) -> Self {
        self.preconditions.push(Precondition::Status {
            id: id.clone(),
            expected: from,
        });
        self.status_changes.push((id, to));
        self
    }

    pub fn purge(mut self, id: Iri) -> Self {
        self.purge = Some(id);
        self
    }

    pub fn replace_agent(mut self, id: Iri, from: AgentContent, to: AgentContent) -> Self {
        self.preconditions.push(Precondition::AgentUnchanged {
            id: id.clone(),
            expected: from,
        });
        self.agent_replacement = Some((id, to));
        self
    }

    pub fn require(mut self, precondition: Precondition) -> Self {
        self.preconditions.push(precondition);
        self
    }
}

// ─── Contract ────────────────────────────────────────────────────────

/// Persistence for DiSCOs, Agents and Events.
///
/// Reads return the most recently committed state. Event listings are
/// ordered by start time, then id.
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    fn get_disco(&self, id: &Iri) -> Result<Option<Disco>, StoreError>;

    fn get_agent(&self, id: &Iri) -> Result<Option<Agent>, StoreError>;

    fn get_event(&self, id: &Iri) -> Result<Option<Event>, StoreError>;

    /// Events whose payload references `id`.
    fn events_referencing(&self, id: &Iri) -> Result<Vec<Event>, StoreError>;

    /// Events whose associated agent is `agent`.
    fn events_by_agent(&self, agent: &Iri) -> Result<Vec<Event>, StoreError>;

    /// Apply `commit` atomically, or fail without writing anything.
    fn commit(&self, commit: &Commit) -> Result<(), StoreError>;
}

// ─── In-Memory Store ─────────────────────────────────────────────────

/// Serializable contents of a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub discos: Vec<Disco>,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Default)]
struct Inner {
    discos: HashMap<Iri, Disco>,
    agents: HashMap<Iri, Agent>,
    events: HashMap<Iri, Event>,
    by_object: HashMap<Iri, Vec<Iri>>,
    by_agent: HashMap<Iri, Vec<Iri>>,
}

impl Inner {
    fn id_in_use(&self, id: &Iri) -> bool {
        self.discos.contains_key(id) || self.agents.contains_key(id) || self.events.contains_key(id)
    }

    fn status_of(&self, id: &Iri) -> Option<Status> {
        self.discos
            .get(id)
            .map(|d| d.status)
            .or_else(|| self.agents.get(id).map(|a| a.status))
    }

    fn check(&self, precondition: &Precondition) -> Result<(), StoreError> {
        let holds = match precondition {
            Precondition::Status { id, expected } => self.status_of(id) == Some(*expected),
            Precondition::Absent { id } => !self.id_in_use(id),
            Precondition::AgentUnchanged { id, expected } => self
                .agents
                .get(id)
                .is_some_and(|a| a.content() == *expected),
        };
        if holds {
            Ok(())
        } else {
            Err(StoreError::Conflict(precondition.clone()))
        }
    }

    fn validate(&self, commit: &Commit) -> Result<(), StoreError> {
        if self.id_in_use(&commit.event.id) {
            return Err(StoreError::Rejected(format!(
                "event id {} is already in use",
                commit.event.id
            )));
        }
        let mut fresh = HashSet::new();
        let new_ids = commit
            .new_discos
            .iter()
            .map(|d| &d.id)
            .chain(commit.new_agents.iter().map(|a| &a.id))
            .chain(std::iter::once(&commit.event.id));
        for id in new_ids {
            if !fresh.insert(id) {
                return Err(StoreError::Rejected(format!("id {id} used twice in one commit")));
            }
        }
        for (id, _) in &commit.status_changes {
            if self.status_of(id).is_none() {
                return Err(StoreError::Rejected(format!("status change for unknown object {id}")));
            }
        }
        if let Some(id) = &commit.purge {
            if !self.discos.contains_key(id) {
                return Err(StoreError::Rejected(format!("purge of unknown DiSCO {id}")));
            }
        }
        if let Some((id, _)) = &commit.agent_replacement {
            if !self.agents.contains_key(id) {
                return Err(StoreError::Rejected(format!("replacement of unknown agent {id}")));
            }
        }
        Ok(())
    }

    fn index_event(&mut self, event: &Event) {
        for id in event.payload.referenced_ids() {
            self.by_object
                .entry(id.clone())
                .or_default()
                .push(event.id.clone());
        }
        self.by_agent
            .entry(event.associated_agent.clone())
            .or_default()
            .push(event.id.clone());
    }

    fn apply(&mut self, commit: &Commit) {
        for disco in &commit.new_discos {
            self.discos.insert(disco.id.clone(), disco.clone());
        }
        for agent in &commit.new_agents {
            self.agents.insert(agent.id.clone(), agent.clone());
        }
        for (id, status) in &commit.status_changes {
            if let Some(disco) = self.discos.get_mut(id) {
                disco.status = *status;
            } else if let Some(agent) = self.agents.get_mut(id) {
                agent.status = *status;
            }
        }
        if let Some(disco) = commit.purge.as_ref().and_then(|id| self.discos.get_mut(id)) {
            disco.purge();
        }
        if let Some((id, content)) = &commit.agent_replacement {
            if let Some(agent) = self.agents.get_mut(id) {
                agent.replace_content(content.clone());
            }
        }
        self.index_event(&commit.event);
        self.events
            .insert(commit.event.id.clone(), commit.event.clone());
    }

    fn events_for(&self, ids: Option<&Vec<Iri>>) -> Vec<Event> {
        let mut events: Vec<Event> = ids
            .into_iter()
            .flatten()
            .filter_map(|id| self.events.get(id).cloned())
            .collect();
        events.sort_by(|a, b| (a.start_time, &a.id).cmp(&(b.start_time, &b.id)));
        events.dedup_by(|a, b| a.id == b.id);
        events
    }
}

/// Thread-safe in-memory [`ObjectStore`].
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Rebuild a store, including its indexes, from a snapshot.
    ///
    /// Fails with `Rejected` if two records share an id.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, StoreError> {
        let mut inner = Inner::default();
        for disco in snapshot.discos {
            if inner.id_in_use(&disco.id) {
                return Err(StoreError::Rejected(format!("duplicate id {}", disco.id)));
            }
            inner.discos.insert(disco.id.clone(), disco);
        }
        for agent in snapshot.agents {
            if inner.id_in_use(&agent.id) {
                return Err(StoreError::Rejected(format!("duplicate id {}", agent.id)));
            }
            inner.agents.insert(agent.id.clone(), agent);
        }
        for event in snapshot.events {
            if inner.id_in_use(&event.id) {
                return Err(StoreError::Rejected(format!("duplicate id {}", event.id)));
            }
            inner.index_event(&event);
            inner.events.insert(event.id.clone(), event);
        }
        Ok(Self {
            inner: RwLock::new(inner),
            available: AtomicBool::new(true),
        })
    }

    /// Everything in the store, sorted for stable output.
    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner.read();
        let mut discos: Vec<Disco> = inner.discos.values().cloned().collect();
        discos.sort_by(|a, b| a.id.cmp(&b.id));
        let mut agents: Vec<Agent> = inner.agents.values().cloned().collect();
        agents.sort_by(|a, b| a.id.cmp(&b.id));
        let mut events: Vec<Event> = inner.events.values().cloned().collect();
        events.sort_by(|a, b| (a.start_time, &a.id).cmp(&(b.start_time, &b.id)));
        StoreSnapshot {
            discos,
            agents,
            events,
        }
    }

    /// Toggle simulated unavailability.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn event_count(&self) -> usize {
        self.inner.read().events.len()
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(
                "in-memory store is switched off".to_string(),
            ))
        }
    }
}

impl ObjectStore for MemoryStore {
    fn get_disco(&self, id: &Iri) -> Result<Option<Disco>, StoreError> {
        self.ensure_available()?;
        Ok(self.inner.read().discos.get(id).cloned())
    }

    fn get_agent(&self, id: &Iri) -> Result<Option<Agent>, StoreError> {
        self.ensure_available()?;
        Ok(self.inner.read().agents.get(id).cloned())
    }

    fn get_event(&self, id: &Iri) -> Result<Option<Event>, StoreError> {
        self.ensure_available()?;
        Ok(self.inner.read().events.get(id).cloned())
    }

    fn events_referencing(&self, id: &Iri) -> Result<Vec<Event>, StoreError> {
        self.ensure_available()?;
        let inner = self.inner.read();
        Ok(inner.events_for(inner.by_object.get(id)))
    }

    fn events_by_agent(&self, agent: &Iri) -> Result<Vec<Event>, StoreError> {
        self.ensure_available()?;
        let inner = self.inner.read();
        Ok(inner.events_for(inner.by_agent.get(agent)))
    }

    fn commit(&self, commit: &Commit) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut inner = self.inner.write();
        for precondition in &commit.preconditions {
            inner.check(precondition)?;
        }
        inner.validate(commit)?;
        inner.apply(commit);
        tracing::debug!(
            event_id = %commit.event.id,
            new_objects = commit.new_discos.len() + commit.new_agents.len(),
            status_changes = commit.status_changes.len(),
            "commit applied"
        );
        Ok(())
    }
}
