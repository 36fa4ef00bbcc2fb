//! # Lifecycle Engine
//!
//! Validates and applies the seven mutation operations. Each successful call
//! commits exactly one [`Event`] together with the objects and status
//! changes it implies; a failed call commits nothing.
//!
//! ## Operations
//!
//! | Operation | Target | Event | Effect |
//! |-----------|--------|-------|--------|
//! | `create_disco` | none | CREATION | new `ACTIVE` DiSCO |
//! | `update_disco` | latest `ACTIVE` version | UPDATE | target `INACTIVE`, new `ACTIVE` DiSCO in same lineage |
//! | `derive_disco` | any non-`DELETED` DiSCO | DERIVATION | new `ACTIVE` DiSCO, new lineage; source untouched |
//! | `inactivate_disco` | `ACTIVE` DiSCO | INACTIVATION | target `INACTIVE` |
//! | `tombstone_disco` | non-terminal DiSCO | TOMBSTONE | target `TOMBSTONED` |
//! | `delete_disco` | non-terminal DiSCO | DELETION | target `DELETED`, content purged |
//! | `create_agent` | none | CREATION | new `ACTIVE` Agent |
//! | `replace_agent` | Agent | REPLACE | fields overwritten; no-op when unchanged |
//!
//! ## Commit Protocol
//!
//! The engine reads current state, validates, then submits a [`Commit`]
//! whose preconditions restate what it validated against. If another
//! writer got there first the store reports a conflict, and the engine
//! re-runs its checks against fresh state so the caller receives the
//! specific error (`NotLatestVersion`, `InactiveVersion`, `AlreadyTerminal`)
//! rather than a generic one. A failed `Absent` guard means the identifier
//! service handed out an id that is already taken, which surfaces as
//! `IdAllocationFailed` whatever the operation. Nothing is retried.
//!
//! ## Authorization
//!
//! The acting agent is trusted as given. [`LifecycleEngine::check_creator`]
//! is available to callers that enforce "same creator or administrator",
//! but no mutation calls it implicitly.

use std::collections::HashMap;
use std::sync::Arc;

use rmap_core::{
    Agent, AgentContent, Disco, DiscoContent, Event, EventPayload, EventTargetType, EventType,
    Iri, ObjectKind, RequestAgent, RmapError, Status, Term,
};

use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, EngineConfig};
use crate::idservice::IdService;
use crate::lineage::LineageResolver;
use crate::sink::{CommitNotice, EventSink, NoopSink, ObjectSnapshot};
use crate::store::{Commit, ObjectStore, Precondition, StoreError};

// ─── Results ─────────────────────────────────────────────────────────

/// Outcome of a DiSCO mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoMutation {
    /// The committed event.
    pub event: Event,
    /// The DiSCO produced or mutated, as committed.
    pub disco: Disco,
    /// For an update, the inactivated previous version; for a derivation,
    /// the source.
    pub source: Option<Disco>,
}

/// Outcome of an Agent mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentMutation {
    pub event: Event,
    pub agent: Agent,
}

// ─── Engine ──────────────────────────────────────────────────────────

/// Applies mutations against an [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct LifecycleEngine {
    store: Arc<dyn ObjectStore>,
    ids: Arc<dyn IdService>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    lineage: LineageResolver,
    config: EngineConfig,
}

impl LifecycleEngine {
    /// An engine with the system clock, no event sink, and default config.
    pub fn new(store: Arc<dyn ObjectStore>, ids: Arc<dyn IdService>) -> Self {
        Self {
            lineage: LineageResolver::new(Arc::clone(&store)),
            store,
            ids,
            clock: Arc::new(SystemClock::new()),
            sink: Arc::new(NoopSink),
            config: EngineConfig::default(),
        }
    }

    /// An engine whose identifier service is built from `config`.
    pub fn from_config(
        store: Arc<dyn ObjectStore>,
        config: EngineConfig,
    ) -> Result<Self, ConfigError> {
        let ids = config.id_service.build()?;
        Ok(Self::new(store, ids).with_config(config))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn lineage(&self) -> &LineageResolver {
        &self.lineage
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── DiSCO operations ────────────────────────────────────────────

    /// Create a new `ACTIVE` DiSCO. Emits CREATION.
    pub fn create_disco(
        &self,
        content: DiscoContent,
        request: &RequestAgent,
    ) -> Result<DiscoMutation, RmapError> {
        self.observe(EventType::Creation, || {
            let start = self.clock.now();
            content.validate()?;
            let content = self.skolemize(content)?;
            let disco_id = self.ids.create_id()?;
            let event_id = self.ids.create_id()?;

            let event = Event::new(
                event_id.clone(),
                EventTargetType::Disco,
                request,
                start,
                EventPayload::Creation {
                    created_object_ids: vec![disco_id.clone()],
                },
            )
            .with_lineage_progenitor(disco_id.clone());
            let disco = Disco::new(disco_id, content, event_id);

            let commit = Commit::new(event).create_disco(disco.clone());
            let event = self.commit(
                commit,
                Vec::new(),
                vec![ObjectSnapshot::Disco(disco.clone())],
                id_collision,
            )?;
            Ok(DiscoMutation {
                event,
                disco,
                source: None,
            })
        })
    }

    /// Replace the latest version of a lineage with new content. Emits
    /// UPDATE; the target becomes `INACTIVE`.
    ///
    /// Fails with `NotFound`, `NotLatestVersion` or `InactiveVersion`,
    /// checked in that order.
    pub fn update_disco(
        &self,
        target: &Iri,
        content: DiscoContent,
        request: &RequestAgent,
    ) -> Result<DiscoMutation, RmapError> {
        self.observe(EventType::Update, || {
            let start = self.clock.now();
            let (old, progenitor) = self.check_updatable(target)?;
            content.validate()?;
            let content = self.skolemize(content)?;
            let new_id = self.ids.create_id()?;
            let event_id = self.ids.create_id()?;

            let event = Event::new(
                event_id.clone(),
                EventTargetType::Disco,
                request,
                start,
                EventPayload::Update {
                    inactivated_object_id: target.clone(),
                    derived_object_id: new_id.clone(),
                },
            )
            .with_lineage_progenitor(progenitor);
            let new = Disco::new(new_id, content, event_id);
            let mut old_after = old.clone();
            old_after.status = Status::Inactive;

            let commit = Commit::new(event)
                .create_disco(new.clone())
                .transition(target.clone(), Status::Active, Status::Inactive);
            let event = self.commit(
                commit,
                vec![ObjectSnapshot::Disco(old)],
                vec![
                    ObjectSnapshot::Disco(old_after.clone()),
                    ObjectSnapshot::Disco(new.clone()),
                ],
                |failed| recheck(failed, || self.check_updatable(target).map(|_| ())),
            )?;
            Ok(DiscoMutation {
                event,
                disco: new,
                source: Some(old_after),
            })
        })
    }

    /// Start a new lineage from `source`, possibly authored by another
    /// agent. Emits DERIVATION; the source's status does not change.
    pub fn derive_disco(
        &self,
        source: &Iri,
        content: DiscoContent,
        request: &RequestAgent,
    ) -> Result<DiscoMutation, RmapError> {
        self.observe(EventType::Derivation, || {
            let start = self.clock.now();
            let source_disco = self.check_derivable(source)?;
            content.validate()?;
            let content = self.skolemize(content)?;
            let derived_id = self.ids.create_id()?;
            let event_id = self.ids.create_id()?;

            let event = Event::new(
                event_id.clone(),
                EventTargetType::Disco,
                request,
                start,
                EventPayload::Derivation {
                    source_object_id: source.clone(),
                    derived_object_id: derived_id.clone(),
                },
            )
            .with_lineage_progenitor(derived_id.clone());
            let derived = Disco::new(derived_id, content, event_id);

            let commit = Commit::new(event)
                .create_disco(derived.clone())
                .require(Precondition::Status {
                    id: source.clone(),
                    expected: source_disco.status,
                });
            let event = self.commit(
                commit,
                Vec::new(),
                vec![ObjectSnapshot::Disco(derived.clone())],
                |failed| recheck(failed, || self.check_derivable(source).map(|_| ())),
            )?;
            Ok(DiscoMutation {
                event,
                disco: derived,
                source: Some(source_disco),
            })
        })
    }

    /// Retire an `ACTIVE` DiSCO. Emits INACTIVATION.
    pub fn inactivate_disco(
        &self,
        target: &Iri,
        request: &RequestAgent,
    ) -> Result<DiscoMutation, RmapError> {
        self.observe(EventType::Inactivation, || {
            self.transition_disco(
                target,
                Status::Inactive,
                EventPayload::Inactivation {
                    inactivated_object_id: target.clone(),
                },
                request,
            )
        })
    }

    /// Hide a DiSCO from public reads. Emits TOMBSTONE.
    pub fn tombstone_disco(
        &self,
        target: &Iri,
        request: &RequestAgent,
    ) -> Result<DiscoMutation, RmapError> {
        self.observe(EventType::Tombstone, || {
            self.transition_disco(
                target,
                Status::Tombstoned,
                EventPayload::Tombstone {
                    tombstoned_object_id: target.clone(),
                },
                request,
            )
        })
    }

    /// Mark a DiSCO deleted and purge its content. The status marker and
    /// every event stay. Emits DELETION.
    pub fn delete_disco(
        &self,
        target: &Iri,
        request: &RequestAgent,
    ) -> Result<DiscoMutation, RmapError> {
        self.observe(EventType::Deletion, || {
            self.transition_disco(
                target,
                Status::Deleted,
                EventPayload::Deletion {
                    deleted_object_id: target.clone(),
                },
                request,
            )
        })
    }

    // ── Agent operations ────────────────────────────────────────────

    /// Create a new `ACTIVE` Agent with an allocated id. Emits CREATION.
    pub fn create_agent(
        &self,
        content: AgentContent,
        request: &RequestAgent,
    ) -> Result<AgentMutation, RmapError> {
        self.observe(EventType::Creation, || {
            let start = self.clock.now();
            content.validate()?;
            let agent_id = self.ids.create_id()?;
            self.commit_new_agent(agent_id, content, request, start, id_collision)
        })
    }

    /// Create an Agent under an id minted earlier by the identifier
    /// service, typically for an agent registering itself. Fails with
    /// `InvalidArgument` if the service does not recognise the id or it is
    /// already taken.
    pub fn create_agent_with_id(
        &self,
        agent_id: Iri,
        content: AgentContent,
        request: &RequestAgent,
    ) -> Result<AgentMutation, RmapError> {
        self.observe(EventType::Creation, || {
            let start = self.clock.now();
            if !self.ids.is_valid_id(&agent_id) {
                return Err(RmapError::InvalidArgument(format!(
                    "{agent_id} is not an id issued by the identifier service"
                )));
            }
            content.validate()?;
            self.ensure_unused(&agent_id)?;
            let fixed = agent_id.clone();
            self.commit_new_agent(agent_id, content, request, start, move |failed| {
                match failed {
                    Precondition::Absent { id } if id == fixed => {
                        RmapError::InvalidArgument(format!("id {id} is already in use"))
                    }
                    other => id_collision(other),
                }
            })
        })
    }

    /// Overwrite an Agent's fields in place. Emits REPLACE, whose
    /// description lists the changed fields.
    ///
    /// Returns `Ok(None)` without emitting anything when `content` matches
    /// the stored fields exactly.
    pub fn replace_agent(
        &self,
        target: &Iri,
        content: AgentContent,
        request: &RequestAgent,
    ) -> Result<Option<AgentMutation>, RmapError> {
        self.observe(EventType::Replace, || {
            let start = self.clock.now();
            let current = self.load_agent(target)?;
            content.validate()?;
            let old_content = current.content();
            let changes = old_content.changes_to(&content);
            if changes.is_empty() {
                tracing::debug!(agent = %target, "agent unchanged; no REPLACE emitted");
                return Ok(None);
            }

            let updates = format!("Updates: {}", changes.join("; "));
            let description = match &request.event_description {
                Some(text) => format!("{text}. {updates}"),
                None => updates,
            };
            let event = Event::new(
                self.ids.create_id()?,
                EventTargetType::Agent,
                request,
                start,
                EventPayload::Replace {
                    updated_object_id: target.clone(),
                },
            )
            .with_description(description);
            let mut replaced = current.clone();
            replaced.replace_content(content.clone());

            let commit = Commit::new(event).replace_agent(target.clone(), old_content, content);
            let event = self.commit(
                commit,
                vec![ObjectSnapshot::Agent(current)],
                vec![ObjectSnapshot::Agent(replaced.clone())],
                |failed| match failed {
                    Precondition::Absent { .. } => id_collision(failed),
                    other => RmapError::IllegalState(format!(
                        "concurrent modification: {other}"
                    )),
                },
            )?;
            Ok(Some(AgentMutation {
                event,
                agent: replaced,
            }))
        })
    }

    // ── Authorization helper ────────────────────────────────────────

    /// Succeeds when the acting agent created `target` or is the configured
    /// administrator; otherwise `NotAuthorized`.
    pub fn check_creator(&self, target: &Iri, request: &RequestAgent) -> Result<(), RmapError> {
        let disco = self.load_disco(target)?;
        let is_creator = disco.creator.as_ref() == Some(&request.agent_id);
        let is_admin = self.config.admin_agent.as_ref() == Some(&request.agent_id);
        if is_creator || is_admin {
            Ok(())
        } else {
            Err(RmapError::NotAuthorized {
                agent: request.agent_id.to_string(),
                target: target.to_string(),
            })
        }
    }

    // ── Internals ───────────────────────────────────────────────────

    fn observe<T>(
        &self,
        operation: EventType,
        f: impl FnOnce() -> Result<T, RmapError>,
    ) -> Result<T, RmapError> {
        let result = f();
        if let Err(err) = &result {
            metrics::counter!("rmap_mutations_rejected_total", "kind" => err.kind().as_str())
                .increment(1);
            tracing::debug!(operation = %operation, error = %err, "mutation rejected");
        }
        result
    }

    fn load_disco(&self, id: &Iri) -> Result<Disco, RmapError> {
        self.store
            .get_disco(id)?
            .ok_or_else(|| RmapError::not_found(ObjectKind::Disco, id))
    }

    fn load_agent(&self, id: &Iri) -> Result<Agent, RmapError> {
        self.store
            .get_agent(id)?
            .ok_or_else(|| RmapError::not_found(ObjectKind::Agent, id))
    }

    fn ensure_unused(&self, id: &Iri) -> Result<(), RmapError> {
        let taken = self.store.get_agent(id)?.is_some()
            || self.store.get_disco(id)?.is_some()
            || self.store.get_event(id)?.is_some();
        if taken {
            return Err(RmapError::InvalidArgument(format!(
                "id {id} is already in use"
            )));
        }
        Ok(())
    }

    /// The target and its lineage progenitor, if an update may proceed.
    fn check_updatable(&self, target: &Iri) -> Result<(Disco, Iri), RmapError> {
        let disco = self.load_disco(target)?;
        let lineage = self.lineage.resolve_lineage(target)?;
        if let Some(latest) = lineage.latest() {
            if latest != target {
                return Err(RmapError::NotLatestVersion {
                    id: target.to_string(),
                    latest: latest.to_string(),
                });
            }
        }
        if disco.status != Status::Active {
            return Err(RmapError::InactiveVersion {
                id: target.to_string(),
            });
        }
        Ok((disco, lineage.progenitor))
    }

    fn check_derivable(&self, source: &Iri) -> Result<Disco, RmapError> {
        let disco = self.load_disco(source)?;
        if disco.status == Status::Deleted {
            return Err(RmapError::Deleted {
                id: source.to_string(),
            });
        }
        Ok(disco)
    }

    fn check_transition(&self, target: &Iri, to: Status) -> Result<Disco, RmapError> {
        let disco = self.load_disco(target)?;
        if disco.status.can_transition_to(to) {
            return Ok(disco);
        }
        Err(if disco.status.is_terminal() {
            RmapError::AlreadyTerminal {
                id: target.to_string(),
                status: disco.status,
            }
        } else {
            RmapError::InactiveVersion {
                id: target.to_string(),
            }
        })
    }

    fn transition_disco(
        &self,
        target: &Iri,
        to: Status,
        payload: EventPayload,
        request: &RequestAgent,
    ) -> Result<DiscoMutation, RmapError> {
        let start = self.clock.now();
        let before = self.check_transition(target, to)?;
        let progenitor = self.lineage.progenitor(target)?;
        let event = Event::new(
            self.ids.create_id()?,
            EventTargetType::Disco,
            request,
            start,
            payload,
        )
        .with_lineage_progenitor(progenitor);

        let mut after = before.clone();
        after.status = to;
        let mut commit = Commit::new(event).transition(target.clone(), before.status, to);
        if to == Status::Deleted {
            after.purge();
            commit = commit.purge(target.clone());
        }

        let event = self.commit(
            commit,
            vec![ObjectSnapshot::Disco(before)],
            vec![ObjectSnapshot::Disco(after.clone())],
            |failed| recheck(failed, || self.check_transition(target, to).map(|_| ())),
        )?;
        Ok(DiscoMutation {
            event,
            disco: after,
            source: None,
        })
    }

    fn commit_new_agent(
        &self,
        agent_id: Iri,
        content: AgentContent,
        request: &RequestAgent,
        start: rmap_core::Timestamp,
        on_conflict: impl FnOnce(Precondition) -> RmapError,
    ) -> Result<AgentMutation, RmapError> {
        let event_id = self.ids.create_id()?;
        let event = Event::new(
            event_id.clone(),
            EventTargetType::Agent,
            request,
            start,
            EventPayload::Creation {
                created_object_ids: vec![agent_id.clone()],
            },
        );
        let agent = Agent::new(agent_id, content, event_id);
        let commit = Commit::new(event).create_agent(agent.clone());
        let event = self.commit(
            commit,
            Vec::new(),
            vec![ObjectSnapshot::Agent(agent.clone())],
            on_conflict,
        )?;
        Ok(AgentMutation { event, agent })
    }

    /// Replace blank nodes in related statements with allocated ids, one id
    /// per distinct label.
    fn skolemize(&self, mut content: DiscoContent) -> Result<DiscoContent, RmapError> {
        let mut minted: HashMap<String, Term> = HashMap::new();
        for statement in &content.related_statements {
            for label in statement.blank_labels() {
                if !minted.contains_key(label) {
                    minted.insert(label.to_string(), Term::iri(self.ids.create_id()?));
                }
            }
        }
        if minted.is_empty() {
            return Ok(content);
        }
        content.related_statements = content
            .related_statements
            .into_iter()
            .map(|s| s.map_blank_nodes(|label| minted.get(label).cloned()))
            .collect();
        Ok(content)
    }

    /// Finish the event, commit, then publish. The event is returned as
    /// committed.
    fn commit(
        &self,
        mut commit: Commit,
        before: Vec<ObjectSnapshot>,
        after: Vec<ObjectSnapshot>,
        on_conflict: impl FnOnce(Precondition) -> RmapError,
    ) -> Result<Event, RmapError> {
        commit.event.finish(self.clock.now())?;
        match self.store.commit(&commit) {
            Ok(()) => {}
            Err(StoreError::Conflict(failed)) => {
                tracing::warn!(event_id = %commit.event.id, conflict = %failed, "commit lost a race");
                return Err(on_conflict(failed));
            }
            Err(err) => return Err(err.into()),
        }

        let event = commit.event;
        metrics::counter!(
            "rmap_events_committed_total",
            "event_type" => event.event_type().as_str()
        )
        .increment(1);
        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type(),
            target_type = %event.target_type,
            agent = %event.associated_agent,
            "event committed"
        );

        let notice = CommitNotice {
            event: event.clone(),
            before,
            after,
        };
        if let Err(err) = self.sink.publish(&notice) {
            tracing::warn!(event_id = %event.id, error = %err, "event sink failed; commit stands");
        }
        Ok(event)
    }
}

/// A conflict on a freshly allocated id.
fn id_collision(failed: Precondition) -> RmapError {
    RmapError::IdAllocationFailed(format!("allocated id collided: {failed}"))
}

/// Classify a lost race. A taken id is an allocation failure; otherwise
/// re-run the operation's checks so the caller sees the specific reason,
/// falling back to `IllegalState` if they now pass.
fn recheck(failed: Precondition, check: impl FnOnce() -> Result<(), RmapError>) -> RmapError {
    if let Precondition::Absent { .. } = failed {
        return id_collision(failed);
    }
    match check() {
        Err(err) => err,
        Ok(()) => RmapError::IllegalState(format!("concurrent modification: {failed}")),
    }
}
