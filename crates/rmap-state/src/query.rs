//! # Read-Side Queries
//!
//! Read-only lookups over the store: objects, their statuses, and the events
//! that touch them. Public DiSCO reads hide tombstoned and deleted objects;
//! [`QueryService::read_disco_any_status`] is the provenance-path exception.

use std::sync::Arc;

use rmap_core::{
    Agent, Disco, Event, EventTargetType, Iri, ObjectKind, RmapError, Status, StatusFilter,
};
use rmap_versioning::Timegate;

use crate::lineage::LineageResolver;
use crate::store::ObjectStore;

#[derive(Debug, Clone)]
pub struct QueryService {
    store: Arc<dyn ObjectStore>,
    lineage: LineageResolver,
}

impl QueryService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            lineage: LineageResolver::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn lineage(&self) -> &LineageResolver {
        &self.lineage
    }

    /// A Timegate over the lineage of `id`.
    pub fn timegate(&self, id: &Iri) -> Result<Timegate, RmapError> {
        Ok(Timegate::new(self.lineage.versions(id)?))
    }

    // ── DiSCOs ──────────────────────────────────────────────────────

    /// The DiSCO, unless it is tombstoned or deleted.
    pub fn read_disco(&self, id: &Iri) -> Result<Disco, RmapError> {
        let disco = self.read_disco_any_status(id)?;
        match disco.status {
            Status::Tombstoned => Err(RmapError::Tombstoned { id: id.to_string() }),
            Status::Deleted => Err(RmapError::Deleted { id: id.to_string() }),
            Status::Active | Status::Inactive => Ok(disco),
        }
    }

    /// The DiSCO whatever its status. A deleted DiSCO comes back purged.
    pub fn read_disco_any_status(&self, id: &Iri) -> Result<Disco, RmapError> {
        self.store
            .get_disco(id)?
            .ok_or_else(|| RmapError::not_found(ObjectKind::Disco, id))
    }

    pub fn disco_status(&self, id: &Iri) -> Result<Status, RmapError> {
        Ok(self.read_disco_any_status(id)?.status)
    }

    /// Every event referring to the DiSCO, oldest first.
    pub fn disco_events(&self, id: &Iri) -> Result<Vec<Event>, RmapError> {
        self.read_disco_any_status(id)?;
        Ok(self.store.events_referencing(id)?)
    }

    // ── Events ──────────────────────────────────────────────────────

    pub fn read_event(&self, id: &Iri) -> Result<Event, RmapError> {
        self.store
            .get_event(id)?
            .ok_or_else(|| RmapError::not_found(ObjectKind::Event, id))
    }

    /// DiSCO ids named in a DiSCO event's payload. Empty for agent events.
    pub fn event_related_discos(&self, id: &Iri) -> Result<Vec<Iri>, RmapError> {
        let event = self.read_event(id)?;
        Ok(match event.target_type {
            EventTargetType::Disco => event.payload.referenced_ids().into_iter().cloned().collect(),
            EventTargetType::Agent => Vec::new(),
        })
    }

    /// The initiating agent, followed by any agent ids named in the payload.
    pub fn event_related_agents(&self, id: &Iri) -> Result<Vec<Iri>, RmapError> {
        let event = self.read_event(id)?;
        let mut agents = vec![event.associated_agent.clone()];
        if event.target_type == EventTargetType::Agent {
            for referenced in event.payload.referenced_ids() {
                if !agents.contains(referenced) {
                    agents.push(referenced.clone());
                }
            }
        }
        Ok(agents)
    }

    // ── Agents ──────────────────────────────────────────────────────

    pub fn read_agent(&self, id: &Iri) -> Result<Agent, RmapError> {
        self.store
            .get_agent(id)?
            .ok_or_else(|| RmapError::not_found(ObjectKind::Agent, id))
    }

    pub fn agent_status(&self, id: &Iri) -> Result<Status, RmapError> {
        Ok(self.read_agent(id)?.status)
    }

    /// Events whose payload names the agent (its creation and replacements).
    pub fn agent_events(&self, id: &Iri) -> Result<Vec<Event>, RmapError> {
        self.read_agent(id)?;
        Ok(self.store.events_referencing(id)?)
    }

    /// Events the agent initiated, oldest first.
    pub fn agent_events_initiated(&self, id: &Iri) -> Result<Vec<Event>, RmapError> {
        self.read_agent(id)?;
        Ok(self.store.events_by_agent(id)?)
    }

    /// DiSCOs the agent brought into existence (created, updated into or
    /// derived), filtered by current status.
    pub fn agent_discos(&self, id: &Iri, filter: StatusFilter) -> Result<Vec<Iri>, RmapError> {
        let mut discos = Vec::new();
        for event in self.agent_events_initiated(id)? {
            if event.target_type != EventTargetType::Disco {
                continue;
            }
            for generated in event.payload.generated_ids() {
                if discos.contains(generated) {
                    continue;
                }
                if let Some(disco) = self.store.get_disco(generated)? {
                    if filter.matches(disco.status) {
                        discos.push(disco.id);
                    }
                }
            }
        }
        Ok(discos)
    }

    // ── Id classification ───────────────────────────────────────────

    pub fn is_disco_id(&self, id: &Iri) -> Result<bool, RmapError> {
        Ok(self.store.get_disco(id)?.is_some())
    }

    pub fn is_agent_id(&self, id: &Iri) -> Result<bool, RmapError> {
        Ok(self.store.get_agent(id)?.is_some())
    }

    pub fn is_event_id(&self, id: &Iri) -> Result<bool, RmapError> {
        Ok(self.store.get_event(id)?.is_some())
    }
}
