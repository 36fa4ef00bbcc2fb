//! # Lineage Resolver
//!
//! Reconstructs the version chain of a DiSCO from the event log.
//!
//! ## Algorithm
//!
//! 1. **Backward.** From the starting DiSCO, follow the generating event.
//!    While it is an UPDATE, step to its inactivated (older) DiSCO. A
//!    CREATION or DERIVATION ends the walk; that DiSCO is the progenitor.
//! 2. **Forward.** Breadth-first from the progenitor, follow every UPDATE
//!    whose inactivated DiSCO is already a member, adding its derived DiSCO.
//! 3. **Order.** Sort members by the start time of their generating event,
//!    oldest first. Equal start times keep their order along the UPDATE
//!    chain; [`Lineage::to_versions`] refuses such a lineage, since a
//!    version map cannot hold two versions at one instant.
//!
//! DERIVATION events are never followed: a derived DiSCO is the progenitor
//! of its own lineage. The cross-lineage link is still available through
//! [`LineageResolver::derivatives`] and [`LineageResolver::derived_from`].
//!
//! The resolver only reads, so it may run concurrently with writers and may
//! observe a slightly stale view.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use rmap_core::{Disco, Event, EventPayload, Iri, ObjectKind, RmapError, Timestamp};
use rmap_versioning::ResourceVersions;
use serde::Serialize;

use crate::store::ObjectStore;

/// A resolved lineage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lineage {
    /// The CREATION- or DERIVATION-origin DiSCO.
    pub progenitor: Iri,
    /// `(generating event start time, DiSCO id)`, oldest first.
    pub members: Vec<(Timestamp, Iri)>,
}

impl Lineage {
    /// The newest member.
    pub fn latest(&self) -> Option<&Iri> {
        self.members.last().map(|(_, id)| id)
    }

    pub fn contains(&self, id: &Iri) -> bool {
        self.members.iter().any(|(_, m)| m == id)
    }

    pub fn position(&self, id: &Iri) -> Option<usize> {
        self.members.iter().position(|(_, m)| m == id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The members as a version map for the Timegate.
    ///
    /// Fails with `IllegalState` if two members share a start time.
    pub fn to_versions(&self) -> Result<ResourceVersions, RmapError> {
        if let Some(pair) = self.members.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(RmapError::IllegalState(format!(
                "versions {} and {} of lineage {} share start time {}",
                pair[0].1, pair[1].1, self.progenitor, pair[0].0
            )));
        }
        ResourceVersions::from_entries(self.members.iter().cloned())
    }
}

/// Walks the event log to build lineages.
#[derive(Debug, Clone)]
pub struct LineageResolver {
    store: Arc<dyn ObjectStore>,
}

impl LineageResolver {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    fn disco(&self, id: &Iri) -> Result<Disco, RmapError> {
        self.store
            .get_disco(id)?
            .ok_or_else(|| RmapError::not_found(ObjectKind::Disco, id))
    }

    fn generating_event(&self, disco: &Disco) -> Result<Event, RmapError> {
        self.store.get_event(&disco.prov_generated_by)?.ok_or_else(|| {
            RmapError::IllegalState(format!(
                "generating event {} of DiSCO {} is missing",
                disco.prov_generated_by, disco.id
            ))
        })
    }

    /// The first version of the lineage containing `id`.
    pub fn progenitor(&self, id: &Iri) -> Result<Iri, RmapError> {
        let mut current = self.disco(id)?;
        let mut seen = HashSet::new();
        loop {
            if !seen.insert(current.id.clone()) {
                return Err(RmapError::IllegalState(format!(
                    "UPDATE cycle detected at DiSCO {}",
                    current.id
                )));
            }
            match self.generating_event(&current)?.payload {
                EventPayload::Update {
                    inactivated_object_id,
                    ..
                } => current = self.disco(&inactivated_object_id)?,
                _ => return Ok(current.id),
            }
        }
    }

    /// All versions in the lineage of `id`, oldest first.
    pub fn resolve_lineage(&self, id: &Iri) -> Result<Lineage, RmapError> {
        let progenitor = self.progenitor(id)?;

        // Discovery order is chain order.
        let mut found = HashSet::from([progenitor.clone()]);
        let mut chain = vec![progenitor.clone()];
        let mut queue = VecDeque::from([progenitor.clone()]);
        while let Some(member) = queue.pop_front() {
            for event in self.store.events_referencing(&member)? {
                if let EventPayload::Update {
                    inactivated_object_id,
                    derived_object_id,
                } = event.payload
                {
                    if inactivated_object_id == member && found.insert(derived_object_id.clone()) {
                        chain.push(derived_object_id.clone());
                        queue.push_back(derived_object_id);
                    }
                }
            }
        }

        let mut ordered = Vec::with_capacity(chain.len());
        for (position, member) in chain.into_iter().enumerate() {
            let disco = self.disco(&member)?;
            let started = self.generating_event(&disco)?.start_time;
            ordered.push((started, position, member));
        }
        ordered.sort_by_key(|(started, position, _)| (*started, *position));
        let members: Vec<(Timestamp, Iri)> = ordered
            .into_iter()
            .map(|(started, _, member)| (started, member))
            .collect();
        tracing::debug!(%progenitor, members = members.len(), "lineage resolved");
        Ok(Lineage {
            progenitor,
            members,
        })
    }

    /// The newest version in the lineage of `id`.
    pub fn latest_version(&self, id: &Iri) -> Result<Iri, RmapError> {
        let lineage = self.resolve_lineage(id)?;
        lineage
            .latest()
            .cloned()
            .ok_or_else(|| RmapError::IllegalState(format!("empty lineage for {id}")))
    }

    /// The version immediately before `id`, if any.
    pub fn previous_version(&self, id: &Iri) -> Result<Option<Iri>, RmapError> {
        let lineage = self.resolve_lineage(id)?;
        Ok(lineage
            .position(id)
            .and_then(|i| i.checked_sub(1))
            .map(|i| lineage.members[i].1.clone()))
    }

    /// The version immediately after `id`, if any.
    pub fn next_version(&self, id: &Iri) -> Result<Option<Iri>, RmapError> {
        let lineage = self.resolve_lineage(id)?;
        Ok(lineage
            .position(id)
            .and_then(|i| lineage.members.get(i + 1))
            .map(|(_, m)| m.clone()))
    }

    /// DiSCOs derived from any member of the lineage of `id`: the
    /// "other-agent versions".
    pub fn derivatives(&self, id: &Iri) -> Result<Vec<Iri>, RmapError> {
        let lineage = self.resolve_lineage(id)?;
        let mut derived = Vec::new();
        for (_, member) in &lineage.members {
            for event in self.store.events_referencing(member)? {
                if let EventPayload::Derivation {
                    source_object_id,
                    derived_object_id,
                } = event.payload
                {
                    if source_object_id == *member && !derived.contains(&derived_object_id) {
                        derived.push(derived_object_id);
                    }
                }
            }
        }
        Ok(derived)
    }

    /// The DiSCO the lineage of `id` was derived from, when its progenitor
    /// came from a DERIVATION rather than a CREATION.
    pub fn derived_from(&self, id: &Iri) -> Result<Option<Iri>, RmapError> {
        let progenitor = self.disco(&self.progenitor(id)?)?;
        Ok(match self.generating_event(&progenitor)?.payload {
            EventPayload::Derivation {
                source_object_id, ..
            } => Some(source_object_id),
            _ => None,
        })
    }

    /// The lineage of `id` as a version map, ready for a Timegate.
    pub fn versions(&self, id: &Iri) -> Result<ResourceVersions, RmapError> {
        self.resolve_lineage(id)?.to_versions()
    }
}
