//! # Provenance Events
//!
//! Every mutation produces exactly one [`Event`]. Events are append-only:
//! once `end_time` is set an event never changes and is never deleted, even
//! when the object it refers to is.
//!
//! ## Event Types
//!
//! | Type | Payload |
//! |------|---------|
//! | CREATION | created object ids (normally one) |
//! | UPDATE | inactivated (old) id, derived (new) id |
//! | DERIVATION | source id, derived (new) id |
//! | INACTIVATION | inactivated id |
//! | TOMBSTONE | tombstoned id |
//! | DELETION | deleted id |
//! | REPLACE | updated id (unchanged) |
//!
//! The type tag and the payload are one value, [`EventPayload`], so an event
//! cannot claim to be an UPDATE while carrying a DERIVATION's references.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::RmapError;
use crate::identity::Iri;
use crate::request::RequestAgent;
use crate::temporal::Timestamp;
use crate::vocabulary;

// ─── Event Type ──────────────────────────────────────────────────────

/// The seven event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Creation,
    Update,
    Derivation,
    Inactivation,
    Tombstone,
    Deletion,
    Replace,
}

impl EventType {
    pub const ALL: [EventType; 7] = [
        Self::Creation,
        Self::Update,
        Self::Derivation,
        Self::Inactivation,
        Self::Tombstone,
        Self::Deletion,
        Self::Replace,
    ];

    /// The canonical upper-case name, also used as a metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creation => "CREATION",
            Self::Update => "UPDATE",
            Self::Derivation => "DERIVATION",
            Self::Inactivation => "INACTIVATION",
            Self::Tombstone => "TOMBSTONE",
            Self::Deletion => "DELETION",
            Self::Replace => "REPLACE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// The ontology term for this event type.
    pub fn term(&self) -> &'static str {
        match self {
            Self::Creation => vocabulary::CREATION,
            Self::Update => vocabulary::UPDATE,
            Self::Derivation => vocabulary::DERIVATION,
            Self::Inactivation => vocabulary::INACTIVATION,
            Self::Tombstone => vocabulary::TOMBSTONE,
            Self::Deletion => vocabulary::DELETION,
            Self::Replace => vocabulary::REPLACE,
        }
    }

    pub fn from_term(term: &str) -> Option<Self> {
        static BY_TERM: OnceLock<HashMap<&'static str, EventType>> = OnceLock::new();
        BY_TERM
            .get_or_init(|| Self::ALL.iter().map(|t| (t.term(), *t)).collect())
            .get(term)
            .copied()
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of object an event acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventTargetType {
    Disco,
    Agent,
}

impl EventTargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disco => "DISCO",
            Self::Agent => "AGENT",
        }
    }

    pub fn term(&self) -> &'static str {
        match self {
            Self::Disco => vocabulary::DISCO,
            Self::Agent => vocabulary::AGENT,
        }
    }

    pub fn from_term(term: &str) -> Option<Self> {
        static BY_TERM: OnceLock<HashMap<&'static str, EventTargetType>> = OnceLock::new();
        BY_TERM
            .get_or_init(|| {
                [EventTargetType::Disco, EventTargetType::Agent]
                    .iter()
                    .map(|t| (t.term(), *t))
                    .collect()
            })
            .get(term)
            .copied()
    }
}

impl std::fmt::Display for EventTargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Payload ─────────────────────────────────────────────────────────

/// Type tag plus the object references that type carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    Creation {
        created_object_ids: Vec<Iri>,
    },
    Update {
        inactivated_object_id: Iri,
        derived_object_id: Iri,
    },
    Derivation {
        source_object_id: Iri,
        derived_object_id: Iri,
    },
    Inactivation {
        inactivated_object_id: Iri,
    },
    Tombstone {
        tombstoned_object_id: Iri,
    },
    Deletion {
        deleted_object_id: Iri,
    },
    Replace {
        updated_object_id: Iri,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Creation { .. } => EventType::Creation,
            Self::Update { .. } => EventType::Update,
            Self::Derivation { .. } => EventType::Derivation,
            Self::Inactivation { .. } => EventType::Inactivation,
            Self::Tombstone { .. } => EventType::Tombstone,
            Self::Deletion { .. } => EventType::Deletion,
            Self::Replace { .. } => EventType::Replace,
        }
    }

    /// Every object id the event refers to, in payload order.
    pub fn referenced_ids(&self) -> Vec<&Iri> {
        match self {
            Self::Creation { created_object_ids } => created_object_ids.iter().collect(),
            Self::Update {
                inactivated_object_id,
                derived_object_id,
            } => vec![inactivated_object_id, derived_object_id],
            Self::Derivation {
                source_object_id,
                derived_object_id,
            } => vec![source_object_id, derived_object_id],
            Self::Inactivation {
                inactivated_object_id,
            } => vec![inactivated_object_id],
            Self::Tombstone {
                tombstoned_object_id,
            } => vec![tombstoned_object_id],
            Self::Deletion { deleted_object_id } => vec![deleted_object_id],
            Self::Replace { updated_object_id } => vec![updated_object_id],
        }
    }

    /// Ids of objects the event brought into existence.
    pub fn generated_ids(&self) -> Vec<&Iri> {
        match self {
            Self::Creation { created_object_ids } => created_object_ids.iter().collect(),
            Self::Update {
                derived_object_id, ..
            }
            | Self::Derivation {
                derived_object_id, ..
            } => vec![derived_object_id],
            _ => Vec::new(),
        }
    }
}

// ─── Event ───────────────────────────────────────────────────────────

/// An immutable provenance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Iri,
    pub target_type: EventTargetType,
    /// The agent that performed the mutation.
    pub associated_agent: Iri,
    /// The credential used, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_key: Option<Iri>,
    pub start_time: Timestamp,
    /// Set exactly once, when the operation completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Progenitor of the lineage a DiSCO event belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage_progenitor: Option<Iri>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    /// A new, unfinished event attributed to `request`.
    pub fn new(
        id: Iri,
        target_type: EventTargetType,
        request: &RequestAgent,
        start_time: Timestamp,
        payload: EventPayload,
    ) -> Self {
        Self {
            id,
            target_type,
            associated_agent: request.agent_id.clone(),
            associated_key: request.key_id.clone(),
            start_time,
            end_time: None,
            description: request.event_description.clone(),
            lineage_progenitor: None,
            payload,
        }
    }

    pub fn with_lineage_progenitor(mut self, progenitor: Iri) -> Self {
        self.lineage_progenitor = Some(progenitor);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }

    /// Record completion. Fails if the event was already finished or if
    /// `end_time` precedes `start_time`.
    pub fn finish(&mut self, end_time: Timestamp) -> Result<(), RmapError> {
        if self.end_time.is_some() {
            return Err(RmapError::IllegalState(format!(
                "event {} already has an end time",
                self.id
            )));
        }
        if end_time < self.start_time {
            return Err(RmapError::IllegalState(format!(
                "event {} cannot end ({end_time}) before it starts ({})",
                self.id, self.start_time
            )));
        }
        self.end_time = Some(end_time);
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// Whether `id` appears among the payload's object references.
    pub fn references(&self, id: &Iri) -> bool {
        self.payload.referenced_ids().contains(&id)
    }
}
