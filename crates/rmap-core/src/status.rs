//! # Object Status
//!
//! The closed status set shared by DiSCOs and Agents.
//!
//! ## States
//!
//! ```text
//! ACTIVE ──▶ INACTIVE ──▶ TOMBSTONED (terminal)
//!   │           │
//!   │           └──────▶ DELETED (terminal)
//!   ├──▶ TOMBSTONED (terminal)
//!   └──▶ DELETED (terminal)
//! ```
//!
//! `ACTIVE` is the only creation state. `INACTIVE` is reachable only from
//! `ACTIVE`. Nothing leaves a terminal state.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::vocabulary;

/// Lifecycle status of a DiSCO or Agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    /// Current and publicly readable. The only creation state.
    #[serde(rename = "ACTIVE")]
    Active,
    /// Superseded or retired; still readable.
    #[serde(rename = "INACTIVE")]
    Inactive,
    /// Hidden from public reads; provenance remains. Terminal.
    #[serde(rename = "TOMBSTONED")]
    Tombstoned,
    /// Content purged; status marker and events remain. Terminal.
    #[serde(rename = "DELETED")]
    Deleted,
}

impl Status {
    /// All statuses, in lifecycle order.
    pub const ALL: [Status; 4] = [
        Self::Active,
        Self::Inactive,
        Self::Tombstoned,
        Self::Deleted,
    ];

    /// The canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Tombstoned => "TOMBSTONED",
            Self::Deleted => "DELETED",
        }
    }

    /// Parse a canonical upper-case name. Returns `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            "TOMBSTONED" => Some(Self::Tombstoned),
            "DELETED" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// The ontology term for this status.
    pub fn term(&self) -> &'static str {
        match self {
            Self::Active => vocabulary::ACTIVE,
            Self::Inactive => vocabulary::INACTIVE,
            Self::Tombstoned => vocabulary::TOMBSTONED,
            Self::Deleted => vocabulary::DELETED,
        }
    }

    /// Reverse lookup from an ontology term.
    pub fn from_term(term: &str) -> Option<Self> {
        static BY_TERM: OnceLock<HashMap<&'static str, Status>> = OnceLock::new();
        BY_TERM
            .get_or_init(|| Self::ALL.iter().map(|s| (s.term(), *s)).collect())
            .get(term)
            .copied()
    }

    /// Whether no further transition is permitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Tombstoned | Self::Deleted)
    }

    /// The statuses reachable in one step from this one.
    pub fn valid_transitions(&self) -> &'static [Status] {
        match self {
            Self::Active => &[Self::Inactive, Self::Tombstoned, Self::Deleted],
            Self::Inactive => &[Self::Tombstoned, Self::Deleted],
            Self::Tombstoned | Self::Deleted => &[],
        }
    }

    /// Whether `self -> to` is a permitted transition.
    pub fn can_transition_to(&self, to: Status) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status filter for listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// Only `ACTIVE` objects.
    Active,
    /// Only `INACTIVE` objects.
    Inactive,
    /// Every object that has not been tombstoned or deleted.
    #[default]
    All,
}

impl StatusFilter {
    /// Whether an object in `status` passes the filter.
    pub fn matches(&self, status: Status) -> bool {
        match self {
            Self::Active => status == Status::Active,
            Self::Inactive => status == Status::Inactive,
            Self::All => !status.is_terminal(),
        }
    }
}
