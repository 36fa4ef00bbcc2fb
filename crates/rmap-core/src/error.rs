//! # Error Hierarchy
//!
//! Structured error types for RMap, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! [`RmapError`] is the single error returned by the lifecycle engine, the
//! lineage resolver, and the version navigator. Each variant carries the ids
//! involved so the calling service can build a useful response without
//! re-querying the store.
//!
//! ## Retry Policy
//!
//! Only [`RmapError::StoreUnavailable`] is retryable. Validation failures are
//! final; the core never retries on its own, so a retry can never emit a
//! second Event for the same request.

use thiserror::Error;

use crate::status::Status;

/// The kind of object an identifier was expected to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A DiSCO.
    Disco,
    /// An Agent.
    Agent,
    /// A provenance Event.
    Event,
    /// Any object; used when the caller did not know which kind to expect.
    Object,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Disco => "DiSCO",
            Self::Agent => "Agent",
            Self::Event => "Event",
            Self::Object => "object",
        })
    }
}

/// Fieldless error category, for callers that dispatch on the kind of
/// failure (e.g. to pick an HTTP status) rather than on its details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InactiveVersion,
    NotLatestVersion,
    AlreadyTerminal,
    Tombstoned,
    Deleted,
    NotAuthorized,
    IllegalState,
    IdAllocationFailed,
    StoreUnavailable,
}

impl ErrorKind {
    /// Stable snake_case label, used as a metrics label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::InactiveVersion => "inactive_version",
            Self::NotLatestVersion => "not_latest_version",
            Self::AlreadyTerminal => "already_terminal",
            Self::Tombstoned => "tombstoned",
            Self::Deleted => "deleted",
            Self::NotAuthorized => "not_authorized",
            Self::IllegalState => "illegal_state",
            Self::IdAllocationFailed => "id_allocation_failed",
            Self::StoreUnavailable => "store_unavailable",
        }
    }
}

/// Top-level error type for RMap.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RmapError {
    /// Referenced object id does not resolve.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What kind of object was expected.
        kind: ObjectKind,
        /// The id that did not resolve.
        id: String,
    },

    /// Structurally malformed input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An update targeted a DiSCO that is not `ACTIVE`.
    #[error("DiSCO {id} is inactive; only active DiSCOs can be updated")]
    InactiveVersion {
        /// The targeted DiSCO.
        id: String,
    },

    /// An update targeted a DiSCO that has a newer version. The latest
    /// version's id is kept in angle brackets at the end of the message so
    /// clients can parse it out.
    #[error("DiSCO {id} has a newer version; only the latest version can be updated. The latest version can be found at <{latest}>")]
    NotLatestVersion {
        /// The targeted DiSCO.
        id: String,
        /// The newest version in the same lineage.
        latest: String,
    },

    /// A transition targeted an object that is already `TOMBSTONED` or `DELETED`.
    #[error("object {id} is already {status}")]
    AlreadyTerminal {
        /// The targeted object.
        id: String,
        /// Its terminal status.
        status: Status,
    },

    /// Read of a tombstoned object through a public read path.
    #[error("object {id} has been tombstoned")]
    Tombstoned {
        /// The tombstoned object.
        id: String,
    },

    /// Read of a deleted object.
    #[error("object {id} has been permanently deleted")]
    Deleted {
        /// The deleted object.
        id: String,
    },

    /// The acting agent may not act on another agent's object.
    #[error("agent {agent} is neither the creator of {target} nor an administrator")]
    NotAuthorized {
        /// The acting agent.
        agent: String,
        /// The targeted object.
        target: String,
    },

    /// An operation was invoked on an object in a state that forbids it.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The identifier service is exhausted or unreachable.
    #[error("identifier allocation failed: {0}")]
    IdAllocationFailed(String),

    /// Transient failure talking to the object/event store.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl RmapError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(kind: ObjectKind, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// The error's category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InactiveVersion { .. } => ErrorKind::InactiveVersion,
            Self::NotLatestVersion { .. } => ErrorKind::NotLatestVersion,
            Self::AlreadyTerminal { .. } => ErrorKind::AlreadyTerminal,
            Self::Tombstoned { .. } => ErrorKind::Tombstoned,
            Self::Deleted { .. } => ErrorKind::Deleted,
            Self::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            Self::IllegalState(_) => ErrorKind::IllegalState,
            Self::IdAllocationFailed(_) => ErrorKind::IdAllocationFailed,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }

    /// Whether a caller may reasonably retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

/// Validation errors for primitive newtypes.
///
/// Each carries the rejected input so that misconfiguration can be
/// diagnosed from the message alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// IRI is empty or malformed.
    #[error("invalid IRI: \"{value}\" ({reason})")]
    InvalidIri {
        /// The rejected string.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Timestamp string is not valid UTC.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The rejected string.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<ValidationError> for RmapError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
