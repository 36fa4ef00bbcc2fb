//! # rmap-core: Foundational Types for RMap
//!
//! This crate is the leaf of the RMap workspace. It defines the object model
//! shared by the lifecycle engine, the lineage resolver, and the Timegate:
//! identifiers, timestamps, the status vocabulary, DiSCOs, Agents, Events,
//! and the error taxonomy. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Validated identifiers.** [`Iri`] is a newtype with a checked
//!    constructor. No bare strings for object ids.
//!
//! 2. **One event record, one payload enum.** Every provenance record is an
//!    [`Event`]; the per-type object references live in [`EventPayload`], so
//!    a `match` on the payload is exhaustive over the seven event types.
//!
//! 3. **Closed status set.** [`Status`] owns the transition table. Terminal
//!    states (`TOMBSTONED`, `DELETED`) have no outgoing transitions.
//!
//! 4. **UTC-only timestamps.** [`Timestamp`] is UTC with millisecond
//!    precision and renders with a `Z` suffix.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `rmap-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod agent;
pub mod disco;
pub mod error;
pub mod event;
pub mod format;
pub mod identity;
pub mod request;
pub mod status;
pub mod temporal;
pub mod triple;
pub mod vocabulary;

pub use agent::{Agent, AgentContent};
pub use disco::{Disco, DiscoContent};
pub use error::{ErrorKind, ObjectKind, RmapError, ValidationError};
pub use event::{Event, EventPayload, EventTargetType, EventType};
pub use format::{RdfCodec, RdfFormat};
pub use identity::Iri;
pub use request::RequestAgent;
pub use status::{Status, StatusFilter};
pub use temporal::Timestamp;
pub use triple::{Term, Triple};
