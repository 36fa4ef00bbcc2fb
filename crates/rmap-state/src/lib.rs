//! # rmap-state: Object Lifecycle for RMap
//!
//! Everything that reads or changes stored provenance state. The
//! collaborators the engine depends on are traits, each with an in-memory or
//! default implementation so the whole stack runs without external services.
//!
//! ## Components
//!
//! - **Lifecycle engine** (`lifecycle.rs`): the seven mutations. Each success
//!   commits exactly one Event atomically with its objects and status
//!   changes; each failure commits nothing.
//!
//! - **Lineage resolver** (`lineage.rs`): rebuilds the UPDATE-linked version
//!   chain of a DiSCO from the event log, plus cross-lineage derivations.
//!
//! - **Queries** (`query.rs`): read-only object, status and event lookups,
//!   and Timegate construction for a lineage.
//!
//! - **Collaborators**: [`ObjectStore`] (`store.rs`), [`IdService`]
//!   (`idservice.rs`), [`Clock`] (`clock.rs`), [`EventSink`] (`sink.rs`),
//!   and a JSON [`rmap_core::RdfCodec`] (`codec.rs`).
//!
//! - **Configuration** (`config.rs`): identifier allocation and the
//!   administrator agent, from YAML or the environment.
//!
//! ## Concurrency
//!
//! The engine is `Send + Sync` and holds no locks of its own. Per-object
//! serialization is delegated to the store: a [`Commit`] carries
//! compare-and-swap preconditions, and of two racing Updates on the same
//! latest version exactly one lands. The loser receives `NotLatestVersion`
//! or `InactiveVersion`, never a partial write.

pub mod clock;
pub mod codec;
pub mod config;
pub mod idservice;
pub mod lifecycle;
pub mod lineage;
pub mod query;
pub mod sink;
pub mod store;

// ─── Engine re-exports ──────────────────────────────────────────────

pub use lifecycle::{AgentMutation, DiscoMutation, LifecycleEngine};
pub use lineage::{Lineage, LineageResolver};
pub use query::QueryService;

// ─── Collaborator re-exports ────────────────────────────────────────

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::JsonCodec;
pub use config::{ConfigError, EngineConfig, IdScheme, IdServiceConfig};
pub use idservice::{IdService, RandomStringIdService, UuidIdService};
pub use sink::{CommitNotice, EventSink, MemorySink, NoopSink, ObjectSnapshot, SinkError, TracingSink};
pub use store::{Commit, MemoryStore, ObjectStore, Precondition, StoreError, StoreSnapshot};
