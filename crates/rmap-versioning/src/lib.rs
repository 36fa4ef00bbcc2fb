//! # rmap-versioning: Temporal Version Navigation
//!
//! Given the versions of a resource keyed by the time each came into being,
//! answers "which version was current at time T?" and the neighbouring
//! first/previous/next/last questions used to build navigation links.
//!
//! Everything here is a pure computation over an immutable
//! [`ResourceVersions`] snapshot. Nothing locks and nothing mutates, so a
//! navigator can be shared freely across threads.
//!
//! ## Resolution Rule
//!
//! [`Timegate::resolve`] checks, in order: no query time (latest version),
//! exact match, query before the first version (first version), otherwise
//! the nearest earlier version. It never fails on a non-empty map.

pub mod timegate;
pub mod versions;

pub use timegate::{NavigationLinks, Timegate, VersionEntry};
pub use versions::ResourceVersions;
