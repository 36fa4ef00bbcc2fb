//! # Timegate
//!
//! Point-in-time version resolution in the Memento style.
//!
//! ```text
//!           T1        T2        T3
//!   ────────●─────────●─────────●──────────▶ time
//!   ◀─ V1 ─▶│◀─ V1 ──▶│◀─ V2 ──▶│◀─ V3 ───▶
//! ```
//!
//! A query before `T1` still resolves to `V1`: a request for a moment before
//! history begins gets the oldest version rather than nothing.

use rmap_core::{Iri, RmapError, Timestamp};
use serde::Serialize;

use crate::versions::ResourceVersions;

/// One `(timestamp, version)` pair, owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    pub timestamp: Timestamp,
    pub version: Iri,
}

impl VersionEntry {
    fn from_pair((timestamp, version): (Timestamp, &Iri)) -> Self {
        Self {
            timestamp,
            version: version.clone(),
        }
    }
}

/// Resolves query times against a resource's versions.
#[derive(Debug, Clone)]
pub struct Timegate {
    versions: ResourceVersions,
}

impl Timegate {
    pub fn new(versions: ResourceVersions) -> Self {
        Self { versions }
    }

    pub fn versions(&self) -> &ResourceVersions {
        &self.versions
    }

    /// The version that was current at `at`, or the latest when `at` is
    /// `None`.
    pub fn resolve(&self, at: Option<Timestamp>) -> Result<VersionEntry, RmapError> {
        let Some(at) = at else {
            return self.last();
        };
        if let Some(version) = self.versions.version_at(at) {
            return Ok(VersionEntry {
                timestamp: at,
                version: version.clone(),
            });
        }
        if at < self.versions.first_timestamp()? {
            return self.first();
        }
        self.versions
            .previous(at)
            .map(VersionEntry::from_pair)
            .ok_or_else(|| RmapError::IllegalState(format!("no version at or before {at}")))
    }

    fn first(&self) -> Result<VersionEntry, RmapError> {
        Ok(VersionEntry {
            timestamp: self.versions.first_timestamp()?,
            version: self.versions.first_version()?.clone(),
        })
    }

    fn last(&self) -> Result<VersionEntry, RmapError> {
        Ok(VersionEntry {
            timestamp: self.versions.last_timestamp()?,
            version: self.versions.last_version()?.clone(),
        })
    }
}

/// First/previous/next/last entries around a selected version, for
/// building Memento `Link` headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationLinks {
    pub first: VersionEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<VersionEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<VersionEntry>,
    pub last: VersionEntry,
}

impl NavigationLinks {
    /// Links around the version created at `timestamp`. `previous` and
    /// `next` are omitted when they would duplicate `first` or `last`.
    pub fn around(versions: &ResourceVersions, timestamp: Timestamp) -> Result<Self, RmapError> {
        let first = VersionEntry {
            timestamp: versions.first_timestamp()?,
            version: versions.first_version()?.clone(),
        };
        let last = VersionEntry {
            timestamp: versions.last_timestamp()?,
            version: versions.last_version()?.clone(),
        };
        let previous = versions
            .previous(timestamp)
            .filter(|_| !versions.previous_is_first(timestamp))
            .map(VersionEntry::from_pair);
        let next = versions
            .next(timestamp)
            .filter(|_| !versions.next_is_last(timestamp))
            .map(VersionEntry::from_pair);
        Ok(Self {
            first,
            previous,
            next,
            last,
        })
    }
}
