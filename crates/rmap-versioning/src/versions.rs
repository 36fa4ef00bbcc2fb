//! # Resource Versions
//!
//! An ordered, non-empty map from timestamp to version id, backed by a
//! `BTreeMap` so that floor, ceiling and boundary lookups are `O(log n)`.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use rmap_core::{Iri, RmapError, Timestamp};
use serde::{Deserialize, Serialize};

/// Versions of one resource keyed by the time each was created.
///
/// Timestamps are unique and there is always at least one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Timestamp, Iri>", into = "BTreeMap<Timestamp, Iri>")]
pub struct ResourceVersions {
    map: BTreeMap<Timestamp, Iri>,
}

impl ResourceVersions {
    /// Wrap an existing map. Fails with `InvalidArgument` when it is empty.
    pub fn new(map: BTreeMap<Timestamp, Iri>) -> Result<Self, RmapError> {
        if map.is_empty() {
            return Err(RmapError::InvalidArgument(
                "resource versions require at least one entry".to_string(),
            ));
        }
        Ok(Self { map })
    }

    /// Build from `(timestamp, version)` pairs in any order.
    ///
    /// Fails with `InvalidArgument` on an empty input or when two entries
    /// share a timestamp.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (Timestamp, Iri)>,
    ) -> Result<Self, RmapError> {
        let mut map = BTreeMap::new();
        for (timestamp, version) in entries {
            if let Some(existing) = map.insert(timestamp, version.clone()) {
                return Err(RmapError::InvalidArgument(format!(
                    "versions {existing} and {version} share timestamp {timestamp}"
                )));
            }
        }
        Self::new(map)
    }

    fn empty() -> RmapError {
        RmapError::IllegalState("resource versions are empty".to_string())
    }

    pub fn first_timestamp(&self) -> Result<Timestamp, RmapError> {
        self.map.keys().next().copied().ok_or_else(Self::empty)
    }

    pub fn first_version(&self) -> Result<&Iri, RmapError> {
        self.map.values().next().ok_or_else(Self::empty)
    }

    pub fn last_timestamp(&self) -> Result<Timestamp, RmapError> {
        self.map.keys().next_back().copied().ok_or_else(Self::empty)
    }

    pub fn last_version(&self) -> Result<&Iri, RmapError> {
        self.map.values().next_back().ok_or_else(Self::empty)
    }

    /// The version created at exactly `timestamp`.
    pub fn version_at(&self, timestamp: Timestamp) -> Option<&Iri> {
        self.map.get(&timestamp)
    }

    /// The timestamp of `version`, if it is in the map.
    pub fn timestamp_of(&self, version: &Iri) -> Option<Timestamp> {
        self.map
            .iter()
            .find(|(_, v)| *v == version)
            .map(|(t, _)| *t)
    }

    /// The entry with the greatest timestamp strictly before `timestamp`.
    pub fn previous(&self, timestamp: Timestamp) -> Option<(Timestamp, &Iri)> {
        self.map
            .range(..timestamp)
            .next_back()
            .map(|(t, v)| (*t, v))
    }

    /// The entry with the smallest timestamp strictly after `timestamp`.
    pub fn next(&self, timestamp: Timestamp) -> Option<(Timestamp, &Iri)> {
        self.map
            .range((Excluded(timestamp), Unbounded))
            .next()
            .map(|(t, v)| (*t, v))
    }

    pub fn has_previous(&self, timestamp: Timestamp) -> bool {
        self.previous(timestamp).is_some()
    }

    pub fn has_next(&self, timestamp: Timestamp) -> bool {
        self.next(timestamp).is_some()
    }

    /// Whether the entry before `timestamp` is the first entry.
    pub fn previous_is_first(&self, timestamp: Timestamp) -> bool {
        match (self.previous(timestamp), self.map.keys().next()) {
            (Some((prev, _)), Some(first)) => prev == *first,
            _ => false,
        }
    }

    /// Whether the entry after `timestamp` is the last entry.
    pub fn next_is_last(&self, timestamp: Timestamp) -> bool {
        match (self.next(timestamp), self.map.keys().next_back()) {
            (Some((next, _)), Some(last)) => next == *last,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Always false for a constructed value; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Entries in timestamp order, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Timestamp, &Iri)> {
        self.map.iter().map(|(t, v)| (*t, v))
    }

    /// Whether `version` is one of the entries.
    pub fn contains_version(&self, version: &Iri) -> bool {
        self.map.values().any(|v| v == version)
    }
}

impl TryFrom<BTreeMap<Timestamp, Iri>> for ResourceVersions {
    type Error = RmapError;

    fn try_from(map: BTreeMap<Timestamp, Iri>) -> Result<Self, Self::Error> {
        Self::new(map)
    }
}

impl From<ResourceVersions> for BTreeMap<Timestamp, Iri> {
    fn from(versions: ResourceVersions) -> Self {
        versions.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(millis: i64) -> Timestamp {
        Timestamp::from_epoch_millis(millis).unwrap()
    }

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    fn three() -> ResourceVersions {
        ResourceVersions::from_entries([
            (ts(3_000), iri("rmap:v3")),
            (ts(1_000), iri("rmap:v1")),
            (ts(2_000), iri("rmap:v2")),
        ])
        .unwrap()
    }

    #[test]
    fn empty_is_rejected() {
        let err = ResourceVersions::new(BTreeMap::new()).unwrap_err();
        assert!(matches!(err, RmapError::InvalidArgument(_)));
        assert!(ResourceVersions::from_entries(Vec::<(Timestamp, Iri)>::new()).is_err());
    }

    #[test]
    fn duplicate_timestamps_are_rejected() {
        let err = ResourceVersions::from_entries([
            (ts(1_000), iri("rmap:v1")),
            (ts(1_000), iri("rmap:v2")),
        ])
        .unwrap_err();
        assert!(matches!(err, RmapError::InvalidArgument(_)));
    }

    #[test]
    fn boundaries() {
        let v = three();
        assert_eq!(v.first_timestamp().unwrap(), ts(1_000));
        assert_eq!(v.first_version().unwrap(), &iri("rmap:v1"));
        assert_eq!(v.last_timestamp().unwrap(), ts(3_000));
        assert_eq!(v.last_version().unwrap(), &iri("rmap:v3"));
        assert_eq!(v.len(), 3);
    }

    #[test]
    fn exact_lookup_returns_none_on_miss() {
        let v = three();
        assert_eq!(v.version_at(ts(2_000)), Some(&iri("rmap:v2")));
        assert_eq!(v.version_at(ts(2_001)), None);
    }

    #[test]
    fn previous_is_strictly_less() {
        let v = three();
        assert_eq!(v.previous(ts(2_000)), Some((ts(1_000), &iri("rmap:v1"))));
        assert_eq!(v.previous(ts(2_500)), Some((ts(2_000), &iri("rmap:v2"))));
        assert_eq!(v.previous(ts(1_000)), None);
        assert_eq!(v.previous(ts(500)), None);
        assert!(!v.has_previous(ts(1_000)));
    }

    #[test]
    fn next_is_strictly_greater() {
        let v = three();
        assert_eq!(v.next(ts(2_000)), Some((ts(3_000), &iri("rmap:v3"))));
        assert_eq!(v.next(ts(500)), Some((ts(1_000), &iri("rmap:v1"))));
        assert_eq!(v.next(ts(3_000)), None);
        assert!(!v.has_next(ts(9_000)));
    }

    #[test]
    fn boundary_predicates() {
        let v = three();
        assert!(v.previous_is_first(ts(2_000)));
        assert!(!v.previous_is_first(ts(3_000)));
        assert!(!v.previous_is_first(ts(1_000)));
        assert!(v.next_is_last(ts(2_000)));
        assert!(!v.next_is_last(ts(1_000)));
        assert!(!v.next_is_last(ts(3_000)));
    }

    #[test]
    fn timestamp_of_finds_version() {
        let v = three();
        assert_eq!(v.timestamp_of(&iri("rmap:v2")), Some(ts(2_000)));
        assert_eq!(v.timestamp_of(&iri("rmap:v9")), None);
        assert!(v.contains_version(&iri("rmap:v3")));
    }

    #[test]
    fn iter_is_oldest_first() {
        let ids: Vec<_> = three().iter().map(|(_, v)| v.to_string()).collect();
        assert_eq!(ids, vec!["rmap:v1", "rmap:v2", "rmap:v3"]);
    }

    #[test]
    fn serde_rejects_empty_map() {
        let v = three();
        let json = serde_json::to_string(&v).unwrap();
        let back: ResourceVersions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
        assert!(serde_json::from_str::<ResourceVersions>("{}").is_err());
    }
}
