//! # rmap-cli: Provenance Snapshot Inspector
//!
//! Provides the `rmap` command-line interface. Every subcommand reads a JSON
//! [`StoreSnapshot`] and answers a read-only question about it, printing
//! JSON on stdout.
//!
//! ## Subcommands
//!
//! - `rmap lineage`: Version chain of a DiSCO, with derivation links.
//! - `rmap timegate`: Version current at a datetime, with Memento links.
//! - `rmap status`: Kind and status of any id.
//! - `rmap events`: Events touching a DiSCO or Agent.
//!
//! ```bash
//! rmap lineage snapshot.json rmap:3k9x0c2mfa
//! rmap timegate snapshot.json rmap:3k9x0c2mfa --at "Tue, 03 Mar 2026 10:00:00 GMT"
//! ```

pub mod inspect;
pub mod lineage;
pub mod timegate;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use rmap_core::Iri;
use rmap_state::{MemoryStore, QueryService, StoreSnapshot};

/// Load a snapshot file into a read-only query service.
pub fn load_snapshot(path: &Path) -> Result<QueryService> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot: StoreSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
    let counts = (
        snapshot.discos.len(),
        snapshot.agents.len(),
        snapshot.events.len(),
    );
    let store = MemoryStore::from_snapshot(snapshot)
        .with_context(|| format!("inconsistent snapshot {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        discos = counts.0,
        agents = counts.1,
        events = counts.2,
        "snapshot loaded"
    );
    Ok(QueryService::new(Arc::new(store)))
}

/// Parse a command-line identifier.
pub fn parse_iri(raw: &str) -> Result<Iri> {
    Iri::new(raw).with_context(|| format!("invalid identifier {raw:?}"))
}

/// Pretty-print `value` as JSON followed by a newline.
pub fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to encode output")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::PathBuf;

    use rmap_core::{AgentContent, DiscoContent, Iri, RequestAgent, Timestamp};
    use rmap_state::{LifecycleEngine, ManualClock, MemoryStore, RandomStringIdService};

    use super::*;

    pub struct Fixture {
        pub dir: tempfile::TempDir,
        pub path: PathBuf,
        pub agent: Iri,
        /// v1 -> v2 -> v3 by update; v3 tombstoned.
        pub versions: Vec<Iri>,
        pub version_events: Vec<Iri>,
        /// Derived from v2 by another agent.
        pub derived: Iri,
    }

    pub fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    /// v1, v2 and v3 start at 09:01, 09:02 and 09:03 UTC on 2026-03-01.
    pub fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let engine = LifecycleEngine::new(
            store.clone(),
            Arc::new(RandomStringIdService::default()),
        )
        .with_clock(Arc::new(ManualClock::with_step(
            Timestamp::parse("2026-03-01T09:00:00Z").unwrap(),
            30_000,
        )));
        let jane = RequestAgent::new(iri("rmap:jane000000"));
        let agent = engine
            .create_agent_with_id(
                iri("rmap:jane000000"),
                AgentContent::new("Jane", iri("https://orcid.org"), iri("https://orcid.org/1")),
                &jane,
            )
            .unwrap()
            .agent
            .id;

        let content = |r: &str| DiscoContent::aggregating([iri(r)]);
        let v1 = engine.create_disco(content("http://example.org/1"), &jane).unwrap();
        let v2 = engine
            .update_disco(&v1.disco.id, content("http://example.org/2"), &jane)
            .unwrap();
        let v3 = engine
            .update_disco(&v2.disco.id, content("http://example.org/3"), &jane)
            .unwrap();
        let derived = engine
            .derive_disco(
                &v2.disco.id,
                content("http://example.org/x"),
                &RequestAgent::new(iri("rmap:bob")),
            )
            .unwrap();
        engine.tombstone_disco(&v3.disco.id, &jane).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, serde_json::to_vec(&store.snapshot()).unwrap()).unwrap();
        Fixture {
            dir,
            path,
            agent,
            versions: vec![v1.disco.id, v2.disco.id, v3.disco.id],
            version_events: vec![v1.event.id, v2.event.id, v3.event.id],
            derived: derived.disco.id,
        }
    }

    /// Run a handler and parse what it printed.
    pub fn output(
        f: impl FnOnce(&mut Vec<u8>) -> Result<u8>,
    ) -> (u8, serde_json::Value) {
        let mut buf = Vec::new();
        let code = f(&mut buf).unwrap();
        (code, serde_json::from_slice(&buf).unwrap())
    }
}
