//! # Timegate Subcommand
//!
//! Resolves the version of a DiSCO's lineage that was current at a given
//! datetime, following Memento datetime negotiation: exact match, else the
//! nearest earlier version, else the first version. Without `--at` the
//! latest version is selected.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use rmap_core::{Iri, Timestamp};
use rmap_versioning::{NavigationLinks, VersionEntry};

use crate::{load_snapshot, parse_iri, write_json};

/// Arguments for the `rmap timegate` subcommand.
#[derive(Args, Debug)]
pub struct TimegateArgs {
    /// Path to a JSON store snapshot.
    pub snapshot: PathBuf,
    /// Any DiSCO in the lineage.
    pub disco: String,
    /// Requested datetime, RFC 3339 or HTTP-date
    /// (e.g. "Sun, 01 Mar 2026 09:00:00 GMT").
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Debug, Serialize)]
struct TimegateReport {
    original: Iri,
    requested: Option<Timestamp>,
    memento: VersionEntry,
    /// `memento.timestamp` as an HTTP-date, for a `Memento-Datetime` header.
    memento_datetime: String,
    links: NavigationLinks,
}

/// Execute the timegate subcommand.
pub fn run_timegate(args: &TimegateArgs, out: &mut impl Write) -> Result<u8> {
    let requested = args
        .at
        .as_deref()
        .map(|raw| Timestamp::parse_any(raw).with_context(|| format!("invalid --at value {raw:?}")))
        .transpose()?;
    let query = load_snapshot(&args.snapshot)?;
    let id = parse_iri(&args.disco)?;

    let gate = query.timegate(&id)?;
    let memento = gate.resolve(requested)?;
    let links = NavigationLinks::around(gate.versions(), memento.timestamp)?;
    tracing::debug!(
        disco = %id,
        requested = ?requested,
        selected = %memento.version,
        "timegate resolved"
    );

    let report = TimegateReport {
        original: id,
        requested,
        memento_datetime: memento.timestamp.to_http_date(),
        memento,
        links,
    };
    write_json(out, &report)?;
    Ok(0)
}
