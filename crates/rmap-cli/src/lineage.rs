//! # Lineage Subcommand
//!
//! Prints the UPDATE-linked version chain of a DiSCO, oldest first, with
//! each member's current status and the lineage's derivation links.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use rmap_core::{Iri, Status, Timestamp};

use crate::{load_snapshot, parse_iri, write_json};

/// Arguments for the `rmap lineage` subcommand.
#[derive(Args, Debug)]
pub struct LineageArgs {
    /// Path to a JSON store snapshot.
    pub snapshot: PathBuf,
    /// Any DiSCO in the lineage.
    pub disco: String,
}

#[derive(Debug, Serialize)]
struct MemberReport {
    timestamp: Timestamp,
    id: Iri,
    status: Status,
}

#[derive(Debug, Serialize)]
struct LineageReport {
    progenitor: Iri,
    latest: Option<Iri>,
    members: Vec<MemberReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    derived_from: Option<Iri>,
    derivatives: Vec<Iri>,
}

/// Execute the lineage subcommand.
pub fn run_lineage(args: &LineageArgs, out: &mut impl Write) -> Result<u8> {
    let query = load_snapshot(&args.snapshot)?;
    let id = parse_iri(&args.disco)?;
    let resolver = query.lineage();
    let lineage = resolver.resolve_lineage(&id)?;

    let mut members = Vec::with_capacity(lineage.len());
    for (timestamp, member) in &lineage.members {
        members.push(MemberReport {
            timestamp: *timestamp,
            id: member.clone(),
            status: query.disco_status(member)?,
        });
    }
    let report = LineageReport {
        latest: lineage.latest().cloned(),
        derived_from: resolver.derived_from(&id)?,
        derivatives: resolver.derivatives(&id)?,
        progenitor: lineage.progenitor,
        members,
    };
    write_json(out, &report)?;
    Ok(0)
}
