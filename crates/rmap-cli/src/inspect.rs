//! # Status and Events Subcommands
//!
//! `rmap status` classifies an id and reports its current status.
//! `rmap events` lists the events that touch a DiSCO or Agent, oldest first.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use rmap_core::{Iri, ObjectKind, Status};

use crate::{load_snapshot, parse_iri, write_json};

/// Arguments for the `rmap status` subcommand.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Path to a JSON store snapshot.
    pub snapshot: PathBuf,
    /// DiSCO, Agent or Event id.
    pub id: String,
}

/// Arguments for the `rmap events` subcommand.
#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Path to a JSON store snapshot.
    pub snapshot: PathBuf,
    /// DiSCO or Agent id.
    pub id: String,
    /// For an Agent, list the events it initiated instead of those naming it.
    #[arg(long)]
    pub initiated: bool,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    id: Iri,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
}

fn kind_label(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Disco => "disco",
        ObjectKind::Agent => "agent",
        ObjectKind::Event => "event",
        ObjectKind::Object => "object",
    }
}

/// Execute the status subcommand.
pub fn run_status(args: &StatusArgs, out: &mut impl Write) -> Result<u8> {
    let query = load_snapshot(&args.snapshot)?;
    let id = parse_iri(&args.id)?;

    let (kind, status) = if query.is_disco_id(&id)? {
        (ObjectKind::Disco, Some(query.disco_status(&id)?))
    } else if query.is_agent_id(&id)? {
        (ObjectKind::Agent, Some(query.agent_status(&id)?))
    } else if query.is_event_id(&id)? {
        (ObjectKind::Event, None)
    } else {
        bail!("{id} is not a DiSCO, Agent or Event in this snapshot");
    };
    write_json(
        out,
        &StatusReport {
            id,
            kind: kind_label(kind),
            status,
        },
    )?;
    Ok(0)
}

/// Execute the events subcommand.
pub fn run_events(args: &EventsArgs, out: &mut impl Write) -> Result<u8> {
    let query = load_snapshot(&args.snapshot)?;
    let id = parse_iri(&args.id)?;

    let events = if query.is_disco_id(&id)? {
        if args.initiated {
            bail!("--initiated applies to Agents; {id} is a DiSCO");
        }
        query.disco_events(&id)?
    } else if query.is_agent_id(&id)? {
        if args.initiated {
            query.agent_events_initiated(&id)?
        } else {
            query.agent_events(&id)?
        }
    } else {
        bail!("{id} is not a DiSCO or Agent in this snapshot");
    };
    write_json(out, &events)?;
    Ok(0)
}
