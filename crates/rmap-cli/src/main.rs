//! # rmap CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rmap_cli::inspect::{run_events, run_status, EventsArgs, StatusArgs};
use rmap_cli::lineage::{run_lineage, LineageArgs};
use rmap_cli::timegate::{run_timegate, TimegateArgs};

/// RMap provenance snapshot inspector.
///
/// Answers read-only questions about a JSON store snapshot: DiSCO lineages,
/// Timegate resolution, object status, and the events touching an object.
#[derive(Parser, Debug)]
#[command(name = "rmap", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// Ignored when RUST_LOG is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the version chain of a DiSCO.
    Lineage(LineageArgs),

    /// Resolve the version current at a datetime.
    Timegate(TimegateArgs),

    /// Report the kind and status of an id.
    Status(StatusArgs),

    /// List events touching a DiSCO or Agent.
    Events(EventsArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let mut stdout = std::io::stdout().lock();
    let result = match &cli.command {
        Commands::Lineage(args) => run_lineage(args, &mut stdout),
        Commands::Timegate(args) => run_timegate(args, &mut stdout),
        Commands::Status(args) => run_status(args, &mut stdout),
        Commands::Events(args) => run_events(args, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
