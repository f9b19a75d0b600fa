//! Tracing subscriber for the `kiln` binary.
//!
//! The library crates only emit events; this is the one place a subscriber
//! is installed. Events go to stderr so stdout stays reserved for results.

use std::io::IsTerminal as _;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;

/// Crates whose events are shown at the level chosen on the command line.
const KILN_TARGETS: [&str; 3] = ["kiln", "kiln_core", "kiln_adapters"];

/// Install the global subscriber. `RUST_LOG`, when set, replaces the
/// flag-derived filter entirely.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(args)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_ansi(!args.no_color && std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber already installed: {e}"))
}

/// `kiln=<level>,kiln_core=<level>,...`; third-party crates stay at the
/// default `error` level.
fn filter_directive(args: &GlobalArgs) -> String {
    let level = match (args.quiet, args.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    KILN_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
