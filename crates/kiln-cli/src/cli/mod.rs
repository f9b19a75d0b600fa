//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! and help text.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "kiln",
    bin_name = "kiln",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Multi-language project generation from versioned template bundles",
    long_about = "Kiln turns a project specification into per-node source trees, \
                  rendering common and language template bundles pulled from \
                  an artifact registry.",
    after_help = "EXAMPLES:\n\
        \x20 kiln generate --spec project.json --registry https://bundles.example.com\n\
        \x20 kiln generate --spec project.json --registry ./mirror --output ./out\n\
        \x20 kiln init",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a project from a specification file.
    #[command(
        visible_alias = "gen",
        about = "Generate a project",
        after_help = "EXAMPLES:\n\
            \x20 kiln generate --spec project.json\n\
            \x20 kiln generate -s project.json -o ./out -r ./mirror --cache-dir /tmp/kiln"
    )]
    Generate(GenerateArgs),

    /// Initialise a Kiln configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 kiln init               # default location\n\
            \x20 kiln -c ./kiln.toml init\n\
            \x20 kiln init --force       # overwrite"
    )]
    Init(InitArgs),
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `kiln generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Project specification (JSON).
    #[arg(short = 's', long = "spec", value_name = "FILE", help = "Project specification file")]
    pub spec: PathBuf,

    /// Directory the project directory is created in.
    #[arg(short = 'o', long = "output", value_name = "DIR", help = "Output directory")]
    pub output: Option<PathBuf>,

    /// Registry URL (`http(s)://`) or bundle mirror directory.
    #[arg(
        short = 'r',
        long = "registry",
        value_name = "URL|DIR",
        help = "Artifact registry URL or directory"
    )]
    pub registry: Option<String>,

    /// Local bundle cache directory.
    #[arg(long = "cache-dir", value_name = "DIR", help = "Bundle cache directory")]
    pub cache_dir: Option<PathBuf>,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `kiln init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── tests ─────────────────────────────────────────────────────────────────────
