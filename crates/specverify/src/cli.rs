//! Command line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "specverify",
    about = "Verify spec documents against code and measure route coverage",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file (default: .specverify.yml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// AI provider: claude, openai or gemini (overrides the config)
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// API key for the AI provider (overrides the environment and config)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Show detailed output and debug logs
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Verify specs against their code
    Check {
        /// A single spec file to verify
        #[arg(conflicts_with_all = ["spec_type", "group"])]
        file: Option<PathBuf>,

        /// Only verify specs of this type (a subdirectory of specs_dir)
        #[arg(long = "type", short = 't', conflicts_with = "group")]
        spec_type: Option<String>,

        /// Only verify specs whose type belongs to this group
        #[arg(long, short = 'g')]
        group: Option<String>,

        /// Minimum average match to pass (default: options.pass_threshold)
        #[arg(long)]
        threshold: Option<u8>,

        /// Fail when any single spec matches below this (default: options.fail_under)
        #[arg(long)]
        fail_under: Option<u8>,

        /// Specs verified at once (default: options.concurrency)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// List routes extracted from the configured route sources
    Routes {
        /// Skip sources that fail instead of aborting
        #[arg(long)]
        keep_going: bool,
    },

    /// Measure how many routes are described by a spec
    Coverage {
        /// Minimum coverage percentage to pass
        #[arg(long, default_value_t = 0.0)]
        threshold: f64,
    },
}
