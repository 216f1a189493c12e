//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - watch: run the registration watcher (also the default)
//! - probe: check domain controller reachability once
//! - events: show the latest registration events

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use joinwatch::config::Config;

/// joinwatch - waits for Hybrid Join device registration to complete
#[derive(Parser, Debug)]
#[command(name = "joinwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch device registration until it completes or the ceiling is hit
    Watch {
        /// Domain whose controllers are probed
        #[arg(short, long)]
        domain: Option<String>,

        /// Maximum number of checks
        #[arg(short = 'n', long)]
        max_iterations: Option<u32>,

        /// Seconds between checks
        #[arg(short, long)]
        interval_secs: Option<u64>,
    },

    /// Check domain controller reachability once
    Probe {
        /// Domain whose controllers are probed
        #[arg(short, long)]
        domain: Option<String>,

        /// Test every domain controller instead of stopping at the first healthy one
        #[arg(short, long)]
        exhaustive: bool,
    },

    /// Show the latest device registration events
    Events,
}

impl Commands {
    /// Fold command-line overrides into the loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        match self {
            Commands::Watch {
                domain,
                max_iterations,
                interval_secs,
            } => {
                if let Some(domain) = domain {
                    config.probe.domain = domain.clone();
                }
                if let Some(max_iterations) = max_iterations {
                    config.watch.max_iterations = *max_iterations;
                }
                if let Some(interval_secs) = interval_secs {
                    config.watch.interval_secs = *interval_secs;
                }
            }
            Commands::Probe { domain, exhaustive } => {
                if let Some(domain) = domain {
                    config.probe.domain = domain.clone();
                }
                if *exhaustive {
                    config.watch.exhaustive_probe = true;
                }
            }
            Commands::Events => {}
        }
    }
}
