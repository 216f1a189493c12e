//! CLI module for joinwatch - command-line interface and subcommands.
//!
//! Without a subcommand the registration watcher runs; `probe` and `events`
//! are one-shot diagnostics.

pub mod commands;

pub use commands::Cli;
