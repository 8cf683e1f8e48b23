//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{CompletionsCommand, ResolveCommand, ValidateCommand, VariantsCommand};
use clap::{Parser, Subcommand};

/// Command-line tool for resolving typed configuration hierarchies.
#[derive(Parser)]
#[command(name = "cfgforge")]
#[command(version, about = "Resolve typed configuration hierarchies", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Build a config class from documents and overrides
    Resolve(ResolveCommand),

    /// List the registered variants of each category
    Variants(VariantsCommand),

    /// Validate a schema file
    Validate(ValidateCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
