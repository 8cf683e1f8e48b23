//! Build script for cfgforge-cli.
//!
//! Generates the man page at build time using clap_mangen and places it in
//! OUT_DIR for inclusion in release builds.
//!
//! The command tree is rebuilt here rather than imported, since a build
//! script cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// Keep in sync with src/cli.rs.
fn build_cli() -> Command {
    Command::new("cfgforge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve typed configuration hierarchies")
        .long_about(
            "Build typed config classes declared in a schema file from nested documents and dotted-key overrides",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .subcommands(vec![
            Command::new("resolve")
                .about("Build a config class from documents and overrides")
                .long_about(
                    "Merge nested documents and KEY=VALUE overrides, build the selected class and print it",
                ),
            Command::new("variants")
                .about("List the registered variants of each category")
                .long_about("Show the variant names each category root accepts in _name keys"),
            Command::new("validate")
                .about("Validate a schema file")
                .long_about("Declare every class of a schema file and report the first error"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").map_err(std::io::Error::other)?);
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let mut buffer = Vec::new();
    Man::new(build_cli()).render(&mut buffer)?;
    fs::write(man_dir.join("cfgforge.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
    Ok(())
}
