use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Ignite: conditional auto-configuration for modular applications
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve and activate the modules of a descriptor
    Run(RunArgs),
    /// List the modules declared by a descriptor
    List {
        /// Descriptor file (TOML, JSON or YAML)
        descriptor: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Descriptor file (TOML, JSON or YAML)
    pub descriptor: PathBuf,

    /// Exclude a module by id (repeatable)
    #[arg(long = "exclude", value_name = "ID")]
    pub excludes: Vec<String>,

    /// Set a property with the highest precedence (repeatable)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    /// Print the condition evaluation report
    #[arg(long)]
    pub report: bool,
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}
