//! CLI argument definitions for the EventVault binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

/// Output format flag
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Format {
    /// Aligned tables for terminals
    #[default]
    Human,
    /// One JSON document per command
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Human => OutputFormat::Human,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// EventVault storage inspection
#[derive(Parser, Debug)]
#[command(name = "eventvault")]
#[command(about = "EventVault: inspect pseudonymous event snapshots")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Human, env = "EVENTVAULT_FORMAT")]
    pub format: Format,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a snapshot and print its table counts
    Check(CheckArgs),
    /// Print the ordered history of one account
    History(HistoryArgs),
    /// Derive the pseudonym of a user under an account salt
    Pseudonym(PseudonymArgs),
}

/// Arguments for the check command
#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Snapshot file to validate
    #[arg(env = "EVENTVAULT_SNAPSHOT")]
    pub snapshot: PathBuf,
}

/// Arguments for the history command
#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    /// Snapshot file to read
    #[arg(env = "EVENTVAULT_SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Account whose history is printed
    #[arg(short, long, env = "EVENTVAULT_ACCOUNT")]
    pub account: String,

    /// Only print entries with a sequence strictly after this one
    #[arg(long)]
    pub since: Option<String>,
}

/// Arguments for the pseudonym command
#[derive(clap::Args, Debug)]
pub struct PseudonymArgs {
    /// Real user id
    #[arg(short, long)]
    pub user: String,

    /// Account user salt
    #[arg(short, long, env = "EVENTVAULT_SALT")]
    pub salt: String,
}
