use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("eventvault=info")),
        )
        .init();

    let cli = Cli::parse();
    let format = cli.format.into();

    let result = match &cli.command {
        Commands::Check(args) => commands::check::run(args, format),
        Commands::History(args) => commands::history::run(args, format),
        Commands::Pseudonym(args) => commands::pseudonym::run(args, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
