mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::cli::app::{check_header, map_tuples};

#[derive(Parser)]
#[command(name = "relmap")]
#[command(about = "Map raw tuples through declarative attribute headers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Map a JSON array of raw tuples through a header spec.
    Map {
        #[arg(long)]
        header: PathBuf,
        #[arg(long)]
        tuples: PathBuf,
        /// Wrap each mapped tuple in a model with this name.
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        pretty: bool,
    },
    /// Build a header spec and print its attribute tree.
    Check {
        #[arg(long)]
        header: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("relmap=warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Command::Map {
            header,
            tuples,
            model,
            pretty,
        } => map_tuples(&header, &tuples, model.as_deref(), pretty)?,
        Command::Check { header } => check_header(&header)?,
    };
    println!("{}", output);
    Ok(())
}
