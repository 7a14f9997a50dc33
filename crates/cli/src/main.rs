mod commands;
mod migrations;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlstep")]
#[command(about = "Versioned, reversible SQL migrations for Postgres")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scaffold a new migration source file
    Create {
        /// Human-readable migration name
        #[arg(long)]
        name: String,

        /// Destination directory for the generated file
        #[arg(long, default_value = "./migrations")]
        dir: String,
    },

    /// Apply every registered migration in version order
    Up {
        /// Database connection string
        #[arg(long)]
        conn: String,
    },

    /// Apply a single registered version
    UpTo {
        /// Database connection string
        #[arg(long)]
        conn: String,

        /// Version to apply
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        version: i64,
    },

    /// Run every registered migration's reverse action
    Down {
        /// Database connection string
        #[arg(long)]
        conn: String,
    },

    /// Revert applied versions strictly above the target
    DownTo {
        /// Database connection string
        #[arg(long)]
        conn: String,

        /// Version to keep; everything above it is reverted
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        version: i64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = commands::dispatch(cli.command).await {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}
