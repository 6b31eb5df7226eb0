//! `tempinbox` - disposable inbox on the command line
//!
//! Decodes raw messages, delivers them into an expiring local inbox and
//! lists what an address has received.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tempinbox_core::{DEFAULT_MAX_RAW_BYTES, DEFAULT_RETENTION_SECS, InboxConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tempinbox", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Inbox database file. Defaults to the platform data directory.
    #[arg(long, global = true, env = "TEMPINBOX_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Seconds a delivered message stays readable
    #[arg(
        long,
        global = true,
        env = "TEMPINBOX_RETENTION_SECS",
        default_value_t = DEFAULT_RETENTION_SECS
    )]
    retention_secs: i64,

    /// Largest raw message accepted for delivery, in bytes
    #[arg(
        long,
        global = true,
        env = "TEMPINBOX_MAX_RAW_BYTES",
        default_value_t = DEFAULT_MAX_RAW_BYTES
    )]
    max_raw_bytes: usize,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a raw message and print it as JSON
    Decode {
        /// Raw message file, or `-` for stdin
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Deliver a raw message into an inbox
    Deliver {
        /// Envelope sender
        #[arg(long)]
        from: String,
        /// Envelope recipient
        #[arg(long)]
        to: String,
        /// Raw message file, or `-` for stdin
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List live messages for an address, newest first
    List {
        /// Recipient address
        address: String,
        /// Omit HTML bodies
        #[arg(long)]
        summary: bool,
    },
    /// Delete expired messages
    Purge,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = InboxConfig::builder()
        .retention_secs(cli.retention_secs)
        .max_raw_bytes(cli.max_raw_bytes)
        .build()?;

    match cli.command {
        Commands::Decode { file, pretty } => commands::decode(&config, &file, pretty),
        Commands::Deliver { from, to, file } => {
            let db = commands::database_path(cli.db)?;
            commands::deliver(&config, &db, &from, &to, &file).await
        }
        Commands::List { address, summary } => {
            let db = commands::database_path(cli.db)?;
            commands::list(&config, &db, &address, summary).await
        }
        Commands::Purge => {
            let db = commands::database_path(cli.db)?;
            commands::purge(&config, &db).await
        }
    }
}

/// Logs go to stderr so stdout stays clean JSON. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
