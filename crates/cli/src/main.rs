//! dbtransfer CLI - Export and import database archives through the remote CLI
//!
//! Usage:
//!   dbtransfer export                                   - Dump the remote database to a local archive
//!   dbtransfer import <path> [--from-db <name>] [--drop] - Restore a local archive into the remote database
//!   dbtransfer list                                     - List local archives
//!   dbtransfer verify <path>                            - Check a local archive without contacting the remote
//!   dbtransfer status                                   - Check remote CLI and service selection

mod commands;
mod context;
mod prompt;
mod spinner;

use clap::{Parser, Subcommand};
use commands::{ExportCommand, ImportCommand, ListCommand, StatusCommand, VerifyCommand};
use context::GlobalArgs;
use shared::{ConsoleReporter, StatusReporter, TransferError};

#[derive(Parser)]
#[command(name = "dbtransfer")]
#[command(about = "Back up and restore the app database through the platform CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the remote database into a new local archive
    Export(ExportCommand),
    /// Restore a local archive into the remote database
    Import(ImportCommand),
    /// List local archives, newest first
    List(ListCommand),
    /// Check a local archive offline
    Verify(VerifyCommand),
    /// Check remote CLI, login and service selection
    Status(StatusCommand),
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Export(cmd) => cmd.run(&cli.global),
        Commands::Import(cmd) => cmd.run(&cli.global),
        Commands::List(cmd) => cmd.run(&cli.global),
        Commands::Verify(cmd) => cmd.run(&cli.global),
        Commands::Status(cmd) => cmd.run(&cli.global),
    };

    if let Err(e) = result {
        report_error(&e);
        std::process::exit(1);
    }
}

/// Message, remediation hint and captured diagnostic
fn report_error(error: &anyhow::Error) {
    let reporter = ConsoleReporter;
    reporter.failure(&format!("{:#}", error));

    if let Some(transfer) = error.downcast_ref::<TransferError>() {
        if let Some(hint) = transfer.remediation() {
            reporter.warn(&hint);
        }
        if let Some(diagnostic) = transfer.diagnostic() {
            reporter.detail("Remote output:");
            reporter.detail(diagnostic);
        }
    }
}
