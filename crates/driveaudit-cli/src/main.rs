//! driveaudit: Google Workspace Drive ownership and external sharing audit.
//!
//! Credentials and the organization domain come from `.driveaudit.yaml`
//! (see `driveaudit config init`) or the DRIVEAUDIT_* environment variables.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use driveaudit_cli::commands::audit::AuditKind;
use driveaudit_cli::commands::{audit, config, version};
use driveaudit_cli::output::Console;
use driveaudit_cli::{exit_code_for, init_tracing, report_failure};
use driveaudit_core::{Config, ExitCode};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "driveaudit",
    about = "Google Workspace Drive ownership and sharing audit",
    long_about = "Audits Google Workspace Drive files across the domain. Reports files \
                  grouped by owner and files shared outside the organization domain."
)]
struct Cli {
    /// Config file (default is ./.driveaudit.yaml, then ~/.driveaudit.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run audit operations
    Audit {
        #[command(subcommand)]
        sub: AuditCommands,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        sub: ConfigCommands,
    },
    /// Print the version number
    Version,
}

#[derive(Subcommand)]
enum AuditCommands {
    /// Write files grouped by owner
    Files,
    /// Write files shared outside the organization domain
    Sharing,
    /// Run every audit
    All,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Generate a sample config file
    Init {
        /// Where to write the file
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<AuditCommands> for AuditKind {
    fn from(command: AuditCommands) -> Self {
        match command {
            AuditCommands::Files => AuditKind::Files,
            AuditCommands::Sharing => AuditKind::Sharing,
            AuditCommands::All => AuditKind::All,
        }
    }
}

/// Cancel `token` on the first Ctrl-C.
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current request");
            token.cancel();
        }
    });
}

async fn run(cli: Cli, cancel: CancellationToken) -> anyhow::Result<()> {
    let console = Console::new(cli.quiet, cli.verbose);

    match cli.command {
        Commands::Audit { sub } => {
            let config =
                Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
            audit::run(sub.into(), &config, &console, &cancel).await
        }
        Commands::Config {
            sub: ConfigCommands::Init { path, force },
        } => config::run(path.as_deref(), force, &console),
        Commands::Version => {
            version::run();
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and similar print to stdout and are not failures.
            return if err.use_stderr() {
                ExitCode::InternalError.into()
            } else {
                ExitCode::Success.into()
            };
        }
    };
    init_tracing(cli.verbose, cli.quiet);

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    match run(cli, cancel).await {
        Ok(()) => ExitCode::Success.into(),
        Err(err) => {
            report_failure(&err);
            exit_code_for(&err).into()
        }
    }
}
