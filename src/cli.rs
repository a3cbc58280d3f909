// cli.rs - Command line interface for Backup GUI
//
// Without a subcommand the window is launched. `backup`/`restore` run the same
// handler headless, with the path given on the command line standing in for the
// file dialog.

use crate::config::AppConfig;
use crate::error::Result;
use crate::handlers::{self, Action, AppContext, Dialogs, OperationReport};
use crate::operation::OperationControl;
use crate::runner::ProcessRunner;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Backup GUI - run external backup and restore scripts
#[derive(Parser, Debug)]
#[command(name = "backup-gui")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Script invoked as `<script> <directory>` for backups
    #[arg(long, global = true)]
    pub backup_script: Option<PathBuf>,

    /// Script invoked as `<script> <file>` for restores
    #[arg(long, global = true)]
    pub restore_script: Option<PathBuf>,

    /// Stop the script after this many seconds (0 waits forever)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the operation report as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Back up a directory
    Backup {
        /// Directory passed to the backup script
        directory: PathBuf,
    },

    /// Restore from a backup file
    Restore {
        /// File passed to the restore script
        file: PathBuf,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(cmd) => {
            let (action, path) = match cmd {
                Commands::Backup { directory } => (Action::Backup, directory),
                Commands::Restore { file } => (Action::Restore, file),
            };
            execute(config, action, path, cli.json)
        }
        None => match crate::run(config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "Application failed");
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

/// Environment configuration with command line overrides applied
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::from_env()?;
    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(script) = &cli.backup_script {
        config.backup_script = script.clone();
    }
    if let Some(script) = &cli.restore_script {
        config.restore_script = script.clone();
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = (secs > 0).then_some(secs);
    }
}

/// Headless action handler
fn execute(config: AppConfig, action: Action, path: PathBuf, json: bool) -> ExitCode {
    let report = run_headless(config, action, path, !json);

    if json {
        if let Err(e) = print_json(&report) {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_headless(config: AppConfig, action: Action, path: PathBuf, print_messages: bool) -> OperationReport {
    let context = AppContext::new(config, ProcessRunner::default());
    let dialogs = TerminalDialogs::new(path, print_messages);
    let control = OperationControl::new(action);

    handlers::perform(&context, &dialogs, &control)
}

fn print_json(report: &OperationReport) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Dialog stand-in for terminal use: the preselected path is "picked" and
/// results go to stdout/stderr
pub struct TerminalDialogs {
    path: PathBuf,
    print_messages: bool,
}

impl TerminalDialogs {
    pub fn new(path: PathBuf, print_messages: bool) -> Self {
        Self {
            path,
            print_messages,
        }
    }
}

impl Dialogs for TerminalDialogs {
    fn pick_directory(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn pick_file(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn show_info(&self, title: &str, message: &str) {
        if self.print_messages {
            println!("{}: {}", title, message);
        }
    }

    fn show_error(&self, title: &str, message: &str) {
        if self.print_messages {
            eprintln!("{}: {}", title, message);
        }
    }
}
