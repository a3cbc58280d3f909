//! Backup and restore handlers
//!
//! A handler runs one full cycle: ask the user for a path, run the matching
//! script with that path as its only argument, and report the result in a dialog.
//! Everything the handler touches comes in through [`AppContext`] and [`Dialogs`],
//! so the same code drives the window, the headless CLI and the tests.

use crate::config::AppConfig;
use crate::error::BackupGuiError;
use crate::operation::OperationControl;
use crate::runner::{ScriptOutcome, ScriptRunner};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const SUCCESS_TITLE: &str = "Success";
pub const ERROR_TITLE: &str = "Error";

/// The two operations offered by the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Backup,
    Restore,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Backup => "backup",
            Action::Restore => "restore",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Action::Backup => "Backup completed successfully.",
            Action::Restore => "Restore completed successfully.",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Action::Backup => "An error occurred during backup.",
            Action::Restore => "An error occurred during restore.",
        }
    }

    fn timed_out_message(&self, after_secs: u64) -> String {
        format!(
            "The {} script did not finish within {} seconds and was stopped.",
            self.label(),
            after_secs
        )
    }

    fn cancelled_message(&self) -> &'static str {
        match self {
            Action::Backup => "Backup was cancelled.",
            Action::Restore => "Restore was cancelled.",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User-facing dialogs used by the handlers
pub trait Dialogs {
    /// Directory picker; `None` when the user cancels
    fn pick_directory(&self) -> Option<PathBuf>;
    /// Single-file picker; `None` when the user cancels
    fn pick_file(&self) -> Option<PathBuf>;
    fn show_info(&self, title: &str, message: &str);
    fn show_error(&self, title: &str, message: &str);
}

/// Everything a handler needs besides the dialogs
#[derive(Debug, Clone)]
pub struct AppContext<R> {
    pub config: AppConfig,
    pub runner: R,
}

impl<R: ScriptRunner> AppContext<R> {
    pub fn new(config: AppConfig, runner: R) -> Self {
        Self { config, runner }
    }
}

/// Final state of one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationStatus {
    Succeeded,
    Failed { exit_code: Option<i32> },
    LaunchFailed { reason: String },
    TimedOut { after_secs: u64 },
    Cancelled,
}

/// Result of one operation, returned to the frontend and printed by the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReport {
    pub operation_id: String,
    pub action: Action,
    /// Display form of the selected path; the script gets the exact bytes
    pub selected_path: String,
    pub status: OperationStatus,
}

impl OperationReport {
    pub fn succeeded(&self) -> bool {
        self.status == OperationStatus::Succeeded
    }
}

/// Run one backup or restore cycle for the action held by `control`
pub fn perform<R, D>(context: &AppContext<R>, dialogs: &D, control: &OperationControl) -> OperationReport
where
    R: ScriptRunner,
    D: Dialogs + ?Sized,
{
    let action = control.action();

    let picked = match action {
        Action::Backup => dialogs.pick_directory(),
        Action::Restore => dialogs.pick_file(),
    };
    // A cancelled dialog still runs the script, with an empty argument
    let selected = picked.unwrap_or_default();
    let selected_path = selected.to_string_lossy().into_owned();
    if selected.as_os_str().is_empty() {
        tracing::warn!(
            operation_id = %control.id(),
            %action,
            "No path selected, running script with an empty argument"
        );
    }

    let script = context.config.script_for(action);
    tracing::info!(
        operation_id = %control.id(),
        %action,
        script = %script.display(),
        path = %selected_path,
        "Running script"
    );

    let status = match context
        .runner
        .run(script, selected.as_os_str(), control, context.config.timeout())
    {
        Ok(outcome) => status_from_outcome(outcome, &context.config),
        Err(e) => {
            tracing::error!(operation_id = %control.id(), %action, error = %e, "Script could not be run");
            launch_failure(e)
        }
    };

    match &status {
        OperationStatus::Succeeded => {
            tracing::info!(
                operation_id = %control.id(),
                %action,
                elapsed_ms = control.elapsed().as_millis() as u64,
                "Script succeeded"
            );
            dialogs.show_info(SUCCESS_TITLE, action.success_message());
        }
        OperationStatus::Failed { exit_code } => {
            tracing::warn!(operation_id = %control.id(), %action, exit_code = ?exit_code, "Script failed");
            dialogs.show_error(ERROR_TITLE, action.failure_message());
        }
        OperationStatus::LaunchFailed { .. } => {
            dialogs.show_error(ERROR_TITLE, action.failure_message());
        }
        OperationStatus::TimedOut { after_secs } => {
            tracing::warn!(operation_id = %control.id(), %action, after_secs, "Script timed out");
            dialogs.show_error(ERROR_TITLE, &action.timed_out_message(*after_secs));
        }
        OperationStatus::Cancelled => {
            tracing::info!(operation_id = %control.id(), %action, "Script cancelled");
            dialogs.show_error(ERROR_TITLE, action.cancelled_message());
        }
    }

    OperationReport {
        operation_id: control.id().to_string(),
        action,
        selected_path,
        status,
    }
}

fn status_from_outcome(outcome: ScriptOutcome, config: &AppConfig) -> OperationStatus {
    match outcome {
        outcome if outcome.succeeded() => OperationStatus::Succeeded,
        ScriptOutcome::Exited { code } => OperationStatus::Failed {
            exit_code: Some(code),
        },
        ScriptOutcome::Terminated => OperationStatus::Failed { exit_code: None },
        ScriptOutcome::TimedOut => OperationStatus::TimedOut {
            after_secs: config.timeout_secs.unwrap_or_default(),
        },
        ScriptOutcome::Cancelled => OperationStatus::Cancelled,
    }
}

fn launch_failure(error: BackupGuiError) -> OperationStatus {
    OperationStatus::LaunchFailed {
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::cell::RefCell;
    use std::ffi::{OsStr, OsString};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Shown {
        Info(String, String),
        Error(String, String),
    }

    #[derive(Default)]
    struct FakeDialogs {
        directory: Option<PathBuf>,
        file: Option<PathBuf>,
        directory_picks: RefCell<usize>,
        file_picks: RefCell<usize>,
        shown: RefCell<Vec<Shown>>,
    }

    impl FakeDialogs {
        fn selecting_directory(path: &str) -> Self {
            Self {
                directory: Some(PathBuf::from(path)),
                ..Self::default()
            }
        }

        fn selecting_file(path: &str) -> Self {
            Self {
                file: Some(PathBuf::from(path)),
                ..Self::default()
            }
        }

        fn infos(&self) -> usize {
            self.shown.borrow().iter().filter(|s| matches!(s, Shown::Info(..))).count()
        }

        fn errors(&self) -> usize {
            self.shown.borrow().iter().filter(|s| matches!(s, Shown::Error(..))).count()
        }
    }

    impl Dialogs for FakeDialogs {
        fn pick_directory(&self) -> Option<PathBuf> {
            *self.directory_picks.borrow_mut() += 1;
            self.directory.clone()
        }

        fn pick_file(&self) -> Option<PathBuf> {
            *self.file_picks.borrow_mut() += 1;
            self.file.clone()
        }

        fn show_info(&self, title: &str, message: &str) {
            self.shown
                .borrow_mut()
                .push(Shown::Info(title.to_string(), message.to_string()));
        }

        fn show_error(&self, title: &str, message: &str) {
            self.shown
                .borrow_mut()
                .push(Shown::Error(title.to_string(), message.to_string()));
        }
    }

    /// Records every invocation and replies with a fixed outcome
    struct FakeRunner {
        reply: fn() -> Result<ScriptOutcome>,
        calls: RefCell<Vec<(PathBuf, OsString, Option<Duration>)>>,
    }

    impl FakeRunner {
        fn replying(reply: fn() -> Result<ScriptOutcome>) -> Self {
            Self {
                reply,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn exiting(code: i32) -> Self {
            match code {
                0 => Self::replying(|| Ok(ScriptOutcome::Exited { code: 0 })),
                1 => Self::replying(|| Ok(ScriptOutcome::Exited { code: 1 })),
                2 => Self::replying(|| Ok(ScriptOutcome::Exited { code: 2 })),
                _ => Self::replying(|| Ok(ScriptOutcome::Exited { code: 127 })),
            }
        }
    }

    impl ScriptRunner for FakeRunner {
        fn run(
            &self,
            script: &Path,
            argument: &OsStr,
            _control: &OperationControl,
            timeout: Option<Duration>,
        ) -> Result<ScriptOutcome> {
            self.calls
                .borrow_mut()
                .push((script.to_path_buf(), argument.to_os_string(), timeout));
            (self.reply)()
        }
    }

    fn context(runner: FakeRunner) -> AppContext<FakeRunner> {
        AppContext::new(AppConfig::default(), runner)
    }

    fn perform_action(
        context: &AppContext<FakeRunner>,
        dialogs: &FakeDialogs,
        action: Action,
    ) -> OperationReport {
        let control = OperationControl::new(action);
        perform(context, dialogs, &control)
    }

    #[test]
    fn test_backup_success_shows_one_info_dialog() {
        let ctx = context(FakeRunner::exiting(0));
        let dialogs = FakeDialogs::selecting_directory("/home/user/docs");

        let report = perform_action(&ctx, &dialogs, Action::Backup);

        assert!(report.succeeded());
        assert_eq!(report.selected_path, "/home/user/docs");
        assert_eq!(dialogs.infos(), 1);
        assert_eq!(dialogs.errors(), 0);
        assert_eq!(
            dialogs.shown.borrow()[0],
            Shown::Info("Success".into(), "Backup completed successfully.".into())
        );
    }

    #[test]
    fn test_backup_nonzero_exit_shows_one_error_dialog() {
        for code in [1, 2, 127] {
            let ctx = context(FakeRunner::exiting(code));
            let dialogs = FakeDialogs::selecting_directory("/srv/data");

            let report = perform_action(&ctx, &dialogs, Action::Backup);

            assert_eq!(report.status, OperationStatus::Failed { exit_code: Some(code) });
            assert_eq!(dialogs.infos(), 0);
            assert_eq!(dialogs.errors(), 1);
            assert_eq!(
                dialogs.shown.borrow()[0],
                Shown::Error("Error".into(), "An error occurred during backup.".into())
            );
        }
    }

    #[test]
    fn test_restore_exit_codes_map_to_dialogs() {
        let ctx = context(FakeRunner::exiting(0));
        let dialogs = FakeDialogs::selecting_file("/backups/docs.tar.gz");
        assert!(perform_action(&ctx, &dialogs, Action::Restore).succeeded());
        assert_eq!(
            dialogs.shown.borrow().as_slice(),
            &[Shown::Info("Success".into(), "Restore completed successfully.".into())]
        );

        let ctx = context(FakeRunner::exiting(1));
        let dialogs = FakeDialogs::selecting_file("/backups/docs.tar.gz");
        assert!(!perform_action(&ctx, &dialogs, Action::Restore).succeeded());
        assert_eq!(
            dialogs.shown.borrow().as_slice(),
            &[Shown::Error("Error".into(), "An error occurred during restore.".into())]
        );
    }

    #[test]
    fn test_backup_uses_directory_picker_and_backup_script() {
        let ctx = context(FakeRunner::exiting(0));
        let dialogs = FakeDialogs::selecting_directory("/home/user/docs");

        perform_action(&ctx, &dialogs, Action::Backup);

        assert_eq!(*dialogs.directory_picks.borrow(), 1);
        assert_eq!(*dialogs.file_picks.borrow(), 0);
        let calls = ctx.runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from("./backup.sh"));
        assert_eq!(calls[0].1, "/home/user/docs");
    }

    #[test]
    fn test_restore_uses_file_picker_and_restore_script() {
        let ctx = context(FakeRunner::exiting(0));
        let dialogs = FakeDialogs::selecting_file("/backups/2024-01-01.tar");

        perform_action(&ctx, &dialogs, Action::Restore);

        assert_eq!(*dialogs.directory_picks.borrow(), 0);
        assert_eq!(*dialogs.file_picks.borrow(), 1);
        let calls = ctx.runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from("./restore.sh"));
        assert_eq!(calls[0].1, "/backups/2024-01-01.tar");
    }

    #[test]
    fn test_cancelled_dialog_runs_script_with_empty_path() {
        let ctx = context(FakeRunner::exiting(1));
        let dialogs = FakeDialogs::default();

        let report = perform_action(&ctx, &dialogs, Action::Restore);

        assert_eq!(report.selected_path, "");
        assert_eq!(ctx.runner.calls.borrow()[0].1, "");
        assert_eq!(dialogs.errors(), 1);
        assert_eq!(dialogs.infos(), 0);
    }

    #[test]
    fn test_launch_failure_becomes_error_dialog() {
        let ctx = context(FakeRunner::replying(|| {
            Err(BackupGuiError::ScriptLaunch {
                script: "./backup.sh".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }));
        let dialogs = FakeDialogs::selecting_directory("/home/user/docs");

        let report = perform_action(&ctx, &dialogs, Action::Backup);

        match &report.status {
            OperationStatus::LaunchFailed { reason } => assert!(reason.contains("./backup.sh")),
            other => panic!("unexpected status: {other:?}"),
        }
        assert_eq!(
            dialogs.shown.borrow().as_slice(),
            &[Shown::Error("Error".into(), "An error occurred during backup.".into())]
        );
    }

    #[test]
    fn test_timeout_is_passed_and_reported() {
        let ctx = AppContext::new(
            AppConfig {
                timeout_secs: Some(30),
                ..AppConfig::default()
            },
            FakeRunner::replying(|| Ok(ScriptOutcome::TimedOut)),
        );
        let dialogs = FakeDialogs::selecting_directory("/data");

        let report = perform_action(&ctx, &dialogs, Action::Backup);

        assert_eq!(report.status, OperationStatus::TimedOut { after_secs: 30 });
        assert_eq!(ctx.runner.calls.borrow()[0].2, Some(Duration::from_secs(30)));
        assert_eq!(dialogs.errors(), 1);
        match &dialogs.shown.borrow()[0] {
            Shown::Error(_, message) => assert!(message.contains("30 seconds")),
            other => panic!("unexpected dialog: {other:?}"),
        };
    }

    #[test]
    fn test_cancelled_and_signalled_scripts_are_errors() {
        let ctx = context(FakeRunner::replying(|| Ok(ScriptOutcome::Cancelled)));
        let dialogs = FakeDialogs::selecting_file("/backups/a.tar");
        let report = perform_action(&ctx, &dialogs, Action::Restore);
        assert_eq!(report.status, OperationStatus::Cancelled);
        assert_eq!(
            dialogs.shown.borrow().as_slice(),
            &[Shown::Error("Error".into(), "Restore was cancelled.".into())]
        );

        let ctx = context(FakeRunner::replying(|| Ok(ScriptOutcome::Terminated)));
        let dialogs = FakeDialogs::selecting_file("/backups/a.tar");
        let report = perform_action(&ctx, &dialogs, Action::Restore);
        assert_eq!(report.status, OperationStatus::Failed { exit_code: None });
        assert_eq!(dialogs.errors(), 1);
    }

    #[test]
    fn test_report_carries_operation_id() {
        let ctx = context(FakeRunner::exiting(0));
        let dialogs = FakeDialogs::selecting_directory("/data");
        let control = OperationControl::new(Action::Backup);

        let report = perform(&ctx, &dialogs, &control);

        assert_eq!(report.operation_id, control.id());
        assert_eq!(report.action, Action::Backup);
    }

    #[test]
    fn test_report_json_shape() {
        let report = OperationReport {
            operation_id: "id".to_string(),
            action: Action::Restore,
            selected_path: "/backups/a.tar".to_string(),
            status: OperationStatus::Failed { exit_code: Some(3) },
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["action"], "restore");
        assert_eq!(json["status"]["kind"], "failed");
        assert_eq!(json["status"]["exit_code"], 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_selection_reaches_script_unchanged() {
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"/home/user/dir\xff");
        let ctx = context(FakeRunner::exiting(0));
        let dialogs = FakeDialogs {
            directory: Some(PathBuf::from(raw)),
            ..FakeDialogs::default()
        };

        let report = perform_action(&ctx, &dialogs, Action::Backup);

        assert_eq!(ctx.runner.calls.borrow()[0].1.as_os_str(), raw);
        assert_eq!(report.selected_path, "/home/user/dir\u{fffd}");
    }
}
