use crate::config::AppConfig;
use crate::dialogs::TauriDialogs;
use crate::handlers::{self, Action, AppContext, Dialogs, OperationReport};
use crate::operation::OperationState;
use crate::runner::{ProcessRunner, ScriptRunner};
use tauri::{AppHandle, State};

/// Command to back up a directory chosen by the user
///
/// Opens a directory picker, runs the backup script with the selection and
/// shows the result dialog. Resolves once the result dialog is dismissed.
#[tauri::command]
pub async fn backup(
    app: AppHandle,
    context: State<'_, AppContext<ProcessRunner>>,
    operations: State<'_, OperationState>,
) -> Result<OperationReport, String> {
    let dialogs = TauriDialogs::new(app);
    run_action(context.inner().clone(), dialogs, &operations, Action::Backup).await
}

/// Command to restore from a file chosen by the user
#[tauri::command]
pub async fn restore(
    app: AppHandle,
    context: State<'_, AppContext<ProcessRunner>>,
    operations: State<'_, OperationState>,
) -> Result<OperationReport, String> {
    let dialogs = TauriDialogs::new(app);
    run_action(context.inner().clone(), dialogs, &operations, Action::Restore).await
}

/// Command to cancel the running backup/restore, if any
#[tauri::command]
pub fn cancel_operation(operations: State<'_, OperationState>) -> bool {
    let cancelled = operations.cancel_active();
    if !cancelled {
        tracing::debug!("Cancel requested with no operation running");
    }
    cancelled
}

/// Get the active script configuration
#[tauri::command]
pub fn get_config(context: State<'_, AppContext<ProcessRunner>>) -> AppConfig {
    context.config.clone()
}

/// Claim the operation slot and run the handler on a blocking worker so the
/// event loop stays responsive while dialogs and the script are open.
async fn run_action<R, D>(
    context: AppContext<R>,
    dialogs: D,
    operations: &OperationState,
    action: Action,
) -> Result<OperationReport, String>
where
    R: ScriptRunner + Send + 'static,
    D: Dialogs + Send + 'static,
{
    let guard = operations.begin(action).map_err(|e| e.to_string())?;
    tracing::info!(operation_id = %guard.control().id(), %action, "Operation started");

    let report = tauri::async_runtime::spawn_blocking(move || {
        let report = handlers::perform(&context, &dialogs, guard.control());
        drop(guard);
        report
    })
    .await
    .map_err(|e| format!("Operation worker failed: {}", e))?;

    tracing::info!(
        operation_id = %report.operation_id,
        action = %report.action,
        succeeded = report.succeeded(),
        "Operation finished"
    );
    Ok(report)
}
