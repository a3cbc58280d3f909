// Lib.rs - Main library entry point for Backup GUI

pub mod cli;
pub mod commands;
pub mod config;
pub mod dialogs;
pub mod error;
pub mod handlers;
pub mod layout;
pub mod logging;
pub mod operation;
pub mod runner;
pub mod window;

use config::AppConfig;
use handlers::AppContext;
use operation::OperationState;
use runner::ProcessRunner;
use tauri::Manager;

/// Run the Tauri GUI application
pub fn run(config: AppConfig) -> error::Result<()> {
    tracing::info!(
        backup_script = %config.backup_script.display(),
        restore_script = %config.restore_script.display(),
        timeout_secs = ?config.timeout_secs,
        "Starting window"
    );

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(AppContext::new(config, ProcessRunner::default()))
        .manage(OperationState::default())
        .setup(|app| {
            match app.get_webview_window(window::MAIN_WINDOW) {
                Some(main) => window::place_main_window(&main)?,
                None => tracing::warn!("Main window missing from configuration"),
            }
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::backup,
            commands::restore,
            commands::cancel_operation,
            commands::get_config,
        ])
        .run(tauri::generate_context!())?;

    Ok(())
}
