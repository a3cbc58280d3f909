//! Native dialogs backed by tauri-plugin-dialog
//!
//! All calls block, so they must run off the main thread (the commands use
//! `spawn_blocking`).

use crate::handlers::Dialogs;
use crate::window::MAIN_WINDOW;
use std::path::PathBuf;
use tauri::{AppHandle, Manager, WebviewWindow};
use tauri_plugin_dialog::{DialogExt, FilePath, MessageDialogKind};

pub struct TauriDialogs {
    app: AppHandle,
}

impl TauriDialogs {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn main_window(&self) -> Option<WebviewWindow> {
        self.app.get_webview_window(MAIN_WINDOW)
    }

    fn show(&self, kind: MessageDialogKind, title: &str, message: &str) {
        let mut builder = self.app.dialog().message(message).kind(kind).title(title);
        if let Some(window) = self.main_window() {
            builder = builder.parent(&window);
        }
        builder.blocking_show();
    }
}

impl Dialogs for TauriDialogs {
    fn pick_directory(&self) -> Option<PathBuf> {
        let mut builder = self.app.dialog().file();
        if let Some(window) = self.main_window() {
            builder = builder.set_parent(&window);
        }
        builder.blocking_pick_folder().and_then(to_local_path)
    }

    fn pick_file(&self) -> Option<PathBuf> {
        let mut builder = self.app.dialog().file();
        if let Some(window) = self.main_window() {
            builder = builder.set_parent(&window);
        }
        builder.blocking_pick_file().and_then(to_local_path)
    }

    fn show_info(&self, title: &str, message: &str) {
        self.show(MessageDialogKind::Info, title, message);
    }

    fn show_error(&self, title: &str, message: &str) {
        self.show(MessageDialogKind::Error, title, message);
    }
}

/// Keep the picked path as OS bytes; a non-UTF-8 name must reach the script intact
fn to_local_path(picked: FilePath) -> Option<PathBuf> {
    match picked.into_path() {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::warn!(error = %e, "Dialog returned a non-local path");
            None
        }
    }
}
