// Main.rs - Application entry point
// Launches the window, or runs a backup/restore headless when given a subcommand

// Hide console window in release builds on Windows
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

use std::process::ExitCode;

fn main() -> ExitCode {
    backup_gui_lib::logging::init();
    backup_gui_lib::cli::run()
}
