use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupGuiError {
    #[error("Failed to launch script '{script}': {source}")]
    ScriptLaunch {
        script: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for script '{script}': {source}")]
    ScriptWait {
        script: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Another backup or restore is already running")]
    Busy,

    #[error("Tauri error: {0}")]
    Tauri(#[from] tauri::Error),
}

pub type Result<T> = std::result::Result<T, BackupGuiError>;
