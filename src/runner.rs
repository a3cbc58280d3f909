//! External script execution

use crate::error::{BackupGuiError, Result};
use crate::operation::OperationControl;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

/// How long a stopped script gets to exit after SIGTERM before SIGKILL
const TERM_GRACE: Duration = Duration::from_millis(250);

#[cfg(unix)]
mod unix_process {
    use libc::{c_int, pid_t};

    pub use libc::{SIGKILL, SIGTERM};

    /// Send a signal to every process in the group (negative pid targets the group)
    pub fn kill_process_group(pgid: u32, signal: c_int) -> std::io::Result<()> {
        // Safety: kill() takes no pointers
        let rc = unsafe { libc::kill(-(pgid as pid_t), signal) };
        if rc == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }

    /// True while any process (zombies included) is left in the group
    pub fn process_group_alive(pgid: u32) -> bool {
        // Safety: signal 0 only checks for existence
        let rc = unsafe { libc::kill(-(pgid as pid_t), 0) };
        rc == 0 || std::io::Error::last_os_error().raw_os_error() != Some(libc::ESRCH)
    }
}

/// How a script run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// The process exited on its own
    Exited { code: i32 },
    /// The process was killed by a signal and has no exit code
    Terminated,
    /// Killed after exceeding the configured timeout
    TimedOut,
    /// Killed because the user cancelled the operation
    Cancelled,
}

impl ScriptOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => ScriptOutcome::Exited { code },
            None => ScriptOutcome::Terminated,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, ScriptOutcome::Exited { code: 0 })
    }
}

/// Runs an external script with a single argument
pub trait ScriptRunner {
    fn run(
        &self,
        script: &Path,
        argument: &OsStr,
        control: &OperationControl,
        timeout: Option<Duration>,
    ) -> Result<ScriptOutcome>;
}

/// Spawns the script as a child process and polls it until it exits.
///
/// On unix the script leads its own process group, so stopping it also stops
/// everything it started.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    poll_interval: Duration,
}

impl ProcessRunner {
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::with_poll_interval(Duration::from_millis(50))
    }
}

impl ScriptRunner for ProcessRunner {
    fn run(
        &self,
        script: &Path,
        argument: &OsStr,
        control: &OperationControl,
        timeout: Option<Duration>,
    ) -> Result<ScriptOutcome> {
        let script_name = script.display().to_string();

        if control.is_cancelled() {
            tracing::debug!(operation_id = %control.id(), script = %script_name, "Cancelled before start");
            return Ok(ScriptOutcome::Cancelled);
        }

        let mut command = Command::new(script);
        command.arg(argument);

        // process_group(0) makes the child's pid its pgid
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(|source| BackupGuiError::ScriptLaunch {
            script: script_name.clone(),
            source,
        })?;

        tracing::debug!(
            operation_id = %control.id(),
            script = %script_name,
            pid = child.id(),
            "Script started"
        );

        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            let status = child.try_wait().map_err(|source| BackupGuiError::ScriptWait {
                script: script_name.clone(),
                source,
            })?;
            if let Some(status) = status {
                return Ok(ScriptOutcome::from_status(status));
            }

            if control.is_cancelled() {
                terminate(&mut child, &script_name, self.poll_interval);
                return Ok(ScriptOutcome::Cancelled);
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                terminate(&mut child, &script_name, self.poll_interval);
                return Ok(ScriptOutcome::TimedOut);
            }

            thread::sleep(self.poll_interval);
        }
    }
}

/// Stop the script's whole process group: SIGTERM, a short grace period, then
/// SIGKILL. The child is reaped before returning.
#[cfg(unix)]
fn terminate(child: &mut Child, script: &str, poll_interval: Duration) {
    use unix_process::{kill_process_group, process_group_alive, SIGKILL, SIGTERM};

    let pgid = child.id();
    if let Err(e) = kill_process_group(pgid, SIGTERM) {
        tracing::warn!(script, pgid, error = %e, "Failed to send SIGTERM to script group");
    }

    let mut reaped = false;
    let start = Instant::now();
    while start.elapsed() < TERM_GRACE {
        // Reap the leader so a zombie does not keep the group alive
        if !reaped {
            reaped = matches!(child.try_wait(), Ok(Some(_)));
        }
        if reaped && !process_group_alive(pgid) {
            return;
        }
        thread::sleep(poll_interval.min(TERM_GRACE));
    }

    tracing::debug!(script, pgid, "Script group still running after SIGTERM, sending SIGKILL");
    if let Err(e) = kill_process_group(pgid, SIGKILL) {
        if e.raw_os_error() != Some(libc::ESRCH) {
            tracing::warn!(script, pgid, error = %e, "Failed to send SIGKILL to script group");
        }
    }
    if !reaped {
        if let Err(e) = child.wait() {
            tracing::warn!(script, error = %e, "Failed to reap script");
        }
    }
}

/// Kill and reap the child
#[cfg(not(unix))]
fn terminate(child: &mut Child, script: &str, _poll_interval: Duration) {
    if let Err(e) = child.kill() {
        tracing::warn!(script, error = %e, "Failed to kill script");
    }
    if let Err(e) = child.wait() {
        tracing::warn!(script, error = %e, "Failed to reap script");
    }
}
