//! Operation tracking for backup/restore runs
//!
//! At most one operation runs at a time. The command layer claims the slot with
//! [`OperationState::begin`] and the worker releases it by dropping the returned guard.

use crate::error::{BackupGuiError, Result};
use crate::handlers::Action;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Shared handle between the UI command surface and the worker running a script
#[derive(Debug)]
pub struct OperationControl {
    id: String,
    action: Action,
    /// Cancellation flag
    cancelled: AtomicBool,
    started: Instant,
}

impl OperationControl {
    pub fn new(action: Action) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            action,
            cancelled: AtomicBool::new(false),
            started: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Check if the operation has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Request cancellation of the operation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

type Slot = Arc<Mutex<Option<Arc<OperationControl>>>>;

/// Single-slot registry of the active operation, managed as Tauri state
#[derive(Debug, Default)]
pub struct OperationState {
    active: Slot,
}

impl OperationState {
    /// Claim the slot for a new operation
    pub fn begin(&self, action: Action) -> Result<OperationGuard> {
        let mut active = lock(&self.active);
        if let Some(current) = active.as_ref() {
            tracing::warn!(
                operation_id = %current.id(),
                running = %current.action(),
                requested = %action,
                "Rejected operation while another is running"
            );
            return Err(BackupGuiError::Busy);
        }

        let control = Arc::new(OperationControl::new(action));
        *active = Some(Arc::clone(&control));

        Ok(OperationGuard {
            slot: Arc::clone(&self.active),
            control,
        })
    }

    /// Cancel the active operation. Returns false when nothing is running.
    pub fn cancel_active(&self) -> bool {
        match lock(&self.active).as_ref() {
            Some(control) => {
                control.cancel();
                tracing::info!(operation_id = %control.id(), action = %control.action(), "Cancellation requested");
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_busy(&self) -> bool {
        lock(&self.active).is_some()
    }
}

/// Holds the slot for the lifetime of one operation
#[derive(Debug)]
pub struct OperationGuard {
    slot: Slot,
    control: Arc<OperationControl>,
}

impl OperationGuard {
    pub fn control(&self) -> &OperationControl {
        &self.control
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        let mut active = lock(&self.slot);
        if active
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &self.control))
        {
            *active = None;
        }
    }
}

fn lock(slot: &Slot) -> MutexGuard<'_, Option<Arc<OperationControl>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
