use crate::error::{ClassifyError, Stage};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cooperative cancellation for a single classification.
///
/// Clones share the cancel flag, so a host can keep one clone and cancel the
/// request from another thread. The pipeline checks it between stages; a stage
/// already running is not interrupted.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail with the stage about to start if cancelled or past the deadline.
    pub fn check(&self, stage: Stage) -> Result<(), ClassifyError> {
        if self.is_cancelled() {
            return Err(ClassifyError::Cancelled(stage));
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(ClassifyError::DeadlineExceeded(stage));
        }
        Ok(())
    }
}
