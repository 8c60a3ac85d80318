//! Cooperative cancellation for long-running reductions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ReduceError, Result};

/// Shared flag polled between recurrence steps and between segments.
///
/// Clones observe the same flag, so one clone can be handed to a UI
/// thread while another is passed into the reduction.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once [`cancel`](Self::cancel) has been called.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ReduceError::Cancelled)
        } else {
            Ok(())
        }
    }
}
