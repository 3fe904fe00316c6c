use crate::linear_assignment::error::{AssignmentError, AssignmentResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a caller and a running solve.
#[derive(Default, Clone, Debug)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

// polled once per outer iteration
#[inline]
pub(crate) fn check(cancellation: Option<&Cancellation>) -> AssignmentResult<()> {
    match cancellation {
        Some(c) if c.is_cancelled() => Err(AssignmentError::Cancelled),
        _ => Ok(()),
    }
}
