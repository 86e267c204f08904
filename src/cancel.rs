//! Cooperative cancellation shared between a reader and its caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::ReadError;

/// Clonable flag a caller can trip to stop an in-flight read.
///
/// Readers poll the token once per input line; a tripped token surfaces as
/// [`ReadError::Canceled`] and no partial table is returned.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the read currently holding this token stop.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Checked by readers at each line boundary.
    pub fn check(&self) -> Result<(), ReadError> {
        if self.is_canceled() {
            Err(ReadError::Canceled)
        } else {
            Ok(())
        }
    }
}
