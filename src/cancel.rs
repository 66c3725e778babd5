// src/cancel.rs

//! Cooperative cancellation for long-running codec operations.
//!
//! Pages are atomic units of work; the token is observed only at page
//! boundaries. Once a page's transformation has started it runs to
//! completion before the next observation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{DbcryptError, Result};

/// Cloneable cancellation handle shared between the caller and a running
/// operation. A fresh token is not cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. The running operation aborts with
    /// [`DbcryptError::Cancelled`] before starting its next page.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Page-boundary check used by the encryptor and decryptor loops.
    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(DbcryptError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_cancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn cancel_propagates_to_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(
            token.check().unwrap_err(),
            DbcryptError::Cancelled
        ));
    }
}
