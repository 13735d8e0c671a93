//! Reentrancy lock for privileged entry points
//!
//! Held for the whole duration of a privileged call, including every call the
//! wallet forwards. Released when the guard drops, whatever the outcome.

use std::cell::Cell;

use super::error::WalletError;

/// In-progress flag shared by all privileged entry points of one wallet
#[derive(Debug, Default)]
pub struct ReentrancyLock {
    entered: Cell<bool>,
}

impl ReentrancyLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock, failing if a privileged call is already running
    pub fn enter(&self) -> Result<LockGuard<'_>, WalletError> {
        if self.entered.replace(true) {
            return Err(WalletError::ReentrancyRejected);
        }
        Ok(LockGuard { lock: self })
    }

    pub fn is_entered(&self) -> bool {
        self.entered.get()
    }
}

/// Releases the [`ReentrancyLock`] on drop
#[derive(Debug)]
pub struct LockGuard<'a> {
    lock: &'a ReentrancyLock,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.entered.set(false);
    }
}
