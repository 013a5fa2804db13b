//! Per-user lock registry.
//!
//! Every balance-affecting operation reads the balance, computes, and writes
//! back. Without serialization, two concurrent debits can both observe the
//! same starting balance and both succeed, spending past the available
//! credits. The registry hands out one mutex per user id; holders of that
//! mutex own the user's read-modify-write window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use shopledger_core::UserId;

/// Registry of per-user mutexes.
///
/// Locks are created on first use and kept for the life of the store. The
/// registry itself is guarded by a single mutex, held only long enough to
/// clone out the per-user handle.
#[derive(Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock handle for a user, creating it if absent.
    ///
    /// Callers lock the returned mutex for the duration of their
    /// read-modify-write sequence.
    #[must_use]
    pub fn for_user(&self, user_id: &UserId) -> Arc<Mutex<()>> {
        let mut map = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        map.entry(user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
