//! In-memory user directory

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parley_core::{DomainError, StoreResult, User, UserDirectory, UserId};

/// In-memory `UserDirectory` implementation
///
/// Thread-safe; `set_unavailable` flips every operation into
/// `StoreUnavailable` to exercise degraded-mode handling.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: DashMap<UserId, User>,
    unavailable: AtomicBool,
}

impl MemoryDirectory {
    /// Create an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user
    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Toggle failure injection
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DomainError::StoreUnavailable(
                "user directory unreachable".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn lookup_user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        self.check_available()?;
        Ok(self.users.get(&id).map(|u| u.clone()))
    }
}
