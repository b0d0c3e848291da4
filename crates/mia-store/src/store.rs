//! The session store: current bearer token and user, swapped as a whole.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use mia_core::{Session, UserProfile};
use tracing::{debug, info, warn};

use crate::storage::{MemoryStorage, SessionStorage, StoreResult, TOKEN_KEY, USER_KEY};

/// Holds at most one [`Session`].
///
/// Every mutation replaces or removes the whole session under a single write
/// lock, so readers never observe a token without its user.
pub struct SessionStore {
    current: RwLock<Option<Session>>,
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    /// Open a store over `storage`, restoring a previously persisted session.
    pub fn open(storage: impl SessionStorage + 'static) -> Self {
        let restored = restore(&storage);
        if let Some(session) = &restored {
            info!(user = %session.user.email, "Restored session");
        }
        Self {
            current: RwLock::new(restored),
            storage: Box::new(storage),
        }
    }

    /// Store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new())
    }

    /// Current session, if any.
    pub fn get(&self) -> Option<Session> {
        self.read().clone()
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    /// Current user, if any.
    pub fn user(&self) -> Option<UserProfile> {
        self.read().as_ref().map(|s| s.user.clone())
    }

    pub fn is_present(&self) -> bool {
        self.read().is_some()
    }

    /// Replace the current session.
    ///
    /// The new session is persisted first; if that fails the previous session
    /// stays in place, both in memory and in storage.
    pub fn set(&self, session: Session) -> StoreResult<()> {
        let mut current = self.write();

        let user_json = serde_json::to_string(&session.user)?;
        self.storage.write(USER_KEY, &user_json)?;
        if let Err(e) = self.storage.write(TOKEN_KEY, &session.token) {
            rollback(self.storage.as_ref(), current.as_ref());
            return Err(e);
        }

        debug!(user = %session.user.email, "Session set");
        *current = Some(session);
        Ok(())
    }

    /// Remove the current session. Clearing an absent session is a no-op.
    ///
    /// The in-memory session is dropped even when the storage backend fails;
    /// the first storage error is returned after both entries were attempted.
    pub fn clear(&self) -> StoreResult<()> {
        let mut current = self.write();
        let previous = current.take();

        let token_result = self.storage.remove(TOKEN_KEY);
        let user_result = self.storage.remove(USER_KEY);

        match &previous {
            Some(session) => info!(user = %session.user.email, "Session cleared"),
            None => debug!("Session clear requested with no active session"),
        }

        token_result.and(user_result)
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Load a persisted session. Half-present or unreadable entries are wiped and
/// reported as no session.
fn restore(storage: &dyn SessionStorage) -> Option<Session> {
    let token = storage.read(TOKEN_KEY);
    let user = storage.read(USER_KEY);

    let (token, user) = match (token, user) {
        (Ok(None), Ok(None)) => return None,
        (Ok(Some(token)), Ok(Some(user))) => (token, user),
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "Failed to read stored session");
            return None;
        }
        _ => {
            warn!("Stored session is incomplete, discarding it");
            wipe(storage);
            return None;
        }
    };

    if token.trim().is_empty() {
        warn!("Stored session has an empty token, discarding it");
        wipe(storage);
        return None;
    }

    match serde_json::from_str::<UserProfile>(&user) {
        Ok(profile) => Some(Session::new(token, profile)),
        Err(e) => {
            warn!(error = %e, "Stored user profile is unreadable, discarding session");
            wipe(storage);
            None
        }
    }
}

fn wipe(storage: &dyn SessionStorage) {
    for key in [TOKEN_KEY, USER_KEY] {
        if let Err(e) = storage.remove(key) {
            warn!(key, error = %e, "Failed to remove stored session entry");
        }
    }
}

/// Put the previous session back after a failed `set`.
fn rollback(storage: &dyn SessionStorage, previous: Option<&Session>) {
    let restored = match previous {
        Some(session) => serde_json::to_string(&session.user)
            .map_err(crate::storage::StoreError::from)
            .and_then(|user| storage.write(USER_KEY, &user)),
        None => storage.remove(USER_KEY),
    };
    if let Err(e) = restored {
        warn!(error = %e, "Failed to roll back session storage");
    }
}
