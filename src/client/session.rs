use crate::auth::store::IdentitySummary;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// What a client keeps between page loads: the bearer token and the identity
/// it was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub identity: IdentitySummary,
}

/// Where a session lives. Browsers back this with local storage, tests and
/// native clients with [`MemorySessionStore`].
pub trait SessionStore {
    fn read(&self) -> Option<StoredSession>;
    fn write(&self, session: StoredSession);
    fn clear(&self);
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self) -> Option<StoredSession> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self, session: StoredSession) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    fn clear(&self) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
