use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::email::Credentials;
use crate::store::repo::{SessionStore, SessionToken};

#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<SessionToken, Credentials>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionToken, Credentials>> {
        // every critical section is a single map call, so poisoning is harmless
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemoryStore {
    fn insert(&self, token: SessionToken, creds: Credentials) {
        self.lock().insert(token, creds);
    }

    fn get(&self, token: &SessionToken) -> Option<Credentials> {
        self.lock().get(token).cloned()
    }

    fn remove(&self, token: &SessionToken) -> Option<Credentials> {
        self.lock().remove(token)
    }
}
