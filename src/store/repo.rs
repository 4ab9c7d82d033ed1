use std::fmt;

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::domain::email::Credentials;

const TOKEN_LEN: usize = 32;

/// Opaque handle the presentation layer keeps instead of the credentials.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        let token = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // enough to tell sessions apart in logs
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "SessionToken({prefix}…)")
    }
}

/// Key-value store of logged-in credentials. Never written to disk.
pub trait SessionStore: Send + Sync {
    fn insert(&self, token: SessionToken, creds: Credentials);
    fn get(&self, token: &SessionToken) -> Option<Credentials>;
    fn remove(&self, token: &SessionToken) -> Option<Credentials>;
}
