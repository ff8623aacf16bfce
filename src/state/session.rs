use tracing::info;

use super::storage::KeyValueStore;
use crate::error::{Error, Result};
use crate::logging::redact_token;

/// Key under which the session token is persisted
pub const SESSION_KEY: &str = "medisetu_patientId";

/// Holds the current identity token, backed by the key-value surface.
///
/// Presence of a token is the only authorization gate in the app.
#[derive(Debug)]
pub struct SessionStore<K> {
    storage: K,
    token: Option<String>,
}

impl<K: KeyValueStore> SessionStore<K> {
    /// Wrap `storage` without reading it; call [`Self::restore`] at cold start.
    pub fn new(storage: K) -> Self {
        Self {
            storage,
            token: None,
        }
    }

    /// Re-read the persisted token, replacing the in-memory one.
    pub fn restore(&mut self) -> Result<Option<&str>> {
        self.token = self
            .storage
            .get(SESSION_KEY)?
            .filter(|token| !token.trim().is_empty());
        Ok(self.current())
    }

    pub fn current(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    /// Accept any non-empty identifier, persist it and return it.
    ///
    /// The in-memory session is set before persisting, so a storage failure
    /// still yields a usable (if unremembered) session.
    pub fn login(&mut self, input: &str) -> Result<String> {
        let token = input.trim();
        if token.is_empty() {
            return Err(Error::EmptyInput);
        }

        self.token = Some(token.to_string());
        info!(patient = %redact_token(token), "patient logged in");
        self.storage.set(SESSION_KEY, token)?;
        Ok(token.to_string())
    }

    /// Drop the session and its persisted token.
    pub fn logout(&mut self) -> Result<()> {
        if let Some(token) = self.token.take() {
            info!(patient = %redact_token(&token), "patient logged out");
        }
        self.storage.remove(SESSION_KEY)
    }

    #[cfg(test)]
    pub fn storage(&self) -> &K {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut K {
        &mut self.storage
    }
}
