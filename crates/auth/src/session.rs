//! Signed-in state and its persistence.

use thiserror::Error;

use crate::{AuthError, AuthUser, CredentialVerifier};

/// Storage key of the persisted user entry.
pub const SESSION_KEY: &str = "hsepartner_user";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The backing storage could not be read or written.
    #[error("session storage failed: {0}")]
    Storage(String),

    /// The stored entry is not a valid user record.
    #[error("stored session is corrupt: {0}")]
    Corrupt(String),
}

/// Persistence for the single signed-in user entry.
pub trait SessionStore {
    fn load(&self) -> Result<Option<AuthUser>, SessionError>;
    fn save(&mut self, user: &AuthUser) -> Result<(), SessionError>;
    fn clear(&mut self) -> Result<(), SessionError>;
}

/// Process-local store for tests/dev.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    entry: Option<String>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value, as it would sit in browser storage.
    pub fn raw(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            entry: Some(raw.into()),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<AuthUser>, SessionError> {
        self.entry
            .as_deref()
            .map(|raw| serde_json::from_str(raw).map_err(|e| SessionError::Corrupt(e.to_string())))
            .transpose()
    }

    fn save(&mut self, user: &AuthUser) -> Result<(), SessionError> {
        let raw = serde_json::to_string(user).map_err(|e| SessionError::Storage(e.to_string()))?;
        self.entry = Some(raw);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        self.entry = None;
        Ok(())
    }
}

/// Authentication state: who is signed in, backed by a [`SessionStore`].
#[derive(Debug)]
pub struct Session<V, S> {
    verifier: V,
    store: S,
    user: Option<AuthUser>,
}

impl<V, S> Session<V, S>
where
    V: CredentialVerifier,
    S: SessionStore,
{
    pub fn new(verifier: V, store: S) -> Self {
        Self {
            verifier,
            store,
            user: None,
        }
    }

    /// Pick up a user persisted by an earlier run.
    ///
    /// A corrupt entry is discarded and the session starts signed out.
    pub fn restore(&mut self) -> Result<Option<&AuthUser>, AuthError> {
        self.user = match self.store.load() {
            Ok(user) => user,
            Err(SessionError::Corrupt(reason)) => {
                tracing::warn!(%reason, "discarding corrupt session entry");
                self.store.clear()?;
                None
            }
            Err(err) => return Err(err.into()),
        };
        Ok(self.user.as_ref())
    }

    /// Verify credentials and persist the resulting user.
    ///
    /// A failed attempt leaves both the store and the current user untouched.
    pub fn login(&mut self, email: &str, password: &str) -> Result<&AuthUser, AuthError> {
        let user = match self.verifier.verify(email, password) {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(email, "login rejected");
                return Err(err);
            }
        };
        self.store.save(&user)?;
        tracing::info!(email, role = %user.role, "logged in");
        Ok(self.user.insert(user))
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.store.clear()?;
        if let Some(user) = self.user.take() {
            tracing::info!(email = %user.email, "logged out");
        }
        Ok(())
    }

    pub fn current(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DemoCredentials, Role};

    fn session(store: InMemorySessionStore) -> Session<DemoCredentials, InMemorySessionStore> {
        Session::new(DemoCredentials, store)
    }

    #[test]
    fn login_persists_user_and_logout_clears_it() {
        let mut session = session(InMemorySessionStore::new());
        let user = session.login("admin@hsepartner.com", "admin123").unwrap().clone();
        assert_eq!(user.role, Role::STORE_MANAGER);
        assert_eq!(session.store().load().unwrap(), Some(user));

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.store().raw(), None);
    }

    #[test]
    fn failed_login_keeps_previous_state() {
        let mut session = session(InMemorySessionStore::new());
        session.login("maint@hsepartner.com", "maint123").unwrap();

        let err = session.login("hse@hsepartner.com", "nope").unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(session.current().unwrap().name, "Mike Wilson");
        assert_eq!(session.store().load().unwrap().unwrap().name, "Mike Wilson");
    }

    #[test]
    fn stored_entry_uses_original_field_names() {
        let mut session = session(InMemorySessionStore::new());
        session.login("hse@hsepartner.com", "hse123").unwrap();
        let raw: serde_json::Value = serde_json::from_str(session.store().raw().unwrap()).unwrap();
        assert_eq!(raw["name"], "Sarah Johnson");
        assert_eq!(raw["role"], "HSE Officer");
        assert_eq!(raw["email"], "hse@hsepartner.com");
    }

    #[test]
    fn restore_reads_a_previous_login() {
        let raw = r#"{"name":"John Smith","role":"Store Manager","email":"admin@hsepartner.com"}"#;
        let mut session = session(InMemorySessionStore::with_raw(raw));
        let user = session.restore().unwrap().cloned().unwrap();
        assert_eq!(user.email, "admin@hsepartner.com");
        assert!(session.is_authenticated());
    }

    #[test]
    fn restore_discards_corrupt_entry() {
        let mut session = session(InMemorySessionStore::with_raw("{not json"));
        assert!(session.restore().unwrap().is_none());
        assert_eq!(session.store().raw(), None);
    }
}
