//! `hsepartner-auth`: demo authentication boundary.
//!
//! Decoupled from storage: credentials come from an injected
//! [`CredentialVerifier`] and the signed-in user is kept in an injected
//! [`SessionStore`].

pub mod credentials;
pub mod roles;
pub mod session;
pub mod user;

pub use credentials::{AuthError, CredentialVerifier, DemoCredentials};
pub use roles::Role;
pub use session::{InMemorySessionStore, SESSION_KEY, Session, SessionError, SessionStore};
pub use user::AuthUser;
