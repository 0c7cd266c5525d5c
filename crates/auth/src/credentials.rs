//! Credential verification.

use thiserror::Error;

use crate::{AuthUser, Role, SessionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Checks an email/password pair and resolves the account behind it.
///
/// Swap the implementation to plug in real authentication; callers only see
/// this trait.
pub trait CredentialVerifier {
    fn verify(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;
}

struct DemoAccount {
    email: &'static str,
    password: &'static str,
    role: Role,
    name: &'static str,
}

const DEMO_ACCOUNTS: [DemoAccount; 3] = [
    DemoAccount {
        email: "admin@hsepartner.com",
        password: "admin123",
        role: Role::STORE_MANAGER,
        name: "John Smith",
    },
    DemoAccount {
        email: "hse@hsepartner.com",
        password: "hse123",
        role: Role::HSE_OFFICER,
        name: "Sarah Johnson",
    },
    DemoAccount {
        email: "maint@hsepartner.com",
        password: "maint123",
        role: Role::MAINTENANCE_TEAM,
        name: "Mike Wilson",
    },
];

/// Hardcoded demo accounts. Exact, case-sensitive match on both fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoCredentials;

impl CredentialVerifier for DemoCredentials {
    fn verify(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        DEMO_ACCOUNTS
            .iter()
            .find(|account| account.email == email && account.password == password)
            .map(|account| AuthUser {
                name: account.name.to_string(),
                role: account.role.clone(),
                email: account.email.to_string(),
            })
            .ok_or(AuthError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_accounts_resolve_to_their_roles() {
        let user = DemoCredentials.verify("hse@hsepartner.com", "hse123").unwrap();
        assert_eq!(user.name, "Sarah Johnson");
        assert_eq!(user.role, Role::HSE_OFFICER);
    }

    #[test]
    fn wrong_password_is_rejected() {
        let err = DemoCredentials
            .verify("admin@hsepartner.com", "admin1234")
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(DemoCredentials.verify("ADMIN@hsepartner.com", "admin123").is_err());
    }
}
