use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Job role shown next to the signed-in user.
///
/// Roles are opaque strings at this layer; nothing here maps them to
/// permissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const STORE_MANAGER: Role = Role::from_static("Store Manager");
    pub const HSE_OFFICER: Role = Role::from_static("HSE Officer");
    pub const MAINTENANCE_TEAM: Role = Role::from_static("Maintenance Team");

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
