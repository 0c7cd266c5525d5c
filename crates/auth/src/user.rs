use serde::{Deserialize, Serialize};

use crate::Role;

/// The signed-in identity, as persisted under [`crate::SESSION_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub name: String,
    pub role: Role,
    pub email: String,
}
