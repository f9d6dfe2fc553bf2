//! User and credential models

use serde::{Deserialize, Serialize};

/// The signed-in user, as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user id
    pub id: u64,
    /// Account email
    pub email: String,
    /// Username
    pub username: String,
}

/// Access/refresh credential pair issued by the backend
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer credential
    pub access: String,
    /// Longer-lived renewal credential
    pub refresh: String,
}

impl TokenPair {
    /// Create a new pair
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

// Credentials stay out of logs
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}
