//! REST API client for the scheduling backend.
//!
//! `ApiClient` wraps every call in the authenticated request pipeline
//! (bearer injection, single refresh-and-retry on 401, error mapping).
//! Endpoint functions live in `auth`, `reddit` and `posts`, each with its
//! own request/response records.

pub mod auth;
pub mod client;
pub mod error;
pub mod posts;
pub mod reddit;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

use serde::Deserialize;

pub use auth::{
    EmailRequest, LoginRequest, PasswordResetConfirmRequest, SignupRequest, VerifyEmailRequest,
};
pub use client::{ApiClient, REFRESH_ENDPOINT, SessionExpiredHook};
pub use error::ApiError;
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError};

/// Response of endpoints that answer 204 or an object we do not read
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Empty {}

/// Informational response (`{"message": ..}` or `{"detail": ..}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    /// Message text
    #[serde(default)]
    pub message: Option<String>,
    /// Django REST framework style detail text
    #[serde(default)]
    pub detail: Option<String>,
}

impl MessageResponse {
    /// Whichever text the backend sent
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.detail.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}
