//! Account and authentication endpoints

use serde::Serialize;
use tracing::debug;

use crate::models::{TokenPair, User};

use super::transport::{Method, Transport};
use super::{ApiClient, ApiError, Empty, MessageResponse};

const LOGIN_ENDPOINT: &str = "/api/auth/login/";
const SIGNUP_ENDPOINT: &str = "/api/auth/signup/";
const GOOGLE_ENDPOINT: &str = "/api/auth/google/";
const LOGOUT_ENDPOINT: &str = "/api/auth/logout/";
const VERIFY_EMAIL_ENDPOINT: &str = "/api/auth/verify-email/";
const RESEND_VERIFICATION_ENDPOINT: &str = "/api/auth/resend-verification/";
const PASSWORD_RESET_ENDPOINT: &str = "/api/auth/password-reset/";
const PASSWORD_RESET_CONFIRM_ENDPOINT: &str = "/api/auth/password-reset-confirm/";
const USER_ENDPOINT: &str = "/api/auth/user/";

/// Body of `POST /api/auth/login/`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Username or email address
    pub username_or_email: String,
    /// Account password
    pub password: String,
}

/// Body of `POST /api/auth/signup/`
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    /// Desired username
    pub username: String,
    /// Email address (verification is sent here)
    pub email: String,
    /// Account password
    pub password: String,
}

/// Body of `POST /api/auth/verify-email/`
#[derive(Debug, Clone, Serialize)]
pub struct VerifyEmailRequest {
    /// Token from the verification link
    pub token: String,
}

/// Body of the resend-verification and password-reset endpoints
#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    /// Account email address
    pub email: String,
}

/// Body of `POST /api/auth/password-reset-confirm/`
#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetConfirmRequest {
    /// Token from the reset link
    pub token: String,
    /// New password
    pub password: String,
}

impl<T: Transport> ApiClient<T> {
    /// Exchange credentials for a token pair
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenPair, ApiError> {
        self.post(LOGIN_ENDPOINT, request).await
    }

    /// Create a new account
    pub async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse, ApiError> {
        self.post(SIGNUP_ENDPOINT, request).await
    }

    /// Browser entry point of the Google OAuth login
    pub fn google_login_url(&self) -> String {
        self.url(GOOGLE_ENDPOINT)
    }

    /// Tell the backend a session ended.
    ///
    /// Sent with the given bearer and no refresh handling, so it can run
    /// after local credentials are already cleared.
    pub async fn notify_logout(&self, access: &str) -> Result<(), ApiError> {
        let response = self
            .send(Method::Post, LOGOUT_ENDPOINT, None, Some(access))
            .await?;
        debug!(status = response.status, "Logout notice delivered");
        if response.is_success() {
            Ok(())
        } else {
            Err(ApiError::from_response(
                response.status,
                &response.status_text,
                &response.body,
            ))
        }
    }

    /// Consume an email verification token
    pub async fn verify_email(&self, token: &str) -> Result<MessageResponse, ApiError> {
        let request = VerifyEmailRequest {
            token: token.to_string(),
        };
        self.post(VERIFY_EMAIL_ENDPOINT, &request).await
    }

    /// Send the verification email again
    pub async fn resend_verification(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let request = EmailRequest {
            email: email.to_string(),
        };
        self.post(RESEND_VERIFICATION_ENDPOINT, &request).await
    }

    /// Request a password reset link
    pub async fn password_reset(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let request = EmailRequest {
            email: email.to_string(),
        };
        self.post(PASSWORD_RESET_ENDPOINT, &request).await
    }

    /// Complete a password reset
    pub async fn password_reset_confirm(
        &self,
        request: &PasswordResetConfirmRequest,
    ) -> Result<Empty, ApiError> {
        self.post(PASSWORD_RESET_CONFIRM_ENDPOINT, request).await
    }

    /// Fetch the signed-in user
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get(USER_ENDPOINT).await
    }
}
