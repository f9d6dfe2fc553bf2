//! Sign-in, sign-up, email verification and password reset flows

use crate::api::{ApiError, LoginRequest, PasswordResetConfirmRequest, SignupRequest, Transport};
use crate::models::User;
use crate::session::Session;

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const SIGNUP_FAILED: &str = "Signup failed. Please try again.";
const VERIFY_MISSING_TOKEN: &str = "Invalid verification link. No token provided.";
const VERIFY_SUCCEEDED: &str = "Email successfully verified! You can now log in.";
const VERIFY_FAILED: &str = "Verification failed. The link may be expired or invalid.";

/// User-facing text for a failed login
pub fn login_error_message(err: &ApiError) -> String {
    if let Some(detail) = err.detail() {
        return detail.to_string();
    }
    let message = err.message();
    if message.is_empty() {
        LOGIN_FAILED.to_string()
    } else {
        message
    }
}

/// User-facing text for a failed signup: every field error, or the message
pub fn signup_error_message(err: &ApiError) -> String {
    if err.details().is_some() {
        let fields = err.field_errors().join(" ");
        if fields.is_empty() {
            SIGNUP_FAILED.to_string()
        } else {
            fields
        }
    } else {
        let message = err.message();
        if message.is_empty() {
            SIGNUP_FAILED.to_string()
        } else {
            message
        }
    }
}

/// Log in with a username or email and load the user
pub async fn log_in<T: Transport + 'static>(
    session: &mut Session<T>,
    username_or_email: &str,
    password: &str,
) -> Result<User, String> {
    let request = LoginRequest {
        username_or_email: username_or_email.trim().to_string(),
        password: password.to_string(),
    };

    let pair = session
        .client()
        .login(&request)
        .await
        .map_err(|e| login_error_message(&e))?;
    session.login(&pair).await.map_err(|e| login_error_message(&e))
}

/// Create an account, then log in with the same email and password
pub async fn sign_up<T: Transport + 'static>(
    session: &mut Session<T>,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, String> {
    let request = SignupRequest {
        username: username.trim().to_string(),
        email: email.trim().to_string(),
        password: password.to_string(),
    };

    let result = async {
        session.client().signup(&request).await?;
        let pair = session
            .client()
            .login(&LoginRequest {
                username_or_email: request.email.clone(),
                password: request.password.clone(),
            })
            .await?;
        session.login(&pair).await
    }
    .await;

    result.map_err(|e| signup_error_message(&e))
}

/// Outcome of consuming an email verification link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Verified; the user can log in
    Verified(String),
    /// Not verified, with the reason to show
    Failed(String),
}

impl Verification {
    /// Text to show for this outcome
    pub fn message(&self) -> &str {
        match self {
            Self::Verified(m) | Self::Failed(m) => m,
        }
    }
}

/// Verify an email address with the token from the link
pub async fn verify_email<T: Transport + 'static>(
    session: &Session<T>,
    token: Option<&str>,
) -> Verification {
    let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        return Verification::Failed(VERIFY_MISSING_TOKEN.to_string());
    };

    match session.client().verify_email(token).await {
        Ok(_) => Verification::Verified(VERIFY_SUCCEEDED.to_string()),
        Err(e) => Verification::Failed(e.detail().unwrap_or(VERIFY_FAILED).to_string()),
    }
}

/// Ask for another verification email
pub async fn resend_verification<T: Transport + 'static>(
    session: &Session<T>,
    email: &str,
) -> Result<String, String> {
    session
        .client()
        .resend_verification(email.trim())
        .await
        .map(|r| {
            r.text()
                .unwrap_or("Verification email sent. Check your inbox.")
                .to_string()
        })
        .map_err(|e| e.detail().map_or_else(|| e.message(), str::to_string))
}

/// Ask for a password reset link
pub async fn request_password_reset<T: Transport + 'static>(
    session: &Session<T>,
    email: &str,
) -> Result<String, String> {
    session
        .client()
        .password_reset(email.trim())
        .await
        .map(|r| {
            r.text()
                .unwrap_or("If that address has an account, a reset link is on its way.")
                .to_string()
        })
        .map_err(|e| e.detail().map_or_else(|| e.message(), str::to_string))
}

/// Set a new password with the token from the reset link
pub async fn confirm_password_reset<T: Transport + 'static>(
    session: &Session<T>,
    token: &str,
    password: &str,
) -> Result<String, String> {
    let request = PasswordResetConfirmRequest {
        token: token.trim().to_string(),
        password: password.to_string(),
    };
    session
        .client()
        .password_reset_confirm(&request)
        .await
        .map(|_| "Password updated. You can now log in.".to_string())
        .map_err(|e| signup_error_message(&e))
}
