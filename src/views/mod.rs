//! Text views for the CLI.
//!
//! Each view fetches through `ApiClient`, never touches credentials
//! directly, and returns text ready to print. Rendering is kept in plain
//! functions over fetched data so it can be tested without a backend.

pub mod accounts;
pub mod auth;
pub mod compose;
pub mod posts;

use anyhow::{Result, bail};

use crate::api::Transport;
use crate::models::User;
use crate::session::Session;

/// Shown when a command needs a signed-in user
pub const NOT_LOGGED_IN: &str = "Not logged in. Run: skedit login <username-or-email>";

/// Resolve the session and fail unless someone is signed in
pub async fn require_login<T: Transport + 'static>(session: &mut Session<T>) -> Result<&User> {
    if session.is_loading() {
        session.start().await;
    }
    match session.user() {
        Some(user) => Ok(user),
        None => bail!(NOT_LOGGED_IN),
    }
}
