//! Connected Reddit account model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Avatar shown when Reddit did not provide one
pub const DEFAULT_AVATAR_URL: &str =
    "https://www.redditstatic.com/avatars/avatar_default_02_FF4500.png";

/// A Reddit account linked to the user through OAuth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditAccount {
    /// Backend id of the link
    #[serde(deserialize_with = "super::id_string")]
    pub id: String,
    /// Reddit username (without u/)
    pub reddit_username: String,
    /// Avatar URL (may be empty)
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// When the account was connected
    pub created_at: DateTime<Utc>,
}

impl RedditAccount {
    /// Avatar URL, falling back to Reddit's default avatar
    pub fn avatar(&self) -> &str {
        match self.avatar_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => DEFAULT_AVATAR_URL,
        }
    }

    /// Username with the u/ prefix
    pub fn handle(&self) -> String {
        format!("u/{}", self.reddit_username)
    }
}
