//! Data models for skedit

mod account;
mod post;
mod user;

pub use account::{DEFAULT_AVATAR_URL, RedditAccount};
pub use post::{NewPost, Post, PostBucket, PostStatus, PostUpdate};
pub use user::{TokenPair, User};

use serde::{Deserialize, Deserializer};

/// Accept ids sent either as JSON strings or numbers
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
