//! Reddit post model (drafts, scheduled and published posts)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RedditAccount;

/// Lifecycle status of a post on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Saved but not scheduled
    #[default]
    Draft,
    /// Waiting for its scheduled time
    Scheduled,
    /// Submitted to Reddit
    Published,
    /// Publishing failed
    Error,
}

impl PostStatus {
    /// Get status as string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
            Self::Error => "error",
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "scheduled" => Some(Self::Scheduled),
            "published" => Some(Self::Published),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Get emoji for status
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Draft => "📝",
            Self::Scheduled => "⏳",
            Self::Published => "✅",
            Self::Error => "❌",
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which list of posts to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostBucket {
    /// Every post regardless of status
    All,
    /// Posts waiting to be published
    #[default]
    Scheduled,
    /// Posts already on Reddit
    Published,
}

impl PostBucket {
    /// Backend path listing this bucket
    pub const fn path(&self) -> &'static str {
        match self {
            Self::All => "/api/posts/",
            Self::Scheduled => "/api/posts/scheduled/",
            Self::Published => "/api/posts/posted/",
        }
    }

    /// Get bucket as string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
        }
    }

    /// Parse bucket from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(Self::All),
            "scheduled" => Some(Self::Scheduled),
            "published" | "posted" => Some(Self::Published),
            _ => None,
        }
    }
}

/// A post managed by the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Backend id
    #[serde(deserialize_with = "super::id_string")]
    pub id: String,
    /// Post title
    pub title: String,
    /// Markdown body
    pub content: String,
    /// Target subreddit (without r/)
    pub subreddit: String,
    /// Current status
    pub status: PostStatus,
    /// When the backend will publish it
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    /// When it was published
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Account that submits the post
    pub reddit_account: RedditAccount,
}

impl Post {
    /// Human-readable time until publishing
    pub fn time_until(&self) -> Option<String> {
        let scheduled_at = self.scheduled_at?;
        let now = Utc::now();
        if scheduled_at <= now {
            return Some("now".to_string());
        }

        let seconds = (scheduled_at - now).num_seconds();

        Some(if seconds < 60 {
            format!("{}s", seconds)
        } else if seconds < 3600 {
            format!("{}m", seconds / 60)
        } else if seconds < 86400 {
            let hours = seconds / 3600;
            let mins = (seconds % 3600) / 60;
            if mins > 0 {
                format!("{}h {}m", hours, mins)
            } else {
                format!("{}h", hours)
            }
        } else {
            let days = seconds / 86400;
            let hours = (seconds % 86400) / 3600;
            if hours > 0 {
                format!("{}d {}h", days, hours)
            } else {
                format!("{}d", days)
            }
        })
    }

    /// Format scheduled time for display
    pub fn scheduled_time_display(&self) -> Option<String> {
        self.scheduled_at
            .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
    }
}

/// Body of `POST /api/posts/create/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    /// Post title
    pub title: String,
    /// Markdown body
    pub content: String,
    /// Target subreddit (without r/)
    pub subreddit: String,
    /// Id of the connected account to post with
    pub reddit_account: String,
    /// Publish time; `null` means publish now
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Body of `PUT /api/posts/{id}/`; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostUpdate {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New subreddit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,
    /// New account id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reddit_account: Option<String>,
}

impl PostUpdate {
    /// Whether the update would change nothing
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.subreddit.is_none()
            && self.reddit_account.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST_JSON: &str = r#"{
        "id": 7,
        "title": "Launch day",
        "content": "We shipped **it**",
        "subreddit": "rust",
        "status": "scheduled",
        "scheduled_at": "2030-05-01T12:00:00Z",
        "published_at": null,
        "reddit_account": {
            "id": "acc-1",
            "reddit_username": "ferris",
            "avatar_url": null,
            "created_at": "2026-01-01T00:00:00Z"
        }
    }"#;

    #[test]
    fn test_parse_post() {
        let post: Post = serde_json::from_str(POST_JSON).unwrap();
        assert_eq!(post.id, "7");
        assert_eq!(post.status, PostStatus::Scheduled);
        assert_eq!(post.reddit_account.reddit_username, "ferris");
        assert_eq!(
            post.scheduled_time_display().as_deref(),
            Some("2030-05-01 12:00 UTC")
        );
        assert!(post.time_until().unwrap().contains('d'));
    }

    #[test]
    fn test_new_post_serializes_null_schedule() {
        let new_post = NewPost {
            title: "t".to_string(),
            content: "c".to_string(),
            subreddit: "rust".to_string(),
            reddit_account: "acc-1".to_string(),
            scheduled_at: None,
        };
        let value = serde_json::to_value(&new_post).unwrap();
        assert!(value["scheduled_at"].is_null());
        assert_eq!(value["reddit_account"], "acc-1");
    }

    #[test]
    fn test_update_omits_absent_fields() {
        let update = PostUpdate {
            title: Some("New title".to_string()),
            ..PostUpdate::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"title":"New title"}"#
        );
        assert!(PostUpdate::default().is_empty());
    }

    #[test]
    fn test_bucket_paths() {
        assert_eq!(PostBucket::default(), PostBucket::Scheduled);
        assert_eq!(PostBucket::All.path(), "/api/posts/");
        assert_eq!(PostBucket::Scheduled.path(), "/api/posts/scheduled/");
        assert_eq!(PostBucket::from_str("posted"), Some(PostBucket::Published));
        assert_eq!(PostBucket::Published.path(), "/api/posts/posted/");
        assert_eq!(PostBucket::from_str("drafts"), None);
    }
}
