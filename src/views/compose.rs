//! Post composer.
//!
//! Collects the raw form fields, validates them into a `NewPost` and
//! submits it. "Publish now" sends `scheduled_at: null`; "Schedule" needs a
//! time, parsed with `schedule::parse_schedule_time`.

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use thiserror::Error;
use tracing::info;

use crate::api::{ApiClient, Transport};
use crate::models::{NewPost, PostUpdate};
use crate::schedule::parse_schedule_time_at;

const CREATE_FAILED: &str = "Failed to create post.";
const PREVIEW_WIDTH: usize = 76;

/// Raw composer input, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    /// Id of the connected account to post with
    pub reddit_account: String,
    /// Subreddit, with or without `r/`
    pub subreddit: String,
    /// Post title
    pub title: String,
    /// Markdown body
    pub content: String,
    /// Human-friendly publish time, only read when scheduling
    pub scheduled_at: String,
}

/// Which submit button was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// Create with `scheduled_at: null`
    PublishNow,
    /// Create with a parsed publish time
    Schedule,
}

/// Why the form could not be turned into a request
#[derive(Error, Debug)]
pub enum FormError {
    /// A required field was blank
    #[error("{0} is required")]
    Missing(&'static str),

    /// The publish time did not parse or lies in the past
    #[error("{0}")]
    InvalidTime(String),
}

fn required(value: &str, name: &'static str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::Missing(name))
    } else {
        Ok(value.to_string())
    }
}

fn normalize_subreddit(input: &str) -> &str {
    let input = input.trim();
    input
        .strip_prefix("r/")
        .or_else(|| input.strip_prefix("/r/"))
        .unwrap_or(input)
}

impl PostForm {
    /// Validate into a create request
    pub fn to_new_post(&self, mode: SubmitMode) -> Result<NewPost, FormError> {
        self.to_new_post_at(mode, Local::now())
    }

    /// Like `to_new_post`, relative to an explicit "now"
    pub fn to_new_post_at(
        &self,
        mode: SubmitMode,
        now: DateTime<Local>,
    ) -> Result<NewPost, FormError> {
        let reddit_account = required(&self.reddit_account, "Reddit account")?;
        let subreddit = required(normalize_subreddit(&self.subreddit), "Subreddit")?;
        let title = required(&self.title, "Title")?;
        let content = required(&self.content, "Content")?;

        let scheduled_at = match mode {
            SubmitMode::PublishNow => None,
            SubmitMode::Schedule => Some(parse_time(&self.scheduled_at, now)?),
        };

        Ok(NewPost {
            title,
            content,
            subreddit,
            reddit_account,
            scheduled_at,
        })
    }

    /// Build an update from the fields that were filled in
    pub fn to_update(&self) -> PostUpdate {
        let filled = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        PostUpdate {
            title: filled(&self.title),
            content: filled(&self.content),
            subreddit: filled(normalize_subreddit(&self.subreddit)),
            reddit_account: filled(&self.reddit_account),
        }
    }

    /// Plain-text preview of the post as it would be submitted
    pub fn preview(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "r/{}", normalize_subreddit(&self.subreddit));
        let _ = writeln!(out, "{}", self.title.trim());
        let _ = writeln!(out, "{}", "-".repeat(self.title.trim().chars().count().max(3)));

        if self.content.trim().is_empty() {
            out.push_str("Nothing to preview yet.\n");
            return out;
        }
        for paragraph in self.content.trim().split("\n\n") {
            for line in textwrap::wrap(paragraph, PREVIEW_WIDTH) {
                let _ = writeln!(out, "{}", line);
            }
            out.push('\n');
        }
        out
    }
}

fn parse_time(input: &str, now: DateTime<Local>) -> Result<DateTime<Utc>, FormError> {
    if input.trim().is_empty() {
        return Err(FormError::Missing("Schedule time"));
    }
    parse_schedule_time_at(input, now).map_err(|e| FormError::InvalidTime(e.to_string()))
}

/// Validate and create the post, returning a confirmation line
pub async fn submit<T: Transport>(
    client: &ApiClient<T>,
    form: &PostForm,
    mode: SubmitMode,
) -> Result<String, String> {
    let new_post = form.to_new_post(mode).map_err(|e| e.to_string())?;

    let post = client.create_post(&new_post).await.map_err(|e| {
        let message = e.message();
        if message.is_empty() {
            CREATE_FAILED.to_string()
        } else {
            message
        }
    })?;

    info!(id = %post.id, status = %post.status, "Post created");
    Ok(match post.scheduled_time_display() {
        Some(at) if mode == SubmitMode::Schedule => {
            format!("Scheduled \"{}\" for r/{} at {} [{}]", post.title, post.subreddit, at, post.id)
        }
        _ => format!("Created \"{}\" for r/{} [{}]", post.title, post.subreddit, post.id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{ScriptedTransport, client, post_json};
    use chrono::{Duration, TimeZone};
    use serde_json::Value;

    fn form() -> PostForm {
        PostForm {
            reddit_account: " acc-1 ".to_string(),
            subreddit: "r/rust".to_string(),
            title: "  Hello  ".to_string(),
            content: "Body".to_string(),
            scheduled_at: String::new(),
        }
    }

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2029, 6, 15, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn test_publish_now_trims_and_strips_prefix() {
        let post = form().to_new_post_at(SubmitMode::PublishNow, noon()).unwrap();
        assert_eq!(post.reddit_account, "acc-1");
        assert_eq!(post.subreddit, "rust");
        assert_eq!(post.title, "Hello");
        assert_eq!(post.scheduled_at, None);
    }

    #[test]
    fn test_schedule_requires_time() {
        let err = form().to_new_post_at(SubmitMode::Schedule, noon()).unwrap_err();
        assert_eq!(err.to_string(), "Schedule time is required");

        let mut scheduled = form();
        scheduled.scheduled_at = "in 2h".to_string();
        let post = scheduled.to_new_post_at(SubmitMode::Schedule, noon()).unwrap();
        assert_eq!(
            post.scheduled_at,
            Some(noon().with_timezone(&Utc) + Duration::hours(2))
        );

        scheduled.scheduled_at = "yesterday-ish".to_string();
        assert!(matches!(
            scheduled.to_new_post_at(SubmitMode::Schedule, noon()),
            Err(FormError::InvalidTime(_))
        ));
    }

    #[test]
    fn test_missing_fields() {
        let mut empty = form();
        empty.subreddit = " r/ ".to_string();
        assert_eq!(
            empty.to_new_post_at(SubmitMode::PublishNow, noon()).unwrap_err().to_string(),
            "Subreddit is required"
        );
        assert!(matches!(
            PostForm::default().to_new_post_at(SubmitMode::PublishNow, noon()),
            Err(FormError::Missing("Reddit account"))
        ));
    }

    #[test]
    fn test_update_only_filled_fields() {
        let update = PostForm {
            title: "New".to_string(),
            subreddit: "/r/learnrust".to_string(),
            ..PostForm::default()
        }
        .to_update();
        assert_eq!(update.title.as_deref(), Some("New"));
        assert_eq!(update.subreddit.as_deref(), Some("learnrust"));
        assert_eq!(update.content, None);
        assert!(PostForm::default().to_update().is_empty());
    }

    #[test]
    fn test_preview() {
        let text = form().preview();
        assert!(text.starts_with("r/rust\nHello\n-----\n"));
        assert!(text.contains("Body"));
        assert!(PostForm::default().preview().contains("Nothing to preview yet."));

        let long = PostForm {
            content: format!("{}\n\nSecond paragraph", "word ".repeat(40)),
            ..form()
        };
        let text = long.preview();
        assert!(text.lines().all(|line| line.chars().count() <= PREVIEW_WIDTH));
        assert!(text.contains("\n\nSecond paragraph\n"));
    }

    #[tokio::test]
    async fn test_submit_publish_now_sends_null() {
        let transport = ScriptedTransport::new();
        transport.respond(201, &post_json("8", "Hello", "published"));
        let api = client(&transport);

        let line = submit(&api, &form(), SubmitMode::PublishNow).await.unwrap();
        assert_eq!(line, "Created \"Hello\" for r/rust [8]");

        let sent = transport.requests_to("/api/posts/create/");
        let body: Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert!(body["scheduled_at"].is_null());
        assert_eq!(body["subreddit"], "rust");
    }

    #[tokio::test]
    async fn test_submit_error_message() {
        let transport = ScriptedTransport::new();
        transport.respond(400, r#"{"subreddit": ["Unknown subreddit"]}"#);
        let api = client(&transport);

        let err = submit(&api, &form(), SubmitMode::PublishNow).await.unwrap_err();
        assert_eq!(err, "API Error: 400 Bad Request");
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let transport = ScriptedTransport::new();
        let api = client(&transport);
        assert!(submit(&api, &PostForm::default(), SubmitMode::PublishNow).await.is_err());
        assert!(transport.requests().is_empty());
    }
}
