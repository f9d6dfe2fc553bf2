//! Post lists and per-post actions

use std::fmt::Write;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::api::{ApiClient, ApiError, Transport};
use crate::models::{Post, PostBucket, PostStatus, PostUpdate};

/// Characters of content shown in a list entry
const EXCERPT_CHARS: usize = 150;
const WRAP_WIDTH: usize = 76;

/// First 150 characters of the content, always followed by "..."
pub fn excerpt(content: &str) -> String {
    let head: String = content.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", head)
}

fn empty_state(bucket: PostBucket) -> String {
    match bucket {
        PostBucket::All => "No posts\nYou haven't created any posts yet.\n".to_string(),
        other => format!(
            "No {0} posts\nYou haven't {0} any posts yet.\n",
            other.as_str()
        ),
    }
}

/// Render one list entry
pub fn render_post(post: &Post) -> String {
    let mut out = format!("{} {}  [{}]\n", post.status.emoji(), post.title, post.id);
    let _ = writeln!(out, "   Subreddit: r/{}", post.subreddit);

    let options = textwrap::Options::new(WRAP_WIDTH)
        .initial_indent("   ")
        .subsequent_indent("   ");
    for line in textwrap::wrap(&excerpt(&post.content), options) {
        let _ = writeln!(out, "{}", line);
    }

    let _ = write!(
        out,
        "   Account: {}   Status: {}",
        post.reddit_account.reddit_username, post.status
    );
    match post.status {
        PostStatus::Scheduled => {
            if let (Some(at), Some(until)) = (post.scheduled_time_display(), post.time_until()) {
                let _ = write!(out, "   {} (in {})", at, until);
            }
        }
        PostStatus::Published => {
            if let Some(at) = post.published_at {
                let _ = write!(out, "   {}", at.format("%Y-%m-%d %H:%M UTC"));
            }
        }
        _ => {}
    }
    out.push('\n');
    out
}

/// Render a bucket of posts, or its empty state
pub fn render_posts(bucket: PostBucket, posts: &[Post]) -> String {
    if posts.is_empty() {
        return empty_state(bucket);
    }

    let mut out = format!("Your posts: {} ({})\n\n", bucket.as_str(), posts.len());
    for post in posts {
        out.push_str(&render_post(post));
        out.push('\n');
    }
    out
}

/// Fetch and render a bucket
pub async fn show<T: Transport>(client: &ApiClient<T>, bucket: PostBucket) -> Result<String, String> {
    match client.posts(bucket).await {
        Ok(posts) => Ok(render_posts(bucket, &posts)),
        Err(e) if e.is_session_expired() => Err(e.message()),
        Err(e) => {
            warn!(bucket = bucket.as_str(), "Failed to fetch posts: {}", e);
            Err(format!("Failed to fetch {} posts.", bucket.as_str()))
        }
    }
}

fn action_error(e: &ApiError) -> String {
    e.detail().map_or_else(|| e.message(), str::to_string)
}

/// Publish a post right away
pub async fn publish<T: Transport>(client: &ApiClient<T>, id: &str) -> Result<String, String> {
    let post = client.publish_post(id).await.map_err(|e| action_error(&e))?;
    Ok(format!("Published \"{}\" to r/{}", post.title, post.subreddit))
}

/// Move a post to a new publish time
pub async fn reschedule<T: Transport>(
    client: &ApiClient<T>,
    id: &str,
    at: DateTime<Utc>,
) -> Result<String, String> {
    let post = client
        .schedule_post(id, at)
        .await
        .map_err(|e| action_error(&e))?;
    let when = post
        .scheduled_time_display()
        .unwrap_or_else(|| at.format("%Y-%m-%d %H:%M UTC").to_string());
    Ok(format!("Scheduled \"{}\" for {}", post.title, when))
}

/// Edit a post; an empty update is rejected without a request
pub async fn update<T: Transport>(
    client: &ApiClient<T>,
    id: &str,
    update: &PostUpdate,
) -> Result<String, String> {
    if update.is_empty() {
        return Err("Nothing to update. Pass --title, --content, --subreddit or --account.".to_string());
    }
    let post = client
        .update_post(id, update)
        .await
        .map_err(|e| action_error(&e))?;
    Ok(format!("Updated post {}\n\n{}", post.id, render_post(&post)))
}

/// Delete a post
pub async fn delete<T: Transport>(client: &ApiClient<T>, id: &str) -> Result<String, String> {
    client.delete_post(id).await.map_err(|e| action_error(&e))?;
    Ok(format!("Deleted post {}", id))
}
