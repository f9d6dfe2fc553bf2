//! Post endpoints (create, list, edit, publish, schedule)

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{NewPost, Post, PostBucket, PostUpdate};

use super::transport::Transport;
use super::{ApiClient, ApiError, Empty};

const CREATE_ENDPOINT: &str = "/api/posts/create/";

/// Body of `POST /api/posts/{id}/schedule/`
#[derive(Debug, Clone, Serialize)]
struct ScheduleRequest {
    scheduled_at: DateTime<Utc>,
}

fn post_endpoint(id: &str, action: Option<&str>) -> String {
    let id = urlencoding::encode(id);
    match action {
        Some(action) => format!("/api/posts/{}/{}/", id, action),
        None => format!("/api/posts/{}/", id),
    }
}

impl<T: Transport> ApiClient<T> {
    /// List posts in a bucket
    pub async fn posts(&self, bucket: PostBucket) -> Result<Vec<Post>, ApiError> {
        self.get(bucket.path()).await
    }

    /// Create a post; it is scheduled when `scheduled_at` is set
    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        self.post(CREATE_ENDPOINT, post).await
    }

    /// Update fields of an existing post
    pub async fn update_post(&self, id: &str, update: &PostUpdate) -> Result<Post, ApiError> {
        self.put(&post_endpoint(id, None), update).await
    }

    /// Delete a post
    pub async fn delete_post(&self, id: &str) -> Result<Empty, ApiError> {
        self.delete(&post_endpoint(id, None)).await
    }

    /// Publish a post right away
    pub async fn publish_post(&self, id: &str) -> Result<Post, ApiError> {
        self.post_empty(&post_endpoint(id, Some("publish"))).await
    }

    /// Schedule (or reschedule) a post
    pub async fn schedule_post(&self, id: &str, at: DateTime<Utc>) -> Result<Post, ApiError> {
        let request = ScheduleRequest { scheduled_at: at };
        self.post(&post_endpoint(id, Some("schedule")), &request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::api::testing::{ScriptedTransport, client, post_json};
    use crate::models::PostStatus;
    use chrono::TimeZone;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_list_buckets() {
        let transport = ScriptedTransport::new();
        transport
            .respond(200, "[]")
            .respond(200, &format!("[{}]", post_json("1", "A", "scheduled")))
            .respond(200, &format!("[{}]", post_json("2", "B", "published")));
        let api = client(&transport);

        assert!(api.posts(PostBucket::All).await.unwrap().is_empty());
        let scheduled = api.posts(PostBucket::Scheduled).await.unwrap();
        assert_eq!(scheduled[0].status, PostStatus::Scheduled);
        let published = api.posts(PostBucket::Published).await.unwrap();
        assert_eq!(published[0].status, PostStatus::Published);

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://api.test/api/posts/",
                "http://api.test/api/posts/scheduled/",
                "http://api.test/api/posts/posted/",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_update_publish_schedule_delete() {
        let transport = ScriptedTransport::new();
        transport
            .respond(201, &post_json("5", "Hello", "draft"))
            .respond(200, &post_json("5", "Hello again", "draft"))
            .respond(200, &post_json("5", "Hello again", "published"))
            .respond(200, &post_json("5", "Hello again", "scheduled"))
            .respond(204, "");
        let api = client(&transport);

        let created = api
            .create_post(&NewPost {
                title: "Hello".to_string(),
                content: "Body".to_string(),
                subreddit: "rust".to_string(),
                reddit_account: "acc-1".to_string(),
                scheduled_at: None,
            })
            .await
            .unwrap();
        assert_eq!(created.id, "5");

        let update = PostUpdate {
            title: Some("Hello again".to_string()),
            ..PostUpdate::default()
        };
        api.update_post("5", &update).await.unwrap();

        let published = api.publish_post("5").await.unwrap();
        assert_eq!(published.status, PostStatus::Published);

        let at = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();
        api.schedule_post("5", at).await.unwrap();
        api.delete_post("5").await.unwrap();

        let sent = transport.requests();
        let calls: Vec<(Method, &str)> = sent
            .iter()
            .map(|r| (r.method, r.url.trim_start_matches("http://api.test")))
            .collect();
        assert_eq!(
            calls,
            vec![
                (Method::Post, "/api/posts/create/"),
                (Method::Put, "/api/posts/5/"),
                (Method::Post, "/api/posts/5/publish/"),
                (Method::Post, "/api/posts/5/schedule/"),
                (Method::Delete, "/api/posts/5/"),
            ]
        );

        let create_body: Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert!(create_body["scheduled_at"].is_null());
        assert_eq!(sent[1].body.as_deref(), Some(r#"{"title":"Hello again"}"#));
        assert_eq!(sent[2].body, None);

        let schedule_body: Value = serde_json::from_str(sent[3].body.as_deref().unwrap()).unwrap();
        assert_eq!(schedule_body, json!({"scheduled_at": "2030-01-01T09:00:00Z"}));
    }
}
