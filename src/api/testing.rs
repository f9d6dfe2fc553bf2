//! Scripted transport and fixtures shared by the unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use super::ApiClient;
use crate::auth::CredentialStore;
use crate::storage::MemoryStorage;

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

/// Transport that answers from a queue or a routing closure and records
/// every request it receives
pub struct ScriptedTransport {
    queue: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    handler: Option<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Answer requests in order from a queue
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(VecDeque::new()),
            handler: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answer every request with `handler`
    pub fn with_handler(
        handler: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(VecDeque::new()),
            handler: Some(Box::new(handler)),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Queue a response
    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.queue.lock().unwrap().push_back(Ok(response(status, body)));
        self
    }

    /// Queue a transport failure
    pub fn fail(&self, message: &str) -> &Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(Err(TransportError(message.to_string())));
        self
    }

    /// Every request sent so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose URL ends with `path`
    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.ends_with(path))
            .collect()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let answer = {
            self.requests.lock().unwrap().push(request.clone());
            match &self.handler {
                Some(handler) => handler(&request),
                None => self
                    .queue
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| Err(TransportError("no scripted response".to_string()))),
            }
        };
        // Let other in-flight requests interleave, like a real network would
        tokio::task::yield_now().await;
        answer
    }
}

/// Build a response with the canonical reason phrase
pub fn response(status: u16, body: &str) -> HttpResponse {
    let status_text = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
        .to_string();
    HttpResponse {
        status,
        status_text,
        body: body.to_string(),
    }
}

/// Client against `http://api.test` with empty in-memory storage
pub fn client(transport: &Arc<ScriptedTransport>) -> ApiClient<Arc<ScriptedTransport>> {
    let store = Arc::new(CredentialStore::new(MemoryStorage::new()));
    ApiClient::with_transport("http://api.test", Arc::clone(transport), store)
}

pub const USER_JSON: &str = r#"{"id": 1, "email": "a@b.com", "username": "alice"}"#;

pub const ACCOUNT_JSON: &str = r#"{
    "id": "acc-1",
    "reddit_username": "ferris",
    "avatar_url": "",
    "created_at": "2026-02-03T04:05:06Z"
}"#;

/// A post JSON object with the given id, title and status
pub fn post_json(id: &str, title: &str, status: &str) -> String {
    format!(
        r#"{{
            "id": "{id}",
            "title": "{title}",
            "content": "Body of {title}",
            "subreddit": "rust",
            "status": "{status}",
            "scheduled_at": "2030-01-01T09:00:00Z",
            "published_at": null,
            "reddit_account": {ACCOUNT_JSON}
        }}"#
    )
}
