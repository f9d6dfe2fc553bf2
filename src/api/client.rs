//! Authenticated request pipeline for the scheduling backend.
//!
//! Every call carries `Content-Type: application/json` and, when a token pair
//! is stored, `Authorization: Bearer <access>`. A 401 with a refresh token
//! available triggers exactly one refresh and one retry; if the retry fails
//! in any way the session is terminated.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::auth::CredentialStore;
use crate::config::Config;
use crate::models::TokenPair;

use super::ApiError;
use super::transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};

/// Token renewal endpoint
pub const REFRESH_ENDPOINT: &str = "/api/token/refresh/";

/// Called after the pipeline terminates an expired session
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    // Only present when the backend rotates refresh tokens
    #[serde(default)]
    refresh: Option<String>,
}

struct Inner<T> {
    base_url: String,
    transport: T,
    store: Arc<CredentialStore>,
    // Held while a refresh is in flight so concurrent 401s share its outcome
    refresh_lock: tokio::sync::Mutex<()>,
    on_session_expired: Mutex<Option<SessionExpiredHook>>,
}

/// API client for the scheduling backend.
/// Clone is cheap and clones share the credential store and refresh guard.
pub struct ApiClient<T = ReqwestTransport> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ApiClient<ReqwestTransport> {
    /// Create a client for the configured backend
    pub fn from_config(config: &Config, store: Arc<CredentialStore>) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::with_transport(&config.api_base_url, transport, store))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Create a client over an explicit transport
    pub fn with_transport(base_url: &str, transport: T, store: Arc<CredentialStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                base_url: base_url.trim_end_matches('/').to_string(),
                transport,
                store,
                refresh_lock: tokio::sync::Mutex::new(()),
                on_session_expired: Mutex::new(None),
            }),
        }
    }

    /// Register the callback run when a session expires
    pub fn set_session_expired_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        let mut slot = self
            .inner
            .on_session_expired
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(hook));
    }

    /// The shared credential store
    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.inner.store
    }

    /// Backend base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Build an absolute URL for an endpoint path
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.inner.base_url, endpoint)
    }

    /// GET `endpoint` and parse the JSON response
    pub async fn get<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, ApiError> {
        self.request::<(), R>(Method::Get, endpoint, None).await
    }

    /// POST a JSON body to `endpoint`
    pub async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::Post, endpoint, Some(body)).await
    }

    /// POST to `endpoint` without a body
    pub async fn post_empty<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, ApiError> {
        self.request::<(), R>(Method::Post, endpoint, None).await
    }

    /// PUT a JSON body to `endpoint`
    pub async fn put<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::Put, endpoint, Some(body)).await
    }

    /// DELETE `endpoint`
    pub async fn delete<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, ApiError> {
        self.request::<(), R>(Method::Delete, endpoint, None).await
    }

    /// Issue an authenticated request and parse the response as `R`.
    ///
    /// A 204 is parsed as an empty JSON object, so `R` should accept `{}`.
    pub async fn request<B, R>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let sent_access = self.store().access_token();
        let mut response = self
            .send(method, endpoint, body.clone(), sent_access.as_deref())
            .await?;

        if response.status == 401 && self.store().has_refresh_token() {
            debug!(%method, endpoint, "Unauthorized, refreshing token");

            let pair = match self.refresh_after_unauthorized(sent_access.as_deref()).await {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("Token refresh failed: {}", e);
                    return Err(self.expire_session());
                }
            };

            response = match self.send(method, endpoint, body, Some(&pair.access)).await {
                Ok(response) if response.is_success() => response,
                Ok(response) => {
                    warn!(%method, endpoint, status = response.status, "Retry after refresh failed");
                    return Err(self.expire_session());
                }
                Err(e) => {
                    warn!(%method, endpoint, "Retry after refresh failed: {}", e);
                    return Err(self.expire_session());
                }
            };
        }

        Self::parse_response(response)
    }

    /// Exchange the stored refresh token for a new pair.
    ///
    /// This is a plain POST and never goes through the 401 retry path.
    pub async fn refresh(&self) -> Result<TokenPair, ApiError> {
        let current = self
            .store()
            .get()
            .filter(|pair| !pair.refresh.is_empty())
            .ok_or(ApiError::NoRefreshToken)?;

        let body = serde_json::to_string(&RefreshRequest {
            refresh: &current.refresh,
        })
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let response = self
            .send(Method::Post, REFRESH_ENDPOINT, Some(body), None)
            .await?;

        if !response.is_success() {
            self.clear_store();
            return Err(ApiError::RefreshFailed {
                status: response.status,
            });
        }

        let refreshed: RefreshResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::InvalidResponse(format!("refresh response: {e}")))?;

        let pair = TokenPair {
            access: refreshed.access,
            refresh: refreshed.refresh.unwrap_or(current.refresh),
        };
        self.store()
            .set(&pair)
            .map_err(|e| ApiError::Storage(format!("{e:#}")))?;

        info!("Access token refreshed");
        Ok(pair)
    }

    /// Refresh unless another request already replaced the token we sent
    async fn refresh_after_unauthorized(
        &self,
        sent_access: Option<&str>,
    ) -> Result<TokenPair, ApiError> {
        let _guard = self.inner.refresh_lock.lock().await;

        if let Some(current) = self.store().get()
            && sent_access.unwrap_or_default() != current.access
        {
            debug!("Token was refreshed by a concurrent request");
            return Ok(current);
        }

        self.refresh().await
    }

    /// Send one request with the given bearer, without any retry logic
    pub(crate) async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<String>,
        access: Option<&str>,
    ) -> Result<HttpResponse, ApiError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(access) = access.filter(|a| !a.is_empty()) {
            headers.push(("Authorization".to_string(), format!("Bearer {}", access)));
        }

        let request = HttpRequest {
            method,
            url: self.url(endpoint),
            headers,
            body,
        };

        debug!(%method, url = %request.url, "Sending request");

        let response = self
            .inner
            .transport
            .send(request)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        debug!(status = response.status, "Received response");
        Ok(response)
    }

    fn parse_response<R: DeserializeOwned>(response: HttpResponse) -> Result<R, ApiError> {
        if !response.is_success() {
            return Err(ApiError::from_response(
                response.status,
                &response.status_text,
                &response.body,
            ));
        }

        if response.status == 204 {
            return serde_json::from_value(Value::Object(Map::new()))
                .map_err(|e| ApiError::InvalidResponse(e.to_string()));
        }

        serde_json::from_str(&response.body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Clear credentials, notify the hook, and produce the expiry error
    fn expire_session(&self) -> ApiError {
        self.clear_store();

        let hook = self
            .inner
            .on_session_expired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(hook) = hook {
            hook();
        }

        ApiError::SessionExpired
    }

    fn clear_store(&self) {
        if let Err(e) = self.store().clear() {
            warn!("Failed to clear stored tokens: {:#}", e);
        }
    }
}
