//! Connected Reddit account endpoints

use crate::models::RedditAccount;

use super::transport::Transport;
use super::{ApiClient, ApiError, Empty};

const ACCOUNTS_ENDPOINT: &str = "/api/reddit/accounts/";
const CONNECT_ENDPOINT: &str = "/api/reddit/connect/";

impl<T: Transport> ApiClient<T> {
    /// List the Reddit accounts linked to the user
    pub async fn reddit_accounts(&self) -> Result<Vec<RedditAccount>, ApiError> {
        self.get(ACCOUNTS_ENDPOINT).await
    }

    /// Browser entry point of the Reddit OAuth flow
    pub fn reddit_connect_url(&self) -> String {
        self.url(CONNECT_ENDPOINT)
    }

    /// Unlink a Reddit account
    pub async fn disconnect_reddit_account(&self, id: &str) -> Result<Empty, ApiError> {
        let endpoint = format!("/api/reddit/disconnect/{}/", urlencoding::encode(id));
        self.delete(&endpoint).await
    }
}
