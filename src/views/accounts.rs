//! Connected Reddit accounts

use std::fmt::Write;

use tracing::warn;

use crate::api::{ApiClient, Transport};
use crate::models::RedditAccount;

const FETCH_FAILED: &str = "Failed to fetch Reddit accounts.";
const DISCONNECT_FAILED: &str = "Failed to disconnect account.";

/// Render the account list, or the empty state
pub fn render_accounts(accounts: &[RedditAccount]) -> String {
    if accounts.is_empty() {
        return "No accounts connected\n\
                Connect a Reddit account to start managing your posts.\n\
                Run: skedit connect\n"
            .to_string();
    }

    let mut out = format!("Connected accounts ({})\n", accounts.len());
    for account in accounts {
        let _ = writeln!(
            out,
            "  {:<24} id: {:<12} connected {}",
            account.handle(),
            account.id,
            account.created_at.format("%Y-%m-%d")
        );
        let _ = writeln!(out, "  {:<24} {}", "", account.avatar());
    }
    out
}

/// Fetch and render the accounts view
pub async fn show<T: Transport>(client: &ApiClient<T>) -> Result<String, String> {
    match client.reddit_accounts().await {
        Ok(accounts) => Ok(render_accounts(&accounts)),
        Err(e) if e.is_session_expired() => Err(e.message()),
        Err(e) => {
            warn!("Failed to fetch Reddit accounts: {}", e);
            Err(FETCH_FAILED.to_string())
        }
    }
}

/// Disconnect an account, then show the refreshed list
pub async fn disconnect<T: Transport>(client: &ApiClient<T>, id: &str) -> Result<String, String> {
    if let Err(e) = client.disconnect_reddit_account(id).await {
        if e.is_session_expired() {
            return Err(e.message());
        }
        warn!(id, "Failed to disconnect account: {}", e);
        return Err(DISCONNECT_FAILED.to_string());
    }
    show(client).await
}
