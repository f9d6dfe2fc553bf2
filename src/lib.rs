//! # Skedit 📅
//!
//! A terminal client for a Reddit post-scheduling service.
//!
//! ## Overview
//!
//! Skedit signs you in to the scheduling backend, connects Reddit accounts,
//! and creates, schedules and publishes posts from your terminal. Every
//! backend call goes through one authenticated pipeline that attaches the
//! bearer token and renews it transparently when it expires.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       CLI / Views                           │
//! │   Auth flows, accounts, posts, composer (text rendering)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Session     │ │       API       │ │     Config      │
//! │                 │ │                 │ │                 │
//! │ • Unknown       │ │ • Bearer inject │ │ • Base URL      │
//! │ • Authenticated │ │ • 401 → refresh │ │ • Timeout       │
//! │ • Anonymous     │ │ • Error mapping │ │ • Theme         │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │
//!          └─────────┬─────────┘
//!                    ▼
//! ┌─────────────────┐ ┌─────────────────┐
//! │      Auth       │ │     Storage     │
//! │                 │ │                 │
//! │ • Token pair    │─►• Encrypted file │
//! │ • Write-through │ │ • In-memory     │
//! └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] — REST client and the authenticated request pipeline
//! - [`auth`] — Credential store for the access/refresh token pair
//! - [`config`] — Configuration management
//! - [`models`] — Data models (User, `RedditAccount`, Post)
//! - [`schedule`] — Human-friendly publish time parsing
//! - [`session`] — Session state machine
//! - [`storage`] — Durable key-value storage
//! - [`theme`] — Light/dark preference
//! - [`views`] — Text views behind the CLI commands
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use skedit::{ApiClient, Config, CredentialStore, Session};
//! use skedit::storage::EncryptedFileStorage;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let store = Arc::new(CredentialStore::new(EncryptedFileStorage::open()?));
//!     let mut session = Session::new(ApiClient::from_config(&config, store)?);
//!
//!     session.start().await;
//!     if let Some(user) = session.user() {
//!         println!("Signed in as {}", user.username);
//!     }
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/skedit/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::if_not_else)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::use_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::wrong_self_convention)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod paths;
pub mod schedule;
pub mod session;
pub mod storage;
pub mod theme;
pub mod views;

// Re-export main types for convenience
pub use api::{ApiClient, ApiError};
pub use auth::CredentialStore;
pub use config::Config;
pub use models::{NewPost, Post, PostBucket, PostStatus, RedditAccount, TokenPair, User};
pub use session::{Session, SessionState};
pub use theme::Theme;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
