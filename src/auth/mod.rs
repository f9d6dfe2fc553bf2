//! Credential store for the access/refresh token pair
//!
//! The pair lives in memory and is mirrored into durable storage under the
//! `tokens` key as JSON. This is the only code that writes credentials.

use anyhow::{Context, Result};
use std::sync::{Mutex, PoisonError};

use crate::models::TokenPair;
use crate::storage::Storage;

/// Durable storage key holding the serialized token pair
pub const TOKENS_KEY: &str = "tokens";

/// Holds the current token pair, in memory and in durable storage
pub struct CredentialStore {
    storage: Box<dyn Storage>,
    current: Mutex<Option<TokenPair>>,
}

impl CredentialStore {
    /// Create a store backed by `storage`; nothing is read until first use
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            current: Mutex::new(None),
        }
    }

    /// Current pair, hydrating from durable storage when memory is empty
    ///
    /// Unreadable or malformed durable data counts as "no credentials".
    pub fn get(&self) -> Option<TokenPair> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current.is_some() {
            return current.clone();
        }

        let stored = match self.storage.get_item(TOKENS_KEY) {
            Ok(stored) => stored?,
            Err(e) => {
                tracing::warn!("Could not read stored tokens: {e:#}");
                return None;
            }
        };

        match serde_json::from_str::<TokenPair>(&stored) {
            Ok(pair) => {
                *current = Some(pair.clone());
                Some(pair)
            }
            Err(e) => {
                tracing::warn!("Could not parse stored tokens: {e}");
                None
            }
        }
    }

    /// Replace the pair in durable storage and memory
    ///
    /// Durable storage is written first; on failure memory is left as it was.
    pub fn set(&self, pair: &TokenPair) -> Result<()> {
        let json = serde_json::to_string(pair).context("Failed to serialize tokens")?;
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        self.storage
            .set_item(TOKENS_KEY, &json)
            .context("Failed to persist tokens")?;
        *current = Some(pair.clone());
        Ok(())
    }

    /// Remove the pair from memory and durable storage
    pub fn clear(&self) -> Result<()> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = None;
        self.storage
            .remove_item(TOKENS_KEY)
            .context("Failed to remove stored tokens")
    }

    /// Current bearer credential, if any
    pub fn access_token(&self) -> Option<String> {
        self.get()
            .map(|pair| pair.access)
            .filter(|access| !access.is_empty())
    }

    /// Whether a refresh credential is available
    pub fn has_refresh_token(&self) -> bool {
        self.get().is_some_and(|pair| !pair.refresh.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{EncryptedFileStorage, MemoryStorage};
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Storage wrapper shared with the test so durable state can be inspected
    struct Shared(Arc<MemoryStorage>);

    impl Storage for Shared {
        fn get_item(&self, key: &str) -> Result<Option<String>> {
            self.0.get_item(key)
        }
        fn set_item(&self, key: &str, value: &str) -> Result<()> {
            self.0.set_item(key, value)
        }
        fn remove_item(&self, key: &str) -> Result<()> {
            self.0.remove_item(key)
        }
    }

    /// Storage whose writes always fail
    struct ReadOnly;

    impl Storage for ReadOnly {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("disk full")
        }
        fn remove_item(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_set_then_get() {
        let store = CredentialStore::new(MemoryStorage::new());
        assert_eq!(store.get(), None);

        let pair = TokenPair::new("A1", "R1");
        store.set(&pair).unwrap();
        assert_eq!(store.get(), Some(pair));
        assert_eq!(store.access_token().as_deref(), Some("A1"));
        assert!(store.has_refresh_token());
    }

    #[test]
    fn test_empty_credentials_count_as_absent() {
        let store = CredentialStore::new(MemoryStorage::new());
        store.set(&TokenPair::new("", "")).unwrap();
        assert_eq!(store.access_token(), None);
        assert!(!store.has_refresh_token());
    }

    #[test]
    fn test_set_overwrites_without_merging() {
        let store = CredentialStore::new(MemoryStorage::new());
        store.set(&TokenPair::new("A1", "R1")).unwrap();
        store.set(&TokenPair::new("A2", "")).unwrap();
        assert_eq!(store.get(), Some(TokenPair::new("A2", "")));
        assert!(!store.has_refresh_token());
    }

    #[test]
    fn test_clear_removes_durable_entry() {
        let durable = Arc::new(MemoryStorage::new());
        let store = CredentialStore::new(Shared(Arc::clone(&durable)));

        store.set(&TokenPair::new("A1", "R1")).unwrap();
        assert!(durable.get_item(TOKENS_KEY).unwrap().is_some());

        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.get(), None);
        assert_eq!(durable.get_item(TOKENS_KEY).unwrap(), None);
    }

    #[test]
    fn test_hydrates_from_durable_storage() {
        let durable = Arc::new(MemoryStorage::new());
        durable
            .set_item(TOKENS_KEY, r#"{"access":"A9","refresh":"R9"}"#)
            .unwrap();

        let store = CredentialStore::new(Shared(durable));
        assert_eq!(store.get(), Some(TokenPair::new("A9", "R9")));
    }

    #[test]
    fn test_malformed_durable_data_is_absent() {
        let durable = Arc::new(MemoryStorage::new());
        durable.set_item(TOKENS_KEY, "{not json").unwrap();

        let store = CredentialStore::new(Shared(durable));
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_failed_durable_write_keeps_memory() {
        let store = CredentialStore::new(ReadOnly);
        assert!(store.set(&TokenPair::new("A1", "R1")).is_err());
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_survives_restart_with_file_storage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.enc");

        let store = CredentialStore::new(EncryptedFileStorage::with_key(&path, [3u8; 32]));
        store.set(&TokenPair::new("A1", "R1")).unwrap();
        drop(store);

        let reloaded = CredentialStore::new(EncryptedFileStorage::with_key(&path, [3u8; 32]));
        assert_eq!(reloaded.get(), Some(TokenPair::new("A1", "R1")));
    }
}
