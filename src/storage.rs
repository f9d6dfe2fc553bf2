//! Durable key-value storage (encrypted file-based)
//!
//! Values are kept in a single JSON map encrypted with AES-256-GCM in
//! ~/.config/skedit/storage.enc. The encryption key is derived from
//! machine-specific identifiers.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use anyhow::{Context, Result};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::paths;

const NONCE_SIZE: usize = 12;

/// A durable key-value slot that survives process restarts
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Get machine ID for key derivation (cross-platform)
fn get_machine_id() -> String {
    // Linux: /etc/machine-id or /var/lib/dbus/machine-id
    #[cfg(target_os = "linux")]
    {
        if let Ok(id) = fs::read_to_string("/etc/machine-id") {
            return id.trim().to_string();
        }
        if let Ok(id) = fs::read_to_string("/var/lib/dbus/machine-id") {
            return id.trim().to_string();
        }
    }

    // macOS: IOPlatformUUID via ioreg
    #[cfg(target_os = "macos")]
    {
        if let Ok(output) = std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
        {
            let stdout = String::from_utf8_lossy(&output.stdout);
            for line in stdout.lines() {
                if line.contains("IOPlatformUUID") {
                    if let Some(uuid) = line.split('"').nth(3) {
                        return uuid.to_string();
                    }
                }
            }
        }
    }

    // Fallback: home directory path
    dirs::home_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "skedit-fallback-key".to_string())
}

/// Derive the encryption key from machine-specific data
fn derive_key() -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(get_machine_id().as_bytes());

    if let Some(home) = dirs::home_dir() {
        hasher.update(home.to_string_lossy().as_bytes());
    }

    // Fixed salt for this app
    hasher.update(b"skedit-durable-storage-v1");

    hasher.finalize().into()
}

/// Encrypted single-file storage
pub struct EncryptedFileStorage {
    path: PathBuf,
    key: [u8; 32],
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl EncryptedFileStorage {
    /// Open storage at the default location
    pub fn open() -> Result<Self> {
        Ok(Self::open_path(&paths::storage_path()?))
    }

    /// Open storage at a specific path with the machine-derived key
    pub fn open_path(path: &Path) -> Self {
        Self::with_key(path, derive_key())
    }

    /// Open storage at a specific path with an explicit key
    pub fn with_key(path: &Path, key: [u8; 32]) -> Self {
        Self {
            path: path.to_path_buf(),
            key,
            write_lock: Mutex::new(()),
        }
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key).map_err(|_| anyhow::anyhow!("Invalid key length"))
    }

    /// Load all entries from the encrypted file
    fn load(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let encrypted = fs::read(&self.path).context("Failed to read storage file")?;

        if encrypted.len() < NONCE_SIZE {
            return Ok(HashMap::new());
        }

        let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher()?
            .decrypt(nonce, ciphertext)
            .map_err(|_| anyhow::anyhow!("Failed to decrypt storage file"))?;

        let json = String::from_utf8(plaintext).context("Invalid UTF-8 in storage file")?;
        let entries: HashMap<String, String> = serde_json::from_str(&json)?;

        Ok(entries)
    }

    /// Save all entries to the encrypted file
    fn save(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create storage directory")?;
        }

        let json = serde_json::to_string(entries)?;

        let mut rng = rand::rng();
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rng.fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher()?
            .encrypt(nonce, json.as_bytes())
            .map_err(|_| anyhow::anyhow!("Failed to encrypt storage file"))?;

        let mut output = nonce_bytes.to_vec();
        output.extend(ciphertext);

        fs::write(&self.path, output).context("Failed to write storage file")?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }
}

impl Storage for EncryptedFileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // An unreadable file is replaced rather than blocking every write
        let mut entries = self.load().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load().unwrap_or_default();
        if entries.remove(key).is_none() && self.path.exists() {
            return Ok(());
        }
        self.save(&entries)
    }
}

/// In-memory storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
