//! Light/dark theme preference.
//!
//! Stored in durable storage under the `theme` key, next to the tokens but
//! independent of them (logging out keeps the theme).

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::storage::Storage;

/// Durable storage key holding the theme name
pub const THEME_KEY: &str = "theme";

/// UI theme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme (default)
    #[default]
    Light,
    /// Dark theme
    Dark,
}

impl Theme {
    /// Get the theme name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a theme name
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// The other theme
    #[must_use]
    pub const fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Get the emoji icon
    #[must_use]
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Light => "☀️",
            Self::Dark => "🌙",
        }
    }

    /// Load the stored preference; anything unreadable falls back to light
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get_item(THEME_KEY) {
            Ok(Some(value)) => Self::from_str(&value).unwrap_or_else(|| {
                tracing::warn!("Unknown stored theme '{}', using light", value);
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("Could not read theme preference: {e:#}");
                Self::default()
            }
        }
    }

    /// Persist this preference
    pub fn save(self, storage: &dyn Storage) -> Result<()> {
        storage.set_item(THEME_KEY, self.as_str())
    }

    /// Flip the stored preference and return the new theme
    pub fn toggle(storage: &dyn Storage) -> Result<Self> {
        let next = Self::load(storage).toggled();
        next.save(storage)?;
        Ok(next)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_default_is_light() {
        let storage = MemoryStorage::new();
        assert_eq!(Theme::load(&storage), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let storage = MemoryStorage::new();
        assert_eq!(Theme::toggle(&storage).unwrap(), Theme::Dark);
        assert_eq!(storage.get_item(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(Theme::toggle(&storage).unwrap(), Theme::Light);
        assert_eq!(Theme::load(&storage), Theme::Light);
    }

    #[test]
    fn test_unknown_value_falls_back() {
        let storage = MemoryStorage::new();
        storage.set_item(THEME_KEY, "solarized").unwrap();
        assert_eq!(Theme::load(&storage), Theme::Light);
        assert_eq!(Theme::from_str(" Dark "), Some(Theme::Dark));
    }
}
