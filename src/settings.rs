//! Client-local preferences
//!
//! Persisted one value per key in LocalStorage (an in-memory map natively).
//! Values are plain strings so older saves stay readable.

use std::collections::HashMap;

use thiserror::Error;

use crate::api::validate::is_valid_player_id;
use crate::theme::ThemeId;

pub const BEST_KEY: &str = "pigjump_best_v1";
pub const THEME_KEY: &str = "pigjump_theme_v1";
pub const RANDOM_THEME_KEY: &str = "pigjump_random_theme_v1";
pub const PLAYER_KEY: &str = "pigjump_player_id_v1";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Player id must be 2-20 letters, digits, spaces, _ or -")]
    InvalidPlayerId,
}

/// Minimal string key-value backend
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Volatile backend for native builds and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    values: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Browser LocalStorage backend (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// None when storage is disabled (private mode, sandboxed iframe)
    pub fn open() -> Option<Self> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|storage| Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(e) = self.storage.set_item(key, value) {
            log::warn!("Failed to save {}: {:?}", key, e);
        }
    }
}

/// Player preferences and local record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    /// Best floored score on this device
    pub best_score: u64,
    pub theme: ThemeId,
    /// Pick a different theme at every run start
    pub random_theme: bool,
    /// Empty until the player saves a valid id
    pub player_id: String,
}

impl Settings {
    /// Read every key, falling back to defaults for missing or garbled values
    pub fn load(kv: &dyn KeyValueStore) -> Self {
        let best_score = kv
            .get(BEST_KEY)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|v| v.floor() as u64)
            .unwrap_or(0);
        let theme = ThemeId::from_str_or_default(&kv.get(THEME_KEY).unwrap_or_default());
        let random_theme = kv.get(RANDOM_THEME_KEY).as_deref() == Some("1");
        let player_id = kv
            .get(PLAYER_KEY)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        log::info!(
            "Loaded settings: best {}, theme {}, random {}",
            best_score,
            theme.as_str(),
            random_theme
        );
        Self {
            best_score,
            theme,
            random_theme,
            player_id,
        }
    }

    /// Write all keys
    pub fn save(&self, kv: &mut dyn KeyValueStore) {
        kv.set(BEST_KEY, &self.best_score.to_string());
        kv.set(THEME_KEY, self.theme.as_str());
        kv.set(RANDOM_THEME_KEY, if self.random_theme { "1" } else { "0" });
        kv.set(PLAYER_KEY, &self.player_id);
    }

    /// Keep the higher of the stored and the new score. Returns true on a new record.
    pub fn record_best(&mut self, kv: &mut dyn KeyValueStore, score: u64) -> bool {
        if score <= self.best_score {
            return false;
        }
        self.best_score = score;
        kv.set(BEST_KEY, &score.to_string());
        true
    }

    pub fn set_theme(&mut self, kv: &mut dyn KeyValueStore, theme: ThemeId) {
        self.theme = theme;
        kv.set(THEME_KEY, theme.as_str());
    }

    pub fn set_random_theme(&mut self, kv: &mut dyn KeyValueStore, enabled: bool) {
        self.random_theme = enabled;
        kv.set(RANDOM_THEME_KEY, if enabled { "1" } else { "0" });
    }

    /// Trim and validate, then persist. The stored id is untouched on error.
    pub fn set_player_id(
        &mut self,
        kv: &mut dyn KeyValueStore,
        raw: &str,
    ) -> Result<&str, SettingsError> {
        let trimmed = raw.trim();
        if !is_valid_player_id(trimmed) {
            return Err(SettingsError::InvalidPlayerId);
        }
        if trimmed != self.player_id {
            self.player_id = trimmed.to_string();
            kv.set(PLAYER_KEY, &self.player_id);
        }
        Ok(&self.player_id)
    }

    /// A saved id that can be submitted to the leaderboard
    pub fn submittable_player_id(&self) -> Option<&str> {
        Some(self.player_id.as_str()).filter(|id| is_valid_player_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let kv = MemoryKv::new();
        let settings = Settings::load(&kv);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.theme, ThemeId::Farm);
        assert!(settings.submittable_player_id().is_none());
    }

    #[test]
    fn test_load_parses_stored_strings() {
        let mut kv = MemoryKv::new();
        kv.set(BEST_KEY, "321");
        kv.set(THEME_KEY, "space");
        kv.set(RANDOM_THEME_KEY, "1");
        kv.set(PLAYER_KEY, "  oink  ");
        let settings = Settings::load(&kv);
        assert_eq!(settings.best_score, 321);
        assert_eq!(settings.theme, ThemeId::Space);
        assert!(settings.random_theme);
        assert_eq!(settings.player_id, "oink");
    }

    #[test]
    fn test_garbled_values_fall_back() {
        let mut kv = MemoryKv::new();
        kv.set(BEST_KEY, "lots");
        kv.set(THEME_KEY, "volcano");
        kv.set(RANDOM_THEME_KEY, "yes");
        let settings = Settings::load(&kv);
        assert_eq!(settings.best_score, 0);
        assert_eq!(settings.theme, ThemeId::Farm);
        assert!(!settings.random_theme);
    }

    #[test]
    fn test_best_is_monotonic() {
        let mut kv = MemoryKv::new();
        let mut settings = Settings::default();
        assert!(settings.record_best(&mut kv, 100));
        assert!(!settings.record_best(&mut kv, 40));
        assert!(!settings.record_best(&mut kv, 100));
        assert_eq!(settings.best_score, 100);
        assert_eq!(kv.get(BEST_KEY).as_deref(), Some("100"));
    }

    #[test]
    fn test_player_id_validation() {
        let mut kv = MemoryKv::new();
        let mut settings = Settings::default();
        assert_eq!(settings.set_player_id(&mut kv, "  ab "), Ok("ab"));
        assert_eq!(kv.get(PLAYER_KEY).as_deref(), Some("ab"));
        assert_eq!(
            settings.set_player_id(&mut kv, "x"),
            Err(SettingsError::InvalidPlayerId)
        );
        assert_eq!(settings.player_id, "ab");
        assert_eq!(settings.submittable_player_id(), Some("ab"));
    }

    #[test]
    fn test_save_round_trip() {
        let mut kv = MemoryKv::new();
        let settings = Settings {
            best_score: 77,
            theme: ThemeId::Candy,
            random_theme: true,
            player_id: "piggy".into(),
        };
        settings.save(&mut kv);
        assert_eq!(Settings::load(&kv), settings);
    }
}
