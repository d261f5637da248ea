//! Settings Store
//!
//! Key/value persistence for the auth token, the theme preference and the
//! API URL override. The browser build backs this with `localStorage`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const TOKEN_KEY: &str = "token";
pub const THEME_KEY: &str = "theme";
pub const API_URL_KEY: &str = "apiUrl";

pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);

    fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|t| !t.trim().is_empty())
    }

    /// Unknown stored values fall back to the default theme
    fn theme(&self) -> Theme {
        self.get(THEME_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    fn set_theme(&self, theme: Theme) {
        self.set(THEME_KEY, &theme.to_string());
    }

    fn api_url(&self) -> Option<String> {
        self.get(API_URL_KEY).filter(|u| !u.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

/// In-process store for tests and non-browser hosts
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RefCell<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_roundtrip_and_fallback() {
        let store = MemorySettings::new();
        assert_eq!(store.theme(), Theme::Dark);
        store.set_theme(Theme::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(store.theme(), Theme::Light);
        store.set(THEME_KEY, "sepia");
        assert_eq!(store.theme(), Theme::Dark);
    }

    #[test]
    fn test_blank_values_are_absent() {
        let store = MemorySettings::new();
        store.set(TOKEN_KEY, "  ");
        assert_eq!(store.token(), None);
        store.set(TOKEN_KEY, "abc");
        assert_eq!(store.token().as_deref(), Some("abc"));
        store.remove(TOKEN_KEY);
        assert_eq!(store.token(), None);
        assert_eq!(store.api_url(), None);
    }
}
