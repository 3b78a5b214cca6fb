use std::collections::BTreeMap;

use crate::upload::DOCX_MIME_TYPE;

/// Settings injected into [`crate::AppState`] at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub page_size: u32,
    pub allowed_upload_types: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            allowed_upload_types: vec![DOCX_MIME_TYPE.to_string()],
        }
    }
}

/// String key-value storage for user preferences.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Stored and displayed name.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

const THEME_KEY: &str = "theme";
const VIEW_MODE_KEY: &str = "view_mode";

/// Typed view over the preference keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub theme: Theme,
    pub view_mode: ViewMode,
}

impl Preferences {
    /// Unknown or missing values fall back to defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let theme = match store.get(THEME_KEY) {
            Some(value) if value == Theme::Dark.as_str() => Theme::Dark,
            _ => Theme::Light,
        };
        let view_mode = match store.get(VIEW_MODE_KEY) {
            Some(value) if value == ViewMode::List.as_str() => ViewMode::List,
            _ => ViewMode::Grid,
        };
        Self { theme, view_mode }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        store.set(THEME_KEY, self.theme.as_str());
        store.set(VIEW_MODE_KEY, self.view_mode.as_str());
    }
}
