use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const PREFERENCES_FILE: &str = "preferences.json";

/// Storage key of the theme preference.
pub const THEME_STORAGE_KEY: &str = "dashboard-chat-theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Flat string key/value preferences persisted as one JSON object.
pub struct PreferenceStore {
    path: PathBuf,
    io_lock: Mutex<()>,
}

impl PreferenceStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(PREFERENCES_FILE),
            io_lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(err) => {
                log::warn!("Ignoring corrupt preferences file {}: {}", self.path.display(), err);
                BTreeMap::new()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let _guard = self.io_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read_all().remove(key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let _guard = self.io_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut all = self.read_all();
        all.insert(key.to_string(), value.to_string());

        let serialized =
            serde_json::to_string_pretty(&all).map_err(|e| format!("Failed to encode preferences: {e}"))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("Failed to create data directory: {e}"))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized).map_err(|e| format!("Failed to write preferences: {e}"))?;
        if self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }
        fs::rename(&tmp_path, &self.path).map_err(|e| format!("Failed to save preferences: {e}"))
    }

    pub fn theme(&self) -> Theme {
        self.get(THEME_STORAGE_KEY)
            .and_then(|v| Theme::parse(&v))
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), String> {
        self.set(THEME_STORAGE_KEY, theme.as_str())
    }
}
