//! Application settings consumed (never produced) by the core.
//!
//! The settings document is a small JSON key/value file naming the menu
//! document to auto-load, a log-verbosity mode, and a locale. Loading never
//! fails: a missing or corrupt file and any missing key fall back to
//! defaults, so the tool always starts in a usable state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Persisted user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Name of the menu document to auto-load on startup (no `.json` suffix).
    pub default_document: String,
    /// Log verbosity: one of `DEBUG`, `INFO`, `WARNING`, `ERROR`, `CRITICAL`.
    pub log_level: String,
    /// Locale selector, e.g. `en_us`.
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_document: "TempBar".to_string(),
            log_level: "ERROR".to_string(),
            language: "en_us".to_string(),
        }
    }
}

impl Settings {
    /// Maps the stored verbosity string onto a [`log::LevelFilter`] for the
    /// host to install. Unknown values fall back to `Error`.
    #[must_use]
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.log_level.to_ascii_uppercase().as_str() {
            "DEBUG" => log::LevelFilter::Debug,
            "INFO" => log::LevelFilter::Info,
            "WARNING" => log::LevelFilter::Warn,
            _ => log::LevelFilter::Error,
        }
    }
}

/// Loads settings from `path`; returns defaults if the file is missing or
/// corrupt. Keys absent from the file keep their default values.
#[must_use]
pub fn load_settings(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => Settings::default(),
    }
}

/// Saves settings to `path` as pretty-printed JSON, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns [`crate::MenubuilderError::Io`] if the directory or file cannot be
/// written.
pub fn save_settings(path: &Path, settings: &Settings) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(crate::core::error::FormatError::Json)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.default_document, "TempBar");
        assert_eq!(settings.log_level, "ERROR");
        assert_eq!(settings.language, "en_us");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = load_settings(Path::new("/nonexistent/settings.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"logLevel": "DEBUG"}"#).unwrap();

        let settings = load_settings(&path);
        assert_eq!(settings.log_level, "DEBUG");
        assert_eq!(settings.default_document, "TempBar");
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.default_document = "studio_menubar".to_string();
        save_settings(&path, &settings).unwrap();

        assert_eq!(load_settings(&path), settings);
    }

    #[test]
    fn test_log_level_filter_mapping() {
        let mut settings = Settings::default();
        assert_eq!(settings.log_level_filter(), log::LevelFilter::Error);
        settings.log_level = "warning".to_string();
        assert_eq!(settings.log_level_filter(), log::LevelFilter::Warn);
        settings.log_level = "CRITICAL".to_string();
        assert_eq!(settings.log_level_filter(), log::LevelFilter::Error);
        settings.log_level = "bogus".to_string();
        assert_eq!(settings.log_level_filter(), log::LevelFilter::Error);
    }
}
