use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, VpError};
use crate::importer::DecodeOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Zero-based row of the column headers.
    #[serde(default = "default_header_row")]
    pub header_row: usize,
    /// Zero-based physical position of the unit-count column.
    #[serde(default = "default_unit_column")]
    pub unit_column: usize,
    #[serde(default = "default_target_years")]
    pub target_years: Vec<i32>,
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: char,
}

fn default_sheet_name() -> String {
    "Forecast".to_string()
}

fn default_header_row() -> usize {
    2
}

fn default_unit_column() -> usize {
    9
}

fn default_target_years() -> Vec<i32> {
    vec![2026, 2027]
}

fn default_csv_delimiter() -> char {
    ','
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            header_row: default_header_row(),
            unit_column: default_unit_column(),
            target_years: default_target_years(),
            csv_delimiter: default_csv_delimiter(),
        }
    }
}

impl Settings {
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            sheet: self.sheet_name.clone(),
            header_row: self.header_row,
            delimiter: delimiter_byte(self.csv_delimiter),
        }
    }
}

/// CSV delimiters are single bytes; anything outside ASCII falls back to a comma.
pub fn delimiter_byte(c: char) -> u8 {
    if c.is_ascii() {
        c as u8
    } else {
        b','
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("vpup")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Read settings from `path`. A missing file gives the defaults; an unreadable or
/// malformed one is logged and also gives the defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read settings, using defaults");
            return Settings::default();
        }
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "invalid settings, using defaults");
        Settings::default()
    })
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path(), settings)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| VpError::Settings(format!("{}: {e}", dir.display())))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, format!("{json}\n"))
        .map_err(|e| VpError::Settings(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), "saved settings");
    Ok(())
}
