use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::layout::Layout;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_group_column")]
    pub group_column_name: String,
    #[serde(default = "default_amount_column")]
    pub amount_column_name: String,
    /// `{column}` and `{value}` are replaced per report.
    #[serde(default = "default_header_text")]
    pub header_text: String,
    #[serde(default)]
    pub sheet: Option<String>,
    /// Parse and sum the amount column. Off means counts only.
    #[serde(default = "default_totals")]
    pub totals: bool,
    #[serde(flatten)]
    pub layout: Layout,
}

fn default_output_dir() -> String {
    "filtered_pdfs".to_string()
}

fn default_group_column() -> String {
    "Issuing bank".to_string()
}

fn default_amount_column() -> String {
    "Amount".to_string()
}

fn default_header_text() -> String {
    "{column}: {value}".to_string()
}

fn default_totals() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            group_column_name: default_group_column(),
            amount_column_name: default_amount_column(),
            header_text: default_header_text(),
            sheet: None,
            totals: default_totals(),
            layout: Layout::default(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tallysheet")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn parse_settings(content: &str, path: &Path) -> Result<Settings> {
    serde_json::from_str(content)
        .map_err(|e| ReportError::Settings(format!("{}: {e}", path.display())))
}

/// Load settings from `explicit` if given, otherwise from the default
/// settings file. A missing or broken default file falls back to defaults;
/// an explicit file must exist and parse.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReportError::Settings(format!("{}: {e}", path.display())))?;
        return parse_settings(&content, path);
    }

    let path = settings_path();
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    match parse_settings(&content, &path) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            log::warn!("{e}; using defaults");
            Ok(Settings::default())
        }
    }
}

pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ReportError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            group_column_name: "Merchant".to_string(),
            sheet: Some("March".to_string()),
            layout: Layout {
                row_height: 5.0,
                ..Layout::default()
            },
            ..Settings::default()
        };
        save_settings(&settings, &path).unwrap();
        let loaded = load_settings(Some(&path)).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.output_dir, "filtered_pdfs");
        assert_eq!(s.amount_column_name, "Amount");
        assert!(s.totals);
        assert_eq!(s.layout, Layout::default());
    }

    #[test]
    fn test_partial_json_merges_with_defaults() {
        let json = r#"{"group_column_name": "Card", "column_width": 30.0, "rows_per_page": 10}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.group_column_name, "Card");
        assert_eq!(s.amount_column_name, "Amount");
        assert_eq!(s.layout.column_width, 30.0);
        assert_eq!(s.layout.rows_per_page, Some(10));
        assert_eq!(s.layout.row_height, Layout::default().row_height);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, ReportError::Settings(_)));
    }

    #[test]
    fn test_explicit_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_settings(Some(&path)).unwrap_err(),
            ReportError::Settings(_)
        ));
    }
}
