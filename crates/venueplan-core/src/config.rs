//! Editor configuration.

use crate::clipboard::DEFAULT_PASTE_OFFSET;
use crate::geometry::{DEFAULT_MAX_FONT_SIZE, DEFAULT_MIN_FONT_SIZE, FontRange};
use crate::scene::PageSize;
use crate::selection::DEFAULT_SELECTION_PADDING;
use crate::snap::GridConfig;
use crate::transform::{DEFAULT_FREE_RESIZE_EPSILON, ResizeOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for an [`Editor`](crate::Editor). Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub grid: GridConfig,
    pub selection_padding: f64,
    pub paste_offset: f64,
    pub min_font_size: f64,
    pub max_font_size: f64,
    pub page_size: PageSize,
    pub free_resize_epsilon: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            selection_padding: DEFAULT_SELECTION_PADDING,
            paste_offset: DEFAULT_PASTE_OFFSET,
            min_font_size: DEFAULT_MIN_FONT_SIZE,
            max_font_size: DEFAULT_MAX_FONT_SIZE,
            page_size: PageSize::default(),
            free_resize_epsilon: DEFAULT_FREE_RESIZE_EPSILON,
        }
    }
}

impl EditorConfig {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.page_size = config.page_size.clamped();
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    pub fn font_range(&self) -> FontRange {
        let min = self.min_font_size.min(self.max_font_size);
        FontRange {
            min,
            max: self.max_font_size.max(min),
        }
    }

    pub fn resize_options(&self) -> ResizeOptions {
        ResizeOptions {
            font_range: self.font_range(),
            free_resize_epsilon: self.free_resize_epsilon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.grid.step_x, 20.0);
        assert_eq!(config.grid.step_y, 15.0);
        assert_eq!(config.grid.threshold, 10.0);
        assert!(config.grid.enabled);
        assert_eq!(config.selection_padding, 10.0);
        assert_eq!(config.paste_offset, 20.0);
        assert_eq!(config.page_size, PageSize::new(1200.0, 800.0));
        assert_eq!(config.font_range(), FontRange { min: 8.0, max: 72.0 });
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = EditorConfig::from_json(r#"{"grid": {"enabled": false}, "pasteOffset": 5}"#).unwrap();
        assert!(!config.grid.enabled);
        assert_eq!(config.grid.step_x, 20.0);
        assert_eq!(config.paste_offset, 5.0);
        assert_eq!(config.selection_padding, 10.0);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let config = EditorConfig::from_json(r#"{"pageSize": {"width": 10, "height": 9000}}"#).unwrap();
        assert_eq!(config.page_size, PageSize::new(200.0, 3000.0));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(EditorConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"selectionPadding": 4}}"#).unwrap();
        let config = EditorConfig::load(file.path()).unwrap();
        assert_eq!(config.selection_padding, 4.0);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = EditorConfig::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
