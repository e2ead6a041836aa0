//! Configuration loader plus strongly typed settings structures.
//!
//! One TOML file covers the backend connection and the layout constants.
//! A missing file is not an error: defaults apply, and every field is
//! individually optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Minimum width of a packed column, in cells. The viewport width
    /// divided by this gives the column count.
    #[serde(default = "default_min_column_width")]
    pub min_column_width: u16,
    /// Vertical gap between surfaces in the same column, in rows.
    #[serde(default = "default_gap")]
    pub gap: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_column_width: default_min_column_width(),
            gap: default_gap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Start in fullscreen (packed) mode instead of the stacked flow.
    #[serde(default)]
    pub fullscreen: bool,
    /// Event poll timeout per frame, in milliseconds.
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            fullscreen: false,
            poll_ms: default_poll_ms(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8765
}

fn default_min_column_width() -> u16 {
    40
}

fn default_gap() -> u16 {
    1
}

fn default_poll_ms() -> u64 {
    16
}

impl Config {
    /// Load from an explicit path (must exist) or from the default
    /// location (missing file falls back to defaults).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let path = Self::config_dir()?.join("config.toml");
                if path.exists() {
                    Self::load_from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Data directory: `MOSAIC_DIR` env var, else `~/.mosaic`.
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("MOSAIC_DIR") {
            return Ok(PathBuf::from(dir));
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".mosaic"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.connection.host, "127.0.0.1");
        assert_eq!(config.connection.port, 8765);
        assert_eq!(config.layout.min_column_width, 40);
        assert_eq!(config.layout.gap, 1);
        assert!(!config.ui.fullscreen);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [connection]
            port = 9000

            [layout]
            min_column_width = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.connection.port, 9000);
        assert_eq!(config.connection.host, "127.0.0.1");
        assert_eq!(config.layout.min_column_width, 30);
        assert_eq!(config.layout.gap, 1);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.connection.port, 8765);
    }
}
