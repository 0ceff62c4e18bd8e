//! User settings from `config.toml`.
//!
//! ```toml
//! [storage]
//! root = "/home/me/CanvasNotes"
//!
//! [canvas]
//! text_width = 320.0
//! text_height = 180.0
//! ```

use std::path::{Path, PathBuf};

use directories::{ProjectDirs, UserDirs};
use serde::Deserialize;

use crate::model::{DEFAULT_TEXT_HEIGHT, DEFAULT_TEXT_WIDTH, MIN_TEXT_HEIGHT, MIN_TEXT_WIDTH};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    pub storage: Option<StorageConfig>,
    pub canvas: Option<CanvasConfig>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct StorageConfig {
    pub root: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct CanvasConfig {
    pub text_width: Option<f32>,
    pub text_height: Option<f32>,
}

impl Config {
    /// Notebook root directory: configured, else `~/CanvasNotes`.
    pub fn notebooks_root(&self) -> PathBuf {
        self.storage
            .as_ref()
            .and_then(|s| s.root.clone())
            .unwrap_or_else(default_notebooks_root)
    }

    /// Size of newly created text boxes, never below the minimum size.
    pub fn text_size(&self) -> (f32, f32) {
        let canvas = self.canvas.as_ref();
        let w = canvas
            .and_then(|c| c.text_width)
            .unwrap_or(DEFAULT_TEXT_WIDTH);
        let h = canvas
            .and_then(|c| c.text_height)
            .unwrap_or(DEFAULT_TEXT_HEIGHT);
        (w.max(MIN_TEXT_WIDTH), h.max(MIN_TEXT_HEIGHT))
    }
}

pub fn default_notebooks_root() -> PathBuf {
    UserDirs::new()
        .map(|dirs| dirs.home_dir().join("CanvasNotes"))
        .unwrap_or_else(|| PathBuf::from("CanvasNotes"))
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "canvas-notes").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Read the config at `path`. A missing file gives the defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
