//! Settings file loading.
//!
//! Settings live in TOML under an `[editor]` table:
//!
//! ```toml
//! [editor]
//! indent_width = 4
//! comment_token = "#"
//! ```
//!
//! Missing keys take their defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use sftpad_core::EditorConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "sftpad.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub editor: EditorConfig,
}

impl Settings {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Loads settings. An explicit path must exist and parse. Otherwise
/// `sftpad.toml` in the working directory is used if present; a broken
/// discovered file falls back to defaults with a warning.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    if let Some(path) = path {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        return Settings::parse(&content)
            .with_context(|| format!("invalid config {}", path.display()));
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    let Ok(content) = fs::read_to_string(&local) else {
        return Ok(Settings::default());
    };
    match Settings::parse(&content) {
        Ok(settings) => {
            log::debug!("using {}", local.display());
            Ok(settings)
        }
        Err(e) => {
            log::warn!("ignoring {}: {e:#}", local.display());
            Ok(Settings::default())
        }
    }
}
