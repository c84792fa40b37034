//! Authoring configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[serde(default)]` uses `Default::default()` for missing fields, so a
//! config file only has to mention what it changes.

use coursekit_exercise::ExerciseKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Playground editing behavior
    pub editor: EditorConfig,

    /// Text mode rendering
    pub serializer: SerializerConfig,

    /// Tag defaults
    pub tags: TagConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("coursekit").join("config.toml"))
    }

    /// Writes the config to `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Playground editing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo steps kept per Playground session
    pub history_limit: usize,

    /// Window in which typing into the same field is one undo step (ms)
    pub coalesce_ms: u64,

    /// Kind used by "add exercise" when none is given
    pub default_kind: ExerciseKind,
}

impl EditorConfig {
    pub fn coalesce_threshold(&self) -> Duration {
        Duration::from_millis(self.coalesce_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            coalesce_ms: 300,
            default_kind: ExerciseKind::SimpleSelection,
        }
    }
}

/// Text mode configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Spaces per indentation level
    pub indent: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Tag configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    /// Colors handed out in turn to tags added without one
    pub palette: Vec<String>,
}

impl TagConfig {
    /// Picks the palette color for the `n`th tag.
    pub fn color_for(&self, n: usize) -> String {
        if self.palette.is_empty() {
            return "#64748B".to_string();
        }
        self.palette[n % self.palette.len()].clone()
    }
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            palette: vec![
                "#3B82F6".to_string(),
                "#22C55E".to_string(),
                "#F97316".to_string(),
                "#A855F7".to_string(),
                "#EF4444".to_string(),
            ],
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor.history_limit, 100);
        assert_eq!(config.serializer.indent, 2);
        assert_eq!(config.editor.default_kind, ExerciseKind::SimpleSelection);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[serializer]\nindent = 4\n").unwrap();
        assert_eq!(config.serializer.indent, 4);
        assert_eq!(config.editor.history_limit, 100);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.editor.history_limit = 5;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_palette_cycles() {
        let tags = TagConfig {
            palette: vec!["#1".to_string(), "#2".to_string()],
        };
        assert_eq!(tags.color_for(0), "#1");
        assert_eq!(tags.color_for(3), "#2");
        assert_eq!(TagConfig { palette: vec![] }.color_for(0), "#64748B");
    }
}
