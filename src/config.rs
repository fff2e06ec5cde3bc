//! File-based settings for the `gitlanes` binary.
//!
//! Values come from an optional TOML file; command-line flags override them.

use graph::git_backend::DEFAULT_LIMIT;
use graph::{BranchAttribution, Palette, SequenceStrategy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "gitlanes.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("unknown palette '{0}', expected \"dark\", \"light\" or a list of colors")]
    UnknownPalette(String),

    #[error("render.message_width must be at least 8, got {0}")]
    MessageWidth(usize),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A named theme or explicit colors
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PaletteSetting {
    Named(String),
    Colors(Vec<String>),
}

impl Default for PaletteSetting {
    fn default() -> Self {
        PaletteSetting::Named("dark".to_string())
    }
}

impl PaletteSetting {
    pub fn to_palette(&self) -> Result<Palette, ConfigError> {
        match self {
            PaletteSetting::Named(name) => match name.as_str() {
                "dark" => Ok(Palette::dark()),
                "light" => Ok(Palette::light()),
                other => Err(ConfigError::UnknownPalette(other.to_string())),
            },
            PaletteSetting::Colors(colors) => Ok(Palette::new(colors.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub limit: usize,
    pub strategy: SequenceStrategy,
    pub attribution: BranchAttribution,
    pub palette: PaletteSetting,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            strategy: SequenceStrategy::default(),
            attribution: BranchAttribution::default(),
            palette: PaletteSetting::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub message_width: usize,
    pub format: OutputFormat,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            message_width: 60,
            format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub graph: GraphSettings,
    pub render: RenderSettings,
}

impl Settings {
    /// Load `path`, or `gitlanes.toml` in the working directory if it exists,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let settings = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        settings.validate()?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(settings)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.graph.palette.to_palette()?;
        if self.render.message_width < 8 {
            return Err(ConfigError::MessageWidth(self.render.message_width));
        }
        Ok(())
    }
}
