//! Configuration file for reweave.
//!
//! Read from `~/.reweave/config.toml` unless a path is given explicitly.
//!
//! ```toml
//! [edits]
//! algorithm = "patience"
//! position_encoding = "utf-16"
//! mode = "diff"
//! annotation_id = "rewrite"
//! annotation_label = "Apply rewrite"
//! needs_confirmation = false
//!
//! [logging]
//! filter = "reweave_lsp=debug,info"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use reweave_lsp::{AssembleOptions, EditMode};
use reweave_text::DiffAlgorithm;
use reweave_types::{ChangeAnnotation, PositionEncoding};

#[derive(Debug, Default, Deserialize)]
pub struct ReweaveConfig {
    pub edits: Option<EditsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// How rewrites become edits.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct EditsConfig {
    #[serde(default)]
    pub algorithm: DiffAlgorithm,
    /// Column unit of emitted positions. Default: "utf-32".
    #[serde(default)]
    pub position_encoding: PositionEncoding,
    /// "diff" (default) or "whole-document".
    #[serde(default)]
    pub mode: EditMode,
    /// Annotation id stamped on every edit. No annotation when absent.
    pub annotation_id: Option<String>,
    /// Label shown for the annotation. Defaults to the id.
    pub annotation_label: Option<String>,
    pub needs_confirmation: Option<bool>,
}

impl EditsConfig {
    #[must_use]
    pub fn assemble_options(&self) -> AssembleOptions {
        let annotation = self.annotation_id.as_ref().map(|id| {
            let label = self.annotation_label.clone().unwrap_or_else(|| id.clone());
            let annotation = ChangeAnnotation {
                needs_confirmation: self.needs_confirmation,
                ..ChangeAnnotation::new(label)
            };
            (id.clone(), annotation)
        });
        AssembleOptions {
            algorithm: self.algorithm,
            encoding: self.position_encoding,
            mode: self.mode,
            annotation,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives. `RUST_LOG` takes precedence.
    pub filter: Option<String>,
}

impl ReweaveConfig {
    /// Load the default config file. `Ok(None)` when there is none.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Load a config file that must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read config");
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to parse config");
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Assembler options, defaults where the `[edits]` table is missing.
    #[must_use]
    pub fn assemble_options(&self) -> AssembleOptions {
        self.edits
            .as_ref()
            .map(EditsConfig::assemble_options)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn log_filter(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.filter.as_deref())
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".reweave").join("config.toml"))
}
