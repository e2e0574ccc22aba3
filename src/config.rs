//! Run configuration.
//!
//! A run is configured by an explicit [`RunConfig`]: where the page tree
//! lives, where reports go and which interpreter family runs the fixtures.
//! Values come from an optional YAML file and are overridden by command-line
//! flags.
//!
//! ```yaml
//! source: acceptance
//! output: target/acceptance-report
//! engine: flow
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::EngineKind;
use crate::errors::ConfigError;

/// Everything a runner needs to know before it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Repository root holding `pages/` and `files/`.
    pub source: PathBuf,
    /// Directory receiving result pages, the suite index and assets.
    pub output: PathBuf,
    pub engine: EngineKind,
}

impl RunConfig {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            engine: EngineKind::default(),
        }
    }

    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    /// Loads a complete configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        PartialConfig::load(path)?.finish()
    }
}

/// A configuration layer in which every setting is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub engine: Option<EngineKind>,
}

impl PartialConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Settings present in `overrides` win.
    pub fn merge(self, overrides: PartialConfig) -> PartialConfig {
        PartialConfig {
            source: overrides.source.or(self.source),
            output: overrides.output.or(self.output),
            engine: overrides.engine.or(self.engine),
        }
    }

    pub fn finish(self) -> Result<RunConfig, ConfigError> {
        Ok(RunConfig {
            source: self.source.ok_or(ConfigError::Missing { setting: "source" })?,
            output: self.output.ok_or(ConfigError::Missing { setting: "output" })?,
            engine: self.engine.unwrap_or_default(),
        })
    }
}
