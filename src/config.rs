use std::{fs, path::Path};

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::errors::{ConfigParseError, FileOperation, IoError};

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ConfigParseError),
}

/// Optional parts of the generated project.
///
/// Both default to on, which is the later of the two layouts the generator has shipped.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Features {
    /// Adds a `GET /health` endpoint to `src/app.js`.
    pub health_check: bool,
    /// Writes `.env.example` and points the README at it.
    pub env_example: bool,
}
impl Default for Features {
    fn default() -> Self {
        Self {
            health_check: true,
            env_example: true,
        }
    }
}

/// Values baked into the generated sources as fallbacks for the project's own env vars.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    pub port: u16,
    pub api_version: String,
    pub mongo_host: String,
}
impl Default for Defaults {
    fn default() -> Self {
        Self {
            port: 5000,
            api_version: "/api/v1".to_string(),
            mongo_host: "mongodb://127.0.0.1:27017".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ScaffoldOptions {
    pub features: Features,
    pub defaults: Defaults,
}
impl ScaffoldOptions {
    /// Loads options from a TOML file. Missing tables and keys fall back to [`Default`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .map_err(|error| IoError::new(FileOperation::Read, path.to_path_buf(), error))?;

        let parsed = toml::from_str(&content).map_err(|error| ConfigParseError {
            path: path.to_path_buf(),
            source: error,
        })?;

        log::debug!("loaded scaffold options from {}", path.display());

        Ok(parsed)
    }

    pub fn without_health_check(mut self) -> Self {
        self.features.health_check = false;
        self
    }

    pub fn without_env_example(mut self) -> Self {
        self.features.env_example = false;
        self
    }
}
