//! Generator configuration.
//!
//! Loaded once, then frozen behind an `Arc` inside the generator. Precedence:
//! explicit path > `DOCQUERY_SCHEMA_CONFIG` > `./docquery-schema.toml` > defaults,
//! with `DOCQUERY_SCHEMA_LANGUAGES` (comma separated) overriding the language list last.

use crate::errors::SchemaError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "DOCQUERY_SCHEMA_CONFIG";
pub const LANGUAGES_ENV: &str = "DOCQUERY_SCHEMA_LANGUAGES";
pub const DEFAULT_CONFIG_FILE: &str = "docquery-schema.toml";

/// Languages accepted by `$text.$language`.
pub const DEFAULT_LANGUAGES: [&str; 16] = [
    "none",
    "danish",
    "dutch",
    "english",
    "finnish",
    "french",
    "german",
    "hungarian",
    "italian",
    "norwegian",
    "portuguese",
    "romanian",
    "russian",
    "spanish",
    "swedish",
    "turkish",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub languages: Vec<String>,
    pub log_level: Option<String>,
}

/// Where [`GeneratorConfig::load_from`] looks, highest precedence first.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub explicit: Option<PathBuf>,
    /// Value of `DOCQUERY_SCHEMA_CONFIG`.
    pub env_path: Option<PathBuf>,
    /// Value of `DOCQUERY_SCHEMA_LANGUAGES`.
    pub env_languages: Option<String>,
    /// The optional working-directory file.
    pub local: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|s| (*s).to_string()).collect(),
            log_level: None,
        }
    }
}

impl GeneratorConfig {
    /// # Errors
    /// Returns an error if the TOML is malformed or the language list is empty.
    pub fn from_toml_str(s: &str) -> Result<Self, SchemaError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.check()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns an error if the file cannot be read or does not parse.
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&s)
    }

    /// Resolve the configuration from the usual locations.
    ///
    /// # Errors
    /// Returns an error when an explicitly named file (argument or env) is missing or invalid.
    /// The implicit `./docquery-schema.toml` is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SchemaError> {
        let sources = ConfigSources {
            explicit: explicit.map(Path::to_path_buf),
            env_path: std::env::var(CONFIG_ENV).ok().map(PathBuf::from),
            env_languages: std::env::var(LANGUAGES_ENV).ok(),
            local: PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        Self::load_from(&sources)
    }

    /// Same precedence as [`GeneratorConfig::load`], with the environment already read.
    ///
    /// # Errors
    /// See [`GeneratorConfig::load`].
    pub fn load_from(sources: &ConfigSources) -> Result<Self, SchemaError> {
        let named = sources.explicit.as_ref().or(sources.env_path.as_ref());
        let mut cfg = match named {
            Some(p) => Self::from_file(p)?,
            None if sources.local.exists() => Self::from_file(&sources.local)?,
            None => Self::default(),
        };
        if let Some(langs) = &sources.env_languages {
            cfg.languages = parse_language_list(langs);
            cfg.check()?;
        }
        log::debug!("generator config: {} text languages", cfg.languages.len());
        Ok(cfg)
    }

    fn check(&self) -> Result<(), SchemaError> {
        if self.languages.is_empty() {
            return Err(SchemaError::Config("languages must not be empty".into()));
        }
        Ok(())
    }
}

fn parse_language_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}
