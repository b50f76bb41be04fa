//! GherkinEase settings.
//!
//! The defaults live in `defaults/gherkin.default.toml` and are compiled in. A [`Loader`]
//! stacks TOML files and single-key overrides on top of them, later layers winning, and
//! produces a [`GherkinConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use gherkin_core::{ResizePolicy, SessionSettings};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/gherkin.default.toml");

/// File picked up from the working directory when present.
pub const LOCAL_CONFIG_FILE: &str = "gherkinease.toml";

/// Everything the composer, table, spell checker, catalogs and output writer read.
#[derive(Debug, Clone, Deserialize)]
pub struct GherkinConfig {
    pub composer: ComposerConfig,
    pub table: TableConfig,
    pub spelling: SpellingConfig,
    pub catalog: CatalogConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComposerConfig {
    pub max_statements_per_clause: usize,
}

/// Example-table behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    pub resize_policy: ResizePolicy,
    pub default_rows: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpellingConfig {
    pub enabled: bool,
    pub language: String,
    pub dictionary_dirs: Vec<PathBuf>,
}

/// Catalog file locations. Empty strings mean the catalog is not configured.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub vocabulary: String,
    pub signals: String,
}

impl CatalogConfig {
    pub fn vocabulary_path(&self) -> Option<&Path> {
        non_empty_path(&self.vocabulary)
    }

    pub fn signals_path(&self) -> Option<&Path> {
        non_empty_path(&self.signals)
    }
}

fn non_empty_path(value: &str) -> Option<&Path> {
    (!value.trim().is_empty()).then(|| Path::new(value))
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub filename: String,
    pub trailing_newline: bool,
}

impl GherkinConfig {
    /// Session limits derived from this configuration.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            max_statements_per_clause: self.composer.max_statements_per_clause,
            resize_policy: self.table.resize_policy,
            default_rows: self.table.default_rows,
        }
    }
}

/// Layered configuration builder. Each added source overrides the ones before it.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Only the compiled-in defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Adds a TOML file; [`Loader::build`] fails if it does not exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Adds a TOML file that may be absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Overrides one dotted key, e.g. `spelling.enabled`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<GherkinConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The compiled-in defaults with nothing layered on top.
pub fn load_defaults() -> Result<GherkinConfig, ConfigError> {
    Loader::new().build()
}

/// Defaults, then `gherkinease.toml` in the working directory if any, then `explicit`.
pub fn load(explicit: Option<&Path>) -> Result<GherkinConfig, ConfigError> {
    let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
    if let Some(path) = explicit {
        loader = loader.with_file(path);
    }
    loader.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.composer.max_statements_per_clause, 10);
        assert_eq!(config.table.resize_policy, ResizePolicy::Preserve);
        assert_eq!(config.table.default_rows, 1);
        assert!(config.spelling.enabled);
        assert_eq!(config.spelling.language, "en_US");
        assert_eq!(config.output.filename, "gherkin_scenario.txt");
        assert!(config.catalog.vocabulary_path().is_none());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("table.resize_policy", "reset")
            .expect("override to apply")
            .set_override("catalog.signals", "signals.yaml")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.table.resize_policy, ResizePolicy::Reset);
        assert_eq!(config.catalog.signals_path(), Some(Path::new("signals.yaml")));
    }

    #[test]
    fn layers_user_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[composer]\nmax_statements_per_clause = 4\n").unwrap();
        let config = Loader::new().with_file(&path).build().expect("config to build");
        assert_eq!(config.composer.max_statements_per_clause, 4);
        assert_eq!(config.session_settings().max_statements_per_clause, 4);
        assert_eq!(config.output.filename, "gherkin_scenario.txt");
    }

    #[test]
    fn absent_optional_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Loader::new()
            .with_optional_file(dir.path().join("absent.toml"))
            .set_override("spelling.enabled", false)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert!(!config.spelling.enabled);
        assert_eq!(config.table.default_rows, 1);
    }

    #[test]
    fn missing_required_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Loader::new().with_file(dir.path().join("absent.toml")).build();
        assert!(result.is_err());
    }
}
