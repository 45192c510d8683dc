use serde::{Deserialize, Serialize};

use std::path::Path;
use std::path::PathBuf;

use crate::error::{ConfigError, ParseError};

/// Default quiet period before a burst of edits triggers a render.
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Quiet period, in milliseconds, before a pending render fires.
    pub debounce_ms: u64,
    /// Text shown when the active document has no content.
    pub placeholder: String,
    /// Glyph used for every list item, ordered or not.
    pub bullet: String,
    /// Mirror scroll position between the editor and the preview.
    pub sync_scroll: bool,
    /// Whether the preview region starts visible.
    pub show_preview: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            placeholder: "No content".to_owned(),
            bullet: "•".to_owned(),
            sync_scroll: true,
            show_preview: true,
        }
    }
}

impl PreviewConfig {
    /// Loads the configuration from the provided loader.
    pub fn load(loader: &impl Loader) -> Result<Self, ConfigError> {
        loader.load()
    }

    /// Loads the configuration, falling back to defaults if the file is missing.
    pub fn load_or_default(store: &FileStore) -> Result<Self, ConfigError> {
        if !store.path().exists() {
            tracing::debug!(
                target: "berrypad::config",
                path = %store.path().display(),
                "no config file, using defaults"
            );
            return Ok(Self::default());
        }
        store.load()
    }

    /// Saves the configuration using the provided saver.
    pub fn save(&self, saver: &impl Saver) -> Result<(), ConfigError> {
        saver.save(self)
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(&self) -> Result<PreviewConfig, ConfigError>;
}

/// The trait for saving configuration data.
pub trait Saver {
    /// Saves the configuration data.
    fn save(&self, config: &PreviewConfig) -> Result<(), ConfigError>;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a configuration file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// [`PreviewConfig`] data will be serialized and deserialized using the file extension.
    /// Supports `.toml` and `.json` files.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> Result<Format, ConfigError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_owned(),
            )),
        }
    }
}

enum Format {
    Json,
    Toml,
}

impl Loader for FileStore {
    fn load(&self) -> Result<PreviewConfig, ConfigError> {
        let format = self.format()?;
        let src = std::fs::read_to_string(&self.path)?;
        let name = self.path.display().to_string();
        match format {
            Format::Json => serde_json::from_str(&src).map_err(|e| {
                let (line, column) = (e.line(), e.column());
                ParseError::new(e.to_string(), name, src.clone())
                    .at_line_col(line, column)
                    .into()
            }),
            Format::Toml => toml::from_str(&src).map_err(|e| {
                let span = e.span();
                let err = ParseError::new(e.message().to_owned(), name, src.clone());
                let err = match span {
                    Some(span) => err.at_span(span.start, span.len()),
                    None => err,
                };
                err.with_advice("see PreviewConfig for the accepted keys")
                    .into()
            }),
        }
    }
}

impl Saver for FileStore {
    fn save(&self, config: &PreviewConfig) -> Result<(), ConfigError> {
        let contents = match self.format()? {
            Format::Json => serde_json::to_string_pretty(config)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Format::Toml => toml::to_string_pretty(config)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PreviewConfig::default();
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.bullet, "•");
        assert!(config.sync_scroll);
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("berrypad.toml"));
        let config = PreviewConfig {
            debounce_ms: 120,
            ..Default::default()
        };
        config.save(&store).unwrap();
        let loaded = PreviewConfig::load(&store).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("berrypad.json");
        std::fs::write(&path, r#"{ "bullet": "-" }"#).unwrap();
        let loaded = PreviewConfig::load(&FileStore::new(&path)).unwrap();
        assert_eq!(loaded.bullet, "-");
        assert_eq!(loaded.debounce_ms, DEFAULT_DEBOUNCE_MS);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.toml"));
        assert_eq!(
            PreviewConfig::load_or_default(&store).unwrap(),
            PreviewConfig::default()
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let store = FileStore::new("berrypad.yaml");
        assert!(matches!(
            PreviewConfig::load(&store),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
        ));
    }

    #[test]
    fn test_bad_toml_reports_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("berrypad.toml");
        std::fs::write(&path, "debounce_ms = \"soon\"\n").unwrap();
        match PreviewConfig::load(&FileStore::new(&path)) {
            Err(ConfigError::Parse(err)) => assert_eq!(err.line_col().map(|(l, _)| l), Some(1)),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
