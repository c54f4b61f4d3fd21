//! File-backed property sources and typed document loading.
//!
//! JSON is always available; YAML and TOML sit behind the `yaml-config` and
//! `toml-config` features. Nested tables are flattened into dotted keys so a
//! file containing
//!
//! ```toml
//! [ignite.autoconfigure]
//! exclude = ["a", "b"]
//! ```
//!
//! exposes the property `ignite.autoconfigure.exclude`.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::environment::PropertySource;
use crate::environment::error::EnvironmentError;

/// Supported configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Human readable format name, used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "JSON",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "YAML",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "TOML",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Deserialize `text` written in this format.
    pub fn parse<T: DeserializeOwned>(&self, text: &str) -> Result<T, String> {
        match self {
            ConfigFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// Reads and deserializes a document, choosing the format from the extension.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, EnvironmentError> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| EnvironmentError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    if !path.exists() {
        return Err(EnvironmentError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path).map_err(|source| EnvironmentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    format.parse(&text).map_err(|message| EnvironmentError::Parse {
        path: path.to_path_buf(),
        format: format.name(),
        message,
    })
}

/// Property source backed by a configuration file.
#[derive(Debug, Clone)]
pub struct FilePropertySource {
    name: String,
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl FilePropertySource {
    /// Load and flatten a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EnvironmentError> {
        let path = path.as_ref();
        let document: Value = load_document(path)?;
        let mut values = BTreeMap::new();
        flatten_into(None, document, &mut values);
        log::debug!("Loaded {} properties from {}", values.len(), path.display());
        Ok(Self {
            name: format!("file [{}]", path.display()),
            path: path.to_path_buf(),
            values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PropertySource for FilePropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// Flattens nested objects into dotted keys. Arrays stay whole.
pub(crate) fn flatten_into(prefix: Option<&str>, value: Value, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let full = match prefix {
                    Some(p) => format!("{}.{}", p, key),
                    None => key,
                };
                flatten_into(Some(&full), nested, out);
            }
        }
        other => {
            if let Some(key) = prefix {
                out.insert(key.to_string(), other);
            }
        }
    }
}
