//! # Ignite Core Environment
//!
//! Externalized configuration. An [`Environment`] is an ordered list of
//! [`PropertySource`]s; the first source that knows a key wins.
pub mod classpath;
pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

pub use classpath::Classpath;
pub use config::{ConfigFormat, FilePropertySource, load_document};
pub use error::EnvironmentError;

/// A named source of property values.
pub trait PropertySource: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Raw value for `key`, if this source defines it.
    fn get(&self, key: &str) -> Option<Value>;

    /// Every key this source defines.
    fn keys(&self) -> Vec<String>;
}

/// In-memory property source.
#[derive(Debug, Clone, Default)]
pub struct MapPropertySource {
    name: String,
    values: BTreeMap<String, Value>,
}

impl MapPropertySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn from_map<K, V>(name: impl Into<String>, values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut source = Self::new(name);
        for (key, value) in values {
            source.insert(key, value);
        }
        source
    }

    /// Builds a source from a nested document, flattening objects into
    /// dotted keys the way file sources do.
    pub fn from_document(name: impl Into<String>, document: Value) -> Self {
        let mut source = Self::new(name);
        config::flatten_into(None, document, &mut source.values);
        source
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }
}

impl PropertySource for MapPropertySource {
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

/// Operating-system environment variables with relaxed key matching:
/// `ignite.autoconfigure.exclude` is looked up as `IGNITE_AUTOCONFIGURE_EXCLUDE`.
#[derive(Debug, Clone)]
pub struct SystemEnvironmentSource {
    vars: BTreeMap<String, String>,
}

impl SystemEnvironmentSource {
    /// Snapshot of the current process environment.
    pub fn new() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    fn env_key(key: &str) -> String {
        key.chars()
            .map(|c| match c {
                '.' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl Default for SystemEnvironmentSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySource for SystemEnvironmentSource {
    fn name(&self) -> &str {
        "systemEnvironment"
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.vars
            .get(key)
            .or_else(|| self.vars.get(&Self::env_key(key)))
            .map(|v| Value::String(v.clone()))
    }

    fn keys(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }
}

/// Ordered collection of property sources.
#[derive(Clone, Default)]
pub struct Environment {
    sources: Vec<Arc<dyn PropertySource>>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("sources", &self.source_names())
            .finish()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_last`](Self::add_last).
    pub fn with_source(mut self, source: impl PropertySource + 'static) -> Self {
        self.add_last(Arc::new(source));
        self
    }

    /// Adds a source with the highest precedence.
    pub fn add_first(&mut self, source: Arc<dyn PropertySource>) {
        self.sources.insert(0, source);
    }

    /// Adds a source with the lowest precedence.
    pub fn add_last(&mut self, source: Arc<dyn PropertySource>) {
        self.sources.push(source);
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Raw value from the first source defining `key`.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.sources.iter().find_map(|source| match source.get(key) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        })
    }

    pub fn contains_property(&self, key: &str) -> bool {
        self.get_value(key).is_some()
    }

    /// Property value rendered as a string. Sequences are joined with commas.
    pub fn get_property(&self, key: &str) -> Option<String> {
        self.get_value(key).map(|value| value_to_string(&value))
    }

    /// `(suffix, value)` for every key under `prefix.`, sorted by suffix.
    /// A key defined by several sources reports the winning value.
    pub fn properties_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        let dotted = format!("{}.", prefix);
        let mut found = BTreeMap::new();
        for source in &self.sources {
            for key in source.keys() {
                let Some(suffix) = key.strip_prefix(&dotted) else { continue };
                if suffix.is_empty() || found.contains_key(suffix) {
                    continue;
                }
                if let Some(value) = self.get_property(&key) {
                    found.insert(suffix.to_string(), value);
                }
            }
        }
        found.into_iter().collect()
    }

    pub fn get_property_or(&self, key: &str, default: &str) -> String {
        self.get_property(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, EnvironmentError> {
        match self.get_value(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(other) => {
                let text = value_to_string(&other);
                match text.trim().to_ascii_lowercase().as_str() {
                    "true" => Ok(Some(true)),
                    "false" => Ok(Some(false)),
                    _ => Err(EnvironmentError::InvalidValue {
                        key: key.to_string(),
                        value: text,
                        expected: "boolean",
                    }),
                }
            }
        }
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool, EnvironmentError> {
        Ok(self.get_bool(key)?.unwrap_or(default))
    }

    /// List property: a sequence, or a comma separated string.
    /// Blank items are dropped.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        let items: Vec<String> = match self.get_value(key) {
            None => Vec::new(),
            Some(Value::Array(values)) => values.iter().map(value_to_string).collect(),
            Some(other) => value_to_string(&other)
                .split(',')
                .map(|s| s.to_string())
                .collect(),
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Replaces `${key}` and `${key:default}` placeholders.
    pub fn resolve_placeholders(&self, text: &str) -> Result<String, EnvironmentError> {
        let mut result = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("${") {
            let Some(len) = rest[start + 2..].find('}') else {
                break;
            };
            result.push_str(&rest[..start]);
            let expression = &rest[start + 2..start + 2 + len];
            let (key, default) = match expression.split_once(':') {
                Some((key, default)) => (key, Some(default)),
                None => (expression, None),
            };
            match (self.get_property(key), default) {
                (Some(value), _) => result.push_str(&value),
                (None, Some(default)) => result.push_str(default),
                (None, None) => {
                    return Err(EnvironmentError::UnresolvablePlaceholder {
                        placeholder: key.to_string(),
                    });
                }
            }
            rest = &rest[start + 2 + len + 1..];
        }
        result.push_str(rest);
        Ok(result)
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
