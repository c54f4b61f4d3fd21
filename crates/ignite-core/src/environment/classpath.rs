//! Model of the libraries available to the application.
use std::collections::BTreeMap;

use semver::Version;

use crate::environment::error::EnvironmentError;

/// Libraries known to be present, each with an optional version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classpath {
    libraries: BTreeMap<String, Option<Version>>,
}

impl Classpath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a classpath from `(name, version)` pairs, an empty version
    /// meaning "present, version unknown".
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, EnvironmentError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut classpath = Self::new();
        for (name, version) in entries {
            let name = name.into();
            let version = version.as_ref().trim();
            if version.is_empty() {
                classpath.add(name, None);
            } else {
                classpath = classpath.with_versioned_library(name, version)?;
            }
        }
        Ok(classpath)
    }

    pub fn with_library(mut self, name: impl Into<String>) -> Self {
        self.add(name, None);
        self
    }

    pub fn with_versioned_library(
        mut self,
        name: impl Into<String>,
        version: &str,
    ) -> Result<Self, EnvironmentError> {
        let name = name.into();
        let parsed = Version::parse(version).map_err(|e| EnvironmentError::InvalidVersion {
            library: name.clone(),
            version: version.to_string(),
            message: e.to_string(),
        })?;
        self.add(name, Some(parsed));
        Ok(self)
    }

    pub fn add(&mut self, name: impl Into<String>, version: Option<Version>) {
        self.libraries.insert(name.into(), version);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.libraries.contains_key(name)
    }

    /// Version of a present library, if it was declared with one.
    pub fn version_of(&self, name: &str) -> Option<&Version> {
        self.libraries.get(name).and_then(|v| v.as_ref())
    }

    /// Names from `required` that are not on the classpath, in input order.
    pub fn missing<'a, I>(&self, required: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        required
            .into_iter()
            .filter(|name| !self.contains(name))
            .cloned()
            .collect()
    }

    pub fn library_names(&self) -> impl Iterator<Item = &str> {
        self.libraries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}
