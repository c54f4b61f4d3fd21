//! Precomputed per-module hints.
//!
//! The index lets the filter pipeline reject modules without instantiating
//! them. It is optional: a module missing from the index is
//! simply never eliminated by a filter.
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use serde::{Deserialize, Serialize};

use crate::environment::config::load_document;
use crate::kernel::error::Result;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::manifest::{ExclusiveGroup, ModuleManifest};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleHints {
    #[serde(default)]
    pub on_class: Vec<String>,
    #[serde(default)]
    pub group: Option<ExclusiveGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataIndex {
    entries: HashMap<String, ModuleHints>,
}

static INDEX_CACHE: OnceLock<Mutex<HashMap<Vec<PathBuf>, Arc<MetadataIndex>>>> = OnceLock::new();

impl MetadataIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_manifests<'a, I>(manifests: I) -> Self
    where
        I: IntoIterator<Item = &'a ModuleManifest>,
    {
        let mut index = Self::new();
        for manifest in manifests {
            index.insert(&manifest.id, manifest.hints());
        }
        index
    }

    pub fn insert(&mut self, id: &str, hints: ModuleHints) {
        self.entries.insert(id.to_string(), hints);
    }

    pub fn get(&self, id: &str) -> Option<&ModuleHints> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of `other` replace entries with the same id.
    pub fn merge(&mut self, other: MetadataIndex) {
        self.entries.extend(other.entries);
    }

    /// Reads index files keyed by module id. Later files win on duplicates.
    pub fn load(paths: &[PathBuf]) -> Result<Self> {
        let mut index = Self::new();
        for path in paths {
            let entries: BTreeMap<String, ModuleHints> =
                load_document(path).map_err(|source| ModuleSystemError::ResourceLoad {
                    path: path.clone(),
                    source,
                })?;
            log::debug!("Loaded {} metadata entries from {}", entries.len(), path.display());
            index.entries.extend(entries);
        }
        Ok(index)
    }

    /// Like [`load`](Self::load), but parsed once per process for a given
    /// list of files.
    pub fn load_cached(paths: &[PathBuf]) -> Result<Arc<Self>> {
        let cache = INDEX_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
        {
            let guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(index) = guard.get(paths) {
                log::trace!("Metadata index cache hit for {:?}", paths);
                return Ok(Arc::clone(index));
            }
        }
        let index = Arc::new(Self::load(paths)?);
        let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = guard.entry(paths.to_vec()).or_insert(index);
        Ok(Arc::clone(entry))
    }

    pub fn clear_cache() {
        if let Some(cache) = INDEX_CACHE.get() {
            cache
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clear();
        }
    }
}
