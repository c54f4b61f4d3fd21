//! Application descriptor files.
//!
//! ```toml
//! name = "shop"
//! property_files = ["application.toml"]
//! metadata = ["metadata.json"]
//!
//! [registry]
//! "ignite.autoconfigure.EnableAutoConfiguration" = ["Web", "CacheRedis"]
//!
//! [classpath]
//! http-server = "1.4.0"
//! redis-client = ""
//!
//! [properties]
//! logging.level.root = "warn"
//!
//! [[modules]]
//! id = "Web"
//! provides = ["router"]
//! ```
//!
//! Relative paths are resolved against the descriptor's directory. Without a
//! `[registry]` section every declared module is an auto-configuration
//! candidate, in declaration order.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignite_core::environment::{
    Classpath, Environment, FilePropertySource, MapPropertySource, SystemEnvironmentSource, load_document,
};
use ignite_core::kernel::error::Result;
use ignite_core::module_system::{
    ConfigurationModule, DeclarativeModule, FactoryRegistry, MetadataIndex, ModuleDescriptor,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppDescriptor {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub registry: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub modules: Vec<ModuleDescriptor>,
    /// Library name to version; an empty version means "present".
    #[serde(default)]
    pub classpath: BTreeMap<String, String>,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
    #[serde(default)]
    pub property_files: Vec<PathBuf>,
    /// Metadata index files consulted before conditions are evaluated.
    #[serde(default)]
    pub metadata: Vec<PathBuf>,
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_name() -> String {
    "application".to_string()
}

impl AppDescriptor {
    pub fn load(path: &Path) -> Result<Self> {
        let mut descriptor: AppDescriptor = load_document(path)?;
        descriptor.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        log::debug!(
            "Loaded descriptor '{}' with {} module(s) from {}",
            descriptor.name,
            descriptor.modules.len(),
            path.display()
        );
        Ok(descriptor)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn registry(&self) -> Result<FactoryRegistry> {
        let mut registry = FactoryRegistry::new();
        if self.registry.is_empty() {
            for module in &self.modules {
                DeclarativeModule::register(&mut registry, module.clone())?;
            }
            return Ok(registry);
        }

        for module in &self.modules {
            let descriptor = Arc::new(module.clone());
            registry.define_module(&module.manifest.id, move || {
                Box::new(DeclarativeModule::new(ModuleDescriptor::clone(&descriptor))) as Box<dyn ConfigurationModule>
            })?;
        }
        for (capability, ids) in &self.registry {
            registry.add_names(capability, ids.iter().cloned());
        }
        Ok(registry)
    }

    /// Sources from highest to lowest precedence: `overrides`, the process
    /// environment, property files in listed order, then `[properties]`.
    pub fn environment(&self, overrides: &[(String, String)]) -> Result<Environment> {
        let mut environment = Environment::new()
            .with_source(MapPropertySource::from_map("commandLine", overrides.iter().cloned()))
            .with_source(SystemEnvironmentSource::new());
        for file in &self.property_files {
            environment = environment.with_source(FilePropertySource::load(self.resolve(file))?);
        }
        Ok(environment.with_source(MapPropertySource::from_document(
            "descriptor",
            Value::Object(self.properties.clone()),
        )))
    }

    pub fn classpath(&self) -> Result<Classpath> {
        Ok(Classpath::from_entries(&self.classpath)?)
    }

    pub fn metadata_index(&self) -> Result<Option<Arc<MetadataIndex>>> {
        if self.metadata.is_empty() {
            return Ok(None);
        }
        let paths: Vec<PathBuf> = self.metadata.iter().map(|p| self.resolve(p)).collect();
        MetadataIndex::load_cached(&paths).map(Some)
    }
}
