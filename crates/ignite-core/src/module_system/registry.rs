//! Static factory registry.
//!
//! Maps capability names to ordered id lists and ids to factories. Ids come
//! from programmatic registration or from resource files (JSON, YAML or
//! TOML) shaped like
//!
//! ```toml
//! "ignite.autoconfigure.EnableAutoConfiguration" = ["cache-redis", "cache-simple"]
//! ```
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::environment::config::load_document;
use crate::kernel::constants::{
    AUTO_CONFIGURATION_CAPABILITY, IMPORT_FILTER_CAPABILITY, IMPORT_LISTENER_CAPABILITY,
    LIFECYCLE_LISTENER_CAPABILITY,
};
use crate::kernel::error::Result;
use crate::lifecycle::listener::LifecycleListener;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::filter::ImportFilter;
use crate::module_system::import_listener::ImportListener;
use crate::module_system::traits::ConfigurationModule;

pub type ModuleFactory = Arc<dyn Fn() -> Box<dyn ConfigurationModule> + Send + Sync>;
pub type ListenerFactory = Arc<dyn Fn() -> Arc<dyn LifecycleListener> + Send + Sync>;
pub type FilterFactory = Arc<dyn Fn() -> Box<dyn ImportFilter> + Send + Sync>;
pub type ImportListenerFactory = Arc<dyn Fn() -> Box<dyn ImportListener> + Send + Sync>;

#[derive(Clone, Default)]
pub struct FactoryRegistry {
    names: HashMap<String, Vec<String>>,
    modules: HashMap<String, ModuleFactory>,
    listeners: HashMap<String, ListenerFactory>,
    filters: HashMap<String, FilterFactory>,
    import_listeners: HashMap<String, ImportListenerFactory>,
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("capabilities", &self.names)
            .field("module_count", &self.modules.len())
            .field("listener_count", &self.listeners.len())
            .field("filter_count", &self.filters.len())
            .field("import_listener_count", &self.import_listeners.len())
            .finish()
    }
}

fn define<T: ?Sized>(map: &mut HashMap<String, Arc<T>>, id: &str, factory: Arc<T>) -> Result<()> {
    if map.contains_key(id) {
        return Err(ModuleSystemError::RegistrationError {
            id: id.to_string(),
            message: "a factory with this id is already defined".to_string(),
        }
        .into());
    }
    map.insert(id.to_string(), factory);
    Ok(())
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a module factory without listing it under any capability.
    pub fn define_module<F>(&mut self, id: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn ConfigurationModule> + Send + Sync + 'static,
    {
        define(&mut self.modules, id, Arc::new(factory) as ModuleFactory)
    }

    /// Define a module and list it as an auto-configuration candidate.
    pub fn register_module<F>(&mut self, id: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn ConfigurationModule> + Send + Sync + 'static,
    {
        self.define_module(id, factory)?;
        self.add_names(AUTO_CONFIGURATION_CAPABILITY, [id]);
        Ok(())
    }

    pub fn register_listener<F>(&mut self, id: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Arc<dyn LifecycleListener> + Send + Sync + 'static,
    {
        define(&mut self.listeners, id, Arc::new(factory) as ListenerFactory)?;
        self.add_names(LIFECYCLE_LISTENER_CAPABILITY, [id]);
        Ok(())
    }

    pub fn register_filter<F>(&mut self, id: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn ImportFilter> + Send + Sync + 'static,
    {
        define(&mut self.filters, id, Arc::new(factory) as FilterFactory)?;
        self.add_names(IMPORT_FILTER_CAPABILITY, [id]);
        Ok(())
    }

    pub fn register_import_listener<F>(&mut self, id: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn ImportListener> + Send + Sync + 'static,
    {
        define(&mut self.import_listeners, id, Arc::new(factory) as ImportListenerFactory)?;
        self.add_names(IMPORT_LISTENER_CAPABILITY, [id]);
        Ok(())
    }

    /// Append ids to a capability list. Duplicates are kept here and
    /// removed by the candidate resolver.
    pub fn add_names<I, S>(&mut self, capability: &str, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names
            .entry(capability.to_string())
            .or_default()
            .extend(ids.into_iter().map(Into::into));
    }

    /// Merge one registry resource file.
    pub fn load_resource(&mut self, path: &Path) -> Result<()> {
        let resource: BTreeMap<String, Vec<String>> =
            load_document(path).map_err(|source| ModuleSystemError::ResourceLoad {
                path: path.to_path_buf(),
                source,
            })?;
        for (capability, ids) in resource {
            log::debug!(
                "Registry resource {} lists {} id(s) for '{}'",
                path.display(),
                ids.len(),
                capability
            );
            self.add_names(&capability, ids);
        }
        Ok(())
    }

    pub fn load_resources(&mut self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            self.load_resource(path)?;
        }
        Ok(())
    }

    /// Ids listed for `capability`, in registration order.
    pub fn load_names(&self, capability: &str) -> Vec<String> {
        self.names.get(capability).cloned().unwrap_or_default()
    }

    pub fn capabilities(&self) -> Vec<String> {
        let mut caps: Vec<String> = self.names.keys().cloned().collect();
        caps.sort();
        caps
    }

    /// Whether a module definition exists for `id`.
    pub fn is_resolvable(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }

    pub fn module_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.modules.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn instantiate_module(&self, id: &str) -> Result<Box<dyn ConfigurationModule>> {
        let factory = self
            .modules
            .get(id)
            .ok_or_else(|| ModuleSystemError::UnknownModule { id: id.to_string() })?;
        let module = factory();
        if module.id() != id {
            return Err(ModuleSystemError::RegistrationError {
                id: id.to_string(),
                message: format!("factory produced a module with id '{}'", module.id()),
            }
            .into());
        }
        Ok(module)
    }

    pub fn instantiate_listeners(&self) -> Result<Vec<Arc<dyn LifecycleListener>>> {
        self.instantiate_all(LIFECYCLE_LISTENER_CAPABILITY, &self.listeners)
    }

    pub fn instantiate_filters(&self) -> Result<Vec<Box<dyn ImportFilter>>> {
        self.instantiate_all(IMPORT_FILTER_CAPABILITY, &self.filters)
    }

    pub fn instantiate_import_listeners(&self) -> Result<Vec<Box<dyn ImportListener>>> {
        self.instantiate_all(IMPORT_LISTENER_CAPABILITY, &self.import_listeners)
    }

    fn instantiate_all<T>(
        &self,
        capability: &str,
        factories: &HashMap<String, Arc<dyn Fn() -> T + Send + Sync>>,
    ) -> Result<Vec<T>> {
        let mut seen = HashSet::new();
        let mut instances = Vec::new();
        for id in self.load_names(capability) {
            if !seen.insert(id.clone()) {
                continue;
            }
            let factory = factories.get(&id).ok_or_else(|| ModuleSystemError::UnknownFactory {
                capability: capability.to_string(),
                id: id.clone(),
            })?;
            instances.push(factory());
        }
        Ok(instances)
    }
}
