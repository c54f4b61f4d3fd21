use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::kernel::error::{Error, Result};

/// A registered component: a unique name, a type tag and the instance.
#[derive(Clone)]
pub struct ComponentEntry {
    name: String,
    type_tag: String,
    instance: Arc<dyn Any + Send + Sync>,
}

impl ComponentEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn instance(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.instance
    }

    /// Whether `tag` names this component's type, either exactly or as the
    /// last path segment(s) of a fully qualified type name.
    pub fn matches_type(&self, tag: &str) -> bool {
        self.type_tag == tag || self.type_tag.ends_with(&format!("::{}", tag))
    }
}

impl fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentEntry")
            .field("name", &self.name)
            .field("type_tag", &self.type_tag)
            .finish_non_exhaustive()
    }
}

/// Named components registered by the user and by configuration modules,
/// kept in registration order.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: Vec<ComponentEntry>,
    by_name: HashMap<String, usize>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `instance` under `name`, tagged with its Rust type name.
    pub fn register_instance<T: Any + Send + Sync>(&mut self, name: &str, instance: T) -> Result<()> {
        self.register_tagged(name, type_name::<T>(), Arc::new(instance))
    }

    /// Register an already shared instance with an explicit type tag.
    pub fn register_tagged(
        &mut self,
        name: &str,
        type_tag: &str,
        instance: Arc<dyn Any + Send + Sync>,
    ) -> Result<()> {
        if self.by_name.contains_key(name) {
            return Err(Error::ComponentRegistryError {
                operation: "RegisterComponent".to_string(),
                component_name: Some(name.to_string()),
                message: format!("A component named '{}' is already registered", name),
            });
        }
        log::debug!("Registering component '{}' ({})", name, type_tag);
        self.by_name.insert(name.to_string(), self.entries.len());
        self.entries.push(ComponentEntry {
            name: name.to_string(),
            type_tag: type_tag.to_string(),
            instance,
        });
        Ok(())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn contains_type(&self, tag: &str) -> bool {
        self.entries.iter().any(|e| e.matches_type(tag))
    }

    pub fn names_for_type(&self, tag: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.matches_type(tag))
            .map(|e| e.name.clone())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ComponentEntry> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    /// Typed lookup by name. `None` when absent or of another type.
    pub fn get_concrete<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name)
            .and_then(|entry| entry.instance.clone().downcast::<T>().ok())
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every component, most recently registered first.
    pub fn drain_reverse(&mut self) -> Vec<ComponentEntry> {
        self.by_name.clear();
        let mut drained: Vec<ComponentEntry> = self.entries.drain(..).collect();
        drained.reverse();
        drained
    }
}
