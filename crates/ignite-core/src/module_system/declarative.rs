//! Modules described entirely by data.
//!
//! A [`ModuleDescriptor`] is a [`ModuleManifest`] plus the components the
//! module provides. `provides` entries are `name` or `name: TypeTag`.
use std::sync::Arc;

use serde::Deserialize;

use crate::context::ComponentRegistry;
use crate::environment::Environment;
use crate::kernel::error::Result;
use crate::module_system::manifest::ModuleManifest;
use crate::module_system::registry::FactoryRegistry;
use crate::module_system::traits::ConfigurationModule;

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleDescriptor {
    #[serde(flatten)]
    pub manifest: ModuleManifest,
    #[serde(default)]
    pub provides: Vec<String>,
}

impl ModuleDescriptor {
    pub fn new(manifest: ModuleManifest) -> Self {
        Self {
            manifest,
            provides: Vec::new(),
        }
    }

    pub fn providing(mut self, component: &str) -> Self {
        self.provides.push(component.to_string());
        self
    }
}

/// Instance registered for each provided component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredComponent {
    pub name: String,
    pub module_id: String,
}

#[derive(Debug, Clone)]
pub struct DeclarativeModule {
    descriptor: ModuleDescriptor,
}

impl DeclarativeModule {
    pub fn new(descriptor: ModuleDescriptor) -> Self {
        Self { descriptor }
    }

    /// Registers a factory for `descriptor` as an auto-configuration candidate.
    pub fn register(registry: &mut FactoryRegistry, descriptor: ModuleDescriptor) -> Result<()> {
        let id = descriptor.manifest.id.clone();
        let shared = Arc::new(descriptor);
        registry.register_module(&id, move || {
            Box::new(DeclarativeModule::new(ModuleDescriptor::clone(&shared))) as Box<dyn ConfigurationModule>
        })
    }

    pub fn provides(&self) -> &[String] {
        &self.descriptor.provides
    }
}

impl ConfigurationModule for DeclarativeModule {
    fn manifest(&self) -> &ModuleManifest {
        &self.descriptor.manifest
    }

    fn configure(&self, components: &mut ComponentRegistry, _environment: &Environment) -> Result<()> {
        for declared in &self.descriptor.provides {
            let (name, type_tag) = match declared.split_once(':') {
                Some((name, tag)) => (name.trim(), tag.trim().to_string()),
                None => (declared.trim(), std::any::type_name::<DeclaredComponent>().to_string()),
            };
            let component = DeclaredComponent {
                name: name.to_string(),
                module_id: self.descriptor.manifest.id.clone(),
            };
            components.register_tagged(name, &type_tag, Arc::new(component))?;
        }
        Ok(())
    }
}
