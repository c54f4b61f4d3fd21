#![cfg(test)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::context::ComponentRegistry;
use crate::environment::Environment;
use crate::kernel::error::{Error, Result as KernelResult};
use crate::lifecycle::{LifecycleEvent, LifecycleListener, LifecyclePhase, ListenerError};
use crate::module_system::manifest::ModuleManifest;
use crate::module_system::registry::FactoryRegistry;
use crate::module_system::traits::{ConfigurationModule, ModulePriority};

// ===== MOCK MODULES =====

/// Module that registers one component named after itself and records the
/// order in which modules were configured.
pub struct TestModule {
    manifest: ModuleManifest,
    configured: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl TestModule {
    pub fn new(manifest: ModuleManifest, configured: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            manifest,
            configured,
            fail: false,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl ConfigurationModule for TestModule {
    fn manifest(&self) -> &ModuleManifest {
        &self.manifest
    }

    fn configure(&self, components: &mut ComponentRegistry, _environment: &Environment) -> KernelResult<()> {
        if self.fail {
            return Err(Error::Other(format!("module {} refused to configure", self.manifest.id)));
        }
        self.configured
            .lock()
            .unwrap()
            .push(self.manifest.id.clone());
        components.register_instance(&format!("{}Component", self.manifest.id), self.manifest.id.clone())
    }
}

/// Registers `manifest` as an auto-configuration candidate backed by a
/// [`TestModule`] sharing `configured`.
pub fn register_test_module(
    registry: &mut FactoryRegistry,
    manifest: ModuleManifest,
    configured: &Arc<Mutex<Vec<String>>>,
) {
    let id = manifest.id.clone();
    let configured = Arc::clone(configured);
    registry
        .register_module(&id, move || {
            Box::new(TestModule::new(manifest.clone(), Arc::clone(&configured))) as Box<dyn ConfigurationModule>
        })
        .unwrap();
}

/// A registry listing a single condition-free module, enough for a run to
/// resolve something.
pub fn single_module_registry() -> FactoryRegistry {
    let mut registry = FactoryRegistry::new();
    register_test_module(&mut registry, ModuleManifest::new("Basic"), &shared_log());
    registry
}

// ===== MOCK LISTENERS =====

/// Records `<name>:<phase>` for every notification it receives.
pub struct RecordingListener {
    name: String,
    priority: ModulePriority,
    log: Arc<Mutex<Vec<String>>>,
    fail_on: Vec<LifecyclePhase>,
    saw_context: Arc<Mutex<Vec<(LifecyclePhase, bool, bool)>>>,
}

impl RecordingListener {
    pub fn new(name: &str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            priority: ModulePriority::DEFAULT,
            log,
            fail_on: Vec::new(),
            saw_context: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_priority(mut self, priority: ModulePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn failing_on(mut self, phase: LifecyclePhase) -> Self {
        self.fail_on.push(phase);
        self
    }

    /// `(phase, had environment, had context)` per notification.
    pub fn observations(&self) -> Arc<Mutex<Vec<(LifecyclePhase, bool, bool)>>> {
        Arc::clone(&self.saw_context)
    }
}

#[async_trait]
impl LifecycleListener for RecordingListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> ModulePriority {
        self.priority
    }

    async fn on_event(&self, event: &LifecycleEvent) -> Result<(), ListenerError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.name, event.phase()));
        self.saw_context.lock().unwrap().push((
            event.phase(),
            event.environment().is_some(),
            event.context().is_some(),
        ));
        if self.fail_on.contains(&event.phase()) {
            return Err(ListenerError::new(format!("{} failed on {}", self.name, event.phase())));
        }
        Ok(())
    }
}

pub fn shared_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn snapshot(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().unwrap().clone()
}
