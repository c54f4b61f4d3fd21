//! # Ignite Core
//!
//! Conditional configuration-module resolution and the staged application
//! lifecycle that surrounds it.
//!
//! A run starts from a [`FactoryRegistry`](module_system::FactoryRegistry)
//! listing candidate modules per capability. The
//! [`AutoConfigurationEngine`](module_system::AutoConfigurationEngine) resolves,
//! filters, evaluates and orders them, and the [`Application`] drives the
//! lifecycle phases around that resolution while notifying listeners.
pub mod condition;
pub mod context;
pub mod environment;
pub mod kernel;
pub mod lifecycle;
pub mod module_system;

#[cfg(test)]
mod tests;

// Re-export key public types for the binary and plugins
pub use condition::{Condition, ConditionEvaluationReport, ConditionOutcome};
pub use context::{ApplicationContext, ComponentRegistry};
pub use environment::{Classpath, Environment, MapPropertySource, PropertySource};
pub use kernel::bootstrap::{Application, ApplicationBuilder, ApplicationRun};
pub use kernel::error::{Error as KernelError, Result as KernelResult};
pub use lifecycle::{LifecycleEvent, LifecycleListener, LifecyclePhase, LifecyclePublisher};
pub use module_system::{
    AutoConfigurationEngine, ConfigurationModule, FactoryRegistry, ModuleManifest, ModulePriority,
};
