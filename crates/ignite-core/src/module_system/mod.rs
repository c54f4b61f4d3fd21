//! # Ignite Core Module System
//!
//! Discovery, filtering, condition evaluation and ordering of configuration
//! modules.
//!
//! The pieces, leaves first:
//! - [`FactoryRegistry`]: capability name to ordered module ids, plus factories.
//! - [`MetadataIndex`]: cached per-module hints used without instantiation.
//! - [`CandidateResolver`]: candidates for one request, minus exclusions.
//! - [`FilterPipeline`]: cheap eliminations before conditions are evaluated.
//! - [`ImportGroup`] and [`ModuleSorter`]: merging across request sites and
//!   deterministic ordering.
//! - [`AutoConfigurationEngine`]: the work queue tying it together.
pub mod candidate;
pub mod conflict;
pub mod declarative;
pub mod engine;
pub mod error;
pub mod filter;
pub mod import_listener;
pub mod manifest;
pub mod metadata;
pub mod ordering;
pub mod registry;
pub mod traits;
pub mod version;

#[cfg(test)]
mod tests;

pub use candidate::{CandidateResolver, RequestSite, ResolutionRequest, ResolutionResult};
pub use declarative::{DeclarativeModule, ModuleDescriptor};
pub use engine::{AutoConfigurationEngine, Resolution};
pub use error::ModuleSystemError;
pub use filter::{FilterPipeline, ImportFilter};
pub use import_listener::{ImportEvent, ImportListener};
pub use manifest::{ExclusiveGroup, ManifestBuilder, ModuleManifest};
pub use metadata::{MetadataIndex, ModuleHints};
pub use ordering::{ImportGroup, ModuleSorter, ResolutionEntry};
pub use registry::FactoryRegistry;
pub use traits::{ConfigurationModule, ModulePriority};
pub use version::VersionRange;
