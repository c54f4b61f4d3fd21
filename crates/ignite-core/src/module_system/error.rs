//! # Ignite Core Module System Errors
//!
//! Errors raised while discovering, filtering and ordering configuration
//! modules. Every configuration error that concerns several module ids lists
//! all of them in a single diagnostic.
use std::path::PathBuf;

use crate::environment::error::EnvironmentError;
use crate::module_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum ModuleSystemError {
    #[error(
        "The following modules could not be excluded because they are not configuration candidates: {}",
        .ids.join(", ")
    )]
    InvalidExcludes { ids: Vec<String> },

    #[error(
        "No configuration modules found for capability '{capability}'. If you are using custom packaging, make sure the registry resources are correct."
    )]
    NoCandidates { capability: String },

    #[error("Module ordering cycle detected: {}", .cycle.join(" -> "))]
    OrderingCycle { cycle: Vec<String> },

    #[error("Unsatisfiable module ordering constraints: {}", .details.join("; "))]
    OrderingConflict { details: Vec<String> },

    #[error("Unknown configuration module '{id}'")]
    UnknownModule { id: String },

    #[error("No factory defined for '{id}' listed under capability '{capability}'")]
    UnknownFactory { capability: String, id: String },

    #[error("Registration error for '{id}': {message}")]
    RegistrationError { id: String, message: String },

    #[error("Import filter '{filter}' returned {actual} results for {expected} candidates")]
    FilterContract {
        filter: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid module priority '{value}'")]
    InvalidPriority { value: String },

    #[error("Failed to load registry resource '{path}': {source}")]
    ResourceLoad {
        path: PathBuf,
        #[source]
        source: EnvironmentError,
    },

    #[error("Version parsing error: {0}")]
    Version(#[from] VersionError),

    #[error("Internal module system error: {message}")]
    InternalError { message: String },
}
