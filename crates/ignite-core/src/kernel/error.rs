//! # Ignite Core Kernel Errors
//!
//! Defines the crate-wide [`Error`] type.
//!
//! Every subsystem owns a typed error enum ([`ModuleSystemError`],
//! [`ConditionError`], [`LifecycleError`], [`EnvironmentError`]) which converts
//! into [`Error`] through `#[from]`, so `?` works across module boundaries.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::condition::error::ConditionError;
use crate::environment::error::EnvironmentError;
use crate::lifecycle::LifecyclePhase;
use crate::lifecycle::error::LifecycleError;
use crate::module_system::error::ModuleSystemError;

/// Error type for the Ignite core
#[derive(Debug, ThisError)]
pub enum Error {
    /// Resolution, registry and ordering failures
    #[error("Module system error: {0}")]
    ModuleSystem(#[from] ModuleSystemError),

    /// Invalid condition declarations
    #[error("Condition error: {0}")]
    Condition(#[from] ConditionError),

    /// Rejected phase transitions and propagated listener failures
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Property sources, configuration files and the classpath model
    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),

    /// A module's `configure` step failed.
    #[error("Configuration of module '{module_id}' failed: {message}")]
    ModuleConfiguration { module_id: String, message: String },

    /// Error related to component registration or lookup.
    #[error("Component registry error during operation '{operation}': {message}")]
    ComponentRegistryError {
        operation: String, // e.g. "RegisterComponent"
        component_name: Option<String>,
        message: String,
    },

    /// Error occurring during a specific kernel phase.
    #[error("Kernel lifecycle error during {phase:?}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// The application run failed and the `Failed` notification was delivered.
    #[error("Application run failed during {phase}: {source}")]
    RunFailed {
        phase: LifecyclePhase,
        #[source]
        source: Box<Error>,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a phase of the application object itself (not a lifecycle event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Bootstrap")]
    Bootstrap,
    #[error("Run")]
    Run,
    #[error("Close")]
    Close,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    /// The error that caused a failed run, or `self` for any other variant.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::RunFailed { source, .. } => source.root_cause(),
            Error::KernelLifecycleError { source: Some(source), .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
