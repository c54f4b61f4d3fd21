//! # Ignite Core Lifecycle
//!
//! The staged startup sequence and its listeners.
//!
//! ```text
//! Starting -> EnvironmentPrepared -> ContextPrepared -> ContextLoaded -> Started -> Running
//!        \___________________________________________________________________/
//!                                   Failed
//! ```
//!
//! [`LifecyclePublisher`] enforces the transitions and notifies every
//! [`LifecycleListener`] in priority order. Before the context is active a
//! failing listener is reported to the [`ErrorHandler`] and the broadcast
//! continues; afterwards the failure propagates to the caller.
pub mod error;
pub mod error_handler;
pub mod listener;
pub mod publisher;
pub mod shutdown;


use std::fmt;
use std::sync::Arc;

use crate::context::ApplicationContext;
use crate::environment::Environment;

pub use error::{LifecycleError, ListenerError};
pub use error_handler::{ErrorHandler, LoggingErrorHandler};
pub use listener::{FnListener, LifecycleListener, sync_listener};
pub use publisher::LifecyclePublisher;
pub use shutdown::{ShutdownHook, run_shutdown_hook};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecyclePhase {
    Starting,
    EnvironmentPrepared,
    ContextPrepared,
    ContextLoaded,
    Started,
    Running,
    Failed,
}

impl LifecyclePhase {
    /// The success path, in order.
    pub const SEQUENCE: [LifecyclePhase; 6] = [
        LifecyclePhase::Starting,
        LifecyclePhase::EnvironmentPrepared,
        LifecyclePhase::ContextPrepared,
        LifecyclePhase::ContextLoaded,
        LifecyclePhase::Started,
        LifecyclePhase::Running,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LifecyclePhase::Starting => "starting",
            LifecyclePhase::EnvironmentPrepared => "environment-prepared",
            LifecyclePhase::ContextPrepared => "context-prepared",
            LifecyclePhase::ContextLoaded => "context-loaded",
            LifecyclePhase::Started => "started",
            LifecyclePhase::Running => "running",
            LifecyclePhase::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecyclePhase::Running | LifecyclePhase::Failed)
    }

    /// The phase that must immediately precede `self` on the success path.
    pub fn predecessor(&self) -> Option<LifecyclePhase> {
        let idx = Self::SEQUENCE.iter().position(|p| p == self)?;
        idx.checked_sub(1).map(|i| Self::SEQUENCE[i])
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The failure delivered with the `Failed` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Last phase reached before the failure.
    pub phase: LifecyclePhase,
    pub message: String,
}

impl Failure {
    pub fn new(phase: LifecyclePhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
        }
    }
}

/// What a listener observes at a phase. The environment is present from
/// `EnvironmentPrepared` on, the context from `ContextPrepared` on.
#[derive(Debug, Clone)]
pub struct LifecycleEvent {
    phase: LifecyclePhase,
    environment: Option<Arc<Environment>>,
    context: Option<Arc<ApplicationContext>>,
    failure: Option<Failure>,
}

impl LifecycleEvent {
    pub fn new(
        phase: LifecyclePhase,
        environment: Option<Arc<Environment>>,
        context: Option<Arc<ApplicationContext>>,
        failure: Option<Failure>,
    ) -> Self {
        Self {
            phase,
            environment,
            context,
            failure,
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn environment(&self) -> Option<&Arc<Environment>> {
        self.environment.as_ref()
    }

    pub fn context(&self) -> Option<&Arc<ApplicationContext>> {
        self.context.as_ref()
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }
}
