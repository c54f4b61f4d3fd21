use crate::lifecycle::LifecyclePhase;

/// Error returned by a lifecycle listener.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for ListenerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ListenerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Invalid lifecycle transition from {} to {to}", describe(.from))]
    InvalidTransition {
        from: Option<LifecyclePhase>,
        to: LifecyclePhase,
    },

    #[error("Lifecycle listener '{listener}' failed during {phase}: {source}")]
    ListenerFailed {
        listener: String,
        phase: LifecyclePhase,
        #[source]
        source: ListenerError,
    },
}

fn describe(phase: &Option<LifecyclePhase>) -> String {
    match phase {
        Some(phase) => phase.to_string(),
        None => "<not started>".to_string(),
    }
}
