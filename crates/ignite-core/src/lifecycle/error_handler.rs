use crate::lifecycle::LifecyclePhase;
use crate::lifecycle::error::ListenerError;

/// Receives listener errors that are not propagated to the caller.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, listener: &str, phase: LifecyclePhase, error: &ListenerError);
}

/// Logs the error at warn level and lets the broadcast continue.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn handle(&self, listener: &str, phase: LifecyclePhase, error: &ListenerError) {
        log::warn!(
            "Error calling lifecycle listener '{}' during {}: {}",
            listener,
            phase,
            error
        );
    }
}
