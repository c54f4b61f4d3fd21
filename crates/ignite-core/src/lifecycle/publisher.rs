use std::sync::Arc;

use crate::context::ApplicationContext;
use crate::environment::Environment;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::error_handler::{ErrorHandler, LoggingErrorHandler};
use crate::lifecycle::listener::LifecycleListener;
use crate::lifecycle::{Failure, LifecycleEvent, LifecyclePhase};

/// How listener errors are treated for one broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    /// Hand errors to the error handler and keep going.
    Logged,
    /// Stop at the first error and return it.
    Propagate,
}

/// Sequences the lifecycle phases and broadcasts each one to the listeners.
pub struct LifecyclePublisher {
    listeners: Vec<Arc<dyn LifecycleListener>>,
    error_handler: Arc<dyn ErrorHandler>,
    current: Option<LifecyclePhase>,
    environment: Option<Arc<Environment>>,
    context: Option<Arc<ApplicationContext>>,
}

impl LifecyclePublisher {
    pub fn new(listeners: Vec<Arc<dyn LifecycleListener>>) -> Self {
        let mut publisher = Self {
            listeners,
            error_handler: Arc::new(LoggingErrorHandler),
            current: None,
            environment: None,
            context: None,
        };
        publisher.sort_listeners();
        publisher
    }

    pub fn with_error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = handler;
        self
    }

    pub fn add_listener(&mut self, listener: Arc<dyn LifecycleListener>) {
        self.listeners.push(listener);
        self.sort_listeners();
    }

    // Stable: equal priorities keep registration order.
    fn sort_listeners(&mut self) {
        self.listeners.sort_by_key(|l| l.priority());
    }

    pub fn listener_names(&self) -> Vec<String> {
        self.listeners.iter().map(|l| l.name().to_string()).collect()
    }

    /// Last phase that was broadcast.
    pub fn current_phase(&self) -> Option<LifecyclePhase> {
        self.current
    }

    pub fn context(&self) -> Option<&Arc<ApplicationContext>> {
        self.context.as_ref()
    }

    pub async fn starting(&mut self) -> Result<(), LifecycleError> {
        self.advance(LifecyclePhase::Starting)?;
        self.broadcast(LifecyclePhase::Starting, None).await
    }

    pub async fn environment_prepared(&mut self, environment: Arc<Environment>) -> Result<(), LifecycleError> {
        self.advance(LifecyclePhase::EnvironmentPrepared)?;
        self.environment = Some(environment);
        self.broadcast(LifecyclePhase::EnvironmentPrepared, None).await
    }

    pub async fn context_prepared(&mut self, context: Arc<ApplicationContext>) -> Result<(), LifecycleError> {
        self.advance(LifecyclePhase::ContextPrepared)?;
        self.context = Some(context);
        self.broadcast(LifecyclePhase::ContextPrepared, None).await
    }

    pub async fn context_loaded(&mut self) -> Result<(), LifecycleError> {
        self.advance(LifecyclePhase::ContextLoaded)?;
        self.broadcast(LifecyclePhase::ContextLoaded, None).await
    }

    pub async fn started(&mut self) -> Result<(), LifecycleError> {
        self.advance(LifecyclePhase::Started)?;
        self.broadcast(LifecyclePhase::Started, None).await
    }

    pub async fn running(&mut self) -> Result<(), LifecycleError> {
        self.advance(LifecyclePhase::Running)?;
        self.broadcast(LifecyclePhase::Running, None).await
    }

    /// Delivers the single `Failed` notification. Listener errors are only
    /// logged so the caller keeps seeing the original failure.
    pub async fn failed(
        &mut self,
        context: Option<Arc<ApplicationContext>>,
        failure: Failure,
    ) -> Result<(), LifecycleError> {
        self.advance(LifecyclePhase::Failed)?;
        if context.is_some() {
            self.context = context;
        }
        log::error!("Application failed during {}: {}", failure.phase, failure.message);
        self.broadcast(LifecyclePhase::Failed, Some(failure)).await
    }

    fn advance(&mut self, to: LifecyclePhase) -> Result<(), LifecycleError> {
        let allowed = match to {
            LifecyclePhase::Failed => matches!(self.current, Some(current) if !current.is_terminal()),
            phase => self.current == phase.predecessor(),
        };
        if !allowed {
            return Err(LifecycleError::InvalidTransition {
                from: self.current,
                to,
            });
        }
        log::debug!("Lifecycle phase {}", to);
        self.current = Some(to);
        Ok(())
    }

    fn delivery(&self, phase: LifecyclePhase) -> Delivery {
        let context_active = self.context.as_ref().is_some_and(|c| c.is_active());
        if phase != LifecyclePhase::Failed && context_active {
            Delivery::Propagate
        } else {
            Delivery::Logged
        }
    }

    async fn broadcast(&self, phase: LifecyclePhase, failure: Option<Failure>) -> Result<(), LifecycleError> {
        let event = LifecycleEvent::new(phase, self.environment.clone(), self.context.clone(), failure);
        let delivery = self.delivery(phase);
        for listener in &self.listeners {
            if !listener.supports_phase(phase) {
                continue;
            }
            log::trace!("Notifying '{}' of {}", listener.name(), phase);
            if let Err(error) = listener.on_event(&event).await {
                match delivery {
                    Delivery::Logged => self.error_handler.handle(listener.name(), phase, &error),
                    Delivery::Propagate => {
                        return Err(LifecycleError::ListenerFailed {
                            listener: listener.name().to_string(),
                            phase,
                            source: error,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
