use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::lifecycle::error::ListenerError;
use crate::lifecycle::{LifecycleEvent, LifecyclePhase};
use crate::module_system::traits::ModulePriority;

/// Observer of lifecycle phase transitions.
///
/// Listeners are invoked one at a time, in ascending [`priority`](Self::priority)
/// with ties kept in registration order.
#[async_trait]
pub trait LifecycleListener: Send + Sync {
    fn name(&self) -> &str;

    fn priority(&self) -> ModulePriority {
        ModulePriority::DEFAULT
    }

    fn supports_phase(&self, _phase: LifecyclePhase) -> bool {
        true
    }

    async fn on_event(&self, event: &LifecycleEvent) -> Result<(), ListenerError>;
}

type Handler = Box<dyn Fn(&LifecycleEvent) -> Result<(), ListenerError> + Send + Sync>;

/// Listener backed by a synchronous closure.
pub struct FnListener {
    name: String,
    priority: ModulePriority,
    phases: Option<Vec<LifecyclePhase>>,
    handler: Handler,
}

impl FnListener {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&LifecycleEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            priority: ModulePriority::DEFAULT,
            phases: None,
            handler: Box::new(handler),
        }
    }

    pub fn with_priority(mut self, priority: ModulePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Restrict the listener to the given phases.
    pub fn for_phases(mut self, phases: &[LifecyclePhase]) -> Self {
        self.phases = Some(phases.to_vec());
        self
    }
}

impl fmt::Debug for FnListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("phases", &self.phases)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LifecycleListener for FnListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> ModulePriority {
        self.priority
    }

    fn supports_phase(&self, phase: LifecyclePhase) -> bool {
        self.phases.as_ref().is_none_or(|phases| phases.contains(&phase))
    }

    async fn on_event(&self, event: &LifecycleEvent) -> Result<(), ListenerError> {
        (self.handler)(event)
    }
}

/// Wraps a closure as a shared listener for every phase.
pub fn sync_listener<F>(name: impl Into<String>, handler: F) -> Arc<dyn LifecycleListener>
where
    F: Fn(&LifecycleEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    Arc::new(FnListener::new(name, handler))
}
