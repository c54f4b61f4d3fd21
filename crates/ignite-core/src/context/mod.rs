//! # Ignite Core Application Context
//!
//! The [`ApplicationContext`] holds the components registered by the user and
//! by activated configuration modules, plus the record of which modules were
//! activated and from which request site.
pub mod component;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::environment::Environment;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::module_system::ordering::ResolutionEntry;

pub use component::{ComponentEntry, ComponentRegistry};

pub struct ApplicationContext {
    id: String,
    environment: Arc<Environment>,
    components: RwLock<ComponentRegistry>,
    activated: RwLock<Vec<ResolutionEntry>>,
    active: AtomicBool,
    closed: AtomicBool,
}

impl std::fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl ApplicationContext {
    pub fn new(id: impl Into<String>, environment: Arc<Environment>, components: ComponentRegistry) -> Self {
        Self {
            id: id.into(),
            environment,
            components: RwLock::new(components),
            activated: RwLock::new(Vec::new()),
            active: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.environment
    }

    /// True once every activated module has been configured, until close.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub async fn components(&self) -> RwLockReadGuard<'_, ComponentRegistry> {
        self.components.read().await
    }

    pub async fn components_mut(&self) -> RwLockWriteGuard<'_, ComponentRegistry> {
        self.components.write().await
    }

    pub async fn record_activation(&self, entry: ResolutionEntry) {
        self.activated.write().await.push(entry);
    }

    /// Activated modules in activation order.
    pub async fn activated_modules(&self) -> Vec<ResolutionEntry> {
        self.activated.read().await.clone()
    }

    pub async fn activated_module_ids(&self) -> Vec<String> {
        self.activated
            .read()
            .await
            .iter()
            .map(|e| e.module_id.clone())
            .collect()
    }

    pub fn mark_active(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Run,
                message: format!("Context '{}' is closed and cannot become active", self.id),
                source: None,
            });
        }
        self.active.store(true, Ordering::Release);
        Ok(())
    }

    /// Drops all components in reverse registration order and returns their
    /// names in drop order. A second call is a no-op.
    pub async fn close(&self) -> Vec<String> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Vec::new();
        }
        self.active.store(false, Ordering::Release);
        let drained = self.components.write().await.drain_reverse();
        let mut dropped = Vec::with_capacity(drained.len());
        for entry in drained {
            log::debug!("Closing component '{}'", entry.name());
            dropped.push(entry.name().to_string());
            drop(entry);
        }
        log::info!("Closed application context '{}'", self.id);
        dropped
    }
}
