//! # Ignite Core Application Bootstrap
//!
//! [`Application`] ties the pieces together for one run:
//!
//! 1. instantiate the registered lifecycle listeners and publish `Starting`;
//! 2. publish `EnvironmentPrepared`, create the [`ApplicationContext`],
//!    publish `ContextPrepared` and `ContextLoaded`;
//! 3. refresh: resolve modules with the [`AutoConfigurationEngine`] and call
//!    `configure` on each in order, then mark the context active;
//! 4. publish `Started` and `Running`.
//!
//! Any error after `Starting` is delivered once as `Failed`, the context is
//! closed, and the error is returned wrapped in [`Error::RunFailed`].
use std::any::Any;
use std::sync::Arc;

use crate::condition::ConditionEvaluationReport;
use crate::context::{ApplicationContext, ComponentRegistry};
use crate::environment::{Classpath, Environment};
use crate::kernel::constants::APP_NAME;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::lifecycle::error_handler::{ErrorHandler, LoggingErrorHandler};
use crate::lifecycle::listener::LifecycleListener;
use crate::lifecycle::{Failure, LifecyclePhase, LifecyclePublisher};
use crate::module_system::candidate::{RequestSite, ResolutionRequest};
use crate::module_system::engine::AutoConfigurationEngine;
use crate::module_system::metadata::MetadataIndex;
use crate::module_system::ordering::ResolutionEntry;
use crate::module_system::registry::FactoryRegistry;

/// Outcome of a successful run.
#[derive(Debug)]
pub struct ApplicationRun {
    context: Arc<ApplicationContext>,
    report: ConditionEvaluationReport,
}

impl ApplicationRun {
    pub fn context(&self) -> &Arc<ApplicationContext> {
        &self.context
    }

    pub fn report(&self) -> &ConditionEvaluationReport {
        &self.report
    }

    pub async fn activated_modules(&self) -> Vec<ResolutionEntry> {
        self.context.activated_modules().await
    }

    pub async fn activated_module_ids(&self) -> Vec<String> {
        self.context.activated_module_ids().await
    }

    /// Closes the context, dropping components in reverse order.
    pub async fn close(&self) -> Vec<String> {
        self.context.close().await
    }
}

pub struct Application {
    name: String,
    registry: FactoryRegistry,
    environment: Environment,
    classpath: Classpath,
    components: Option<ComponentRegistry>,
    requests: Vec<ResolutionRequest>,
    listeners: Vec<Arc<dyn LifecycleListener>>,
    error_handler: Arc<dyn ErrorHandler>,
    metadata_index: Option<Arc<MetadataIndex>>,
    has_run: bool,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("environment", &self.environment)
            .field("requests", &self.requests)
            .field("has_run", &self.has_run)
            .finish_non_exhaustive()
    }
}

impl Application {
    pub fn builder(name: impl Into<String>) -> ApplicationBuilder {
        ApplicationBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &FactoryRegistry {
        &self.registry
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Runs the full lifecycle. An application runs at most once.
    pub async fn run(&mut self) -> Result<ApplicationRun> {
        if self.has_run {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Run,
                message: format!("Application '{}' has already been run", self.name),
                source: None,
            });
        }
        self.has_run = true;
        log::info!("Starting {} application '{}'", APP_NAME, self.name);

        let mut listeners = self.registry.instantiate_listeners()?;
        listeners.extend(self.listeners.iter().cloned());
        let mut publisher = LifecyclePublisher::new(listeners).with_error_handler(Arc::clone(&self.error_handler));
        publisher.starting().await?;

        let components = self.components.take().unwrap_or_default();
        let mut context = None;
        match self.drive(&mut publisher, components, &mut context).await {
            Ok(run) => {
                log::info!("Application '{}' is running", self.name);
                Ok(run)
            }
            Err(error) => Err(self.handle_failure(&mut publisher, context, error).await),
        }
    }

    async fn drive(
        &self,
        publisher: &mut LifecyclePublisher,
        components: ComponentRegistry,
        context_slot: &mut Option<Arc<ApplicationContext>>,
    ) -> Result<ApplicationRun> {
        let environment = Arc::new(self.environment.clone());
        publisher.environment_prepared(Arc::clone(&environment)).await?;

        let context = Arc::new(ApplicationContext::new(
            self.name.clone(),
            Arc::clone(&environment),
            components,
        ));
        *context_slot = Some(Arc::clone(&context));
        publisher.context_prepared(Arc::clone(&context)).await?;
        publisher.context_loaded().await?;

        let report = self.refresh(&context, &environment).await?;
        context.mark_active()?;

        publisher.started().await?;
        publisher.running().await?;
        Ok(ApplicationRun { context, report })
    }

    /// Resolves modules and configures them in activation order.
    async fn refresh(
        &self,
        context: &Arc<ApplicationContext>,
        environment: &Environment,
    ) -> Result<ConditionEvaluationReport> {
        let mut engine = AutoConfigurationEngine::new(&self.registry, environment, &self.classpath)?;
        if let Some(index) = &self.metadata_index {
            engine = engine.with_index(Arc::clone(index));
        }

        let mut components = context.components_mut().await;
        let resolution = engine.run(self.requests.clone(), &components)?;
        let (modules, report) = resolution.into_parts();
        for (entry, module) in modules {
            log::info!("Configuring module '{}' (from '{}')", entry.module_id, entry.site);
            module
                .configure(&mut components, environment)
                .map_err(|e| Error::ModuleConfiguration {
                    module_id: entry.module_id.clone(),
                    message: e.to_string(),
                })?;
            context.record_activation(entry).await;
        }
        Ok(report)
    }

    async fn handle_failure(
        &self,
        publisher: &mut LifecyclePublisher,
        context: Option<Arc<ApplicationContext>>,
        error: Error,
    ) -> Error {
        let phase = publisher.current_phase().unwrap_or(LifecyclePhase::Starting);
        if phase == LifecyclePhase::Running {
            log::error!(
                "Lifecycle listener failed after '{}' reached {}: {}",
                self.name,
                phase,
                error
            );
        } else if let Err(e) = publisher
            .failed(context.clone(), Failure::new(phase, error.to_string()))
            .await
        {
            log::warn!("Could not publish failure of '{}': {}", self.name, e);
        }
        if let Some(context) = context {
            context.close().await;
        }
        Error::RunFailed {
            phase,
            source: Box::new(error),
        }
    }
}

/// Builder for [`Application`].
pub struct ApplicationBuilder {
    name: String,
    registry: FactoryRegistry,
    environment: Environment,
    classpath: Classpath,
    components: ComponentRegistry,
    requests: Vec<ResolutionRequest>,
    excludes: Vec<String>,
    listeners: Vec<Arc<dyn LifecycleListener>>,
    error_handler: Arc<dyn ErrorHandler>,
    metadata_index: Option<Arc<MetadataIndex>>,
    pending_error: Option<Error>,
}

impl ApplicationBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: FactoryRegistry::new(),
            environment: Environment::new(),
            classpath: Classpath::new(),
            components: ComponentRegistry::new(),
            requests: Vec::new(),
            excludes: Vec::new(),
            listeners: Vec::new(),
            error_handler: Arc::new(LoggingErrorHandler),
            metadata_index: None,
            pending_error: None,
        }
    }

    pub fn registry(mut self, registry: FactoryRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn classpath(mut self, classpath: Classpath) -> Self {
        self.classpath = classpath;
        self
    }

    /// Pre-registers a component visible to module conditions.
    pub fn component<T: Any + Send + Sync>(mut self, name: &str, instance: T) -> Self {
        if let Err(e) = self.components.register_instance(name, instance) {
            self.pending_error.get_or_insert(e);
        }
        self
    }

    /// Adds an explicit resolution request. Without any, the application
    /// resolves the auto-configuration capability from a site named after it.
    pub fn request(mut self, request: ResolutionRequest) -> Self {
        self.requests.push(request);
        self
    }

    /// By-name exclude for the default request.
    pub fn exclude(mut self, id: impl Into<String>) -> Self {
        self.excludes.push(id.into());
        self
    }

    pub fn listener(mut self, listener: Arc<dyn LifecycleListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = handler;
        self
    }

    pub fn metadata_index(mut self, index: Arc<MetadataIndex>) -> Self {
        self.metadata_index = Some(index);
        self
    }

    pub fn build(self) -> Result<Application> {
        if let Some(error) = self.pending_error {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Bootstrap,
                message: format!("Failed to build application '{}'", self.name),
                source: Some(Box::new(error)),
            });
        }
        let mut requests = self.requests;
        if requests.is_empty() {
            let mut default = ResolutionRequest::auto_configuration(RequestSite::new(self.name.clone()));
            for id in self.excludes {
                default = default.exclude_name(id);
            }
            requests.push(default);
        } else if !self.excludes.is_empty() {
            log::warn!("Excludes given to '{}' are ignored when explicit requests are set", self.name);
        }
        Ok(Application {
            name: self.name,
            registry: self.registry,
            environment: self.environment,
            classpath: self.classpath,
            components: Some(self.components),
            requests,
            listeners: self.listeners,
            error_handler: self.error_handler,
            metadata_index: self.metadata_index,
            has_run: false,
        })
    }
}
