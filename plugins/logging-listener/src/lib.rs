//! # Ignite Logging Listener
//!
//! Lifecycle listener that owns the application's logging setup:
//!
//! * `Starting`: bridges `log` records into `tracing`;
//! * `EnvironmentPrepared`: reads the `logging.*` properties, installs the
//!   global subscriber and, if `logging.register-shutdown-hook` is true,
//!   the process shutdown hook;
//! * `ContextPrepared`: exposes the active [`LoggingSystem`] as a component;
//! * `Failed`: reports the failure and flushes.
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ignite_core::environment::{Environment, EnvironmentError};
use ignite_core::kernel::constants::REGISTER_SHUTDOWN_HOOK_PROPERTY;
use ignite_core::kernel::error::Result as KernelResult;
use ignite_core::lifecycle::{LifecycleEvent, LifecycleListener, LifecyclePhase, ListenerError, ShutdownHook};
use ignite_core::module_system::registry::FactoryRegistry;
use ignite_core::module_system::traits::ModulePriority;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;


/// Registry id of the listener factory.
pub const LISTENER_ID: &str = "logging";

/// Prefix of per-target level properties, e.g. `logging.level.ignite_core`.
pub const LEVEL_PREFIX: &str = "logging.level";

/// `text` (default) or `json`.
pub const FORMAT_PROPERTY: &str = "logging.format";

/// Component name under which the [`LoggingSystem`] is registered.
pub const LOGGING_SYSTEM_COMPONENT: &str = "loggingSystem";

const ROOT_TARGET: &str = "root";
const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(other.to_string()),
        }
    }
}

/// Logging configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub root_level: String,
    /// `(target, level)` overrides, sorted by target.
    pub targets: Vec<(String, String)>,
    pub format: LogFormat,
    pub register_shutdown_hook: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            root_level: "info".to_string(),
            targets: Vec::new(),
            format: LogFormat::Text,
            register_shutdown_hook: false,
        }
    }
}

impl LoggingSettings {
    /// The root level comes from `logging.level.root`, falling back to the
    /// `trace` / `debug` switches and then `info`.
    pub fn from_environment(environment: &Environment) -> Result<Self, EnvironmentError> {
        let mut settings = Self::default();
        if is_set(environment, "debug") {
            settings.root_level = "debug".to_string();
        }
        if is_set(environment, "trace") {
            settings.root_level = "trace".to_string();
        }

        for (target, level) in environment.properties_with_prefix(LEVEL_PREFIX) {
            let level = parse_level(&format!("{}.{}", LEVEL_PREFIX, target), &level)?;
            if target == ROOT_TARGET {
                settings.root_level = level;
            } else {
                settings.targets.push((target, level));
            }
        }

        if let Some(format) = environment.get_property(FORMAT_PROPERTY) {
            settings.format = format.parse().map_err(|value| EnvironmentError::InvalidValue {
                key: FORMAT_PROPERTY.to_string(),
                value,
                expected: "log format (text or json)",
            })?;
        }
        settings.register_shutdown_hook = environment.get_bool_or(REGISTER_SHUTDOWN_HOOK_PROPERTY, false)?;
        Ok(settings)
    }

    /// `EnvFilter` directives, e.g. `info,ignite_core=debug`.
    pub fn filter_directives(&self) -> String {
        std::iter::once(self.root_level.clone())
            .chain(self.targets.iter().map(|(target, level)| format!("{}={}", target, level)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn is_set(environment: &Environment, key: &str) -> bool {
    environment
        .get_property(key)
        .is_some_and(|value| !value.eq_ignore_ascii_case("false"))
}

fn parse_level(key: &str, value: &str) -> Result<String, EnvironmentError> {
    let level = value.trim().to_ascii_lowercase();
    if LEVELS.contains(&level.as_str()) {
        Ok(level)
    } else {
        Err(EnvironmentError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "log level",
        })
    }
}

/// What the listener set up, exposed to the application as a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSystem {
    pub settings: LoggingSettings,
    /// Whether this listener installed the global subscriber. `false` when
    /// another subscriber was already in place.
    pub subscriber_installed: bool,
}

#[derive(Debug, Default)]
pub struct LoggingListener {
    system: Mutex<Option<LoggingSystem>>,
}

impl LoggingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the listener factory under [`LISTENER_ID`].
    pub fn register(registry: &mut FactoryRegistry) -> KernelResult<()> {
        registry.register_listener(LISTENER_ID, || Arc::new(LoggingListener::new()) as Arc<dyn LifecycleListener>)
    }

    /// The logging system set up during `EnvironmentPrepared`, if any.
    pub fn system(&self) -> Option<LoggingSystem> {
        self.system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn initialize(&self, environment: &Environment) -> Result<(), ListenerError> {
        let settings = LoggingSettings::from_environment(environment).map_err(|e| ListenerError::new(e.to_string()))?;
        let subscriber_installed = install_subscriber(&settings);
        if subscriber_installed {
            log::debug!("Logging initialized with '{}'", settings.filter_directives());
        } else {
            log::debug!("A global subscriber is already set, keeping it");
        }

        if settings.register_shutdown_hook && ShutdownHook::register_once(|| log::logger().flush()) {
            log::debug!("Registered logging shutdown hook");
        }

        *self.system.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(LoggingSystem {
            settings,
            subscriber_installed,
        });
        Ok(())
    }

    async fn expose_system(&self, event: &LifecycleEvent) -> Result<(), ListenerError> {
        let (Some(context), Some(system)) = (event.context(), self.system()) else {
            return Ok(());
        };
        let mut components = context.components_mut().await;
        if components.contains_name(LOGGING_SYSTEM_COMPONENT) {
            return Ok(());
        }
        components
            .register_instance(LOGGING_SYSTEM_COMPONENT, system)
            .map_err(|e| ListenerError::new(e.to_string()))
    }

    fn clean_up(&self, event: &LifecycleEvent) {
        if let Some(failure) = event.failure() {
            log::error!("Application failed during {}: {}", failure.phase, failure.message);
        }
        log::logger().flush();
    }
}

/// Installs the `log` to `tracing` bridge. Only the first call per process
/// has any effect.
fn install_log_bridge() {
    if tracing_log::LogTracer::init().is_err() {
        log::trace!("log bridge already installed");
    }
}

fn install_subscriber(settings: &LoggingSettings) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.filter_directives()));
    let registry = tracing_subscriber::registry().with(filter);
    let result = match settings.format {
        LogFormat::Text => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().with_target(true).with_writer(std::io::stderr)),
        ),
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_writer(std::io::stderr)),
        ),
    };
    result.is_ok()
}

#[async_trait]
impl LifecycleListener for LoggingListener {
    fn name(&self) -> &str {
        LISTENER_ID
    }

    fn priority(&self) -> ModulePriority {
        ModulePriority::highest_plus(20)
    }

    fn supports_phase(&self, phase: LifecyclePhase) -> bool {
        matches!(
            phase,
            LifecyclePhase::Starting
                | LifecyclePhase::EnvironmentPrepared
                | LifecyclePhase::ContextPrepared
                | LifecyclePhase::Failed
        )
    }

    async fn on_event(&self, event: &LifecycleEvent) -> Result<(), ListenerError> {
        match event.phase() {
            LifecyclePhase::Starting => {
                install_log_bridge();
                Ok(())
            }
            LifecyclePhase::EnvironmentPrepared => match event.environment() {
                Some(environment) => self.initialize(environment),
                None => Err(ListenerError::new("environment missing from EnvironmentPrepared")),
            },
            LifecyclePhase::ContextPrepared => self.expose_system(event).await,
            LifecyclePhase::Failed => {
                self.clean_up(event);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
