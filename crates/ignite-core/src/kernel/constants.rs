//! Well-known names shared by the registry, the environment and the lifecycle.

/// Application name
pub const APP_NAME: &str = "Ignite";

/// Capability under which auto-configuration modules are registered.
pub const AUTO_CONFIGURATION_CAPABILITY: &str = "ignite.autoconfigure.EnableAutoConfiguration";

/// Capability listing lifecycle listeners to instantiate for each run.
pub const LIFECYCLE_LISTENER_CAPABILITY: &str = "ignite.lifecycle.LifecycleListener";

/// Capability listing additional import filters.
pub const IMPORT_FILTER_CAPABILITY: &str = "ignite.autoconfigure.ImportFilter";

/// Capability listing import listeners.
pub const IMPORT_LISTENER_CAPABILITY: &str = "ignite.autoconfigure.ImportListener";

/// Comma separated (or sequence) list of module ids to exclude.
pub const EXCLUDE_PROPERTY: &str = "ignite.autoconfigure.exclude";

/// Turns auto-configuration off entirely when `false`.
pub const ENABLED_PROPERTY: &str = "ignite.autoconfigure.enabled";

/// Prefix of the per-group alternative selection properties.
pub const GROUP_SELECTION_PREFIX: &str = "ignite.group";

/// Whether the logging listener installs the process shutdown hook.
pub const REGISTER_SHUTDOWN_HOOK_PROPERTY: &str = "logging.register-shutdown-hook";

/// Property key selecting the alternative of an exclusive group,
/// e.g. `ignite.group.cache-backend`.
pub fn group_selection_key(group: &str) -> String {
    format!("{}.{}", GROUP_SELECTION_PREFIX, group)
}
