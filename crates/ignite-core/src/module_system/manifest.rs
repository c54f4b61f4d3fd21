use serde::{Deserialize, Serialize};

use crate::condition::{Condition, ConditionError};
use crate::module_system::metadata::ModuleHints;
use crate::module_system::traits::ModulePriority;

/// Membership in a set of mutually exclusive alternatives, e.g. the
/// `redis` member of the `cache-backend` group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExclusiveGroup {
    pub name: String,
    pub alias: String,
}

impl ExclusiveGroup {
    pub fn new(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
        }
    }
}

/// Declarative description of a configuration module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub priority: Option<ModulePriority>,
    /// Ids this module must be activated before.
    #[serde(default)]
    pub before: Vec<String>,
    /// Ids this module must be activated after.
    #[serde(default)]
    pub after: Vec<String>,
    #[serde(default)]
    pub group: Option<ExclusiveGroup>,
    /// Capability resolved as a nested request when this module matches.
    #[serde(default)]
    pub imports: Option<String>,
}

impl ModuleManifest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            conditions: Vec::new(),
            priority: None,
            before: Vec::new(),
            after: Vec::new(),
            group: None,
            imports: None,
        }
    }

    pub fn builder(id: impl Into<String>) -> ManifestBuilder {
        ManifestBuilder::new(id)
    }

    /// Libraries the module is known to require without evaluating it.
    pub fn class_requirements(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.conditions.iter().flat_map(|c| c.required_classes()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// The cheap subset of this manifest kept in the metadata index.
    pub fn hints(&self) -> ModuleHints {
        ModuleHints {
            on_class: self.class_requirements(),
            group: self.group.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConditionError> {
        if self.id.trim().is_empty() {
            return Err(ConditionError::Invalid {
                module_id: self.id.clone(),
                message: "module id must not be empty".to_string(),
            });
        }
        self.conditions.iter().try_for_each(|c| c.validate(&self.id))
    }
}

/// Builder for creating module manifests
pub struct ManifestBuilder {
    manifest: ModuleManifest,
}

impl ManifestBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            manifest: ModuleManifest::new(id),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.manifest.description = description.to_string();
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.manifest.conditions.push(condition);
        self
    }

    pub fn priority(mut self, priority: ModulePriority) -> Self {
        self.manifest.priority = Some(priority);
        self
    }

    pub fn before(mut self, id: &str) -> Self {
        self.manifest.before.push(id.to_string());
        self
    }

    pub fn after(mut self, id: &str) -> Self {
        self.manifest.after.push(id.to_string());
        self
    }

    pub fn group(mut self, name: &str, alias: &str) -> Self {
        self.manifest.group = Some(ExclusiveGroup::new(name, alias));
        self
    }

    pub fn imports(mut self, capability: &str) -> Self {
        self.manifest.imports = Some(capability.to_string());
        self
    }

    pub fn build(self) -> ModuleManifest {
        self.manifest
    }
}
