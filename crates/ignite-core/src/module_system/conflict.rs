/// Types of module conflicts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictType {
    /// Two modules are alternatives of the same exclusive group
    MutuallyExclusive,
}

/// Strategies for resolving module conflicts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// Keep the first module, drop the second
    DisableSecond,
}

/// Represents a conflict between two modules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleConflict {
    pub first_module: String,
    pub second_module: String,
    pub conflict_type: ConflictType,
    pub description: String,
    pub resolved: bool,
    pub resolution: Option<ResolutionStrategy>,
}

impl ModuleConflict {
    pub fn new(first_module: &str, second_module: &str, conflict_type: ConflictType, description: &str) -> Self {
        Self {
            first_module: first_module.to_string(),
            second_module: second_module.to_string(),
            conflict_type,
            description: description.to_string(),
            resolved: false,
            resolution: None,
        }
    }

    /// Mark this conflict as resolved with the given strategy
    pub fn resolve(&mut self, strategy: ResolutionStrategy) {
        self.resolved = true;
        self.resolution = Some(strategy);
    }
}

/// Records conflicts found while selecting modules and how they were resolved.
#[derive(Debug, Clone, Default)]
pub struct ConflictManager {
    conflicts: Vec<ModuleConflict>,
}

impl ConflictManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_conflict(&mut self, conflict: ModuleConflict) {
        self.conflicts.push(conflict);
    }

    pub fn get_conflicts(&self) -> &[ModuleConflict] {
        &self.conflicts
    }
}
