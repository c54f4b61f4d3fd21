use std::collections::HashSet;
use std::fmt;

use crate::environment::Environment;
use crate::kernel::constants::{AUTO_CONFIGURATION_CAPABILITY, ENABLED_PROPERTY, EXCLUDE_PROPERTY};
use crate::kernel::error::Result;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::registry::FactoryRegistry;

/// Where a resolution request originated: the application itself or a
/// module whose manifest imports another capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestSite {
    name: String,
}

impl RequestSite {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RequestSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One request to resolve the candidates listed under a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    site: RequestSite,
    capability: String,
    exclude: Vec<String>,
    exclude_names: Vec<String>,
}

impl ResolutionRequest {
    pub fn new(site: RequestSite, capability: impl Into<String>) -> Self {
        Self {
            site,
            capability: capability.into(),
            exclude: Vec::new(),
            exclude_names: Vec::new(),
        }
    }

    /// Request for the auto-configuration capability.
    pub fn auto_configuration(site: RequestSite) -> Self {
        Self::new(site, AUTO_CONFIGURATION_CAPABILITY)
    }

    /// Exclude a module declared alongside the request.
    pub fn exclude(mut self, id: impl Into<String>) -> Self {
        self.exclude.push(id.into());
        self
    }

    /// Exclude a module given by name, e.g. on the command line.
    pub fn exclude_name(mut self, name: impl Into<String>) -> Self {
        self.exclude_names.push(name.into());
        self
    }

    pub fn site(&self) -> &RequestSite {
        &self.site
    }

    pub fn capability(&self) -> &str {
        &self.capability
    }
}

/// Candidates left after exclusions, and the exclusions themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
    pub candidates: Vec<String>,
    pub exclusions: Vec<String>,
}

impl ResolutionResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Turns a [`ResolutionRequest`] into a deduplicated candidate list with
/// every exclusion applied.
pub struct CandidateResolver<'a> {
    registry: &'a FactoryRegistry,
    environment: &'a Environment,
}

impl<'a> CandidateResolver<'a> {
    pub fn new(registry: &'a FactoryRegistry, environment: &'a Environment) -> Self {
        Self { registry, environment }
    }

    /// True when the request targets auto-configuration and the enabled
    /// property switches it off.
    pub fn is_disabled(&self, request: &ResolutionRequest) -> Result<bool> {
        Ok(request.capability == AUTO_CONFIGURATION_CAPABILITY
            && !self.environment.get_bool_or(ENABLED_PROPERTY, true)?)
    }

    pub fn resolve(&self, request: &ResolutionRequest) -> Result<ResolutionResult> {
        if self.is_disabled(request)? {
            log::info!(
                "Auto-configuration disabled by '{}', skipping request from '{}'",
                ENABLED_PROPERTY,
                request.site
            );
            return Ok(ResolutionResult::empty());
        }

        let listed = self.registry.load_names(&request.capability);
        if listed.is_empty() {
            return Err(ModuleSystemError::NoCandidates {
                capability: request.capability.clone(),
            }
            .into());
        }
        let candidates = dedup(listed);
        let declared = dedup(request.exclude.iter().chain(request.exclude_names.iter()).cloned());
        self.check_excluded(&declared, |id| candidates.contains(id))?;

        let exclusions = dedup(declared.into_iter().chain(self.property_exclusions()));
        let excluded: HashSet<&String> = exclusions.iter().collect();
        let candidates: Vec<String> = candidates
            .into_iter()
            .filter(|id| !excluded.contains(id))
            .collect();
        log::debug!(
            "Resolved {} candidate(s) for '{}' from '{}' ({} excluded)",
            candidates.len(),
            request.capability,
            request.site,
            exclusions.len()
        );
        Ok(ResolutionResult { candidates, exclusions })
    }

    /// Ids bound to the exclude property. They apply to every request of a
    /// run, so they are validated once against all listed candidates with
    /// [`check_property_exclusions`](Self::check_property_exclusions).
    pub fn property_exclusions(&self) -> Vec<String> {
        self.environment.get_list(EXCLUDE_PROPERTY)
    }

    /// Fails if the exclude property names a resolvable module that no
    /// request of the run listed.
    pub fn check_property_exclusions(&self, listed: &HashSet<String>) -> Result<()> {
        self.check_excluded(&self.property_exclusions(), |id| listed.contains(id))
    }

    fn check_excluded(&self, exclusions: &[String], is_candidate: impl Fn(&String) -> bool) -> Result<()> {
        let invalid: Vec<String> = exclusions
            .iter()
            .filter(|id| self.registry.is_resolvable(id) && !is_candidate(id))
            .cloned()
            .collect();
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ModuleSystemError::InvalidExcludes { ids: invalid }.into())
        }
    }
}

fn dedup<I: IntoIterator<Item = String>>(ids: I) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
