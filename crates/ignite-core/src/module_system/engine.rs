//! Drives one resolution run end to end.
//!
//! For every request taken off the work queue: resolve candidates, run the
//! filter pipeline, notify import listeners, evaluate conditions, and hand
//! the matches to the [`ImportGroup`]. A matched module whose manifest
//! imports another capability enqueues a nested request sited at that module.
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::condition::{ConditionContext, ConditionEvaluationReport, ConditionEvaluator};
use crate::context::ComponentRegistry;
use crate::environment::{Classpath, Environment};
use crate::kernel::error::Result;
use crate::module_system::candidate::{CandidateResolver, RequestSite, ResolutionRequest, ResolutionResult};
use crate::module_system::conflict::ConflictManager;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::filter::{FilterContext, FilterPipeline};
use crate::module_system::import_listener::{ImportEvent, ImportListener};
use crate::module_system::metadata::MetadataIndex;
use crate::module_system::ordering::{ImportGroup, OrderingHints, ResolutionEntry};
use crate::module_system::registry::FactoryRegistry;
use crate::module_system::traits::ConfigurationModule;

/// Ordered modules selected by a run, with the report explaining why.
pub struct Resolution {
    entries: Vec<ResolutionEntry>,
    modules: Vec<Box<dyn ConfigurationModule>>,
    report: ConditionEvaluationReport,
}

impl Resolution {
    pub fn entries(&self) -> &[ResolutionEntry] {
        &self.entries
    }

    pub fn module_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.module_id.clone()).collect()
    }

    pub fn report(&self) -> &ConditionEvaluationReport {
        &self.report
    }

    /// Entries paired with their module instances, in activation order.
    pub fn into_parts(
        self,
    ) -> (
        Vec<(ResolutionEntry, Box<dyn ConfigurationModule>)>,
        ConditionEvaluationReport,
    ) {
        (self.entries.into_iter().zip(self.modules).collect(), self.report)
    }
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

pub struct AutoConfigurationEngine<'a> {
    registry: &'a FactoryRegistry,
    environment: &'a Environment,
    classpath: &'a Classpath,
    index: Arc<MetadataIndex>,
    filters: FilterPipeline,
    import_listeners: Vec<Box<dyn ImportListener>>,
    evaluator: ConditionEvaluator,
}

impl<'a> AutoConfigurationEngine<'a> {
    /// Engine with the default filters followed by any registered ones.
    pub fn new(
        registry: &'a FactoryRegistry,
        environment: &'a Environment,
        classpath: &'a Classpath,
    ) -> Result<Self> {
        let mut filters = FilterPipeline::with_defaults();
        for filter in registry.instantiate_filters()? {
            filters.add_filter(filter);
        }
        Ok(Self {
            registry,
            environment,
            classpath,
            index: Arc::new(MetadataIndex::new()),
            filters,
            import_listeners: registry.instantiate_import_listeners()?,
            evaluator: ConditionEvaluator::new(),
        })
    }

    pub fn with_index(mut self, index: Arc<MetadataIndex>) -> Self {
        self.index = index;
        self
    }

    pub fn with_import_listener(mut self, listener: Box<dyn ImportListener>) -> Self {
        self.import_listeners.push(listener);
        self
    }

    pub fn filters(&self) -> &FilterPipeline {
        &self.filters
    }

    pub fn run(&self, requests: Vec<ResolutionRequest>, components: &ComponentRegistry) -> Result<Resolution> {
        let resolver = CandidateResolver::new(self.registry, self.environment);
        let filter_context = FilterContext {
            index: &self.index,
            environment: self.environment,
            classpath: self.classpath,
        };

        let mut queue: VecDeque<ResolutionRequest> = requests.into();
        let mut visited: HashSet<(RequestSite, String)> = HashSet::new();
        let mut group = ImportGroup::new();
        let mut report = ConditionEvaluationReport::new();
        let mut evaluated: HashMap<String, bool> = HashMap::new();
        let mut instances: HashMap<String, Box<dyn ConfigurationModule>> = HashMap::new();
        let mut listed: HashSet<String> = HashSet::new();
        let mut any_enabled = false;

        while let Some(request) = queue.pop_front() {
            if !visited.insert((request.site().clone(), request.capability().to_string())) {
                log::debug!(
                    "Skipping repeated request for '{}' from '{}'",
                    request.capability(),
                    request.site()
                );
                continue;
            }

            let result = resolver.resolve(&request)?;
            if !resolver.is_disabled(&request)? {
                any_enabled = true;
                listed.extend(self.registry.load_names(request.capability()));
            }
            report.record_exclusions(&result.exclusions);

            let filtered = self.filters.apply(result.candidates, &filter_context)?;
            for (id, filter) in &filtered.eliminated {
                report.record_filtered(id, filter);
            }

            let event = ImportEvent {
                site: request.site().clone(),
                candidates: filtered.survivors.clone(),
                exclusions: result.exclusions.clone(),
            };
            for listener in &self.import_listeners {
                listener.on_import(&event);
            }

            let mut matched = Vec::new();
            for id in &filtered.survivors {
                if let Some(&was_match) = evaluated.get(id) {
                    if was_match {
                        matched.push(id.clone());
                    }
                    continue;
                }

                let module = self.registry.instantiate_module(id)?;
                module.manifest().validate()?;
                let context = ConditionContext {
                    module_id: id,
                    environment: self.environment,
                    classpath: self.classpath,
                    components,
                };
                let outcome = self.evaluator.evaluate_all(&module.manifest().conditions, &context);
                let is_match = outcome.is_match();
                report.record_outcome(id, outcome);
                evaluated.insert(id.clone(), is_match);
                if !is_match {
                    continue;
                }

                if let Some(capability) = &module.manifest().imports {
                    log::debug!("Module '{}' imports '{}'", id, capability);
                    queue.push_back(ResolutionRequest::new(RequestSite::new(id.clone()), capability.clone()));
                }
                instances.insert(id.clone(), module);
                matched.push(id.clone());
            }

            group.process(
                request.site(),
                &ResolutionResult {
                    candidates: matched,
                    exclusions: result.exclusions,
                },
            );
        }

        if any_enabled {
            resolver.check_property_exclusions(&listed)?;
        }

        let hints: HashMap<String, OrderingHints> = group
            .entries()
            .iter()
            .filter_map(|entry| {
                let module = instances.get(&entry.module_id)?;
                Some((entry.module_id.clone(), OrderingHints::from(module.manifest())))
            })
            .collect();

        let mut conflicts = ConflictManager::new();
        let entries = group.select_imports(&hints, &mut conflicts)?;
        for conflict in conflicts.get_conflicts() {
            report.record_conflict(conflict.clone());
        }

        let mut modules = Vec::with_capacity(entries.len());
        for entry in &entries {
            let module = instances
                .remove(&entry.module_id)
                .ok_or_else(|| ModuleSystemError::InternalError {
                    message: format!("no instance for selected module '{}'", entry.module_id),
                })?;
            modules.push(module);
        }
        log::info!(
            "Resolved {} module(s): [{}]",
            entries.len(),
            entries
                .iter()
                .map(|e| e.module_id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Resolution {
            entries,
            modules,
            report,
        })
    }
}
