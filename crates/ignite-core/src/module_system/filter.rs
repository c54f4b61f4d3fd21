//! Cheap import filters run before condition evaluation.
//!
//! Every filter sees the whole candidate array and answers with one boolean
//! per slot. Slots already emptied by an earlier filter are `None`; whatever
//! a filter answers for them is ignored.
use crate::environment::{Classpath, Environment};
use crate::kernel::constants::group_selection_key;
use crate::kernel::error::Result;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::metadata::MetadataIndex;

pub struct FilterContext<'a> {
    pub index: &'a MetadataIndex,
    pub environment: &'a Environment,
    pub classpath: &'a Classpath,
}

pub trait ImportFilter: Send + Sync {
    fn name(&self) -> &str;

    /// One entry per candidate slot, `false` eliminating the candidate.
    fn matches(&self, candidates: &[Option<&str>], context: &FilterContext<'_>) -> Vec<bool>;
}

/// Eliminates candidates whose indexed class requirements are missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnClassFilter;

impl ImportFilter for OnClassFilter {
    fn name(&self) -> &str {
        "OnClassFilter"
    }

    fn matches(&self, candidates: &[Option<&str>], context: &FilterContext<'_>) -> Vec<bool> {
        candidates
            .iter()
            .map(|slot| match slot.and_then(|id| context.index.get(id)) {
                Some(hints) => hints.on_class.iter().all(|name| context.classpath.contains(name)),
                None => true,
            })
            .collect()
    }
}

/// Eliminates members of an exclusive group whose alias differs from the
/// group's selection property. Groups without a selection are left alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExclusiveGroupFilter;

impl ImportFilter for ExclusiveGroupFilter {
    fn name(&self) -> &str {
        "ExclusiveGroupFilter"
    }

    fn matches(&self, candidates: &[Option<&str>], context: &FilterContext<'_>) -> Vec<bool> {
        candidates
            .iter()
            .map(|slot| {
                let Some(group) = slot
                    .and_then(|id| context.index.get(id))
                    .and_then(|hints| hints.group.as_ref())
                else {
                    return true;
                };
                match context.environment.get_property(&group_selection_key(&group.name)) {
                    Some(selected) => selected.eq_ignore_ascii_case(&group.alias),
                    None => true,
                }
            })
            .collect()
    }
}

/// Survivors of a pipeline run plus `(module id, filter name)` for every
/// elimination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub survivors: Vec<String>,
    pub eliminated: Vec<(String, String)>,
}

/// Ordered chain of independent [`ImportFilter`]s.
#[derive(Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn ImportFilter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Class presence first, then exclusive groups.
    pub fn with_defaults() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_filter(Box::new(OnClassFilter));
        pipeline.add_filter(Box::new(ExclusiveGroupFilter));
        pipeline
    }

    pub fn add_filter(&mut self, filter: Box<dyn ImportFilter>) {
        self.filters.push(filter);
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn apply(&self, candidates: Vec<String>, context: &FilterContext<'_>) -> Result<FilterOutcome> {
        let mut slots: Vec<Option<String>> = candidates.into_iter().map(Some).collect();
        let mut eliminated = Vec::new();

        for filter in &self.filters {
            let results = {
                let view: Vec<Option<&str>> = slots.iter().map(|s| s.as_deref()).collect();
                filter.matches(&view, context)
            };
            if results.len() != slots.len() {
                return Err(ModuleSystemError::FilterContract {
                    filter: filter.name().to_string(),
                    expected: slots.len(),
                    actual: results.len(),
                }
                .into());
            }
            for (slot, keep) in slots.iter_mut().zip(results) {
                if keep {
                    continue;
                }
                if let Some(id) = slot.take() {
                    log::debug!("Candidate '{}' eliminated by {}", id, filter.name());
                    eliminated.push((id, filter.name().to_string()));
                }
            }
        }

        Ok(FilterOutcome {
            survivors: slots.into_iter().flatten().collect(),
            eliminated,
        })
    }
}
