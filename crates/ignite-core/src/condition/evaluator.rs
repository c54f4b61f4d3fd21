use std::path::Path;

use crate::condition::{Condition, ConditionContext, ConditionError, ConditionOutcome};
use crate::kernel::constants::group_selection_key;

/// Recursive interpreter for [`Condition`] trees.
///
/// Evaluation is read-only. Anything the evaluator cannot establish counts
/// as a no-match; predicates that report [`ConditionError::Indeterminate`]
/// produce an outcome flagged as indeterminate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// ANDs every condition of a module, stopping at the first no-match.
    pub fn evaluate_all(&self, conditions: &[Condition], context: &ConditionContext<'_>) -> ConditionOutcome {
        if conditions.is_empty() {
            return ConditionOutcome::unconditional();
        }
        let outcome = self.conjunction(conditions, context);
        if outcome.is_indeterminate() {
            log::warn!(
                "Conditions of module '{}' could not be determined, treating as no match: {}",
                context.module_id,
                outcome.reasons().join("; ")
            );
        } else {
            log::debug!("Conditions of module '{}': {}", context.module_id, outcome);
        }
        outcome
    }

    pub fn evaluate(&self, condition: &Condition, context: &ConditionContext<'_>) -> ConditionOutcome {
        match condition {
            Condition::OnClass { names } => {
                let missing = context.classpath.missing(names);
                if missing.is_empty() {
                    ConditionOutcome::matched(format!("found required libraries {}", quote(names)))
                } else {
                    ConditionOutcome::no_match(format!("did not find required libraries {}", quote(&missing)))
                }
            }
            Condition::OnMissingClass { names } => {
                let present: Vec<String> = names
                    .iter()
                    .filter(|n| context.classpath.contains(n))
                    .cloned()
                    .collect();
                if present.is_empty() {
                    ConditionOutcome::matched(format!("did not find unwanted libraries {}", quote(names)))
                } else {
                    ConditionOutcome::no_match(format!("found unwanted libraries {}", quote(&present)))
                }
            }
            Condition::OnLibraryVersion { library, range } => {
                match context.classpath.version_of(library) {
                    Some(version) if range.includes(version) => ConditionOutcome::matched(format!(
                        "library '{}' version {} satisfies {}",
                        library, version, range
                    )),
                    Some(version) => ConditionOutcome::no_match(format!(
                        "library '{}' version {} does not satisfy {}",
                        library, version, range
                    )),
                    None if context.classpath.contains(library) => ConditionOutcome::no_match(format!(
                        "library '{}' is present but its version is unknown",
                        library
                    )),
                    None => ConditionOutcome::no_match(format!("library '{}' is not present", library)),
                }
            }
            Condition::OnComponent(query) => {
                if query.is_empty() {
                    return ConditionOutcome::no_match("no component names or types to look for");
                }
                let absent = query.absent_from(context.components);
                if absent.is_empty() {
                    ConditionOutcome::matched(format!("found components {}", quote(&query.present_in(context.components))))
                } else {
                    ConditionOutcome::no_match(format!("did not find components {}", quote(&absent)))
                }
            }
            Condition::OnMissingComponent(query) => {
                if query.is_empty() {
                    return ConditionOutcome::no_match("no component names or types to look for");
                }
                let present = query.present_in(context.components);
                if present.is_empty() {
                    ConditionOutcome::matched("found no conflicting components")
                } else {
                    ConditionOutcome::no_match(format!("found components {}", quote(&present)))
                }
            }
            Condition::OnProperty {
                name,
                having_value,
                match_if_missing,
            } => match (context.environment.get_property(name), having_value) {
                (None, _) if *match_if_missing => {
                    ConditionOutcome::matched(format!("property '{}' is not set (matches if missing)", name))
                }
                (None, _) => ConditionOutcome::no_match(format!("property '{}' is not set", name)),
                (Some(value), Some(expected)) if value.eq_ignore_ascii_case(expected) => {
                    ConditionOutcome::matched(format!("property '{}' has value '{}'", name, expected))
                }
                (Some(value), Some(expected)) => ConditionOutcome::no_match(format!(
                    "property '{}' is '{}', expected '{}'",
                    name, value, expected
                )),
                (Some(value), None) if value.eq_ignore_ascii_case("false") => {
                    ConditionOutcome::no_match(format!("property '{}' is false", name))
                }
                (Some(_), None) => ConditionOutcome::matched(format!("property '{}' is set", name)),
            },
            Condition::OnResource { locations } => self.evaluate_resources(locations, context),
            Condition::SelectedAlternative { group, alias } => {
                let key = group_selection_key(group);
                match context.environment.get_property(&key) {
                    None => ConditionOutcome::matched(format!("automatic selection for group '{}'", group)),
                    Some(selected) if selected.eq_ignore_ascii_case(alias) => {
                        ConditionOutcome::matched(format!("'{}' selected by {}", alias, key))
                    }
                    Some(selected) => ConditionOutcome::no_match(format!(
                        "'{}' is selected by {}, not '{}'",
                        selected, key, alias
                    )),
                }
            }
            Condition::All { conditions } => {
                if conditions.is_empty() {
                    ConditionOutcome::matched("empty conjunction")
                } else {
                    self.conjunction(conditions, context)
                }
            }
            Condition::Any { conditions } => self.disjunction(conditions, context),
            Condition::Not { condition } => {
                let inner = self.evaluate(condition, context);
                if inner.is_indeterminate() {
                    return inner;
                }
                let matched = !inner.is_match();
                ConditionOutcome::from_parts(
                    matched,
                    false,
                    inner.reasons().iter().map(|r| format!("not ({})", r)).collect(),
                )
            }
            Condition::Custom(predicate) => match predicate.evaluate(context) {
                Ok(outcome) => outcome,
                Err(ConditionError::Indeterminate { reason }) => ConditionOutcome::indeterminate(reason),
                Err(other) => ConditionOutcome::indeterminate(other.to_string()),
            },
        }
    }

    fn conjunction(&self, conditions: &[Condition], context: &ConditionContext<'_>) -> ConditionOutcome {
        let mut reasons = Vec::new();
        for condition in conditions {
            let outcome = self.evaluate(condition, context);
            reasons.extend(outcome.reasons().iter().cloned());
            if !outcome.is_match() {
                return ConditionOutcome::from_parts(false, outcome.is_indeterminate(), reasons);
            }
        }
        ConditionOutcome::from_parts(true, false, reasons)
    }

    fn disjunction(&self, conditions: &[Condition], context: &ConditionContext<'_>) -> ConditionOutcome {
        if conditions.is_empty() {
            return ConditionOutcome::no_match("empty disjunction");
        }
        let mut reasons = Vec::new();
        let mut indeterminate = false;
        for condition in conditions {
            let outcome = self.evaluate(condition, context);
            if outcome.is_match() {
                return outcome;
            }
            indeterminate |= outcome.is_indeterminate();
            reasons.extend(outcome.reasons().iter().cloned());
        }
        ConditionOutcome::from_parts(false, indeterminate, reasons)
    }

    fn evaluate_resources(&self, locations: &[String], context: &ConditionContext<'_>) -> ConditionOutcome {
        if locations.is_empty() {
            return ConditionOutcome::no_match("no resource locations given");
        }
        let mut missing = Vec::new();
        for location in locations {
            match context.environment.resolve_placeholders(location) {
                Ok(resolved) if Path::new(&resolved).exists() => {}
                Ok(resolved) => missing.push(resolved),
                Err(e) => {
                    return ConditionOutcome::no_match(format!("resource location '{}': {}", location, e));
                }
            }
        }
        if missing.is_empty() {
            ConditionOutcome::matched(format!("found resources {}", quote(locations)))
        } else {
            ConditionOutcome::no_match(format!("did not find resources {}", quote(&missing)))
        }
    }
}

fn quote(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("'{}'", i))
        .collect::<Vec<_>>()
        .join(", ")
}
