use std::fmt::Write as _;

use crate::condition::ConditionOutcome;
use crate::module_system::conflict::ModuleConflict;

/// A candidate removed by a filter before its conditions were evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredCandidate {
    pub module_id: String,
    pub filter: String,
}

/// Everything the engine decided during one resolution run: condition
/// outcomes per module, exclusions, filter eliminations and group conflicts.
#[derive(Debug, Clone, Default)]
pub struct ConditionEvaluationReport {
    outcomes: Vec<(String, ConditionOutcome)>,
    exclusions: Vec<String>,
    filtered: Vec<FilteredCandidate>,
    conflicts: Vec<ModuleConflict>,
}

impl ConditionEvaluationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_outcome(&mut self, module_id: &str, outcome: ConditionOutcome) {
        self.outcomes.push((module_id.to_string(), outcome));
    }

    pub fn record_exclusions(&mut self, exclusions: &[String]) {
        for id in exclusions {
            if !self.exclusions.contains(id) {
                self.exclusions.push(id.clone());
            }
        }
    }

    pub fn record_filtered(&mut self, module_id: &str, filter: &str) {
        self.filtered.push(FilteredCandidate {
            module_id: module_id.to_string(),
            filter: filter.to_string(),
        });
    }

    pub fn record_conflict(&mut self, conflict: ModuleConflict) {
        self.conflicts.push(conflict);
    }

    pub fn outcome_for(&self, module_id: &str) -> Option<&ConditionOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == module_id)
            .map(|(_, outcome)| outcome)
    }

    pub fn outcomes(&self) -> &[(String, ConditionOutcome)] {
        &self.outcomes
    }

    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }

    pub fn filtered(&self) -> &[FilteredCandidate] {
        &self.filtered
    }

    pub fn conflicts(&self) -> &[ModuleConflict] {
        &self.conflicts
    }

    pub fn matched_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.is_match())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn unmatched_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_match())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Plain-text rendering used by the CLI's `--report`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "CONDITIONS EVALUATION REPORT");
        let _ = writeln!(out, "============================");

        let _ = writeln!(out, "\nPositive matches:");
        self.render_outcomes(&mut out, true);
        let _ = writeln!(out, "\nNegative matches:");
        self.render_outcomes(&mut out, false);

        let _ = writeln!(out, "\nFiltered candidates:");
        if self.filtered.is_empty() {
            let _ = writeln!(out, "   None");
        }
        for f in &self.filtered {
            let _ = writeln!(out, "   {} (removed by {})", f.module_id, f.filter);
        }

        let _ = writeln!(out, "\nExclusions:");
        if self.exclusions.is_empty() {
            let _ = writeln!(out, "   None");
        }
        for id in &self.exclusions {
            let _ = writeln!(out, "   {}", id);
        }

        let _ = writeln!(out, "\nGroup conflicts:");
        if self.conflicts.is_empty() {
            let _ = writeln!(out, "   None");
        }
        for c in &self.conflicts {
            let _ = writeln!(
                out,
                "   {} kept, {} dropped: {}",
                c.first_module, c.second_module, c.description
            );
        }
        out
    }

    fn render_outcomes(&self, out: &mut String, matched: bool) {
        let mut any = false;
        for (id, outcome) in self.outcomes.iter().filter(|(_, o)| o.is_match() == matched) {
            any = true;
            let marker = if outcome.is_indeterminate() { " [indeterminate]" } else { "" };
            let _ = writeln!(out, "   {}{}:", id, marker);
            for reason in outcome.reasons() {
                let _ = writeln!(out, "      - {}", reason);
            }
        }
        if !any {
            let _ = writeln!(out, "   None");
        }
    }
}
