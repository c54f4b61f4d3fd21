use std::fmt;

/// Result of evaluating a condition: match or no-match, the reasons that led
/// there, and whether the answer is a fail-closed indeterminate one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionOutcome {
    matched: bool,
    indeterminate: bool,
    reasons: Vec<String>,
}

impl ConditionOutcome {
    pub fn matched(reason: impl Into<String>) -> Self {
        Self {
            matched: true,
            indeterminate: false,
            reasons: vec![reason.into()],
        }
    }

    pub fn no_match(reason: impl Into<String>) -> Self {
        Self {
            matched: false,
            indeterminate: false,
            reasons: vec![reason.into()],
        }
    }

    pub fn indeterminate(reason: impl Into<String>) -> Self {
        Self {
            matched: false,
            indeterminate: true,
            reasons: vec![reason.into()],
        }
    }

    /// Outcome for a module declaring no conditions at all.
    pub fn unconditional() -> Self {
        Self::matched("no conditions declared")
    }

    pub fn is_match(&self) -> bool {
        self.matched
    }

    pub fn is_indeterminate(&self) -> bool {
        self.indeterminate
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub(crate) fn from_parts(matched: bool, indeterminate: bool, reasons: Vec<String>) -> Self {
        Self {
            matched,
            indeterminate,
            reasons,
        }
    }
}

impl fmt::Display for ConditionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = match (self.matched, self.indeterminate) {
            (true, _) => "matched",
            (false, true) => "indeterminate",
            (false, false) => "did not match",
        };
        write!(f, "{}", verdict)?;
        if !self.reasons.is_empty() {
            write!(f, " ({})", self.reasons.join("; "))?;
        }
        Ok(())
    }
}
