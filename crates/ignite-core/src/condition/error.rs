/// Errors produced by condition declarations and custom predicates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    /// The predicate could not decide. Evaluated as a distinct no-match.
    #[error("Condition could not be determined: {reason}")]
    Indeterminate { reason: String },

    /// The condition declaration itself is malformed.
    #[error("Invalid condition on module '{module_id}': {message}")]
    Invalid { module_id: String, message: String },
}

impl ConditionError {
    pub fn indeterminate(reason: impl Into<String>) -> Self {
        ConditionError::Indeterminate { reason: reason.into() }
    }
}
