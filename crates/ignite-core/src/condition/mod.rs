//! # Ignite Core Conditions
//!
//! Applicability predicates attached to configuration modules.
//!
//! A [`Condition`] is a tagged expression tree. Leaves inspect the classpath,
//! the registered components or the environment; `All`, `Any` and `Not`
//! compose them. Conditions deserialize from manifests using a `type` tag:
//!
//! ```toml
//! [[modules.conditions]]
//! type = "on_class"
//! names = ["redis-client"]
//! ```
pub mod error;
pub mod evaluator;
pub mod outcome;
pub mod report;


use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::ComponentRegistry;
use crate::environment::{Classpath, Environment};
use crate::module_system::version::VersionRange;

pub use error::ConditionError;
pub use evaluator::ConditionEvaluator;
pub use outcome::ConditionOutcome;
pub use report::ConditionEvaluationReport;

/// Components selected by name and/or type tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentQuery {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl ComponentQuery {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            types: Vec::new(),
        }
    }

    pub fn of_type(tag: impl Into<String>) -> Self {
        Self {
            names: Vec::new(),
            types: vec![tag.into()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.types.is_empty()
    }

    /// Names and types from the query that are present in `components`.
    pub fn present_in(&self, components: &ComponentRegistry) -> Vec<String> {
        let names = self
            .names
            .iter()
            .filter(|n| components.contains_name(n))
            .cloned();
        let types = self
            .types
            .iter()
            .filter(|t| components.contains_type(t))
            .map(|t| format!("type {}", t));
        names.chain(types).collect()
    }

    /// Names and types from the query that are absent from `components`.
    pub fn absent_from(&self, components: &ComponentRegistry) -> Vec<String> {
        let names = self
            .names
            .iter()
            .filter(|n| !components.contains_name(n))
            .cloned();
        let types = self
            .types
            .iter()
            .filter(|t| !components.contains_type(t))
            .map(|t| format!("type {}", t));
        names.chain(types).collect()
    }
}

/// What a condition may look at while it is evaluated.
#[derive(Clone, Copy)]
pub struct ConditionContext<'a> {
    pub module_id: &'a str,
    pub environment: &'a Environment,
    pub classpath: &'a Classpath,
    pub components: &'a ComponentRegistry,
}

/// A condition supplied in code rather than declared in a manifest.
pub trait ConditionPredicate: Send + Sync + fmt::Debug {
    fn evaluate(&self, context: &ConditionContext<'_>) -> Result<ConditionOutcome, ConditionError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// All named libraries are present.
    OnClass { names: Vec<String> },
    /// None of the named libraries are present.
    OnMissingClass { names: Vec<String> },
    /// The library is present with a version inside `range`.
    OnLibraryVersion { library: String, range: VersionRange },
    /// Every queried component is registered.
    OnComponent(ComponentQuery),
    /// No queried component is registered.
    OnMissingComponent(ComponentQuery),
    /// Property presence or value.
    OnProperty {
        name: String,
        #[serde(default)]
        having_value: Option<String>,
        #[serde(default)]
        match_if_missing: bool,
    },
    /// Every location exists on disk after placeholder resolution.
    OnResource { locations: Vec<String> },
    /// The exclusive group's selection property is unset or names `alias`.
    SelectedAlternative { group: String, alias: String },
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
    #[serde(skip)]
    Custom(Arc<dyn ConditionPredicate>),
}

impl Condition {
    pub fn on_class<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::OnClass {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn on_missing_class<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::OnMissingClass {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn on_library_version(library: impl Into<String>, range: VersionRange) -> Self {
        Condition::OnLibraryVersion {
            library: library.into(),
            range,
        }
    }

    pub fn on_component(query: ComponentQuery) -> Self {
        Condition::OnComponent(query)
    }

    pub fn on_missing_component(query: ComponentQuery) -> Self {
        Condition::OnMissingComponent(query)
    }

    /// Matches when the property is set to anything but `false`.
    pub fn on_property(name: impl Into<String>) -> Self {
        Condition::OnProperty {
            name: name.into(),
            having_value: None,
            match_if_missing: false,
        }
    }

    pub fn on_property_value(name: impl Into<String>, value: impl Into<String>, match_if_missing: bool) -> Self {
        Condition::OnProperty {
            name: name.into(),
            having_value: Some(value.into()),
            match_if_missing,
        }
    }

    pub fn on_resource<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::OnResource {
            locations: locations.into_iter().map(Into::into).collect(),
        }
    }

    pub fn selected_alternative(group: impl Into<String>, alias: impl Into<String>) -> Self {
        Condition::SelectedAlternative {
            group: group.into(),
            alias: alias.into(),
        }
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::All { conditions }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Any { conditions }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Condition::Not {
            condition: Box::new(condition),
        }
    }

    pub fn custom(predicate: impl ConditionPredicate + 'static) -> Self {
        Condition::Custom(Arc::new(predicate))
    }

    /// Library names this condition requires, as far as they can be known
    /// without evaluating anything. Only `OnClass` leaves reachable through
    /// `All` contribute.
    pub fn required_classes(&self) -> Vec<String> {
        match self {
            Condition::OnClass { names } => names.clone(),
            Condition::All { conditions } => conditions.iter().flat_map(|c| c.required_classes()).collect(),
            _ => Vec::new(),
        }
    }

    /// Rejects declarations that can never be evaluated meaningfully.
    pub fn validate(&self, module_id: &str) -> Result<(), ConditionError> {
        let invalid = |message: &str| {
            Err(ConditionError::Invalid {
                module_id: module_id.to_string(),
                message: message.to_string(),
            })
        };
        match self {
            Condition::OnProperty { name, .. } if name.trim().is_empty() => invalid("property name must not be empty"),
            Condition::OnLibraryVersion { library, .. } if library.trim().is_empty() => {
                invalid("library name must not be empty")
            }
            Condition::SelectedAlternative { group, alias } if group.trim().is_empty() || alias.trim().is_empty() => {
                invalid("alternative group and alias must not be empty")
            }
            Condition::All { conditions } | Condition::Any { conditions } => {
                conditions.iter().try_for_each(|c| c.validate(module_id))
            }
            Condition::Not { condition } => condition.validate(module_id),
            _ => Ok(()),
        }
    }
}
