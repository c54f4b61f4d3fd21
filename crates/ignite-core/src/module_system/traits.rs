use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::context::ComponentRegistry;
use crate::environment::Environment;
use crate::kernel::error::Result;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::manifest::ModuleManifest;

/// Ordering priority shared by modules and lifecycle listeners.
///
/// Lower values come first. Modules without a priority sit in the
/// [`DEFAULT`](Self::DEFAULT) bucket. Textual forms accepted by
/// [`FromStr`] and by manifests: integers, `highest`, `lowest`, `default`,
/// `highest+N` and `lowest-N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PriorityRepr", into = "i32")]
pub struct ModulePriority(i32);

impl ModulePriority {
    pub const HIGHEST: ModulePriority = ModulePriority(i32::MIN);
    pub const LOWEST: ModulePriority = ModulePriority(i32::MAX);
    pub const DEFAULT: ModulePriority = ModulePriority(0);

    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    /// `HIGHEST + offset`, saturating.
    pub fn highest_plus(offset: i32) -> Self {
        Self(i32::MIN.saturating_add(offset))
    }

    /// `LOWEST - offset`, saturating.
    pub fn lowest_minus(offset: i32) -> Self {
        Self(i32::MAX.saturating_sub(offset))
    }
}

impl Default for ModulePriority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ModulePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMED_RANGE: i64 = 1_000;
        let value = self.0 as i64;
        let from_highest = value - i32::MIN as i64;
        let from_lowest = i32::MAX as i64 - value;
        match (from_highest, from_lowest) {
            (0, _) => write!(f, "highest"),
            (_, 0) => write!(f, "lowest"),
            (n, _) if n < NAMED_RANGE => write!(f, "highest+{}", n),
            (_, n) if n < NAMED_RANGE => write!(f, "lowest-{}", n),
            _ => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for ModulePriority {
    type Err = ModuleSystemError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ModuleSystemError::InvalidPriority { value: s.to_string() };
        let text = s.trim().to_ascii_lowercase();
        let parse_offset = |raw: &str| raw.trim().parse::<i32>().map_err(|_| invalid());
        match text.as_str() {
            "highest" => Ok(Self::HIGHEST),
            "lowest" => Ok(Self::LOWEST),
            "default" => Ok(Self::DEFAULT),
            _ => {
                if let Some(rest) = text.strip_prefix("highest+") {
                    Ok(Self::highest_plus(parse_offset(rest)?))
                } else if let Some(rest) = text.strip_prefix("lowest-") {
                    Ok(Self::lowest_minus(parse_offset(rest)?))
                } else {
                    text.parse::<i32>().map(Self).map_err(|_| invalid())
                }
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriorityRepr {
    Value(i32),
    Name(String),
}

impl TryFrom<PriorityRepr> for ModulePriority {
    type Error = ModuleSystemError;

    fn try_from(repr: PriorityRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            PriorityRepr::Value(v) => Ok(Self(v)),
            PriorityRepr::Name(name) => name.parse(),
        }
    }
}

impl From<ModulePriority> for i32 {
    fn from(priority: ModulePriority) -> Self {
        priority.0
    }
}

/// A configuration module: a manifest describing when and where it applies,
/// plus the step that registers its components.
pub trait ConfigurationModule: Send + Sync {
    fn manifest(&self) -> &ModuleManifest;

    fn id(&self) -> &str {
        &self.manifest().id
    }

    /// Called once, in activation order, after the module matched.
    fn configure(&self, components: &mut ComponentRegistry, environment: &Environment) -> Result<()>;
}
