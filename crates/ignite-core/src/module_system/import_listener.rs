use std::fmt;

use crate::module_system::candidate::RequestSite;

/// Published once per resolution request, after filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEvent {
    pub site: RequestSite,
    /// Candidates that survived the filter pipeline, in discovery order.
    pub candidates: Vec<String>,
    pub exclusions: Vec<String>,
}

/// Observer of the candidate sets produced for each request.
pub trait ImportListener: Send + Sync {
    fn name(&self) -> &str;

    fn on_import(&self, event: &ImportEvent);
}

impl fmt::Debug for dyn ImportListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportListener").field("name", &self.name()).finish()
    }
}
