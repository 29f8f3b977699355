//! Context type for tracking who caused an event

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Context carried by every event on the bus
///
/// The `source` names the actor that produced the event (a rule, a binding,
/// a script), and `parent_id` links follow-up events back to the event that
/// caused them, e.g. an `ItemStateChangedEvent` to the `ItemStateEvent` that
/// requested the update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Unique identifier for this context (ULID)
    pub id: String,

    /// Actor that produced the event (if known)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Parent context ID for tracking causality chains
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Context {
    /// Create a new context with a fresh ULID
    pub fn new() -> Self {
        Self {
            id: Ulid::new().to_string(),
            source: None,
            parent_id: None,
        }
    }

    /// Create a new context attributed to `source`
    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new()
        }
    }

    /// Create a child context with this context as parent
    pub fn child(&self) -> Self {
        Self {
            id: Ulid::new().to_string(),
            source: self.source.clone(),
            parent_id: Some(self.id.clone()),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_links_to_parent() {
        let parent = Context::with_source("rule:doge");
        let child = parent.child();
        assert_ne!(child.id, parent.id);
        assert_eq!(child.parent_id.as_deref(), Some(parent.id.as_str()));
        assert_eq!(child.source.as_deref(), Some("rule:doge"));
    }
}
