//! Item snapshot type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ItemName, ItemState, ItemType};

/// A registered item and its current state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique item name
    pub name: ItemName,

    /// Declared type, which decides the states the item accepts
    pub item_type: ItemType,

    /// Optional human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Current state (`NULL` until the first update)
    #[serde(default)]
    pub state: ItemState,

    /// When the state was last updated (even if the value didn't change)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,

    /// When the state last changed value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_change: Option<DateTime<Utc>>,
}

impl Item {
    /// Create a new item in the `NULL` state
    pub fn new(name: ItemName, item_type: ItemType) -> Self {
        Self {
            name,
            item_type,
            label: None,
            state: ItemState::Null,
            last_update: None,
            last_change: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Create an updated item, preserving `last_change` if the state is the same
    pub fn with_state(&self, state: ItemState) -> Self {
        let now = Utc::now();
        let changed = self.state != state;

        Self {
            name: self.name.clone(),
            item_type: self.item_type,
            label: self.label.clone(),
            state,
            last_update: Some(now),
            last_change: if changed { Some(now) } else { self.last_change },
        }
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        // Timestamps are not compared
        self.name == other.name
            && self.item_type == other.item_type
            && self.label == other.label
            && self.state == other.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypedValue;

    fn item() -> Item {
        Item::new(ItemName::new("DogeString").unwrap(), ItemType::String)
    }

    #[test]
    fn test_new_item_is_null() {
        let item = item().with_label("Doge");
        assert_eq!(item.state, ItemState::Null);
        assert_eq!(item.label.as_deref(), Some("Doge"));
        assert!(item.last_update.is_none());
    }

    #[test]
    fn test_with_state_tracks_change() {
        let first = item().with_state(TypedValue::from("a").into());
        assert!(first.last_change.is_some());

        let same = first.with_state(TypedValue::from("a").into());
        assert_eq!(same.last_change, first.last_change);
        assert!(same.last_update >= first.last_update);

        let changed = same.with_state(TypedValue::from("b").into());
        assert_ne!(changed.state, same.state);
        assert!(changed.last_change >= same.last_change);
    }
}
