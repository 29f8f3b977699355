//! Core types for openHAB items
//!
//! This crate provides the fundamental types used throughout the workspace:
//! ItemName, ItemType, ItemState and the typed state values, units of
//! measurement with their converter, and the Event/Context types carried on
//! the event bus.

mod context;
mod event;
mod item;
mod item_name;
mod item_type;
mod state;
pub mod types;
pub mod units;

pub use context::Context;
pub use event::{Event, EventData, EventType, ItemEventData};
pub use item::Item;
pub use item_name::{ItemName, ItemNameError};
pub use item_type::{ItemType, ItemTypeError};
pub use state::ItemState;
pub use types::{
    DateTimeType, HsbColor, OnOff, Percent, Quantity, TypedValue, ValueError, ValueKind,
};
pub use units::{Dimension, StandardUnitConverter, Unit, UnitConverter, UnitError};

/// Standard item event types
pub mod events {
    use super::*;

    /// Event type for a requested state update (the update has not been applied yet)
    pub const ITEM_STATE: &str = "ItemStateEvent";

    /// Event type fired after every applied update, changed or not
    pub const ITEM_STATE_UPDATED: &str = "ItemStateUpdatedEvent";

    /// Event type fired after an applied update changed the state
    pub const ITEM_STATE_CHANGED: &str = "ItemStateChangedEvent";

    /// Event type for item creation
    pub const ITEM_ADDED: &str = "ItemAddedEvent";

    /// Event type for item removal
    pub const ITEM_REMOVED: &str = "ItemRemovedEvent";

    /// Data for ITEM_STATE events
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct ItemStateData {
        pub item_name: ItemName,
        pub state: ItemState,
    }

    impl EventData for ItemStateData {
        fn event_type() -> &'static str {
            ITEM_STATE
        }
    }

    impl ItemEventData for ItemStateData {
        fn item_name(&self) -> &ItemName {
            &self.item_name
        }

        fn topic_suffix() -> &'static str {
            "state"
        }
    }

    /// Data for ITEM_STATE_UPDATED events
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct ItemStateUpdatedData {
        pub item_name: ItemName,
        pub state: ItemState,
    }

    impl EventData for ItemStateUpdatedData {
        fn event_type() -> &'static str {
            ITEM_STATE_UPDATED
        }
    }

    impl ItemEventData for ItemStateUpdatedData {
        fn item_name(&self) -> &ItemName {
            &self.item_name
        }

        fn topic_suffix() -> &'static str {
            "stateupdated"
        }
    }

    /// Data for ITEM_STATE_CHANGED events
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct ItemStateChangedData {
        pub item_name: ItemName,
        pub old_state: ItemState,
        pub new_state: ItemState,
    }

    impl EventData for ItemStateChangedData {
        fn event_type() -> &'static str {
            ITEM_STATE_CHANGED
        }
    }

    impl ItemEventData for ItemStateChangedData {
        fn item_name(&self) -> &ItemName {
            &self.item_name
        }

        fn topic_suffix() -> &'static str {
            "statechanged"
        }
    }

    /// Data for ITEM_ADDED events
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct ItemAddedData {
        pub item: Item,
    }

    impl EventData for ItemAddedData {
        fn event_type() -> &'static str {
            ITEM_ADDED
        }
    }

    impl ItemEventData for ItemAddedData {
        fn item_name(&self) -> &ItemName {
            &self.item.name
        }

        fn topic_suffix() -> &'static str {
            "added"
        }
    }

    /// Data for ITEM_REMOVED events
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct ItemRemovedData {
        pub item: Item,
    }

    impl EventData for ItemRemovedData {
        fn event_type() -> &'static str {
            ITEM_REMOVED
        }
    }

    impl ItemEventData for ItemRemovedData {
        fn item_name(&self) -> &ItemName {
            &self.item.name
        }

        fn topic_suffix() -> &'static str {
            "removed"
        }
    }

}
