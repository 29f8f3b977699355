//! Item state, including the two undefined states

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::TypedValue;

/// The state an item currently holds
///
/// `Null` is the state of an item nothing has ever updated; `Undef` is set
/// explicitly when a binding cannot determine a value. Both count as
/// "no value" for readers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "value")]
pub enum ItemState {
    #[default]
    #[serde(rename = "NULL")]
    Null,
    #[serde(rename = "UNDEF")]
    Undef,
    #[serde(rename = "VALUE")]
    Value(TypedValue),
}

impl ItemState {
    /// Whether the item holds an actual value
    pub fn is_defined(&self) -> bool {
        matches!(self, ItemState::Value(_))
    }

    pub fn value(&self) -> Option<&TypedValue> {
        match self {
            ItemState::Value(v) => Some(v),
            ItemState::Null | ItemState::Undef => None,
        }
    }

    pub fn into_value(self) -> Option<TypedValue> {
        match self {
            ItemState::Value(v) => Some(v),
            ItemState::Null | ItemState::Undef => None,
        }
    }
}

impl From<TypedValue> for ItemState {
    fn from(value: TypedValue) -> Self {
        ItemState::Value(value)
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemState::Null => f.write_str("NULL"),
            ItemState::Undef => f.write_str("UNDEF"),
            ItemState::Value(v) => v.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_states_have_no_value() {
        assert!(!ItemState::Null.is_defined());
        assert!(ItemState::Undef.value().is_none());
        assert_eq!(ItemState::default(), ItemState::Null);
        assert_eq!(ItemState::Undef.to_string(), "UNDEF");
    }

    #[test]
    fn test_defined_state() {
        let state = ItemState::from(TypedValue::from("5 Dogecoins"));
        assert!(state.is_defined());
        assert_eq!(state.to_string(), "5 Dogecoins");
        assert_eq!(
            state.into_value(),
            Some(TypedValue::String("5 Dogecoins".to_string()))
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_value(ItemState::Null).unwrap();
        assert_eq!(json["state"], "NULL");

        let state = ItemState::from(TypedValue::from("abc"));
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(serde_json::from_str::<ItemState>(&json).unwrap(), state);
    }
}
