//! Declared item types and the state kinds they accept

use chrono::FixedOffset;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::types::{DateTimeType, HsbColor, OnOff, Percent, TypedValue, ValueError, ValueKind};

/// Errors raised when an item type and a state do not fit together
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ItemTypeError {
    #[error("unknown item type '{0}'")]
    UnknownType(String),

    #[error("{item_type} item cannot accept a {kind} state")]
    Incompatible { item_type: ItemType, kind: ValueKind },

    #[error(transparent)]
    Value(#[from] ValueError),
}

/// The declared type of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ItemType {
    String,
    DateTime,
    Number,
    Dimmer,
    Color,
    Switch,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::String => "String",
            ItemType::DateTime => "DateTime",
            ItemType::Number => "Number",
            ItemType::Dimmer => "Dimmer",
            ItemType::Color => "Color",
            ItemType::Switch => "Switch",
        }
    }

    /// Check a state against this type, normalizing where the type allows it
    ///
    /// - `Number` accepts decimals and quantities
    /// - `Dimmer` accepts percentages; a decimal in `[0, 100]` becomes a
    ///   percentage and `ON`/`OFF` become 100%/0%
    /// - every other type accepts exactly its own kind
    pub fn accept(self, value: TypedValue) -> Result<TypedValue, ItemTypeError> {
        let incompatible = |value: &TypedValue| ItemTypeError::Incompatible {
            item_type: self,
            kind: value.kind(),
        };

        match (self, value) {
            (ItemType::String, v @ TypedValue::String(_))
            | (ItemType::DateTime, v @ TypedValue::DateTime(_))
            | (ItemType::Number, v @ (TypedValue::Decimal(_) | TypedValue::Quantity(_)))
            | (ItemType::Dimmer, v @ TypedValue::Percent(_))
            | (ItemType::Color, v @ TypedValue::Hsb(_))
            | (ItemType::Switch, v @ TypedValue::OnOff(_)) => Ok(v),
            (ItemType::Dimmer, TypedValue::Decimal(d)) => Ok(TypedValue::Percent(Percent::new(d)?)),
            (ItemType::Dimmer, TypedValue::OnOff(OnOff::On)) => Ok(Percent::HUNDRED.into()),
            (ItemType::Dimmer, TypedValue::OnOff(OnOff::Off)) => Ok(Percent::ZERO.into()),
            (_, other) => Err(incompatible(&other)),
        }
    }

    /// Parse state text the way a binding update for this item type would
    ///
    /// Zone-less date-times are placed in `default_offset`.
    pub fn parse_state(
        self,
        text: &str,
        default_offset: FixedOffset,
    ) -> Result<TypedValue, ItemTypeError> {
        let value = match self {
            ItemType::String => TypedValue::String(text.to_string()),
            ItemType::DateTime => DateTimeType::parse_with_offset(text, default_offset)?.into(),
            ItemType::Number => match Decimal::from_str(text.trim()) {
                Ok(d) => TypedValue::Decimal(d),
                Err(_) => TypedValue::Quantity(text.parse()?),
            },
            ItemType::Dimmer => match OnOff::from_str(text) {
                Ok(switch) => TypedValue::OnOff(switch),
                Err(_) => TypedValue::Percent(text.parse()?),
            },
            ItemType::Color => TypedValue::Hsb(text.parse::<HsbColor>()?),
            ItemType::Switch => TypedValue::OnOff(text.parse()?),
        };
        self.accept(value)
    }
}

impl FromStr for ItemType {
    type Err = ItemTypeError;

    /// Accepts dimensioned number types such as `Number:Temperature`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let base = s.split(':').next().unwrap_or_default().trim();
        match base {
            "String" => Ok(ItemType::String),
            "DateTime" => Ok(ItemType::DateTime),
            "Number" => Ok(ItemType::Number),
            "Dimmer" => Ok(ItemType::Dimmer),
            "Color" => Ok(ItemType::Color),
            "Switch" => Ok(ItemType::Switch),
            _ => Err(ItemTypeError::UnknownType(s.to_string())),
        }
    }
}

impl TryFrom<String> for ItemType {
    type Error = ItemTypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ItemType> for String {
    fn from(item_type: ItemType) -> String {
        item_type.as_str().to_string()
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
