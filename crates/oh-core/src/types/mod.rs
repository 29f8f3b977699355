//! Typed item state values
//!
//! Item states arrive from bindings as loosely typed values. [`TypedValue`]
//! gives each of them an explicit variant so that every consumer matches on
//! the kind of state instead of sniffing strings:
//!
//! | variant    | example text                    |
//! |------------|---------------------------------|
//! | `String`   | `5 Dogecoins`                   |
//! | `DateTime` | `1991-12-21T12:21:19.000+0000`  |
//! | `Decimal`  | `55.5`                          |
//! | `Percent`  | `55`                            |
//! | `Quantity` | `55.0 °C`                       |
//! | `Hsb`      | `55,55,55`                      |
//! | `OnOff`    | `ON`                            |

mod datetime;
mod hsb;
mod on_off;
mod percent;
mod quantity;

pub use datetime::{utc_offset, DateTimeType, DATE_TIME_FORMAT};
pub use hsb::HsbColor;
pub use on_off::OnOff;
pub use percent::Percent;
pub use quantity::Quantity;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::units::UnitError;

/// Errors raised while constructing or parsing state values
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("percentage {0} is outside [0, 100]")]
    PercentOutOfRange(Decimal),

    #[error("hue {0} is outside [0, 360)")]
    HueOutOfRange(Decimal),

    #[error("'{input}' is not a valid number")]
    InvalidNumber { input: String },

    #[error("'{input}' has no unit")]
    MissingUnit { input: String },

    #[error("'{input}' is not a valid date-time")]
    InvalidDateTime { input: String },

    #[error("'{input}' is not a valid HSB color: {reason}")]
    InvalidColor { input: String, reason: String },

    #[error("'{0}' is not ON or OFF")]
    InvalidOnOff(String),

    #[error(transparent)]
    Unit(#[from] UnitError),
}

/// The kind of a [`TypedValue`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    String,
    DateTime,
    Decimal,
    Percent,
    Quantity,
    Hsb,
    OnOff,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "StringType",
            ValueKind::DateTime => "DateTimeType",
            ValueKind::Decimal => "DecimalType",
            ValueKind::Percent => "PercentType",
            ValueKind::Quantity => "QuantityType",
            ValueKind::Hsb => "HSBType",
            ValueKind::OnOff => "OnOffType",
        };
        f.write_str(name)
    }
}

/// A defined item state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TypedValue {
    String(String),
    DateTime(DateTimeType),
    Decimal(Decimal),
    Percent(Percent),
    Quantity(Quantity),
    Hsb(HsbColor),
    OnOff(OnOff),
}

impl TypedValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            TypedValue::String(_) => ValueKind::String,
            TypedValue::DateTime(_) => ValueKind::DateTime,
            TypedValue::Decimal(_) => ValueKind::Decimal,
            TypedValue::Percent(_) => ValueKind::Percent,
            TypedValue::Quantity(_) => ValueKind::Quantity,
            TypedValue::Hsb(_) => ValueKind::Hsb,
            TypedValue::OnOff(_) => ValueKind::OnOff,
        }
    }

    /// Numeric magnitude for decimal, percent and quantity states
    ///
    /// Units are dropped; colors, switches, text and date-times have none.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            TypedValue::Decimal(d) => Some(*d),
            TypedValue::Percent(p) => Some(p.value()),
            TypedValue::Quantity(q) => Some(q.value()),
            TypedValue::String(_)
            | TypedValue::DateTime(_)
            | TypedValue::Hsb(_)
            | TypedValue::OnOff(_) => None,
        }
    }

    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            TypedValue::Quantity(q) => Some(q),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<&DateTimeType> {
        match self {
            TypedValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(s) => f.write_str(s),
            TypedValue::DateTime(dt) => dt.fmt(f),
            TypedValue::Decimal(d) => d.fmt(f),
            TypedValue::Percent(p) => p.fmt(f),
            TypedValue::Quantity(q) => q.fmt(f),
            TypedValue::Hsb(c) => c.fmt(f),
            TypedValue::OnOff(o) => o.fmt(f),
        }
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        TypedValue::String(s.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(s: String) -> Self {
        TypedValue::String(s)
    }
}

impl From<Decimal> for TypedValue {
    fn from(d: Decimal) -> Self {
        TypedValue::Decimal(d)
    }
}

impl From<DateTimeType> for TypedValue {
    fn from(dt: DateTimeType) -> Self {
        TypedValue::DateTime(dt)
    }
}

impl From<Percent> for TypedValue {
    fn from(p: Percent) -> Self {
        TypedValue::Percent(p)
    }
}

impl From<Quantity> for TypedValue {
    fn from(q: Quantity) -> Self {
        TypedValue::Quantity(q)
    }
}

impl From<HsbColor> for TypedValue {
    fn from(c: HsbColor) -> Self {
        TypedValue::Hsb(c)
    }
}

impl From<OnOff> for TypedValue {
    fn from(o: OnOff) -> Self {
        TypedValue::OnOff(o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Unit;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_canonical_text() {
        assert_eq!(TypedValue::from("5 Dogecoins").to_string(), "5 Dogecoins");
        assert_eq!(TypedValue::from(dec("55.5")).to_string(), "55.5");
        assert_eq!(
            TypedValue::from(Percent::new(55).unwrap()).to_string(),
            "55"
        );
        assert_eq!(
            TypedValue::from(Quantity::new(dec("55.0"), Unit::Celsius)).to_string(),
            "55.0 °C"
        );
        assert_eq!(TypedValue::from(OnOff::On).to_string(), "ON");
    }

    #[test]
    fn test_as_decimal() {
        assert_eq!(TypedValue::from(dec("55.5")).as_decimal(), Some(dec("55.5")));
        assert_eq!(
            TypedValue::from(Quantity::new(dec("21.5"), Unit::Celsius)).as_decimal(),
            Some(dec("21.5"))
        );
        assert_eq!(TypedValue::from("55.5").as_decimal(), None);
        assert_eq!(TypedValue::from(OnOff::Off).as_decimal(), None);
    }

    #[test]
    fn test_variants_with_same_text_are_distinct() {
        let decimal = TypedValue::from(dec("55"));
        let percent = TypedValue::from(Percent::new(55).unwrap());
        assert_eq!(decimal.to_string(), percent.to_string());
        assert_ne!(decimal, percent);
        assert_eq!(percent.kind(), ValueKind::Percent);
    }

    #[test]
    fn test_serde_is_tagged() {
        let value = TypedValue::from(Quantity::new(dec("55.0"), Unit::Celsius));
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["type"], "Quantity");
        assert_eq!(json["value"]["unit"], "°C");

        let parsed: TypedValue = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, value);
    }
}
