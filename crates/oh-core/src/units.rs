//! Units of measurement and dimensional conversion
//!
//! Every unit belongs to exactly one [`Dimension`] and maps onto that
//! dimension's base unit with an exact affine transform:
//!
//! ```text
//! base = (value + offset) * num / den
//! ```
//!
//! Conversion between two units of the same dimension goes through the base
//! unit using `rust_decimal` arithmetic, so `55.0 °C` becomes exactly
//! `131.0 °F`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::types::Quantity;

/// Errors raised by unit parsing and conversion
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("cannot convert {from} ({from_dimension}) to {to} ({to_dimension})")]
    DimensionMismatch {
        from: Unit,
        from_dimension: Dimension,
        to: Unit,
        to_dimension: Dimension,
    },

    #[error("numeric overflow converting {from} to {to}")]
    Overflow { from: Unit, to: Unit },
}

/// Physical dimension a unit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Temperature,
    Length,
    Mass,
    Power,
    Energy,
    Pressure,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Temperature => "Temperature",
            Dimension::Length => "Length",
            Dimension::Mass => "Mass",
            Dimension::Power => "Power",
            Dimension::Energy => "Energy",
            Dimension::Pressure => "Pressure",
        };
        f.write_str(name)
    }
}

/// A known unit of measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    Celsius,
    Fahrenheit,
    Kelvin,
    Millimetre,
    Centimetre,
    Metre,
    Kilometre,
    Inch,
    Foot,
    Mile,
    Gram,
    Kilogram,
    Pound,
    Ounce,
    Watt,
    Kilowatt,
    Joule,
    WattHour,
    KilowattHour,
    Pascal,
    Hectopascal,
    Bar,
    Psi,
}

/// Affine mapping of a unit onto its dimension's base unit
struct Scale {
    num: i64,
    den: i64,
    /// Offset as (mantissa, scale)
    offset: (i64, u32),
}

impl Scale {
    const fn linear(num: i64, den: i64) -> Self {
        Self {
            num,
            den,
            offset: (0, 0),
        }
    }

    fn offset(&self) -> Decimal {
        Decimal::new(self.offset.0, self.offset.1)
    }
}

impl Unit {
    /// All supported units
    pub const ALL: &'static [Unit] = &[
        Unit::Celsius,
        Unit::Fahrenheit,
        Unit::Kelvin,
        Unit::Millimetre,
        Unit::Centimetre,
        Unit::Metre,
        Unit::Kilometre,
        Unit::Inch,
        Unit::Foot,
        Unit::Mile,
        Unit::Gram,
        Unit::Kilogram,
        Unit::Pound,
        Unit::Ounce,
        Unit::Watt,
        Unit::Kilowatt,
        Unit::Joule,
        Unit::WattHour,
        Unit::KilowattHour,
        Unit::Pascal,
        Unit::Hectopascal,
        Unit::Bar,
        Unit::Psi,
    ];

    /// Canonical symbol, as used in state text (`55.0 °C`)
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
            Unit::Kelvin => "K",
            Unit::Millimetre => "mm",
            Unit::Centimetre => "cm",
            Unit::Metre => "m",
            Unit::Kilometre => "km",
            Unit::Inch => "in",
            Unit::Foot => "ft",
            Unit::Mile => "mi",
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Pound => "lb",
            Unit::Ounce => "oz",
            Unit::Watt => "W",
            Unit::Kilowatt => "kW",
            Unit::Joule => "J",
            Unit::WattHour => "Wh",
            Unit::KilowattHour => "kWh",
            Unit::Pascal => "Pa",
            Unit::Hectopascal => "hPa",
            Unit::Bar => "bar",
            Unit::Psi => "psi",
        }
    }

    /// Dimension this unit measures
    pub fn dimension(self) -> Dimension {
        match self {
            Unit::Celsius | Unit::Fahrenheit | Unit::Kelvin => Dimension::Temperature,
            Unit::Millimetre
            | Unit::Centimetre
            | Unit::Metre
            | Unit::Kilometre
            | Unit::Inch
            | Unit::Foot
            | Unit::Mile => Dimension::Length,
            Unit::Gram | Unit::Kilogram | Unit::Pound | Unit::Ounce => Dimension::Mass,
            Unit::Watt | Unit::Kilowatt => Dimension::Power,
            Unit::Joule | Unit::WattHour | Unit::KilowattHour => Dimension::Energy,
            Unit::Pascal | Unit::Hectopascal | Unit::Bar | Unit::Psi => Dimension::Pressure,
        }
    }

    /// Look up a unit by its symbol or a common alias
    pub fn from_symbol(symbol: &str) -> Option<Unit> {
        let unit = match symbol.trim() {
            "°C" | "℃" | "C" | "degC" => Unit::Celsius,
            "°F" | "℉" | "F" | "degF" => Unit::Fahrenheit,
            "K" => Unit::Kelvin,
            "mm" => Unit::Millimetre,
            "cm" => Unit::Centimetre,
            "m" => Unit::Metre,
            "km" => Unit::Kilometre,
            "in" => Unit::Inch,
            "ft" => Unit::Foot,
            "mi" => Unit::Mile,
            "g" => Unit::Gram,
            "kg" => Unit::Kilogram,
            "lb" | "lbs" => Unit::Pound,
            "oz" => Unit::Ounce,
            "W" => Unit::Watt,
            "kW" => Unit::Kilowatt,
            "J" => Unit::Joule,
            "Wh" => Unit::WattHour,
            "kWh" => Unit::KilowattHour,
            "Pa" => Unit::Pascal,
            "hPa" | "mbar" => Unit::Hectopascal,
            "bar" => Unit::Bar,
            "psi" => Unit::Psi,
            _ => return None,
        };
        Some(unit)
    }

    // Base units: K, m, g, W, J, Pa
    fn scale(self) -> Scale {
        match self {
            Unit::Kelvin => Scale::linear(1, 1),
            Unit::Celsius => Scale {
                num: 1,
                den: 1,
                offset: (27315, 2),
            },
            Unit::Fahrenheit => Scale {
                num: 5,
                den: 9,
                offset: (45967, 2),
            },
            Unit::Millimetre => Scale::linear(1, 1000),
            Unit::Centimetre => Scale::linear(1, 100),
            Unit::Metre => Scale::linear(1, 1),
            Unit::Kilometre => Scale::linear(1000, 1),
            Unit::Inch => Scale::linear(254, 10_000),
            Unit::Foot => Scale::linear(3048, 10_000),
            Unit::Mile => Scale::linear(1_609_344, 1000),
            Unit::Gram => Scale::linear(1, 1),
            Unit::Kilogram => Scale::linear(1000, 1),
            Unit::Pound => Scale::linear(45_359_237, 100_000),
            Unit::Ounce => Scale::linear(28_349_523_125, 1_000_000_000),
            Unit::Watt => Scale::linear(1, 1),
            Unit::Kilowatt => Scale::linear(1000, 1),
            Unit::Joule => Scale::linear(1, 1),
            Unit::WattHour => Scale::linear(3600, 1),
            Unit::KilowattHour => Scale::linear(3_600_000, 1),
            Unit::Pascal => Scale::linear(1, 1),
            Unit::Hectopascal => Scale::linear(100, 1),
            Unit::Bar => Scale::linear(100_000, 1),
            Unit::Psi => Scale::linear(6_894_757_293_168, 1_000_000_000),
        }
    }

    /// Convert a magnitude from this unit into `target`
    ///
    /// The result keeps at least the input's number of decimal places and
    /// drops any trailing zeros beyond that.
    pub fn convert_value(self, value: Decimal, target: Unit) -> Result<Decimal, UnitError> {
        if self.dimension() != target.dimension() {
            return Err(UnitError::DimensionMismatch {
                from: self,
                from_dimension: self.dimension(),
                to: target,
                to_dimension: target.dimension(),
            });
        }
        if self == target {
            return Ok(value);
        }

        let overflow = || UnitError::Overflow {
            from: self,
            to: target,
        };
        let from = self.scale();
        let to = target.scale();

        let mut converted = value
            .checked_add(from.offset())
            .and_then(|v| v.checked_mul(Decimal::from(from.num)))
            .and_then(|v| v.checked_div(Decimal::from(from.den)))
            .and_then(|base| base.checked_mul(Decimal::from(to.den)))
            .and_then(|v| v.checked_div(Decimal::from(to.num)))
            .and_then(|v| v.checked_sub(to.offset()))
            .ok_or_else(overflow)?
            .normalize();

        if converted.scale() < value.scale() {
            converted.rescale(value.scale());
        }
        Ok(converted)
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::from_symbol(s).ok_or_else(|| UnitError::UnknownUnit(s.trim().to_string()))
    }
}

impl TryFrom<String> for Unit {
    type Error = UnitError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> String {
        unit.symbol().to_string()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Converts quantities between units of the same dimension
pub trait UnitConverter: Send + Sync {
    /// Convert `quantity` into `target`, failing on a dimension mismatch
    fn convert(&self, quantity: &Quantity, target: Unit) -> Result<Quantity, UnitError>;
}

/// Converter backed by the exact scale table in [`Unit`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardUnitConverter;

impl UnitConverter for StandardUnitConverter {
    fn convert(&self, quantity: &Quantity, target: Unit) -> Result<Quantity, UnitError> {
        let value = quantity.unit().convert_value(quantity.value(), target)?;
        Ok(Quantity::new(value, target))
    }
}
