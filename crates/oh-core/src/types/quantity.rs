//! Decimal magnitude paired with a unit

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValueError;
use crate::units::{Dimension, Unit};

/// A measured value such as `55.0 °C`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quantity {
    value: Decimal,
    unit: Unit,
}

impl Quantity {
    pub fn new(value: Decimal, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }
}

impl FromStr for Quantity {
    type Err = ValueError;

    /// Parses `"<number> <unit>"`; the space is optional (`"55.0°C"`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
            .ok_or_else(|| ValueError::MissingUnit {
                input: s.to_string(),
            })?;
        let (number, unit) = s.split_at(split);

        let value = Decimal::from_str(number.trim()).map_err(|_| ValueError::InvalidNumber {
            input: s.to_string(),
        })?;
        let unit = unit.parse::<Unit>()?;
        Ok(Self::new(value, unit))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitError;

    #[test]
    fn test_parse_with_and_without_space() {
        let q: Quantity = "55.0 °C".parse().unwrap();
        assert_eq!(q.value(), Decimal::from_str("55.0").unwrap());
        assert_eq!(q.unit(), Unit::Celsius);
        assert_eq!(q.dimension(), Dimension::Temperature);

        let q: Quantity = "-3.5kWh".parse().unwrap();
        assert_eq!(q.value(), Decimal::from_str("-3.5").unwrap());
        assert_eq!(q.unit(), Unit::KilowattHour);
    }

    #[test]
    fn test_display_keeps_precision() {
        let q: Quantity = "131.0 °F".parse().unwrap();
        assert_eq!(q.to_string(), "131.0 °F");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "55".parse::<Quantity>().unwrap_err(),
            ValueError::MissingUnit { .. }
        ));
        assert!(matches!(
            "abc °C".parse::<Quantity>().unwrap_err(),
            ValueError::InvalidNumber { .. }
        ));
        assert_eq!(
            "5 Dogecoins".parse::<Quantity>().unwrap_err(),
            ValueError::Unit(UnitError::UnknownUnit("Dogecoins".to_string()))
        );
    }
}
