//! Bounded percentage value

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValueError;

/// A decimal percentage in the closed range `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percent(Decimal);

impl Percent {
    /// 0%
    pub const ZERO: Percent = Percent(Decimal::ZERO);

    /// 100%
    pub const HUNDRED: Percent = Percent(Decimal::ONE_HUNDRED);

    /// Create a percentage, rejecting values outside `[0, 100]`
    pub fn new(value: impl Into<Decimal>) -> Result<Self, ValueError> {
        let value = value.into();
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(ValueError::PercentOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// The percentage as a decimal in `[0, 100]`
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Percent {
    type Error = ValueError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percent> for Decimal {
    fn from(percent: Percent) -> Decimal {
        percent.0
    }
}

impl FromStr for Percent {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let number = s.strip_suffix('%').unwrap_or(s).trim_end();
        let value = Decimal::from_str(number).map_err(|_| ValueError::InvalidNumber {
            input: s.to_string(),
        })?;
        Self::new(value)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
