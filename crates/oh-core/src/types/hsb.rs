//! Hue/saturation/brightness color

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Percent, ValueError};

/// An HSB color: hue in degrees `[0, 360)`, saturation and brightness as percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "HsbParts")]
pub struct HsbColor {
    hue: Decimal,
    saturation: Percent,
    brightness: Percent,
}

/// Unchecked wire form of [`HsbColor`]
#[derive(Deserialize)]
struct HsbParts {
    hue: Decimal,
    saturation: Percent,
    brightness: Percent,
}

impl TryFrom<HsbParts> for HsbColor {
    type Error = ValueError;

    fn try_from(parts: HsbParts) -> Result<Self, Self::Error> {
        Self::new(parts.hue, parts.saturation, parts.brightness)
    }
}

impl HsbColor {
    pub fn new(
        hue: impl Into<Decimal>,
        saturation: Percent,
        brightness: Percent,
    ) -> Result<Self, ValueError> {
        let hue = hue.into();
        if hue < Decimal::ZERO || hue >= Decimal::from(360) {
            return Err(ValueError::HueOutOfRange(hue));
        }
        Ok(Self {
            hue,
            saturation,
            brightness,
        })
    }

    pub fn hue(&self) -> Decimal {
        self.hue
    }

    pub fn saturation(&self) -> Percent {
        self.saturation
    }

    pub fn brightness(&self) -> Percent {
        self.brightness
    }
}

impl FromStr for HsbColor {
    type Err = ValueError;

    /// Parses the `"h,s,b"` form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValueError::InvalidColor {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [hue, saturation, brightness] = parts.as_slice() else {
            return Err(invalid("expected three comma-separated components"));
        };

        let hue = Decimal::from_str(hue).map_err(|_| invalid("hue is not a number"))?;
        Self::new(hue, saturation.parse()?, brightness.parse()?)
    }
}

impl fmt::Display for HsbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.hue, self.saturation, self.brightness)
    }
}
