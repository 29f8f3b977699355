//! Binary switch state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValueError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OnOff {
    On,
    Off,
}

impl OnOff {
    pub fn is_on(self) -> bool {
        self == OnOff::On
    }
}

impl From<bool> for OnOff {
    fn from(on: bool) -> Self {
        if on {
            OnOff::On
        } else {
            OnOff::Off
        }
    }
}

impl FromStr for OnOff {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ON" => Ok(OnOff::On),
            "OFF" => Ok(OnOff::Off),
            _ => Err(ValueError::InvalidOnOff(s.to_string())),
        }
    }
}

impl fmt::Display for OnOff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OnOff::On => "ON",
            OnOff::Off => "OFF",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("on".parse::<OnOff>().unwrap(), OnOff::On);
        assert_eq!(" OFF ".parse::<OnOff>().unwrap(), OnOff::Off);
        assert!("maybe".parse::<OnOff>().is_err());
    }

    #[test]
    fn test_display_and_bool() {
        assert_eq!(OnOff::from(true).to_string(), "ON");
        assert!(!OnOff::Off.is_on());
    }
}
