//! Item name type

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for invalid item names
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ItemNameError {
    #[error("item name cannot be empty")]
    Empty,

    #[error("item name cannot start with a digit")]
    LeadingDigit,

    #[error("item name contains invalid character '{0}' (must be ASCII alphanumeric or underscore)")]
    InvalidChar(char),
}

/// Represents an openHAB item name (e.g., "Kitchen_Temperature")
///
/// Item names are case-sensitive, consist of ASCII letters, digits and
/// underscores, and cannot start with a digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemName(String);

impl ItemName {
    /// Create a new ItemName, validating its characters
    pub fn new(name: impl Into<String>) -> Result<Self, ItemNameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Get the item name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether a string would be accepted as an item name
    pub fn is_valid(name: &str) -> bool {
        Self::validate(name).is_ok()
    }

    fn validate(name: &str) -> Result<(), ItemNameError> {
        let first = name.chars().next().ok_or(ItemNameError::Empty)?;
        if first.is_ascii_digit() {
            return Err(ItemNameError::LeadingDigit);
        }
        match name.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
            Some(c) => Err(ItemNameError::InvalidChar(c)),
            None => Ok(()),
        }
    }
}

impl FromStr for ItemName {
    type Err = ItemNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ItemName {
    type Error = ItemNameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ItemName> for String {
    fn from(name: ItemName) -> String {
        name.0
    }
}

// Hash of ItemName is the hash of its string, so lookups by &str are consistent
impl Borrow<str> for ItemName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_item_names() {
        let name = ItemName::new("DogeTest").unwrap();
        assert_eq!(name.as_str(), "DogeTest");
        assert_eq!(name.to_string(), "DogeTest");

        assert!(ItemName::is_valid("Kitchen_Temperature_1"));
        assert!(ItemName::is_valid("_hidden"));
    }

    #[test]
    fn test_invalid_item_names() {
        assert_eq!("".parse::<ItemName>().unwrap_err(), ItemNameError::Empty);
        assert_eq!(
            "1stFloor".parse::<ItemName>().unwrap_err(),
            ItemNameError::LeadingDigit
        );
        assert_eq!(
            "Doge-Test".parse::<ItemName>().unwrap_err(),
            ItemNameError::InvalidChar('-')
        );
        assert_eq!(
            "Doge Test".parse::<ItemName>().unwrap_err(),
            ItemNameError::InvalidChar(' ')
        );
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert_ne!(
            ItemName::new("DogeTest").unwrap(),
            ItemName::new("dogetest").unwrap()
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let name = ItemName::new("DogeNumber").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"DogeNumber\"");

        let parsed: ItemName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, name);

        assert!(serde_json::from_str::<ItemName>("\"not valid\"").is_err());
    }
}
