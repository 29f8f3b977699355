//! Runtime configuration
//!
//! Parses the `runtime:` and `items:` sections of the configuration file.

use chrono::FixedOffset;
use oh_core::{Dimension, Item, ItemName, ItemType, Unit};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::Path;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::load_yaml;

/// Preferred unit per dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSystem {
    pub temperature: Unit,
    pub length: Unit,
    pub mass: Unit,
    pub power: Unit,
    pub energy: Unit,
    pub pressure: Unit,
}

impl UnitSystem {
    /// Create metric unit system
    pub fn metric() -> Self {
        Self {
            temperature: Unit::Celsius,
            length: Unit::Metre,
            mass: Unit::Kilogram,
            power: Unit::Watt,
            energy: Unit::KilowattHour,
            pressure: Unit::Hectopascal,
        }
    }

    /// Create imperial unit system
    pub fn imperial() -> Self {
        Self {
            temperature: Unit::Fahrenheit,
            length: Unit::Foot,
            mass: Unit::Pound,
            power: Unit::Watt,
            energy: Unit::KilowattHour,
            pressure: Unit::Psi,
        }
    }

    /// Preferred unit for a dimension
    pub fn unit_for(&self, dimension: Dimension) -> Unit {
        match dimension {
            Dimension::Temperature => self.temperature,
            Dimension::Length => self.length,
            Dimension::Mass => self.mass,
            Dimension::Power => self.power,
            Dimension::Energy => self.energy,
            Dimension::Pressure => self.pressure,
        }
    }
}

/// Unit system configuration - "metric", "imperial", or a custom table
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(untagged)]
pub enum UnitSystemConfig {
    /// Metric, when the key is left empty
    #[default]
    Metric,
    /// Named unit system
    Named(String),
    /// Full custom unit system
    Custom(UnitSystem),
}

impl UnitSystemConfig {
    /// Convert to the full UnitSystem struct
    pub fn to_unit_system(&self) -> ConfigResult<UnitSystem> {
        match self {
            UnitSystemConfig::Metric => Ok(UnitSystem::metric()),
            UnitSystemConfig::Named(name) => match name.as_str() {
                "metric" => Ok(UnitSystem::metric()),
                "imperial" | "us_customary" => Ok(UnitSystem::imperial()),
                other => Err(ConfigError::InvalidValue {
                    key: "unit_system".to_string(),
                    reason: format!("unknown unit system '{}'", other),
                }),
            },
            UnitSystemConfig::Custom(custom) => Ok(*custom),
        }
    }
}

/// An item declared in the configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemConfig {
    /// Item name
    pub name: String,

    /// Declared item type, e.g. `Number` or `Number:Temperature`
    #[serde(rename = "type")]
    pub item_type: ItemType,

    /// Optional label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Initial state, as state text (`55.0 °C`, `ON`, `55,55,55`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl ItemConfig {
    /// Build the (stateless) item this entry declares
    pub fn to_item(&self) -> ConfigResult<Item> {
        let name = ItemName::new(&self.name).map_err(|e| ConfigError::InvalidItem {
            name: self.name.clone(),
            reason: e.to_string(),
        })?;
        let item = Item::new(name, self.item_type);
        Ok(match &self.label {
            Some(label) => item.with_label(label),
            None => item,
        })
    }
}

/// Configuration of the item runtime from the `runtime:` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    /// UTC offset applied to zone-less date-times (e.g. "+01:00", "UTC")
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Unit system (metric or imperial)
    #[serde(default)]
    pub unit_system: UnitSystemConfig,

    /// How long to wait for a posted update to be applied
    #[serde(default = "default_state_wait_timeout_ms")]
    pub state_wait_timeout_ms: u64,

    /// Capacity of each event bus channel
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    /// Items to create at startup (from the top-level `items:` section)
    #[serde(skip)]
    pub items: Vec<ItemConfig>,
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

fn default_state_wait_timeout_ms() -> u64 {
    500
}

fn default_event_bus_capacity() -> usize {
    1024
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            unit_system: UnitSystemConfig::Metric,
            state_wait_timeout_ms: default_state_wait_timeout_ms(),
            event_bus_capacity: default_event_bus_capacity(),
            items: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file = path.file_name().map(Path::new).unwrap_or(path);
        let yaml = load_yaml(config_dir, file)?;

        Self::from_yaml(&yaml)
    }

    /// Parse configuration from a YAML value
    pub fn from_yaml(yaml: &Value) -> ConfigResult<Self> {
        let mapping = yaml.as_mapping().ok_or_else(|| ConfigError::InvalidValue {
            key: "root".to_string(),
            reason: "configuration must be a mapping".to_string(),
        })?;

        let runtime_section = mapping
            .get(Value::String("runtime".to_string()))
            .cloned()
            .unwrap_or(Value::Mapping(serde_yaml::Mapping::new()));

        let mut config: RuntimeConfig =
            serde_yaml::from_value(runtime_section).map_err(|e| ConfigError::InvalidValue {
                key: "runtime".to_string(),
                reason: e.to_string(),
            })?;

        if let Some(items) = mapping.get(Value::String("items".to_string())) {
            config.items =
                serde_yaml::from_value(items.clone()).map_err(|e| ConfigError::InvalidValue {
                    key: "items".to_string(),
                    reason: e.to_string(),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot, for configs built in code as well as parsed ones
    pub fn validate(&self) -> ConfigResult<()> {
        self.offset()?;
        self.unit_system()?;
        if self.event_bus_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "event_bus_capacity".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// The configured time zone as a fixed UTC offset
    pub fn offset(&self) -> ConfigResult<FixedOffset> {
        let zone = self.time_zone.trim();
        if matches!(zone, "UTC" | "Z" | "GMT") {
            return Ok(oh_core::types::utc_offset());
        }
        zone.parse::<FixedOffset>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "time_zone".to_string(),
                reason: format!("'{}' is not a UTC offset: {}", zone, e),
            })
    }

    /// Get the resolved unit system
    pub fn unit_system(&self) -> ConfigResult<UnitSystem> {
        self.unit_system.to_unit_system()
    }

    pub fn state_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.state_wait_timeout_ms)
    }
}
