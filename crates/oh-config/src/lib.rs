//! YAML configuration for the openHAB item runtime
//!
//! The configuration file has two top-level sections:
//!
//! ```yaml
//! runtime:
//!   time_zone: "+01:00"         # offset for zone-less date-times
//!   unit_system: metric         # or imperial
//!   state_wait_timeout_ms: 500  # bound for waiting on posted updates
//!   event_bus_capacity: 1024
//!
//! items: !include items.yaml   # or an inline list
//! ```
//!
//! Two custom tags are supported:
//!
//! - `!include path` - Include another YAML file
//! - `!env_var VAR` - Environment variable substitution

mod error;
mod loader;
mod runtime_config;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_yaml, load_yaml_string, YamlLoader};
pub use runtime_config::{ItemConfig, RuntimeConfig, UnitSystem, UnitSystemConfig};

// Re-export serde_yaml::Value for convenience
pub use serde_yaml::Value;
