//! YAML configuration loader with custom tag support
//!
//! Supports two custom YAML tags:
//! - `!include path` - Include another YAML file, relative to the including file
//! - `!env_var VAR` - Environment variable substitution

use crate::error::{ConfigError, ConfigResult};
use serde_yaml::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// YAML loader with support for `!include` and `!env_var`
pub struct YamlLoader {
    /// Base directory for resolving relative paths
    config_dir: PathBuf,
    /// Track included files to detect circular includes
    include_stack: HashSet<PathBuf>,
}

impl YamlLoader {
    /// Create a new YAML loader for the given config directory
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            include_stack: HashSet::new(),
        }
    }

    /// Load and process a YAML file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<Value> {
        let path = self.resolve_path(path.as_ref());
        debug!("Loading YAML file: {:?}", path);

        if self.include_stack.contains(&path) {
            return Err(ConfigError::CircularInclude { path });
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        self.include_stack.insert(path.clone());
        let result = self.load_string(&content, &path);
        self.include_stack.remove(&path);

        result
    }

    /// Load and process YAML from a string
    pub fn load_string(&mut self, content: &str, source_path: &Path) -> ConfigResult<Value> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: source_path.to_path_buf(),
            source: e,
        })?;

        self.process_value(value, source_path)
    }

    /// The directory relative paths are resolved against
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn process_value(&mut self, value: Value, source_path: &Path) -> ConfigResult<Value> {
        match value {
            Value::Tagged(tagged) => {
                let tag = tagged.tag.to_string();
                trace!("Processing tag '{}'", tag);
                match tag.as_str() {
                    "!include" => {
                        let include_path = self.value_to_path(&tagged.value, source_path)?;
                        debug!("Including file: {:?}", include_path);
                        self.load_file(&include_path)
                    }
                    "!env_var" => Self::process_env_var(tagged.value),
                    _ => {
                        // Unknown tags are kept, with their inner value processed
                        let tagged = *tagged;
                        let processed = self.process_value(tagged.value, source_path)?;
                        Ok(Value::Tagged(Box::new(serde_yaml::value::TaggedValue {
                            tag: tagged.tag,
                            value: processed,
                        })))
                    }
                }
            }
            Value::Mapping(map) => {
                let mut result = serde_yaml::Mapping::new();
                for (k, v) in map {
                    let processed_key = self.process_value(k, source_path)?;
                    let processed_value = self.process_value(v, source_path)?;
                    result.insert(processed_key, processed_value);
                }
                Ok(Value::Mapping(result))
            }
            Value::Sequence(seq) => {
                let result: ConfigResult<Vec<Value>> = seq
                    .into_iter()
                    .map(|v| self.process_value(v, source_path))
                    .collect();
                Ok(Value::Sequence(result?))
            }
            _ => Ok(value),
        }
    }

    fn process_env_var(value: Value) -> ConfigResult<Value> {
        let Value::String(var_name) = value else {
            return Err(ConfigError::InvalidValue {
                key: "!env_var".to_string(),
                reason: "environment variable name must be a string".to_string(),
            });
        };

        let env_value = std::env::var(&var_name).map_err(|_| ConfigError::EnvVarNotFound {
            var: var_name.clone(),
        })?;

        debug!("Substituted env var: {}", var_name);
        Ok(Value::String(env_value))
    }

    /// Convert a YAML value to a path, resolving relative to the source file
    fn value_to_path(&self, value: &Value, source_path: &Path) -> ConfigResult<PathBuf> {
        let Value::String(path_str) = value else {
            return Err(ConfigError::InvalidIncludePath {
                path: format!("{:?}", value),
                reason: "path must be a string".to_string(),
            });
        };

        let base_dir = source_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(&self.config_dir);
        Ok(base_dir.join(path_str))
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }
}

/// Load a YAML file with tag processing
pub fn load_yaml(config_dir: impl Into<PathBuf>, file: impl AsRef<Path>) -> ConfigResult<Value> {
    YamlLoader::new(config_dir).load_file(file)
}

/// Load a YAML string with tag processing
pub fn load_yaml_string(
    config_dir: impl Into<PathBuf>,
    content: &str,
    source_name: &str,
) -> ConfigResult<Value> {
    YamlLoader::new(config_dir).load_string(content, Path::new(source_name))
}
