//! Configuration loader for the refactor workflow

use std::path::Path;

use super::types::WorkflowConfig;
use crate::error::{RefactorError, RefactorResult};

/// Loads workflow configuration from files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub fn load_from_yaml(path: &Path) -> RefactorResult<WorkflowConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RefactorError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        serde_yaml::from_str(&content)
            .map_err(|e| RefactorError::ConfigError(format!("Failed to parse YAML: {}", e)))
    }

    /// Load configuration from a JSON file
    pub fn load_from_json(path: &Path) -> RefactorResult<WorkflowConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RefactorError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| RefactorError::ConfigError(format!("Failed to parse JSON: {}", e)))
    }

    /// Load and validate configuration (format picked by extension)
    pub fn load(path: &Path) -> RefactorResult<WorkflowConfig> {
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::load_from_yaml(path)?,
            Some("json") => Self::load_from_json(path)?,
            _ => {
                return Err(RefactorError::ConfigError(
                    "Unsupported configuration file format".to_string(),
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration if `path` is given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> RefactorResult<WorkflowConfig> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(WorkflowConfig::default()),
        }
    }
}
