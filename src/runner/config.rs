//! Tool configuration file parsing.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::runner::ds::error::GraphError;
use crate::runner::sync::semaphore::DEFAULT_NUMBER_OF_RESOURCES;

/// Key names recognized inside patch sources and dynamic data structures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectiveConfig {
    pub remove_key: String,
    pub prepend_key: String,
    pub append_key: String,
    pub position_prefix: String,
    pub position_suffix: String,
    pub evaluate_key: String,
    pub execute_key: String,
    pub self_reference_name: String,
}

impl Default for DirectiveConfig {
    fn default() -> Self {
        DirectiveConfig {
            remove_key: "__remove__".to_string(),
            prepend_key: "__prepend__".to_string(),
            append_key: "__append__".to_string(),
            position_prefix: "__".to_string(),
            position_suffix: "__".to_string(),
            evaluate_key: "__evaluate__".to_string(),
            execute_key: "__execute__".to_string(),
            self_reference_name: "self".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepresentationConfig {
    pub indention: String,
    pub number_of_levels: i64,
    pub maximum_number_of_levels_reached_identifier: String,
}

impl Default for RepresentationConfig {
    fn default() -> Self {
        RepresentationConfig {
            indention: "    ".to_string(),
            number_of_levels: 8,
            maximum_number_of_levels_reached_identifier: "__maximum_number_of_levels_reached__"
                .to_string(),
        }
    }
}

/// Complete tool configuration. Every field may be omitted.
///
/// ```json
/// {
///     "logging": true,
///     "directives": {"evaluate_key": "__eval__"},
///     "representation": {"indention": "  ", "number_of_levels": 4},
///     "semaphore_resources": 3
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub logging: bool,
    pub directives: DirectiveConfig,
    pub representation: RepresentationConfig,
    pub semaphore_resources: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        ToolsConfig {
            logging: false,
            directives: DirectiveConfig::default(),
            representation: RepresentationConfig::default(),
            semaphore_resources: DEFAULT_NUMBER_OF_RESOURCES,
        }
    }
}

impl ToolsConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let content = fs::read_to_string(path)
            .map_err(|e| GraphError::ConfigError(format!("Failed to read config file: {}", e)))?;

        Self::parse(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn parse(content: &str) -> Result<Self, GraphError> {
        serde_json::from_str(content)
            .map_err(|e| GraphError::ConfigError(format!("Invalid config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config = ToolsConfig::parse(
            r#"{"logging": true, "representation": {"indention": "  "}}"#,
        )
        .unwrap();
        assert!(config.logging);
        assert_eq!(config.representation.indention, "  ");
        assert_eq!(config.representation.number_of_levels, 8);
        assert_eq!(config.directives, DirectiveConfig::default());
        assert_eq!(config.semaphore_resources, 2);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ToolsConfig::parse("{"),
            Err(GraphError::ConfigError(_))
        ));
        assert!(matches!(
            ToolsConfig::load(Path::new("/nonexistent/tools.json")),
            Err(GraphError::ConfigError(_))
        ));
    }
}
