use crate::core::errors::{ExecError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Hook executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Run hooks at all; when false every stage passes the payload through untouched
    pub enabled: bool,
    /// Endpoint of the request being processed, handed to every hook
    pub endpoint: String,
    /// Emit an info summary after each stage
    pub log_outcomes: bool,
    /// Per-module configuration, keyed by module code
    pub modules: HashMap<String, Value>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/".to_string(),
            log_outcomes: false,
            modules: HashMap::new(),
        }
    }
}

impl ExecutorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(ExecError::configuration_field(
                "endpoint cannot be empty",
                "endpoint",
            ));
        }
        for (module, config) in &self.modules {
            if !config.is_object() {
                return Err(ExecError::configuration_field(
                    format!("configuration of module {} must be an object", module),
                    format!("modules.{}", module),
                ));
            }
        }
        Ok(())
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| ExecError::io(format!("read {}", path.display()), e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Add configuration for a module
    pub fn with_module_config(mut self, module: impl Into<String>, config: Value) -> Self {
        self.modules.insert(module.into(), config);
        self
    }

    /// Disable hook execution
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExecutorConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.enabled);
        assert!(!config.log_outcomes);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
endpoint: /openrtb2/auction
log_outcomes: true
modules:
  acme.filter:
    allowed_countries: [US, CA]
"#;
        let config = ExecutorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.endpoint, "/openrtb2/auction");
        assert!(config.enabled);
        assert!(config.log_outcomes);
        assert_eq!(
            config.modules["acme.filter"],
            json!({"allowed_countries": ["US", "CA"]})
        );
    }

    #[test]
    fn test_validation_errors() {
        let err = ExecutorConfig::default().with_endpoint("  ").validate().unwrap_err();
        assert_eq!(err.category(), "configuration");

        let err = ExecutorConfig::default()
            .with_module_config("acme", json!(42))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ExecError::Configuration { field: Some(ref f), .. } if f == "modules.acme"));

        let err = ExecutorConfig::from_yaml_str("enabled: [nope").unwrap_err();
        assert_eq!(err.category(), "serialization");
    }

    #[test]
    fn test_missing_file() {
        let err = ExecutorConfig::from_yaml_file("/nonexistent/hooks.yaml").unwrap_err();
        assert_eq!(err.category(), "io");
    }
}
