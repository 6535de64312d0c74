//! Generator configuration.
//!
//! ```toml
//! [logging]
//! level = "gdmarshal=debug"
//! format = "json"
//! output = "stderr"
//!
//! [types]
//! float_precision = "double"
//! enums = ["Node.ProcessMode", "Error"]
//!
//! [[types.engine_classes]]
//! name = "Node"
//! base = "Object"
//!
//! [synthesis]
//! abort_on_error = true
//! ```
//!
//! Every section and field may be omitted.

#[cfg(feature = "config")]
use std::path::Path;

use crate::registry::{EngineClass, FloatPrecision, KnownTypeOptions};

/// Top-level configuration of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct GeneratorConfig {
    pub logging: LoggingConfig,
    pub types: TypesConfig,
    pub synthesis: SynthesisConfig,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Subscriber settings, consumed by the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `gdmarshal=trace`.
    pub level: String,
    pub format: LogFormat,
    /// `stdout`, `stderr` or a file path to append to.
    pub output: String,
    /// ANSI colors, only honored on terminals.
    pub color: bool,
    pub timestamps: bool,
    /// Include the event target (module path).
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            // stdout carries the generated code.
            output: "stderr".to_string(),
            color: true,
            timestamps: true,
            target: false,
        }
    }
}

/// Engine-specific type registrations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TypesConfig {
    pub float_precision: FloatPrecision,
    pub engine_classes: Vec<EngineClass>,
    pub enums: Vec<String>,
}

impl TypesConfig {
    pub fn known_type_options(&self) -> KnownTypeOptions {
        KnownTypeOptions {
            float_precision: self.float_precision,
        }
    }
}

/// Batch synthesis behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SynthesisConfig {
    /// Stop at the first member that fails instead of reporting it.
    pub abort_on_error: bool,
}

#[cfg(feature = "config")]
impl GeneratorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }
}

/// Configuration error.
#[cfg(feature = "config")]
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(String, std::io::Error),
    /// TOML parse error.
    Parse(toml::de::Error),
}

#[cfg(feature = "config")]
impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Failed to read config file '{}': {}", path, e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

#[cfg(feature = "config")]
impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

#[cfg(all(test, feature = "config"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[logging]
level = "gdmarshal=debug"
format = "json"
output = "stdout"
timestamps = false

[types]
float_precision = "double"
enums = ["Node.ProcessMode"]

[[types.engine_classes]]
name = "Node"
base = "Object"

[[types.engine_classes]]
name = "RefCounted"

[synthesis]
abort_on_error = true
"#;
        let config = GeneratorConfig::from_str(toml).unwrap();
        assert_eq!(config.logging.level, "gdmarshal=debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.output, "stdout");
        assert!(!config.logging.timestamps);
        assert!(config.logging.color);
        assert_eq!(config.types.float_precision, FloatPrecision::Double);
        assert_eq!(config.types.enums, vec!["Node.ProcessMode".to_string()]);
        assert_eq!(
            config.types.engine_classes,
            vec![EngineClass::new("Node").inheriting("Object"), EngineClass::new("RefCounted")]
        );
        assert!(config.synthesis.abort_on_error);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GeneratorConfig::from_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.logging.output, "stderr");
        assert_eq!(config.types.known_type_options().float_precision, FloatPrecision::Single);
    }

    #[test]
    fn test_invalid_config() {
        let err = GeneratorConfig::from_str("[types]\nfloat_precision = \"quad\"\n").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config:"));

        let err = GeneratorConfig::from_file("/nonexistent/gdmarshal.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
