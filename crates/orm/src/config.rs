//! Resolver configuration
//!
//! Detail types can be declared in code, in a YAML/JSON file, or picked up
//! from the environment. The defaults describe the `Account` model with its
//! `BankAccount` and `Card` detail types.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::relationships::{DetailRelation, DetailTypeRegistry, PolymorphicConfig};

pub const ENV_CONFIG_PATH: &str = "POLYMORPH_CONFIG";
pub const ENV_DISCRIMINATOR_FIELD: &str = "POLYMORPH_DISCRIMINATOR_FIELD";
pub const ENV_DETAILS_FIELD: &str = "POLYMORPH_DETAILS_FIELD";
pub const ENV_FOREIGN_KEY: &str = "POLYMORPH_FOREIGN_KEY";
pub const ENV_STRICT: &str = "POLYMORPH_STRICT";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("File system error: {message}")]
    FileSystem { message: String },

    #[error("Configuration parsing error: {message}")]
    ParseError { message: String },
}

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value loaded from environment variable
    EnvVar(String),
    /// Default value used
    Default,
    /// Value loaded from file
    File(String),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::EnvVar(var) => write!(f, "Environment variable: {}", var),
            ConfigSource::Default => write!(f, "Default value"),
            ConfigSource::File(path) => write!(f, "Configuration file: {}", path),
        }
    }
}

/// One declared detail type; alias and names fall back to the naming convention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailTypeConfig {
    pub discriminator: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub related_model: Option<String>,
    #[serde(default)]
    pub related_table: Option<String>,
}

impl DetailTypeConfig {
    pub fn new(discriminator: impl Into<String>) -> Self {
        Self {
            discriminator: discriminator.into(),
            alias: None,
            related_model: None,
            related_table: None,
        }
    }

    fn to_relation(&self) -> DetailRelation {
        let alias = self
            .alias
            .clone()
            .unwrap_or_else(|| crate::relationships::inference::alias_for(&self.discriminator));
        let mut relation = DetailRelation::new(self.discriminator.clone(), alias);
        if let Some(model) = &self.related_model {
            relation = relation.with_related_model(model.clone());
        }
        if let Some(table) = &self.related_table {
            relation = relation.with_related_table(table.clone());
        }
        relation
    }
}

fn default_discriminator_field() -> String {
    "type".to_string()
}

fn default_details_field() -> String {
    "details".to_string()
}

fn default_foreign_key() -> String {
    "details_id".to_string()
}

fn default_owning_model() -> String {
    "Account".to_string()
}

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Name of the owning model the detail types belong to
    #[serde(default = "default_owning_model")]
    pub owning_model: String,
    #[serde(default = "default_discriminator_field")]
    pub discriminator_field: String,
    #[serde(default = "default_details_field")]
    pub details_field: String,
    #[serde(default = "default_foreign_key")]
    pub foreign_key: String,
    /// Reject records with conflicting detail relations instead of picking the first
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub types: Vec<DetailTypeConfig>,

    #[serde(skip)]
    sources: HashMap<String, ConfigSource>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            owning_model: default_owning_model(),
            discriminator_field: default_discriminator_field(),
            details_field: default_details_field(),
            foreign_key: default_foreign_key(),
            strict: false,
            types: vec![
                DetailTypeConfig::new("BankAccount"),
                DetailTypeConfig::new("Card"),
            ],
            sources: HashMap::new(),
        }
    }
}

impl ResolverConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileSystem {
            message: format!("{}: {}", path.display(), e),
        })?;

        let mut config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "config file".to_string(),
                    value: other.unwrap_or("").to_string(),
                    expected: "yaml, yml or json".to_string(),
                })
            }
        };

        let source = ConfigSource::File(path.display().to_string());
        for field in ["owning_model", "discriminator_field", "details_field", "foreign_key", "strict", "types"] {
            config.sources.insert(field.to_string(), source.clone());
        }
        tracing::debug!("Loaded resolver configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults, then the file named by `POLYMORPH_CONFIG`, then field overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var(ENV_CONFIG_PATH) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(value) = env::var(ENV_DISCRIMINATOR_FIELD) {
            config.discriminator_field = value;
            config.set_source("discriminator_field", ConfigSource::EnvVar(ENV_DISCRIMINATOR_FIELD.to_string()));
        }
        if let Ok(value) = env::var(ENV_DETAILS_FIELD) {
            config.details_field = value;
            config.set_source("details_field", ConfigSource::EnvVar(ENV_DETAILS_FIELD.to_string()));
        }
        if let Ok(value) = env::var(ENV_FOREIGN_KEY) {
            config.foreign_key = value;
            config.set_source("foreign_key", ConfigSource::EnvVar(ENV_FOREIGN_KEY.to_string()));
        }
        if let Ok(value) = env::var(ENV_STRICT) {
            config.strict = parse_bool(ENV_STRICT, &value)?;
            config.set_source("strict", ConfigSource::EnvVar(ENV_STRICT.to_string()));
        }

        config.validate()?;
        Ok(config)
    }

    fn set_source(&mut self, field: &str, source: ConfigSource) {
        self.sources.insert(field.to_string(), source);
    }

    /// Where a field's value came from
    pub fn source_of(&self, field: &str) -> ConfigSource {
        self.sources.get(field).cloned().unwrap_or(ConfigSource::Default)
    }

    pub fn polymorphic(&self) -> PolymorphicConfig {
        PolymorphicConfig::new(
            self.details_field.clone(),
            self.discriminator_field.clone(),
            self.foreign_key.clone(),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owning_model.is_empty() {
            return Err(ConfigError::ValidationFailed {
                message: "owning_model cannot be empty".to_string(),
            });
        }

        if self.types.is_empty() {
            return Err(ConfigError::ValidationFailed {
                message: "at least one detail type must be declared".to_string(),
            });
        }

        self.polymorphic()
            .validate()
            .map_err(|e| ConfigError::ValidationFailed { message: e.to_string() })
    }

    /// Build the frozen registry; duplicate declarations abort
    pub fn build_registry(&self) -> Result<DetailTypeRegistry, ConfigError> {
        self.validate()?;

        let mut builder = DetailTypeRegistry::builder().with_polymorphic(self.polymorphic());
        for detail in &self.types {
            builder
                .register_relation(detail.to_relation())
                .map_err(|e| ConfigError::ValidationFailed { message: e.to_string() })?;
        }

        builder
            .build()
            .map_err(|e| ConfigError::ValidationFailed { message: e.to_string() })
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            expected: "true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for var in [ENV_CONFIG_PATH, ENV_DISCRIMINATOR_FIELD, ENV_DETAILS_FIELD, ENV_FOREIGN_KEY, ENV_STRICT] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config_builds_account_registry() {
        let registry = ResolverConfig::default().build_registry().unwrap();
        assert_eq!(
            registry.aliases_for_load().collect::<Vec<_>>(),
            vec!["bankAccountDetails", "cardDetails"]
        );
        assert_eq!(registry.polymorphic().id_column, "details_id");
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
owning_model: Payment
discriminator_field: kind
strict: true
types:
  - discriminator: Wire
  - discriminator: Crypto
    alias: walletInfo
    related_table: wallets
"#;
        let config = ResolverConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.owning_model, "Payment");
        assert_eq!(config.details_field, "details");
        assert!(config.strict);

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.relation_alias_for("Wire"), Some("wireDetails"));
        assert_eq!(registry.relation_alias_for("Crypto"), Some("walletInfo"));
        assert_eq!(registry.relation_for("Crypto").unwrap().related_table, "wallets");
        assert_eq!(registry.polymorphic().type_column, "kind");
    }

    #[test]
    fn test_duplicate_types_rejected() {
        let json = r#"{"types": [{"discriminator": "Card"}, {"discriminator": "Card", "alias": "other"}]}"#;
        let config = ResolverConfig::from_json_str(json).unwrap();
        let err = config.build_registry().unwrap_err();
        assert!(err.to_string().contains("'Card' is already registered"));
    }

    #[test]
    fn test_validation() {
        let config = ResolverConfig::from_yaml_str("types: []").unwrap();
        assert!(config.validate().is_err());

        let config = ResolverConfig::from_yaml_str("discriminator_field: details\ntypes:\n  - discriminator: A").unwrap();
        assert!(config.validate().is_err());

        assert!(ResolverConfig::from_yaml_str("types: 5").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "types:\n  - discriminator: Card").unwrap();

        let config = ResolverConfig::from_file(file.path()).unwrap();
        assert_eq!(config.types.len(), 1);
        assert!(matches!(config.source_of("types"), ConfigSource::File(_)));

        let other = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(
            ResolverConfig::from_file(other.path()),
            Err(ConfigError::InvalidValue { .. })
        ));

        assert!(matches!(
            ResolverConfig::from_file("/nonexistent/polymorph.yaml"),
            Err(ConfigError::FileSystem { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var(ENV_DETAILS_FIELD, "payload");
        env::set_var(ENV_STRICT, "yes");

        let config = ResolverConfig::from_env().unwrap();
        assert_eq!(config.details_field, "payload");
        assert!(config.strict);
        assert_eq!(config.source_of("details_field"), ConfigSource::EnvVar(ENV_DETAILS_FIELD.to_string()));
        assert_eq!(config.source_of("foreign_key"), ConfigSource::Default);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_bool() {
        clear_env();
        env::set_var(ENV_STRICT, "maybe");

        assert!(matches!(
            ResolverConfig::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));

        clear_env();
    }
}
