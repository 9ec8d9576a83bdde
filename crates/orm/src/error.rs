//! Error types for the resolver
//!
//! Setup-time failures (duplicate registrations, bad configuration) are
//! fatal and surface as `Err`. Lookups and normalization never fail; an
//! unknown discriminator is an absent result, not an error.

use std::fmt;

use crate::config::ConfigError;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Crate-wide error type
#[derive(Debug, Clone)]
pub enum ModelError {
    /// Relationship registration or resolution failed
    Relationship(RelationshipError),
    /// Configuration could not be loaded or validated
    Configuration(ConfigError),
    /// Serialization/deserialization error
    Serialization(String),
    /// A record did not have the expected shape
    Validation(String),
    /// Record not found in the store
    NotFound(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Relationship(err) => write!(f, "Relationship error: {}", err),
            ModelError::Configuration(err) => write!(f, "Configuration error: {}", err),
            ModelError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ModelError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ModelError::NotFound(table) => write!(f, "Record not found in table '{}'", table),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Relationship(err) => Some(err),
            ModelError::Configuration(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RelationshipError> for ModelError {
    fn from(err: RelationshipError) -> Self {
        ModelError::Relationship(err)
    }
}

impl From<ConfigError> for ModelError {
    fn from(err: ConfigError) -> Self {
        ModelError::Configuration(err)
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

/// Error types for polymorphic relationship registration and strict resolution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationshipError {
    /// A discriminator value or relation alias was registered twice
    #[error("'{value}' is already registered")]
    DuplicateRegistration { value: String },

    /// Invalid relationship configuration
    #[error("Invalid relationship configuration: {0}")]
    InvalidConfiguration(String),

    /// Discriminator value has no registered relation
    #[error("Unknown discriminator '{0}'")]
    UnknownDiscriminator(String),

    /// More than one per-type relation was populated on the same record
    #[error("More than one detail relation is populated: {}", aliases.join(", "))]
    ConflictingDetails { aliases: Vec<String> },

    /// The populated relation does not belong to the record's discriminator
    #[error("Record of type '{discriminator}' has '{alias}' populated")]
    DiscriminatorMismatch { discriminator: String, alias: String },
}

impl RelationshipError {
    pub(crate) fn duplicate(value: impl Into<String>) -> Self {
        RelationshipError::DuplicateRegistration { value: value.into() }
    }
}
