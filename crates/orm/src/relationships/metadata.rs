//! Relationship Metadata - Definitions for polymorphic detail relations

use serde::{Deserialize, Serialize};

use crate::error::RelationshipError;

/// Polymorphic relationship configuration shared by every detail type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolymorphicConfig {
    /// The discriminator column (stores the detail type)
    pub type_column: String,

    /// The shared foreign key column pointing at the detail row
    pub id_column: String,

    /// The unified field the populated detail is exposed under
    pub name: String,
}

impl Default for PolymorphicConfig {
    fn default() -> Self {
        Self {
            type_column: "type".to_string(),
            id_column: "details_id".to_string(),
            name: "details".to_string(),
        }
    }
}

impl PolymorphicConfig {
    /// Create a new polymorphic configuration
    pub fn new(
        name: impl Into<String>,
        type_column: impl Into<String>,
        id_column: impl Into<String>,
    ) -> Self {
        Self {
            type_column: type_column.into(),
            id_column: id_column.into(),
            name: name.into(),
        }
    }

    /// Validate the polymorphic configuration
    pub fn validate(&self) -> Result<(), RelationshipError> {
        if self.name.is_empty() {
            return Err(RelationshipError::InvalidConfiguration(
                "Polymorphic relationship name cannot be empty".to_string(),
            ));
        }

        if self.type_column.is_empty() {
            return Err(RelationshipError::InvalidConfiguration(
                "Polymorphic type column cannot be empty".to_string(),
            ));
        }

        if self.id_column.is_empty() {
            return Err(RelationshipError::InvalidConfiguration(
                "Polymorphic ID column cannot be empty".to_string(),
            ));
        }

        if self.type_column == self.id_column || self.type_column == self.name {
            return Err(RelationshipError::InvalidConfiguration(
                "Polymorphic type column must differ from the ID column and the relationship name"
                    .to_string(),
            ));
        }

        if self.id_column == self.name {
            return Err(RelationshipError::InvalidConfiguration(
                "Polymorphic ID column must differ from the relationship name".to_string(),
            ));
        }

        Ok(())
    }

    /// True for the columns a relation alias may never shadow
    pub fn is_reserved(&self, field: &str) -> bool {
        field == self.name || field == self.type_column || field == self.id_column
    }
}

/// One registered detail type: discriminator value, alias and related model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRelation {
    /// Discriminator value selecting this relation (e.g. "BankAccount")
    pub discriminator: String,

    /// Field name the eagerly fetched record is attached under
    pub alias: String,

    /// The related model's type name
    pub related_model: String,

    /// The related model's table name
    pub related_table: String,
}

impl DetailRelation {
    /// Create a relation with an explicit alias; model and table names follow the convention
    pub fn new(discriminator: impl Into<String>, alias: impl Into<String>) -> Self {
        let discriminator = discriminator.into();
        Self {
            related_model: super::inference::related_model_for(&discriminator),
            related_table: super::inference::table_for(&discriminator),
            alias: alias.into(),
            discriminator,
        }
    }

    /// Override the related model name
    pub fn with_related_model(mut self, model: impl Into<String>) -> Self {
        self.related_model = model.into();
        self
    }

    /// Override the related table name
    pub fn with_related_table(mut self, table: impl Into<String>) -> Self {
        self.related_table = table.into();
        self
    }

    pub fn validate(&self) -> Result<(), RelationshipError> {
        if self.discriminator.is_empty() {
            return Err(RelationshipError::InvalidConfiguration(
                "Discriminator value cannot be empty".to_string(),
            ));
        }

        if self.alias.is_empty() {
            return Err(RelationshipError::InvalidConfiguration(format!(
                "Relation alias for '{}' cannot be empty",
                self.discriminator
            )));
        }

        Ok(())
    }
}
