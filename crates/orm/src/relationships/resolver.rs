//! Polymorphic Resolver - Collapses per-type detail relations into one field
//!
//! Storage eagerly attaches every relation returned by
//! [`PolymorphicResolver::aliases_for_load`] to the owning row. Before the row
//! reaches a caller, [`PolymorphicResolver::normalize`] picks the populated
//! relation, exposes it under the unified details field and drops every alias
//! field from the output.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::registry::DetailTypeRegistry;
use crate::error::RelationshipError;
use crate::record::{is_populated, NormalizedRecord, RawRecord};

/// Stateless resolver over a frozen [`DetailTypeRegistry`]
#[derive(Debug, Clone)]
pub struct PolymorphicResolver {
    registry: Arc<DetailTypeRegistry>,
}

impl PolymorphicResolver {
    pub fn new(registry: impl Into<Arc<DetailTypeRegistry>>) -> Self {
        Self {
            registry: registry.into(),
        }
    }

    pub fn registry(&self) -> &DetailTypeRegistry {
        &self.registry
    }

    /// Relation aliases a storage collaborator must eagerly fetch
    pub fn aliases_for_load(&self) -> impl Iterator<Item = &str> + '_ {
        self.registry.aliases_for_load()
    }

    /// Alias registered for a discriminator value; unknown values yield `None`
    pub fn relation_alias_for(&self, discriminator: &str) -> Option<&str> {
        self.registry.relation_alias_for(discriminator)
    }

    /// Aliases populated on `entity`, in registration order
    pub fn populated_aliases<'a>(&'a self, entity: &'a RawRecord) -> impl Iterator<Item = &'a str> + 'a {
        self.registry
            .aliases_for_load()
            .filter(move |alias| is_populated(entity.get(alias)))
    }

    /// Project `entity` onto its normalized shape.
    ///
    /// The first populated alias in registration order becomes the details
    /// value; when several are populated the later ones are dropped. A
    /// non-alias details field already on the record is kept when no alias is
    /// populated, so normalizing a normalized record is a no-op.
    pub fn normalize(&self, entity: &RawRecord) -> NormalizedRecord {
        let details_field = &self.registry.polymorphic().name;

        let mut populated = self.populated_aliases(entity);
        let selected = populated.next();
        if let Some(first) = selected {
            let skipped: Vec<&str> = populated.collect();
            if !skipped.is_empty() {
                tracing::debug!(
                    "Record has several detail relations populated; using '{}', ignoring {:?}",
                    first,
                    skipped
                );
            }
        }

        let mut attributes = Map::new();
        let mut carried_details = None;
        for (key, value) in entity.fields() {
            if self.registry.is_alias(key) {
                continue;
            }
            if key == details_field {
                carried_details = Some(value);
                continue;
            }
            attributes.insert(key.clone(), value.clone());
        }

        let details = match selected {
            Some(alias) => entity.get(alias).cloned(),
            None => carried_details.filter(|v| !v.is_null()).cloned(),
        };

        NormalizedRecord::new(attributes, details_field.clone(), details)
    }

    /// Normalize every record of a fetch result
    pub fn normalize_all<'a, I>(&self, entities: I) -> Vec<NormalizedRecord>
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        entities.into_iter().map(|entity| self.normalize(entity)).collect()
    }

    /// Like [`normalize`](Self::normalize), but rejects records that break the
    /// "at most one detail, matching the discriminator" invariant
    pub fn normalize_strict(&self, entity: &RawRecord) -> Result<NormalizedRecord, RelationshipError> {
        let populated: Vec<&str> = self.populated_aliases(entity).collect();

        if populated.len() > 1 {
            return Err(RelationshipError::ConflictingDetails {
                aliases: populated.iter().map(|a| a.to_string()).collect(),
            });
        }

        let type_value = entity.populated(&self.registry.polymorphic().type_column);
        if let (Some(alias), Some(type_value)) = (populated.first(), type_value) {
            // A non-string discriminator never selects a relation
            let expected = type_value
                .as_str()
                .and_then(|discriminator| self.registry.relation_alias_for(discriminator));
            if expected != Some(*alias) {
                return Err(RelationshipError::DiscriminatorMismatch {
                    discriminator: match type_value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    },
                    alias: alias.to_string(),
                });
            }
        }

        Ok(self.normalize(entity))
    }

    /// The detail relation selected by the record's own discriminator.
    ///
    /// Returns `None` when the discriminator is missing or unregistered, or
    /// when that relation was not loaded.
    pub fn details_for<'a>(&self, entity: &'a RawRecord) -> Option<&'a Value> {
        let discriminator = self.discriminator_of(entity)?;
        match self.registry.relation_alias_for(discriminator) {
            Some(alias) => entity.populated(alias),
            None => {
                tracing::warn!("No detail relation registered for type '{}'", discriminator);
                None
            }
        }
    }

    fn discriminator_of<'a>(&self, entity: &'a RawRecord) -> Option<&'a str> {
        entity.get_str(&self.registry.polymorphic().type_column)
    }
}
