//! Detail Type Registry - Frozen discriminator/alias mapping and its per-model index

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use super::inference;
use super::metadata::{DetailRelation, PolymorphicConfig};
use crate::error::RelationshipError;

/// Builder collecting detail types before the registry is frozen
#[derive(Debug, Clone, Default)]
pub struct DetailTypeRegistryBuilder {
    polymorphic: PolymorphicConfig,
    relations: Vec<DetailRelation>,
}

impl DetailTypeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a non-default discriminator column, foreign key or details field
    pub fn with_polymorphic(mut self, polymorphic: PolymorphicConfig) -> Self {
        self.polymorphic = polymorphic;
        self
    }

    /// Register a discriminator value under an explicit relation alias
    pub fn register_type(
        &mut self,
        discriminator: &str,
        alias: &str,
    ) -> Result<&mut Self, RelationshipError> {
        self.register_relation(DetailRelation::new(discriminator, alias))
    }

    /// Register a discriminator value, deriving its alias by convention
    pub fn register_type_by_convention(
        &mut self,
        discriminator: &str,
    ) -> Result<&mut Self, RelationshipError> {
        let alias = inference::alias_for(discriminator);
        self.register_type(discriminator, &alias)
    }

    /// Register a fully described relation
    pub fn register_relation(
        &mut self,
        relation: DetailRelation,
    ) -> Result<&mut Self, RelationshipError> {
        relation.validate()?;

        check_reserved(&self.polymorphic, &relation)?;

        for existing in &self.relations {
            if existing.discriminator == relation.discriminator {
                return Err(RelationshipError::duplicate(&relation.discriminator));
            }
            if existing.alias == relation.alias {
                return Err(RelationshipError::duplicate(&relation.alias));
            }
        }

        tracing::debug!(
            "Registered detail type '{}' as '{}' ({})",
            relation.discriminator,
            relation.alias,
            relation.related_model
        );
        self.relations.push(relation);
        Ok(self)
    }

    /// Freeze the registry; nothing can be registered afterwards
    pub fn build(self) -> Result<DetailTypeRegistry, RelationshipError> {
        self.polymorphic.validate()?;
        // with_polymorphic may have changed the reserved names since registration
        for relation in &self.relations {
            check_reserved(&self.polymorphic, relation)?;
        }

        let by_discriminator = self
            .relations
            .iter()
            .enumerate()
            .map(|(i, r)| (r.discriminator.clone(), i))
            .collect();
        let by_alias = self
            .relations
            .iter()
            .enumerate()
            .map(|(i, r)| (r.alias.clone(), i))
            .collect();

        Ok(DetailTypeRegistry {
            polymorphic: self.polymorphic,
            relations: self.relations,
            by_discriminator,
            by_alias,
        })
    }
}

fn check_reserved(polymorphic: &PolymorphicConfig, relation: &DetailRelation) -> Result<(), RelationshipError> {
    if polymorphic.is_reserved(&relation.alias) {
        return Err(RelationshipError::InvalidConfiguration(format!(
            "Alias '{}' collides with a reserved field",
            relation.alias
        )));
    }
    Ok(())
}

/// Immutable, ordered mapping from discriminator value to relation alias
#[derive(Debug, Clone, PartialEq)]
pub struct DetailTypeRegistry {
    polymorphic: PolymorphicConfig,
    relations: Vec<DetailRelation>,
    by_discriminator: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl DetailTypeRegistry {
    pub fn builder() -> DetailTypeRegistryBuilder {
        DetailTypeRegistryBuilder::new()
    }

    /// Build a registry from (discriminator, alias) pairs in order
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, RelationshipError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut builder = Self::builder();
        for (discriminator, alias) in pairs {
            builder.register_type(discriminator, alias)?;
        }
        builder.build()
    }

    /// Aliases in registration order; each call starts a fresh iteration
    pub fn aliases_for_load(&self) -> impl Iterator<Item = &str> + '_ {
        self.relations.iter().map(|r| r.alias.as_str())
    }

    /// Alias registered for a discriminator value, `None` when unregistered
    pub fn relation_alias_for(&self, discriminator: &str) -> Option<&str> {
        self.relation_for(discriminator).map(|r| r.alias.as_str())
    }

    /// Discriminator value that owns an alias
    pub fn discriminator_for(&self, alias: &str) -> Option<&str> {
        self.by_alias
            .get(alias)
            .map(|&i| self.relations[i].discriminator.as_str())
    }

    pub fn relation_for(&self, discriminator: &str) -> Option<&DetailRelation> {
        self.by_discriminator.get(discriminator).map(|&i| &self.relations[i])
    }

    pub fn is_alias(&self, field: &str) -> bool {
        self.by_alias.contains_key(field)
    }

    pub fn relations(&self) -> &[DetailRelation] {
        &self.relations
    }

    pub fn polymorphic(&self) -> &PolymorphicConfig {
        &self.polymorphic
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

/// Per-owning-model index of frozen registries, safe to share across tasks
#[derive(Debug, Clone, Default)]
pub struct MorphRegistry {
    models: Arc<DashMap<String, Arc<DetailTypeRegistry>>>,
}

impl MorphRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a frozen registry to an owning model; each model is registered once
    pub fn register(
        &self,
        owning_model: &str,
        registry: DetailTypeRegistry,
    ) -> Result<Arc<DetailTypeRegistry>, RelationshipError> {
        use dashmap::mapref::entry::Entry;

        match self.models.entry(owning_model.to_string()) {
            Entry::Occupied(_) => Err(RelationshipError::duplicate(owning_model)),
            Entry::Vacant(slot) => {
                let registry = Arc::new(registry);
                slot.insert(registry.clone());
                tracing::debug!(
                    "Registered {} detail types for model '{}'",
                    registry.len(),
                    owning_model
                );
                Ok(registry)
            }
        }
    }

    pub fn get(&self, owning_model: &str) -> Option<Arc<DetailTypeRegistry>> {
        self.models.get(owning_model).map(|entry| entry.value().clone())
    }

    /// Alias relevant for an instance of `owning_model` with the given discriminator
    pub fn relation_alias_for(&self, owning_model: &str, discriminator: &str) -> Option<String> {
        self.models
            .get(owning_model)?
            .relation_alias_for(discriminator)
            .map(str::to_string)
    }

    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
