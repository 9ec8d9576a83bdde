//! Eager Loading Scope - Which detail relations a fetch must include

use super::metadata::DetailRelation;
use super::registry::DetailTypeRegistry;

/// Name of the scope that includes every detail relation
pub const WITH_DETAILS_SCOPE: &str = "withDetails";

/// Describes the relations a storage collaborator should attach to each row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EagerLoadSpec {
    /// Scope name, used for logging
    pub scope: String,
    /// Relations to include, in registration order
    pub relations: Vec<DetailRelation>,
    /// Shared foreign key column on the owning table
    pub foreign_key: String,
    /// Discriminator column on the owning table
    pub type_column: String,
}

impl EagerLoadSpec {
    /// Scope that fetches no relations at all
    pub fn none(registry: &DetailTypeRegistry) -> Self {
        let poly = registry.polymorphic();
        Self {
            scope: "default".to_string(),
            relations: Vec::new(),
            foreign_key: poly.id_column.clone(),
            type_column: poly.type_column.clone(),
        }
    }

    /// The `withDetails` scope: every registered alias
    pub fn with_details(registry: &DetailTypeRegistry) -> Self {
        Self {
            scope: WITH_DETAILS_SCOPE.to_string(),
            relations: registry.relations().to_vec(),
            ..Self::none(registry)
        }
    }

    /// Include only the relations named by `aliases`; unknown aliases are ignored
    pub fn only(registry: &DetailTypeRegistry, aliases: &[&str]) -> Self {
        Self {
            scope: "custom".to_string(),
            relations: registry
                .relations()
                .iter()
                .filter(|r| aliases.contains(&r.alias.as_str()))
                .cloned()
                .collect(),
            ..Self::none(registry)
        }
    }

    pub fn includes(&self, alias: &str) -> bool {
        self.relations.iter().any(|r| r.alias == alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> + '_ {
        self.relations.iter().map(|r| r.alias.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> DetailTypeRegistry {
        DetailTypeRegistry::from_pairs([
            ("BankAccount", "bankAccountDetails"),
            ("Card", "cardDetails"),
        ])
        .unwrap()
    }

    #[test]
    fn test_with_details_scope() {
        let spec = EagerLoadSpec::with_details(&registry());
        assert_eq!(spec.scope, WITH_DETAILS_SCOPE);
        assert_eq!(spec.aliases().collect::<Vec<_>>(), vec!["bankAccountDetails", "cardDetails"]);
        assert_eq!(spec.foreign_key, "details_id");
        assert_eq!(spec.type_column, "type");
        assert!(spec.includes("cardDetails"));
    }

    #[test]
    fn test_only_and_none_scopes() {
        let registry = registry();
        let spec = EagerLoadSpec::only(&registry, &["cardDetails", "ghost"]);
        assert_eq!(spec.aliases().collect::<Vec<_>>(), vec!["cardDetails"]);
        assert!(!spec.includes("bankAccountDetails"));

        assert!(EagerLoadSpec::none(&registry).is_empty());
    }
}
