//! Storage seam - where owning rows and their detail relations come from
//!
//! A [`RecordSource`] returns owning rows with every relation named by the
//! [`EagerLoadSpec`] attached: the matching detail row, or `null`. It never
//! omits a requested alias key.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::error::{ModelError, ModelResult, RelationshipError};
use crate::record::RawRecord;
use crate::relationships::{DetailTypeRegistry, EagerLoadSpec};

/// Storage collaborator producing raw owning records
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every owning record with the relations named by `scope`
    async fn fetch_all(&self, scope: &EagerLoadSpec) -> ModelResult<Vec<RawRecord>>;

    /// Fetch a single owning record by primary key
    async fn fetch_one(&self, id: i64, scope: &EagerLoadSpec) -> ModelResult<Option<RawRecord>>;
}

#[derive(Debug, Default)]
struct Tables {
    owners: Vec<Map<String, Value>>,
    /// table name -> rows keyed by id
    details: HashMap<String, Vec<Map<String, Value>>>,
    next_owner_id: i64,
    next_detail_ids: HashMap<String, i64>,
}

/// In-memory relational stand-in: one owning table, one table per detail type
#[derive(Debug, Clone)]
pub struct MemoryStore {
    registry: Arc<DetailTypeRegistry>,
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new(registry: impl Into<Arc<DetailTypeRegistry>>) -> Self {
        Self {
            registry: registry.into(),
            tables: Arc::new(RwLock::new(Tables::default())),
        }
    }

    pub fn registry(&self) -> &DetailTypeRegistry {
        &self.registry
    }

    /// Insert a detail row and an owning row pointing at it.
    ///
    /// Returns the created owning record with only its own relation attached.
    pub async fn create_with_details(
        &self,
        discriminator: &str,
        attributes: Map<String, Value>,
        details: Map<String, Value>,
    ) -> ModelResult<RawRecord> {
        let relation = self
            .registry
            .relation_for(discriminator)
            .ok_or_else(|| RelationshipError::UnknownDiscriminator(discriminator.to_string()))?
            .clone();
        let poly = self.registry.polymorphic().clone();
        let now = Value::String(Utc::now().to_rfc3339());

        let mut tables = self.tables.write().await;

        let detail_id = {
            let next = tables
                .next_detail_ids
                .entry(relation.related_table.clone())
                .or_insert(0);
            *next += 1;
            *next
        };
        let mut detail_row = details;
        detail_row.insert("id".to_string(), Value::from(detail_id));
        detail_row.insert("created_at".to_string(), now.clone());
        detail_row.insert("updated_at".to_string(), now.clone());
        tables
            .details
            .entry(relation.related_table.clone())
            .or_default()
            .push(detail_row.clone());

        tables.next_owner_id += 1;
        let mut owner = attributes;
        owner.insert("id".to_string(), Value::from(tables.next_owner_id));
        owner.insert(poly.type_column.clone(), Value::String(discriminator.to_string()));
        owner.insert(poly.id_column.clone(), Value::from(detail_id));
        owner.insert("created_at".to_string(), now.clone());
        owner.insert("updated_at".to_string(), now);
        tables.owners.push(owner.clone());

        tracing::debug!(
            "Created {} #{} with {} #{}",
            discriminator,
            tables.next_owner_id,
            relation.related_table,
            detail_id
        );

        let mut created = RawRecord::from(owner);
        created.insert(&relation.alias, Value::Object(detail_row));
        Ok(created)
    }

    pub async fn count(&self) -> usize {
        self.tables.read().await.owners.len()
    }

    fn attach(&self, tables: &Tables, owner: &Map<String, Value>, scope: &EagerLoadSpec) -> RawRecord {
        let mut record = RawRecord::from(owner.clone());
        let discriminator = owner.get(&scope.type_column).and_then(Value::as_str);
        let foreign_id = owner.get(&scope.foreign_key).and_then(Value::as_i64);

        for relation in &scope.relations {
            // The foreign key is shared by every detail table, so a join is
            // only valid for the relation matching the row's own type.
            let joined = match (discriminator, foreign_id) {
                (Some(d), Some(id)) if d == relation.discriminator => tables
                    .details
                    .get(&relation.related_table)
                    .and_then(|rows| rows.iter().find(|row| row.get("id").and_then(Value::as_i64) == Some(id)))
                    .map(|row| Value::Object(row.clone())),
                _ => None,
            };
            record.insert(&relation.alias, joined.unwrap_or(Value::Null));
        }

        record
    }
}

#[async_trait]
impl RecordSource for MemoryStore {
    async fn fetch_all(&self, scope: &EagerLoadSpec) -> ModelResult<Vec<RawRecord>> {
        let tables = self.tables.read().await;
        tracing::debug!("Fetching {} records with scope '{}'", tables.owners.len(), scope.scope);
        Ok(tables
            .owners
            .iter()
            .map(|owner| self.attach(&tables, owner, scope))
            .collect())
    }

    async fn fetch_one(&self, id: i64, scope: &EagerLoadSpec) -> ModelResult<Option<RawRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .owners
            .iter()
            .find(|owner| owner.get("id").and_then(Value::as_i64) == Some(id))
            .map(|owner| self.attach(&tables, owner, scope)))
    }
}

/// Fetch one record or fail with `NotFound`
pub async fn find_or_fail<S: RecordSource + ?Sized>(
    source: &S,
    id: i64,
    scope: &EagerLoadSpec,
) -> ModelResult<RawRecord> {
    source
        .fetch_one(id, scope)
        .await?
        .ok_or_else(|| ModelError::NotFound(format!("id {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryStore {
        MemoryStore::new(
            DetailTypeRegistry::from_pairs([
                ("BankAccount", "bankAccountDetails"),
                ("Card", "cardDetails"),
            ])
            .unwrap(),
        )
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_create_with_details() {
        let store = store();
        let created = store
            .create_with_details("BankAccount", Map::new(), object(json!({"bankName": "ABC"})))
            .await
            .unwrap();

        assert_eq!(created.get("id"), Some(&json!(1)));
        assert_eq!(created.get_str("type"), Some("BankAccount"));
        assert_eq!(created.get("details_id"), Some(&json!(1)));
        assert_eq!(created.get("bankAccountDetails").unwrap()["bankName"], json!("ABC"));
        assert!(created.get("created_at").is_some());
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_discriminator_rejected() {
        let err = store()
            .create_with_details("Cash", Map::new(), Map::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::Relationship(RelationshipError::UnknownDiscriminator(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_populates_every_requested_alias() {
        let store = store();
        store
            .create_with_details("BankAccount", Map::new(), object(json!({"bankName": "ABC"})))
            .await
            .unwrap();
        // Both detail tables now hold a row with id 1
        store
            .create_with_details("Card", Map::new(), object(json!({"last4": "1234"})))
            .await
            .unwrap();

        let scope = EagerLoadSpec::with_details(store.registry());
        let records = store.fetch_all(&scope).await.unwrap();
        assert_eq!(records.len(), 2);

        let bank = &records[0];
        assert_eq!(bank.get("bankAccountDetails").unwrap()["bankName"], json!("ABC"));
        assert_eq!(bank.get("cardDetails"), Some(&Value::Null));

        let card = &records[1];
        assert_eq!(card.get("bankAccountDetails"), Some(&Value::Null));
        assert_eq!(card.get("cardDetails").unwrap()["last4"], json!("1234"));
    }

    #[tokio::test]
    async fn test_fetch_without_scope_attaches_nothing() {
        let store = store();
        store
            .create_with_details("Card", Map::new(), object(json!({"last4": "1234"})))
            .await
            .unwrap();

        let scope = EagerLoadSpec::none(store.registry());
        let record = store.fetch_one(1, &scope).await.unwrap().unwrap();
        assert!(!record.contains_key("cardDetails"));
        assert!(store.fetch_one(2, &scope).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_or_fail() {
        let store = store();
        let scope = EagerLoadSpec::with_details(store.registry());
        let err = find_or_fail(&store, 42, &scope).await.unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
    }
}
