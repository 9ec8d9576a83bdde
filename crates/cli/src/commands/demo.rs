//! Replays the account example: create a bank account and a card account,
//! then fetch everything with the `withDetails` scope.

use polymorph_orm::models::{account_registry, Account, AccountType};
use polymorph_orm::{EagerLoadSpec, MemoryStore, PolymorphicResolver, RecordSource};
use serde_json::{json, Map, Value};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub async fn run() -> anyhow::Result<()> {
    let registry = account_registry()?;
    let store = MemoryStore::new(registry.clone());
    let resolver = PolymorphicResolver::new(registry);

    let bank_account = store
        .create_with_details(
            AccountType::BankAccount.as_str(),
            Map::new(),
            object(json!({"bankName": "ABC", "last4": "4444", "routingNumber": "000111000"})),
        )
        .await?;
    println!(
        "created bank account json: {}",
        serde_json::to_string_pretty(&resolver.normalize(&bank_account))?
    );

    let card_account = store
        .create_with_details(
            AccountType::Card.as_str(),
            Map::new(),
            object(json!({"providerName": "Mastercard", "last4": "1234", "expiration": "03/24"})),
        )
        .await?;
    println!(
        "created card account json: {}",
        serde_json::to_string_pretty(&resolver.normalize(&card_account))?
    );

    let scope = EagerLoadSpec::with_details(resolver.registry());
    let fetched = store.fetch_all(&scope).await?;
    let accounts = resolver
        .normalize_all(&fetched)
        .into_iter()
        .map(Account::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    println!("{}", serde_json::to_string_pretty(&accounts)?);

    tracing::info!("Demo finished with {} accounts", accounts.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    #[tokio::test]
    async fn test_demo_runs() {
        assert!(super::run().await.is_ok());
    }
}
