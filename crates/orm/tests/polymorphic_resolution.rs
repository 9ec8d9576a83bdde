use polymorph_orm::models::{account_registry, Account, AccountDetails, AccountType};
use polymorph_orm::{
    DetailTypeRegistry, EagerLoadSpec, MemoryStore, MorphRegistry, PolymorphicResolver, RawRecord,
    RecordSource, RelationshipError,
};
use serde_json::{json, Map, Value};

fn account_resolver() -> PolymorphicResolver {
    PolymorphicResolver::new(
        DetailTypeRegistry::from_pairs([
            ("BankAccount", "bankAccountDetails"),
            ("Card", "cardDetails"),
        ])
        .unwrap(),
    )
}

fn raw(value: Value) -> RawRecord {
    RawRecord::try_from(value).unwrap()
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[test]
fn bank_account_details_become_details() {
    let normalized = account_resolver().normalize(&raw(json!({
        "type": "BankAccount",
        "bankAccountDetails": {"bankName": "ABC"},
        "cardDetails": null
    })));

    assert_eq!(
        serde_json::to_value(&normalized).unwrap(),
        json!({"type": "BankAccount", "details": {"bankName": "ABC"}})
    );
}

#[test]
fn card_without_loaded_details_has_null_details() {
    // cardDetails is left out: the JSON form of an undefined relation
    let normalized = account_resolver().normalize(&raw(json!({
        "type": "Card",
        "bankAccountDetails": null
    })));

    assert_eq!(normalized.into_value(), json!({"type": "Card", "details": null}));
}

#[test]
fn registering_a_discriminator_twice_fails() {
    let mut builder = DetailTypeRegistry::builder();
    builder.register_type("X", "a").unwrap();

    assert!(matches!(
        builder.register_type("X", "b"),
        Err(RelationshipError::DuplicateRegistration { .. })
    ));
}

#[test]
fn unknown_discriminator_is_absent_not_an_error() {
    assert_eq!(account_resolver().relation_alias_for("Unknown"), None);
}

#[test]
fn relation_alias_for_matches_registrations() {
    let resolver = account_resolver();
    for (discriminator, alias) in [("BankAccount", "bankAccountDetails"), ("Card", "cardDetails")] {
        assert_eq!(resolver.relation_alias_for(discriminator), Some(alias));
    }
    for unregistered in ["bankAccount", "card", "", "bankAccountDetails"] {
        assert_eq!(resolver.relation_alias_for(unregistered), None);
    }
}

#[tokio::test]
async fn store_fetch_normalize_and_type() {
    let registry = account_registry().unwrap();
    let store = MemoryStore::new(registry.clone());
    let resolver = PolymorphicResolver::new(registry);

    store
        .create_with_details(
            AccountType::BankAccount.as_str(),
            Map::new(),
            object(json!({"bankName": "ABC", "last4": "4444", "routingNumber": "000111000"})),
        )
        .await
        .unwrap();
    store
        .create_with_details(
            AccountType::Card.as_str(),
            Map::new(),
            object(json!({"providerName": "Mastercard", "last4": "1234", "expiration": "03/24"})),
        )
        .await
        .unwrap();

    let scope = EagerLoadSpec::with_details(resolver.registry());
    let fetched = store.fetch_all(&scope).await.unwrap();
    let normalized = resolver.normalize_all(&fetched);

    for record in &normalized {
        assert!(!record.contains_key("bankAccountDetails"));
        assert!(!record.contains_key("cardDetails"));
        assert!(resolver.normalize_strict(&record.clone().into_raw()).is_ok());
    }

    let accounts: Vec<Account> = normalized
        .into_iter()
        .map(Account::try_from)
        .collect::<Result<_, _>>()
        .unwrap();

    assert!(matches!(
        &accounts[0].details,
        Some(AccountDetails::BankAccount(d)) if d.bank_name.as_deref() == Some("ABC")
    ));
    assert!(matches!(
        &accounts[1].details,
        Some(AccountDetails::Card(d)) if d.provider_name.as_deref() == Some("Mastercard")
    ));
}

#[test]
fn morph_registry_resolves_per_owning_model() {
    let morphs = MorphRegistry::new();
    morphs.register("Account", account_registry().unwrap()).unwrap();
    morphs
        .register(
            "Payment",
            DetailTypeRegistry::from_pairs([("Wire", "wireInfo")]).unwrap(),
        )
        .unwrap();

    assert_eq!(morphs.relation_alias_for("Payment", "Wire").as_deref(), Some("wireInfo"));
    assert_eq!(morphs.relation_alias_for("Account", "Wire"), None);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let morphs = morphs.clone();
            std::thread::spawn(move || morphs.relation_alias_for("Account", "Card"))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("cardDetails"));
    }
}
