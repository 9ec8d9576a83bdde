use std::path::Path;

use anyhow::Context;
use polymorph_orm::{NormalizedRecord, PolymorphicResolver, RawRecord};
use serde_json::Value;

use super::load_config;

/// Normalize a JSON object or array of raw records and print the result
pub fn run(input: &Path, config: Option<&Path>, strict: bool) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let resolver = PolymorphicResolver::new(config.build_registry()?);

    let content = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", input.display()))?;

    let output = normalize_value(&resolver, value, strict || config.strict)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn normalize_value(resolver: &PolymorphicResolver, value: Value, strict: bool) -> anyhow::Result<Value> {
    let normalize_one = |value: Value| -> anyhow::Result<NormalizedRecord> {
        let raw = RawRecord::try_from(value)?;
        if strict {
            Ok(resolver.normalize_strict(&raw)?)
        } else {
            Ok(resolver.normalize(&raw))
        }
    };

    Ok(match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| normalize_one(item).map(NormalizedRecord::into_value))
                .collect::<anyhow::Result<_>>()?,
        ),
        other => normalize_one(other)?.into_value(),
    })
}
