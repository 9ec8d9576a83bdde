use std::path::Path;

use polymorph_orm::{EagerLoadSpec, PolymorphicResolver};

use super::load_config;

/// Print the aliases the `withDetails` scope loads, in registration order
pub fn aliases(config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let registry = config.build_registry()?;
    let scope = EagerLoadSpec::with_details(&registry);

    println!("{} ({} via {}):", config.owning_model, scope.scope, scope.foreign_key);
    for relation in &scope.relations {
        println!(
            "  {:<20} -> {:<24} {} ({})",
            relation.discriminator, relation.alias, relation.related_model, relation.related_table
        );
    }
    Ok(())
}

/// Print the alias for one discriminator value; an unknown value is a warning
pub fn resolve(discriminator: &str, config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let resolver = PolymorphicResolver::new(config.build_registry()?);

    match resolver.relation_alias_for(discriminator) {
        Some(alias) => println!("{}", alias),
        None => tracing::warn!(
            "'{}' is not a registered {} type",
            discriminator,
            config.owning_model
        ),
    }
    Ok(())
}
