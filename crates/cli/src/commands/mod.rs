pub mod demo;
pub mod inspect;
pub mod normalize;

use std::path::Path;

use anyhow::Context;
use polymorph_orm::ResolverConfig;

/// Explicit `--config` file, otherwise defaults plus `POLYMORPH_*` variables
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ResolverConfig> {
    let config = match path {
        Some(path) => ResolverConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ResolverConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}
