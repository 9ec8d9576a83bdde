//! Logging setup for the `polymorph` binary

use std::io;

use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    /// Enable JSON structured logging (vs plain text)
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    pub fn new(level: impl Into<String>, json_format: bool) -> Self {
        Self {
            level: level.into(),
            json_format,
        }
    }
}

/// Install the global subscriber; `RUST_LOG` wins over the configured level.
/// Logs go to stderr so stdout stays clean JSON.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr))
            .try_init()?;
    }

    tracing::debug!("Logging initialized at level '{}'", config.level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = LoggingConfig::new("polymorph_orm=debug", true);
        assert_eq!(config.level, "polymorph_orm=debug");
        assert!(config.json_format);
        assert!(EnvFilter::try_new(&config.level).is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json_format);
    }
}
