mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use logging::{init_logging, LoggingConfig};

#[derive(Parser)]
#[command(name = "polymorph")]
#[command(about = "Inspect detail-type registries and normalize polymorphic records")]
struct Cli {
    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create sample accounts in memory and print them normalized
    Demo,

    /// List the relation aliases loaded for the owning model
    Aliases {
        /// Resolver configuration file (.yaml, .yml or .json)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the relation alias registered for a discriminator value
    Resolve {
        /// Discriminator value (e.g. BankAccount)
        discriminator: String,

        /// Resolver configuration file (.yaml, .yml or .json)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Normalize a JSON object or array of raw records
    Normalize {
        /// Input JSON file
        input: PathBuf,

        /// Resolver configuration file (.yaml, .yml or .json)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Fail on records with conflicting detail relations
        #[arg(long)]
        strict: bool,
    },
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Demo => commands::demo::run().await,
        Commands::Aliases { config } => commands::inspect::aliases(config.as_deref()),
        Commands::Resolve { discriminator, config } => {
            commands::inspect::resolve(&discriminator, config.as_deref())
        }
        Commands::Normalize { input, config, strict } => {
            commands::normalize::run(&input, config.as_deref(), strict)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&LoggingConfig::new(cli.log_level.clone(), cli.json_logs)) {
        eprintln!("failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli.command).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
