mod commands;
mod runtime;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::runtime::Runtime;

#[derive(Debug, Parser)]
#[command(name = "aivis")]
#[command(about = "Measure how AI assistants talk about your brand")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Detect brand and competitor mentions in a piece of text
    Detect {
        /// Brand to look for (by slug)
        #[arg(long)]
        brand: String,

        /// Read the text from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Run the brand's prompts through the configured provider and score them
    Analyze {
        /// Brand to analyze (by slug)
        #[arg(long)]
        brand: String,

        /// Only run these prompt ids (repeatable)
        #[arg(long = "prompt")]
        prompts: Vec<i64>,

        /// Number of consecutive runs; later runs gain confidence from earlier ones
        #[arg(long, default_value_t = 1)]
        repeat: u32,
    },
    /// Send the brand's prompts to every comparison model
    Compare {
        /// Brand to compare (by slug)
        #[arg(long)]
        brand: String,

        /// Only run these prompt ids (repeatable)
        #[arg(long = "prompt")]
        prompts: Vec<i64>,

        /// Only query these models (repeatable, by display name)
        #[arg(long = "model")]
        models: Vec<String>,
    },
    /// Show provider, rate limit and brand configuration
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = aivis_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("no command given; run `aivis --help` for usage");
        return Ok(());
    };

    let runtime = Runtime::load(config)?;
    match command {
        Commands::Detect { brand, file } => {
            commands::run_detect(&runtime, &brand, file.as_deref())?;
        }
        Commands::Analyze {
            brand,
            prompts,
            repeat,
        } => commands::run_analyze(&runtime, &brand, &prompts, repeat).await?,
        Commands::Compare {
            brand,
            prompts,
            models,
        } => commands::run_compare(&runtime, &brand, &prompts, &models).await?,
        Commands::Status => commands::run_status(&runtime).await?,
    }

    Ok(())
}
