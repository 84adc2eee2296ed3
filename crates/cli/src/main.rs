//! Stratus CLI - Main Entry Point
//!
//! Drives the provider against the local cloud simulator: plan and apply
//! resource configurations, refresh and import state, look up data sources
//! and inspect or seed the simulated account.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stratus_common::ProviderConfig;

mod client;
mod commands;
mod output;

use commands::{data, resource, schema, sim};

/// Stratus CLI - declarative cloud resource provider
#[derive(Parser)]
#[command(name = "stratus")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, env = "STRATUS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Store directory holding the simulator database
    #[arg(long, env = "STRATUS_STORE", global = true)]
    store: Option<PathBuf>,

    /// Region to operate in
    #[arg(long, env = "STRATUS_REGION", global = true)]
    region: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List resource and data source types
    Types,

    /// Show the schema of a type
    Schema(schema::SchemaArgs),

    /// Validate a resource configuration
    Validate(schema::ValidateArgs),

    /// Show what applying a configuration would change
    Plan(resource::PlanArgs),

    /// Create, update or replace a resource to match its configuration
    Apply(resource::PlanArgs),

    /// Refresh a resource's state
    Read(resource::StateArgs),

    /// Import an existing object into a state file
    Import(resource::ImportArgs),

    /// Delete a resource
    Destroy(resource::StateArgs),

    /// Look up a data source
    Data(data::DataArgs),

    /// Inspect and seed the local simulator
    #[command(subcommand)]
    Sim(sim::SimCommands),

    /// Show version information
    Version,
}

fn load_config(cli: &Cli) -> anyhow::Result<ProviderConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(stratus_common::default_config_path);
    let mut config = ProviderConfig::load(&path)?;
    if let Some(store) = &cli.store {
        config.store_path = store.clone();
    }
    if let Some(region) = &cli.region {
        config.region = region.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Version = cli.command {
        println!("Stratus CLI v{}", stratus_common::VERSION);
        return Ok(());
    }

    let session = client::Session::open(load_config(&cli)?)?;
    let provider = &session.provider;
    let format = cli.format;

    let result = match cli.command {
        Commands::Types => {
            schema::types(provider, format);
            Ok(())
        }
        Commands::Schema(args) => schema::schema(provider, args, format),
        Commands::Validate(args) => schema::validate(provider, args, format),
        Commands::Plan(args) => resource::plan(provider, args, format),
        Commands::Apply(args) => resource::apply(provider, args, format).await,
        Commands::Read(args) => resource::read(provider, args, format).await,
        Commands::Import(args) => resource::import(provider, args, format).await,
        Commands::Destroy(args) => resource::destroy(provider, args).await,
        Commands::Data(args) => data::execute(provider, args, format).await,
        Commands::Sim(cmd) => sim::execute(cmd, &session.cloud, format),
        Commands::Version => Ok(()),
    };

    if let Err(err) = result {
        output::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
    Ok(())
}
