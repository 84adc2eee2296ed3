//! Data Source Command

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use stratus_provider::StratusProvider;

use crate::client::read_value;
use crate::output::{print_state, OutputFormat};

#[derive(Args)]
pub struct DataArgs {
    /// Data source type name
    pub type_name: String,

    /// Lookup arguments (JSON)
    #[arg(short, long)]
    pub config: PathBuf,
}

pub async fn execute(provider: &StratusProvider, args: DataArgs, format: OutputFormat) -> Result<()> {
    let config = read_value(&args.config)?;
    let found = provider.read_data_source(&args.type_name, &config).await?;
    print_state(&found, format);
    Ok(())
}
