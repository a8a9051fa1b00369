use anyhow::Result;
use clap::Args;

use super::{build_engine, format_result};
use crate::config::CliConfig;

#[derive(Args)]
pub struct SearchArgs {}

/// Run the post-install search for this simulated install
pub async fn run(_args: SearchArgs, config: &CliConfig) -> Result<()> {
    let engine = build_engine(config).await?;
    let result = engine.post_install_search().await;
    println!("{}", format_result(&result));
    Ok(())
}
