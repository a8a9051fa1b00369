use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use traceback_core::{CampaignLedger, FileStore, InstallGate, KeyValueStore};

use crate::config::CliConfig;

#[derive(Args)]
pub struct StateArgs {
    /// Forget the completed search and seen campaigns, simulating a fresh install
    #[arg(long)]
    pub reset: bool,
}

/// Show the persisted attribution state of this simulated install
pub async fn run(args: StateArgs, config: &CliConfig) -> Result<()> {
    let store = FileStore::load(&config.app.data_dir).await?;
    let path = store.path().to_path_buf();
    let store: Arc<dyn KeyValueStore> = Arc::new(store);
    let gate = InstallGate::new(Arc::clone(&store));
    let ledger = CampaignLedger::new(store);

    if args.reset {
        gate.reset().await?;
        ledger.clear().await?;
        println!("Reset attribution state in {}", path.display());
        return Ok(());
    }

    println!("State file:      {}", path.display());
    println!("Search complete: {}", gate.get().await?);

    let campaigns = ledger.seen().await?;
    if campaigns.is_empty() {
        println!("Seen campaigns:  (none)");
    } else {
        println!("Seen campaigns:");
        for campaign in campaigns {
            println!("  {}", campaign);
        }
    }
    Ok(())
}
