pub mod check;
pub mod diagnose;
pub mod open;
pub mod search;
pub mod state;

use std::sync::Arc;

use anyhow::Result;
use traceback_core::{AttributionEngine, AttributionResult, FileStore};

use crate::config::CliConfig;
use crate::host::{EnvSystemInfo, SystemClipboard};

/// Engine for the simulated install described by `config`
async fn build_engine(config: &CliConfig) -> Result<AttributionEngine> {
    let store = FileStore::load(&config.app.data_dir).await?;
    let engine = AttributionEngine::builder(config.traceback.clone())
        .store(Arc::new(store))
        .system_info(Arc::new(EnvSystemInfo {
            bundle_id: config.app.bundle_id.clone(),
            data_dir: config.app.data_dir.clone(),
        }))
        .clipboard(Arc::new(SystemClipboard))
        .build()?;
    Ok(engine)
}

/// Render an attribution result for the terminal
fn format_result(result: &AttributionResult) -> String {
    if result.is_empty() {
        return "No link".to_string();
    }

    let mut out = String::new();
    match &result.url {
        Some(url) => out.push_str(&format!("URL:        {}\n", url)),
        None => out.push_str("URL:        (none)\n"),
    }
    if let Some(campaign) = &result.campaign {
        out.push_str(&format!("Campaign:   {}\n", campaign));
    }
    out.push_str(&format!("Match type: {}", result.match_type));
    for event in &result.analytics {
        out.push_str(&format!("\nEvent:      {}", event));
    }
    out
}
