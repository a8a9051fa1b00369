use anyhow::{Result, bail};
use clap::Args;
use traceback_core::{DiagnosticsStatus, diagnostics};

use crate::config::CliConfig;

#[derive(Args)]
pub struct DiagnoseArgs {}

pub fn run(_args: DiagnoseArgs, config: &CliConfig) -> Result<()> {
    let report = diagnostics::check_configuration(&config.traceback);
    println!("{}", report);

    if report.status() == DiagnosticsStatus::HasErrors {
        bail!("Configuration has {} error(s)", report.error_count());
    }
    Ok(())
}
