use anyhow::{Result, bail};
use clap::Args;
use traceback_core::links;
use url::Url;

use crate::config::CliConfig;

#[derive(Args)]
pub struct CheckArgs {
    /// Link to check against the configured hosts
    pub url: Url,
}

/// Report whether a link belongs to this app; fails for foreign links
pub fn run(args: CheckArgs, config: &CliConfig) -> Result<()> {
    if !links::is_associated_host(&config.traceback, &args.url) {
        bail!("{} is not a traceback link", args.url);
    }

    println!("{} is a traceback link", args.url);
    match links::campaign_id(&args.url) {
        Some(campaign) => println!("Campaign: {}", campaign),
        None => match links::link_parameter(&args.url) {
            Some(link) => println!("Resolves locally to: {}", link),
            None => println!("No campaign or link parameter"),
        },
    }
    Ok(())
}
