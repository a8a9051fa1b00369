use anyhow::Result;
use clap::Args;
use url::Url;

use super::{build_engine, format_result};
use crate::config::CliConfig;

#[derive(Args)]
pub struct OpenArgs {
    /// Link the app was opened with
    pub url: Url,

    /// Also run the post-install search, as on a first launch
    #[arg(long)]
    pub wait_search: bool,
}

pub async fn run(args: OpenArgs, config: &CliConfig) -> Result<()> {
    let engine = build_engine(config).await?;

    if args.wait_search {
        let (search, opened) = tokio::join!(
            engine.post_install_search(),
            engine.campaign_link(&args.url)
        );
        println!("Post-install search:\n{}\n", format_result(&search));
        println!("Opened link:\n{}", format_result(&opened));
    } else {
        let opened = engine.campaign_link(&args.url).await;
        println!("{}", format_result(&opened));
    }
    Ok(())
}
