//! Loads the website media catalog feed into the media knowledge table.
//!
//! Usage: `load-website <URL> [--max-pages N] [--table webdata]`

use std::{process::ExitCode, time::Duration};

use anyhow::Context;
use clap::Parser;
use feed_loader::{
    TargetArgs, init_tracing, load_records,
    media::{DEFAULT_MEDIA_TABLE, FeedPaging, feed_client, fetch_media},
    open_store,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "load-website", version, about = "Load the website media feed into the media catalog table")]
struct Cli {
    /// Feed URL returning `playContentArray.playContents`.
    url: String,

    /// Pages to fetch; above 1 the page number is sent as a query parameter.
    #[arg(long, default_value_t = 1)]
    max_pages: u32,

    /// Name of the page query parameter.
    #[arg(long, default_value = "page")]
    page_param: String,

    /// HTTP timeout per page, in seconds.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    #[command(flatten)]
    target: TargetArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing().context("installing tracing subscriber")?;
    let cli = Cli::parse();
    let target = cli.target.target(DEFAULT_MEDIA_TABLE);

    let client = feed_client(Duration::from_secs(cli.timeout_secs))?;
    let paging = FeedPaging {
        max_pages: cli.max_pages,
        page_param: cli.page_param,
    };
    let records = fetch_media(&client, &cli.url, &paging)
        .await
        .with_context(|| format!("fetching {}", cli.url))?;
    info!(rows = records.len(), "media feed flattened");

    let store = open_store(&cli.target)?;
    let summary = load_records(&store, &target, records, 0).await?;
    println!("{summary}");

    if summary.nothing_written() {
        error!(%target, "no rows were written");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
