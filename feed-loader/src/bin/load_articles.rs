//! Loads a support article JSONL export into the articles knowledge table.
//!
//! Usage: `load-articles <DATA_FILEPATH> [--url-prefix https://support.com/en_us/]`

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use feed_loader::{
    TargetArgs,
    articles::{DEFAULT_ARTICLE_TABLE, DEFAULT_URL_PREFIX, parse_articles},
    init_tracing, load_records, open_store,
};
use rag_store::read_jsonl_file;
use tracing::error;

#[derive(Parser)]
#[command(name = "load-articles", version, about = "Load support articles (JSONL) into the knowledge base table")]
struct Cli {
    /// JSONL export, one article object per line.
    data_filepath: PathBuf,

    /// Prefix of the public article URL; `<slug>-<hash>` is appended.
    #[arg(long, env = "ARTICLE_URL_PREFIX", default_value = DEFAULT_URL_PREFIX)]
    url_prefix: String,

    #[command(flatten)]
    target: TargetArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing().context("installing tracing subscriber")?;
    let cli = Cli::parse();
    let target = cli.target.target(DEFAULT_ARTICLE_TABLE);

    let lines = read_jsonl_file(&cli.data_filepath)
        .with_context(|| format!("reading {}", cli.data_filepath.display()))?;
    let parsed = parse_articles(lines, &cli.url_prefix);

    let store = open_store(&cli.target)?;
    let summary = load_records(&store, &target, parsed.records, parsed.skipped).await?;
    println!("{summary}");

    if summary.nothing_written() {
        error!(%target, "no rows were written");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
