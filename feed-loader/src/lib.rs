//! Batch loaders that fill the knowledge tables used by the support chat.
//!
//! - [`media`]: website media catalog JSON feed (`load-website`)
//! - [`articles`]: support article JSONL export (`load-articles`)
//!
//! Rows are embedded and written through `rag-store` in batches of at most
//! 10,000; a failed batch is logged and the run continues.

pub mod articles;
pub mod error;
pub mod load;
pub mod media;

use std::sync::Arc;

use ai_llm_service::{LlmServiceProfiles, telemetry};
use clap::Args;
use rag_store::{DEFAULT_UPSERT_BATCH, GeminiEmbedder, RagConfig, RagStore, TableRef};
use tracing::Level;
use tracing_subscriber::{Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{LoaderError, Result};
pub use load::{LoadSummary, RowSink, load_records};

pub const DEFAULT_DATASET: &str = "lunar_data_ds";

/// Target and batching flags shared by both loaders.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Rows per write batch (1..=10000).
    #[arg(long, env = "UPSERT_BATCH", default_value_t = DEFAULT_UPSERT_BATCH)]
    pub batch_size: usize,

    /// Concurrent embedding requests.
    #[arg(long, env = "EMBEDDING_CONCURRENCY", default_value_t = 8)]
    pub concurrency: usize,

    /// Dataset (collection prefix).
    #[arg(long, env = "KNOWLEDGE_DATASET", default_value = DEFAULT_DATASET)]
    pub dataset: String,

    /// Table name; each loader has its own default.
    #[arg(long)]
    pub table: Option<String>,
}

impl TargetArgs {
    pub fn target(&self, default_table: &str) -> TableRef {
        TableRef::new(&self.dataset, self.table.as_deref().unwrap_or(default_table))
    }

    /// `RagConfig::from_env` with the batch flags applied.
    pub fn rag_config(&self) -> Result<RagConfig> {
        let mut cfg = RagConfig::from_env()?;
        cfg.upsert_batch = self.batch_size;
        cfg.embedding_concurrency = self.concurrency.max(1);
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Qdrant store with Gemini embeddings, configured from env and flags.
pub fn open_store(args: &TargetArgs) -> Result<RagStore> {
    let svc = Arc::new(LlmServiceProfiles::from_env()?);
    Ok(RagStore::new(args.rag_config()?, Arc::new(GeminiEmbedder::new(svc)))?)
}

/// Loads `.env` when present and installs the loader's subscriber.
pub fn init_tracing() -> std::result::Result<(), tracing_subscriber::util::TryInitError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(
            fmt::layer()
                .with_target(false)
                .with_filter(telemetry::exclude_this_crate()),
        )
        .with(telemetry::layer())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};
    use std::ffi::OsStr;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        target: TargetArgs,
    }

    #[test]
    fn flags_default_to_known_target() {
        let cli = Cli::parse_from(["test"]);
        assert_eq!(cli.target.batch_size, 10_000);
        assert_eq!(cli.target.concurrency, 8);
        assert_eq!(cli.target.target("webdata").table, "webdata");
    }

    #[test]
    fn batch_flags_read_the_shared_env_vars() {
        let cmd = Cli::command();
        let env_of = |id: &str| {
            cmd.get_arguments()
                .find(|a| a.get_id() == id)
                .and_then(|a| a.get_env())
                .map(OsStr::to_os_string)
        };
        assert_eq!(env_of("batch_size").as_deref(), Some(OsStr::new("UPSERT_BATCH")));
        assert_eq!(env_of("concurrency").as_deref(), Some(OsStr::new("EMBEDDING_CONCURRENCY")));
        assert_eq!(env_of("dataset").as_deref(), Some(OsStr::new("KNOWLEDGE_DATASET")));
    }

    #[test]
    fn table_flag_overrides_default() {
        let cli = Cli::parse_from(["test", "--table", "staging", "--dataset", "ds", "--batch-size", "500"]);
        let t = cli.target.target("articledata");
        assert_eq!(t, TableRef::new("ds", "staging"));
        assert_eq!(cli.target.batch_size, 500);
    }
}
