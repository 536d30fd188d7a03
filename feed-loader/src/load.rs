//! Writes loader rows into a knowledge table and summarises the run.

use std::{fmt, future::Future, pin::Pin};

use colored::Colorize;
use rag_store::{IngestReport, MemoryStore, RagRecord, RagStore, TableRef};
use tracing::info;

use crate::error::Result;

/// Boxed future returned by [`RowSink::write_rows`].
pub type WriteFuture<'a> = Pin<Box<dyn Future<Output = Result<IngestReport>> + Send + 'a>>;

/// Destination of loader rows.
pub trait RowSink: Send + Sync {
    fn write_rows<'a>(&'a self, target: &'a TableRef, rows: Vec<RagRecord>) -> WriteFuture<'a>;
}

impl RowSink for RagStore {
    fn write_rows<'a>(&'a self, target: &'a TableRef, rows: Vec<RagRecord>) -> WriteFuture<'a> {
        Box::pin(async move { Ok(self.ingest_rows(target, rows).await?) })
    }
}

impl RowSink for MemoryStore {
    fn write_rows<'a>(&'a self, target: &'a TableRef, rows: Vec<RagRecord>) -> WriteFuture<'a> {
        Box::pin(async move { Ok(self.insert_rows(target, rows).await) })
    }
}

/// End-of-run numbers printed by the loader binaries.
#[derive(Clone, Debug)]
pub struct LoadSummary {
    pub target: TableRef,
    /// Source records turned into rows.
    pub parsed: usize,
    /// Source records rejected before embedding.
    pub skipped: usize,
    pub report: IngestReport,
}

impl LoadSummary {
    /// The run wrote no row at all.
    pub fn nothing_written(&self) -> bool {
        self.report.rows_written == 0
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let written = self.report.rows_written.to_string();
        let failed = self.report.batches_failed.to_string();
        writeln!(f, "{} {}", "Loaded into".bold(), self.target.to_string().cyan())?;
        writeln!(f, "  parsed          {}", self.parsed)?;
        writeln!(f, "  skipped         {}", self.skipped + self.report.rows_skipped)?;
        writeln!(
            f,
            "  rows written    {}",
            if self.nothing_written() { written.red() } else { written.green() }
        )?;
        write!(
            f,
            "  failed batches  {}",
            if self.report.batches_failed > 0 { failed.yellow() } else { failed.normal() }
        )
    }
}

/// Writes `records` and builds the summary.
///
/// `skipped` counts source records that never became rows.
pub async fn load_records(
    sink: &dyn RowSink,
    target: &TableRef,
    records: Vec<RagRecord>,
    skipped: usize,
) -> Result<LoadSummary> {
    let parsed = records.len();
    info!(%target, rows = parsed, skipped, "loading rows");
    let report = sink.write_rows(target, records).await?;
    Ok(LoadSummary {
        target: target.clone(),
        parsed,
        skipped,
        report,
    })
}
