use crate::domain::ports::{Differ, RowRepository};
use crate::domain::{
    table_diff::{DataDiffResult, RowMap, RowSnapshot},
    value_objects::{ColumnName, TableName},
};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, instrument};

// ─── PerfReport ──────────────────────────────────────────────────────────────

/// A single timed operation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OpTiming {
    /// Operation name: "fetch_rows" or "diff_table".
    pub operation: &'static str,
    pub table: String,
    /// Elapsed wall time in milliseconds.
    pub duration_ms: u128,
    /// Rows fetched, or rows on both sides for a diff.
    pub rows: usize,
}

/// Accumulated timings for one data comparison run.
///
/// Shared across the decorators of a run via `Arc<Mutex<_>>`. Render with
/// [`crate::presentation::cli_summary::print_perf_summary`].
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct PerfReport {
    pub timings: Vec<OpTiming>,
    pub total_rows_fetched: usize,
    pub total_ms: u128,
}

impl PerfReport {
    pub fn new() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::default()))
    }

    /// Copy of the report accumulated so far.
    pub fn snapshot(report: &Arc<Mutex<Self>>) -> Self {
        report.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(report: &Arc<Mutex<Self>>, timing: OpTiming) {
        if let Ok(mut r) = report.lock() {
            r.total_ms += timing.duration_ms;
            if timing.operation == "fetch_rows" {
                r.total_rows_fetched += timing.rows;
            }
            r.timings.push(timing);
        }
    }
}

// ─── MonitoringRowRepository ─────────────────────────────────────────────────

/// Decorator: times every `fetch_rows` call of the wrapped repository.
pub struct MonitoringRowRepository {
    inner: Arc<dyn RowRepository>,
    report: Arc<Mutex<PerfReport>>,
}

impl MonitoringRowRepository {
    pub fn new(inner: Arc<dyn RowRepository>, report: Arc<Mutex<PerfReport>>) -> Self {
        Self { inner, report }
    }
}

#[async_trait]
impl RowRepository for MonitoringRowRepository {
    #[instrument(
        name = "fetch_rows",
        skip(self, table, columns),
        fields(db.table = %table.0, db.columns = columns.len()),
        level = "info"
    )]
    async fn fetch_rows(&self, table: &TableName, columns: &[ColumnName]) -> Result<Vec<RowMap>> {
        let start = Instant::now();
        let rows = self.inner.fetch_rows(table, columns).await?;
        let duration_ms = start.elapsed().as_millis();

        info!(table = %table.0, rows = rows.len(), duration_ms, "fetch_rows completed");

        PerfReport::record(
            &self.report,
            OpTiming {
                operation: "fetch_rows",
                table: table.0.clone(),
                duration_ms,
                rows: rows.len(),
            },
        );

        Ok(rows)
    }
}

// ─── MonitoringDiffer ────────────────────────────────────────────────────────

/// Decorator: times every `diff_table` call of the wrapped differ.
pub struct MonitoringDiffer {
    inner: Arc<dyn Differ>,
    report: Arc<Mutex<PerfReport>>,
}

impl MonitoringDiffer {
    pub fn new(inner: Arc<dyn Differ>, report: Arc<Mutex<PerfReport>>) -> Self {
        Self { inner, report }
    }
}

impl Differ for MonitoringDiffer {
    #[instrument(
        name = "diff_table",
        skip(self, source, target, table, pk_cols, columns),
        fields(
            db.table = %table.0,
            source.rows = source.len(),
            target.rows = target.len(),
        ),
        level = "info"
    )]
    fn diff_table(
        &self,
        source: &RowSnapshot,
        target: &RowSnapshot,
        table: &TableName,
        pk_cols: &[ColumnName],
        columns: &[ColumnName],
    ) -> Vec<DataDiffResult> {
        let start = Instant::now();
        let result = self.inner.diff_table(source, target, table, pk_cols, columns);
        let duration_ms = start.elapsed().as_millis();

        info!(
            table = %table.0,
            source_rows = source.len(),
            target_rows = target.len(),
            changes = result.len(),
            duration_ms,
            "diff_table completed"
        );

        PerfReport::record(
            &self.report,
            OpTiming {
                operation: "diff_table",
                table: table.0.clone(),
                duration_ms,
                rows: source.len() + target.len(),
            },
        );

        result
    }
}
