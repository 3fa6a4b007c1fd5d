use std::sync::{Arc, Mutex};

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// ─── Log level ────────────────────────────────────────────────────────────────

/// Controls the verbosity of syncdiff's internal tracing output.
///
/// Pass to [`init_tracing`] before calling any async entry point.
///
/// | Variant | `tracing` level | When to use                          |
/// |---------|-----------------|--------------------------------------|
/// | `Error` | `error`         | `--quiet` / CI scripting             |
/// | `Info`  | `info`          | Default, shows per-table timings     |
/// | `Debug` | `debug`         | `--verbose`, shows SQL queries too   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    #[default]
    Info,
    Debug,
}

/// Initialise the global `tracing` subscriber for syncdiff.
///
/// Respects `RUST_LOG` when set, falling back to `level` otherwise. Call
/// once at startup; library consumers with their own subscriber skip this.
///
/// Only available with the `cli` feature (pulls in `tracing-subscriber`).
#[cfg(feature = "cli")]
pub fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;

    let default_filter = match level {
        LogLevel::Error => "syncdiff=error",
        LogLevel::Info  => "syncdiff=info",
        LogLevel::Debug => "syncdiff=debug",
    };

    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

// ─── Public API Facade ───

pub use application::monitoring::PerfReport;
pub use application::table_builder::build_create_table_sql;
pub use domain::changeset::{Changeset, ChangesetKind, Summary};
pub use domain::schema::{ColumnInfo, IndexInfo, KeyRole, SchemaInfo, TableInfo};
pub use domain::schema_diff::{DiffKind, DiffResult};
pub use infrastructure::memory::MemoryDatabase;
pub use domain::table_definition::{
    BareDefault, ColumnDefinition, DefaultValue, IndexDefinition, TableDefinition, CHARSETS,
    COMMON_DATA_TYPES, TABLE_ENGINES,
};
pub use domain::table_diff::{
    DataDiffKind, DataDiffResult, RowMap, RowSnapshot, TableDataDiff, TableDataInfo,
};
pub use domain::value_objects::{column_names, ColumnName, SyncOptions, TableName};
pub use error::{Result, SyncError};
pub use infrastructure::config::{AppConfig, ConnectionConfig, DataConfig, OutputConfig};
pub use infrastructure::db::client::{
    create_database, drop_database, list_databases, test_connection,
};
pub use infrastructure::db::dialect::MysqlDialect;

use crate::application::diff::{self as data_diff, DataDiffService, TableDiffer};
use crate::application::monitoring::{MonitoringDiffer, MonitoringRowRepository};
use crate::application::schema_diff::{SchemaDiffService, SchemaDiffer};
use crate::application::schema_snapshot::SchemaSnapshotService;
use crate::application::snapshot::RowSnapshotService;
use crate::application::table_builder::TableBuilderService;
use crate::domain::ports::{Differ, MetadataProvider};
use crate::infrastructure::db::client::{connect, MysqlSession};

// ─── Pure entry points ───

/// Compare two already-captured schemas.
pub fn diff_schemas(source: &SchemaInfo, target: &SchemaInfo) -> Vec<DiffResult> {
    SchemaDiffer::new().diff(source, target)
}

/// Compare two already-captured row snapshots of `table`.
pub fn diff_table_data(
    source: &RowSnapshot,
    target: &RowSnapshot,
    table: &TableName,
    pk_cols: &[ColumnName],
    columns: &[ColumnName],
) -> Vec<DataDiffResult> {
    TableDiffer::new().diff_table(source, target, table, pk_cols, columns)
}

// ─── Snapshot entry points ───

/// Capture the structure of the database `cfg` points at.
pub async fn schema_snapshot(cfg: &ConnectionConfig) -> Result<SchemaInfo> {
    let session = Arc::new(connect(cfg).await?);
    let result = SchemaSnapshotService::new(session.clone())
        .capture(&cfg.database)
        .await;
    session.close().await;
    result
}

/// Read every row of `table`, keyed by `pk_cols`.
///
/// Fails with [`SyncError::Precondition`] before any row is read when
/// `pk_cols` is empty.
pub async fn row_snapshot(
    cfg: &ConnectionConfig,
    table: &TableName,
    columns: &[ColumnName],
    pk_cols: &[ColumnName],
) -> Result<RowSnapshot> {
    if pk_cols.is_empty() {
        return Err(SyncError::missing_primary_key(&table.0));
    }
    let session = Arc::new(connect(cfg).await?);
    let result = RowSnapshotService::new(session.clone())
        .capture(table, columns, pk_cols)
        .await;
    session.close().await;
    result
}

// ─── Comparison entry points ───

/// Compare the schemas of `cfg.source` and `cfg.target`.
pub async fn compare_schemas(cfg: &AppConfig) -> Result<Changeset> {
    let (source, target) = open_pair(cfg).await?;
    let result = SchemaDiffService::new(source.clone(), target.clone())
        .run_diff(&cfg.source.database, &cfg.target.database)
        .await;
    close_pair(&source, &target).await;

    Ok(Changeset::for_schema(
        &cfg.source.database,
        &cfg.target.database,
        result?,
    ))
}

/// Compare the rows of the configured tables (every keyed table when
/// `cfg.data.tables` is empty).
pub async fn compare_data(cfg: &AppConfig) -> Result<Changeset> {
    let (changeset, _) = compare_data_with_timing(cfg).await?;
    Ok(changeset)
}

/// [`compare_data`] plus a [`PerfReport`] with per-table fetch and diff timings.
pub async fn compare_data_with_timing(cfg: &AppConfig) -> Result<(Changeset, PerfReport)> {
    let report = PerfReport::new();
    let (source, target) = open_pair(cfg).await?;
    let result = run_data_diff(cfg, &source, &target, &report).await;
    close_pair(&source, &target).await;

    Ok((result?, PerfReport::snapshot(&report)))
}

/// Source tables with their primary key, columns and row count.
pub async fn list_sync_tables(cfg: &ConnectionConfig) -> Result<Vec<TableDataInfo>> {
    let session = connect(cfg).await?;
    let result = data_diff::list_sync_tables(&session).await;
    session.close().await;
    result
}

/// Build the `CREATE TABLE` for `def` and execute it against `cfg`.
/// Returns the executed statement.
pub async fn create_table(cfg: &ConnectionConfig, def: &TableDefinition) -> Result<String> {
    let session = Arc::new(connect(cfg).await?);
    let result = TableBuilderService::new(session.clone()).create(def).await;
    session.close().await;
    result
}

// ─── Private helpers ───────────────────────────────────────────────────────────

/// Open source then target. A target failure closes the source first.
async fn open_pair(cfg: &AppConfig) -> Result<(Arc<MysqlSession>, Arc<MysqlSession>)> {
    let source = connect(&cfg.source).await?;
    match connect(&cfg.target).await {
        Ok(target) => Ok((Arc::new(source), Arc::new(target))),
        Err(e) => {
            source.close().await;
            Err(e)
        }
    }
}

async fn close_pair(source: &MysqlSession, target: &MysqlSession) {
    tokio::join!(source.close(), target.close());
}

async fn run_data_diff(
    cfg: &AppConfig,
    source: &Arc<MysqlSession>,
    target: &Arc<MysqlSession>,
    report: &Arc<Mutex<PerfReport>>,
) -> Result<Changeset> {
    let tables: Vec<TableName> = if cfg.data.tables.is_empty() {
        let meta: &dyn MetadataProvider = source.as_ref();
        data_diff::tables_with_primary_key(meta).await?
    } else {
        cfg.data.tables.iter().map(|t| TableName(t.clone())).collect()
    };

    let differ: Arc<dyn Differ> = Arc::new(MonitoringDiffer::new(
        Arc::new(TableDiffer::new()),
        Arc::clone(report),
    ));
    let service = DataDiffService::new(
        source.clone(),
        target.clone(),
        Arc::new(MonitoringRowRepository::new(source.clone(), Arc::clone(report))),
        Arc::new(MonitoringRowRepository::new(target.clone(), Arc::clone(report))),
        differ,
    );

    let diffs = service.compare_tables(&tables, cfg.data.options()).await?;
    Ok(Changeset::for_data(
        &cfg.source.database,
        &cfg.target.database,
        diffs,
    ))
}
