use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::application::snapshot::RowSnapshotService;
use crate::domain::ports::{Differ, MetadataProvider, RowRepository};
use crate::domain::table_diff::{
    DataDiffKind, DataDiffResult, RowMap, RowSnapshot, TableDataDiff, TableDataInfo,
};
use crate::domain::value_objects::{ColumnName, SyncOptions, TableName};
use crate::error::{Result, SyncError};
use crate::infrastructure::db::sql_utils::{
    delete_statement, insert_statement, update_statement, value_text,
};

// ─── Data Diff Service ───

/// Compares the rows of tables that exist on both sides.
///
/// Primary keys and the column list always come from the source side.
pub struct DataDiffService {
    source_meta: Arc<dyn MetadataProvider>,
    target_meta: Arc<dyn MetadataProvider>,
    source_repo: Arc<dyn RowRepository>,
    target_repo: Arc<dyn RowRepository>,
    differ: Arc<dyn Differ>,
}

impl DataDiffService {
    pub fn new(
        source_meta: Arc<dyn MetadataProvider>,
        target_meta: Arc<dyn MetadataProvider>,
        source_repo: Arc<dyn RowRepository>,
        target_repo: Arc<dyn RowRepository>,
        differ: Arc<dyn Differ>,
    ) -> Self {
        Self {
            source_meta,
            target_meta,
            source_repo,
            target_repo,
            differ,
        }
    }

    /// Diff one table. Tables without a primary key are rejected before any
    /// row is read. `options` filters the returned statements; the rollup
    /// counts always cover the full diff.
    #[instrument(
        name = "compare_table",
        skip(self, table, options),
        fields(db.table = %table),
        level = "info"
    )]
    pub async fn compare_table(
        &self,
        table: &TableName,
        options: SyncOptions,
    ) -> Result<TableDataDiff> {
        let pk_cols = self.source_meta.primary_keys(table).await?;
        if pk_cols.is_empty() {
            return Err(SyncError::missing_primary_key(&table.0));
        }
        let columns: Vec<ColumnName> = self
            .source_meta
            .list_columns(table)
            .await?
            .into_iter()
            .map(|c| ColumnName(c.name))
            .collect();

        let source = RowSnapshotService::new(Arc::clone(&self.source_repo));
        let target = RowSnapshotService::new(Arc::clone(&self.target_repo));
        let (source_rows, target_rows) = tokio::join!(
            source.capture(table, &columns, &pk_cols),
            target.capture(table, &columns, &pk_cols)
        );
        let diffs = self
            .differ
            .diff_table(&source_rows?, &target_rows?, table, &pk_cols, &columns);

        let (source_count, target_count) = tokio::join!(
            self.source_meta.row_count(table),
            self.target_meta.row_count(table)
        );
        let info = TableDataInfo {
            table_name: table.0.clone(),
            primary_keys: pk_cols.iter().map(|c| c.0.clone()).collect(),
            columns: columns.iter().map(|c| c.0.clone()).collect(),
            source_count: source_count?,
            target_count: target_count?,
            ..Default::default()
        }
        .tally(&diffs);

        info!(
            table = %table,
            inserts = info.insert_count,
            updates = info.update_count,
            deletes = info.delete_count,
            "data comparison complete"
        );

        let diffs = diffs.into_iter().filter(|d| options.allows(d.kind)).collect();
        Ok(TableDataDiff { info, diffs })
    }

    /// Diff each table in order; the first failure aborts the run.
    pub async fn compare_tables(
        &self,
        tables: &[TableName],
        options: SyncOptions,
    ) -> Result<Vec<TableDataDiff>> {
        let mut results = Vec::with_capacity(tables.len());
        for table in tables {
            results.push(self.compare_table(table, options).await?);
        }
        Ok(results)
    }
}

/// Every base table of the provider's database with its primary key,
/// columns and row count. Tables without a primary key are listed too, with
/// an empty key, so callers can show why they are skipped.
pub async fn list_sync_tables(meta: &dyn MetadataProvider) -> Result<Vec<TableDataInfo>> {
    let tables = meta.list_tables().await?;
    let mut infos = Vec::with_capacity(tables.len());
    for table in tables {
        let primary_keys = meta.primary_keys(&table).await?;
        let columns = meta.list_columns(&table).await?;
        let source_count = meta.row_count(&table).await?;
        infos.push(TableDataInfo {
            table_name: table.0,
            primary_keys: primary_keys.into_iter().map(|c| c.0).collect(),
            columns: columns.into_iter().map(|c| c.name).collect(),
            source_count,
            ..Default::default()
        });
    }
    Ok(infos)
}

/// Base tables that have a primary key, in listing order.
pub async fn tables_with_primary_key(meta: &dyn MetadataProvider) -> Result<Vec<TableName>> {
    let mut keyed = Vec::new();
    for table in meta.list_tables().await? {
        if meta.primary_keys(&table).await?.is_empty() {
            debug!(table = %table, "skipping table without primary key");
        } else {
            keyed.push(table);
        }
    }
    Ok(keyed)
}

// ─── Table Differ (implementation of the port) ───

#[derive(Default)]
pub struct TableDiffer;

impl TableDiffer {
    pub fn new() -> Self {
        Self
    }
}

impl Differ for TableDiffer {
    /// Source keys in ascending order (inserts and updates interleaved), then
    /// deletes in ascending key order.
    fn diff_table(
        &self,
        source: &RowSnapshot,
        target: &RowSnapshot,
        table: &TableName,
        pk_cols: &[ColumnName],
        columns: &[ColumnName],
    ) -> Vec<DataDiffResult> {
        let mut results = Vec::new();

        for (key, source_row) in source {
            match target.get(key) {
                None => results.push(DataDiffResult {
                    kind: DataDiffKind::Insert,
                    table_name: table.0.clone(),
                    primary_key: extract_pk(source_row, pk_cols),
                    old_values: None,
                    new_values: Some(source_row.clone()),
                    sql: insert_statement(table, source_row, columns),
                }),
                Some(target_row) if rows_differ(source_row, target_row) => {
                    results.push(DataDiffResult {
                        kind: DataDiffKind::Update,
                        table_name: table.0.clone(),
                        primary_key: extract_pk(source_row, pk_cols),
                        old_values: Some(target_row.clone()),
                        new_values: Some(source_row.clone()),
                        sql: update_statement(table, source_row, pk_cols, columns),
                    })
                }
                Some(_) => {}
            }
        }

        for (key, target_row) in target {
            if !source.contains_key(key) {
                let pk = extract_pk(target_row, pk_cols);
                let sql = delete_statement(table, &pk, pk_cols);
                results.push(DataDiffResult {
                    kind: DataDiffKind::Delete,
                    table_name: table.0.clone(),
                    primary_key: pk,
                    old_values: Some(target_row.clone()),
                    new_values: None,
                    sql,
                });
            }
        }

        results
    }
}

/// Column count first, then stringified value per column. Not type-aware:
/// `"5"` equals `5`, `"5.0"` does not. NULL (or a missing column) differs
/// from every string.
fn rows_differ(source: &RowMap, target: &RowMap) -> bool {
    source.len() != target.len()
        || source
            .iter()
            .any(|(col, val)| value_text(val) != target.get(col).and_then(value_text))
}

fn extract_pk(row: &RowMap, pk_cols: &[ColumnName]) -> RowMap {
    pk_cols
        .iter()
        .filter_map(|col| row.get(&col.0).map(|v| (col.0.clone(), v.clone())))
        .collect()
}
