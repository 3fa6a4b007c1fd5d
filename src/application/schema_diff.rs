use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::application::schema_snapshot::SchemaSnapshotService;
use crate::domain::ports::MetadataProvider;
use crate::domain::schema::{ColumnInfo, SchemaInfo, TableInfo, PRIMARY_INDEX};
use crate::domain::schema_diff::{DiffKind, DiffResult, SchemaSummary};
use crate::error::Result;
use crate::infrastructure::db::sql_utils::{
    add_column, add_index, drop_column, drop_index, drop_table, modify_column, recreate_index,
    terminate, ColumnPlacement,
};

// ─── Schema Diff Service ───

/// Captures both sides and compares them.
pub struct SchemaDiffService {
    source: Arc<dyn MetadataProvider>,
    target: Arc<dyn MetadataProvider>,
    differ: SchemaDiffer,
}

impl SchemaDiffService {
    pub fn new(source: Arc<dyn MetadataProvider>, target: Arc<dyn MetadataProvider>) -> Self {
        Self {
            source,
            target,
            differ: SchemaDiffer::new(),
        }
    }

    #[instrument(name = "schema_diff", skip(self), level = "info")]
    pub async fn run_diff(&self, source_db: &str, target_db: &str) -> Result<Vec<DiffResult>> {
        let source = SchemaSnapshotService::new(Arc::clone(&self.source));
        let target = SchemaSnapshotService::new(Arc::clone(&self.target));

        let (source_schema, target_schema) =
            tokio::join!(source.capture(source_db), target.capture(target_db));
        let results = self.differ.diff(&source_schema?, &target_schema?);

        let summary = SchemaSummary::from_results(&results);
        info!(
            added = summary.added,
            modified = summary.modified,
            removed = summary.removed,
            "schema comparison complete"
        );
        Ok(results)
    }
}

// ─── Schema Differ ───

/// Pure comparison of two schema snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaDiffer;

impl SchemaDiffer {
    pub fn new() -> Self {
        Self
    }

    /// Every difference that turns `target` into `source`, sorted by
    /// (kind, table name). Sub-diffs of one table keep their emission order.
    pub fn diff(&self, source: &SchemaInfo, target: &SchemaInfo) -> Vec<DiffResult> {
        let mut results = Vec::new();

        for (name, table) in &source.tables {
            if !target.tables.contains_key(name) {
                results.push(DiffResult {
                    kind: DiffKind::Added,
                    table_name: name.clone(),
                    detail: "Table exists in source but not in target".to_string(),
                    sql: terminate(&table.create_sql),
                });
            }
        }

        for name in target.tables.keys() {
            if !source.tables.contains_key(name) {
                results.push(DiffResult {
                    kind: DiffKind::Removed,
                    table_name: name.clone(),
                    detail: "Table exists in target but not in source".to_string(),
                    sql: drop_table(name),
                });
            }
        }

        for (name, source_table) in &source.tables {
            if let Some(target_table) = target.tables.get(name) {
                results.extend(diff_table_structure(source_table, target_table));
            }
        }

        // stable: per-table sub-diff order survives
        results.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then_with(|| a.table_name.cmp(&b.table_name))
        });
        results
    }
}

fn modified(table: &str, detail: String, sql: String) -> DiffResult {
    DiffResult {
        kind: DiffKind::Modified,
        table_name: table.to_string(),
        detail,
        sql,
    }
}

fn by_position(table: &TableInfo) -> Vec<&ColumnInfo> {
    let mut columns: Vec<&ColumnInfo> = table.columns.iter().collect();
    columns.sort_by_key(|c| c.position);
    columns
}

/// Where `col` lands, resolved against its predecessor in the source table.
fn placement(source: &TableInfo, col: &ColumnInfo) -> ColumnPlacement {
    if col.position <= 1 {
        return ColumnPlacement::First;
    }
    source
        .column_at(col.position - 1)
        .map(|prev| ColumnPlacement::After(prev.name.clone()))
        .unwrap_or(ColumnPlacement::Last)
}

/// Column and index differences of a table present on both sides.
fn diff_table_structure(source: &TableInfo, target: &TableInfo) -> Vec<DiffResult> {
    let table = source.name.as_str();
    let source_cols = by_position(source);
    let target_cols = by_position(target);
    let source_by_name: HashMap<&str, &ColumnInfo> =
        source_cols.iter().map(|c| (c.name.as_str(), *c)).collect();
    let target_by_name: HashMap<&str, &ColumnInfo> =
        target_cols.iter().map(|c| (c.name.as_str(), *c)).collect();

    let mut results = Vec::new();

    for col in &source_cols {
        if !target_by_name.contains_key(col.name.as_str()) {
            results.push(modified(
                table,
                format!("Add column: {}", col.name),
                add_column(table, col, &placement(source, col)),
            ));
        }
    }

    for col in &target_cols {
        if !source_by_name.contains_key(col.name.as_str()) {
            results.push(modified(
                table,
                format!("Drop column: {}", col.name),
                drop_column(table, &col.name),
            ));
        }
    }

    for col in &source_cols {
        if let Some(existing) = target_by_name.get(col.name.as_str()) {
            if !col.same_definition(existing) {
                results.push(modified(
                    table,
                    format!(
                        "Modify column: {} ({} -> {})",
                        col.name, existing.column_type, col.column_type
                    ),
                    modify_column(table, col),
                ));
            }
        }
    }

    let source_idx = source.index_columns();
    let target_idx = target.index_columns();

    for (name, columns) in &source_idx {
        if *name != PRIMARY_INDEX && !target_idx.contains_key(name) {
            results.push(modified(
                table,
                format!("Add index: {}", name),
                add_index(table, name, columns),
            ));
        }
    }

    for (name, columns) in &source_idx {
        if *name == PRIMARY_INDEX {
            continue;
        }
        if let Some(existing) = target_idx.get(name) {
            if existing != columns {
                results.push(modified(
                    table,
                    format!("Recreate index: {}", name),
                    recreate_index(table, name, columns),
                ));
            }
        }
    }

    for name in target_idx.keys() {
        if *name != PRIMARY_INDEX && !source_idx.contains_key(name) {
            results.push(modified(
                table,
                format!("Drop index: {}", name),
                drop_index(table, name),
            ));
        }
    }

    results
}
