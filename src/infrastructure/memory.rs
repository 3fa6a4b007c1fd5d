use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::ports::{MetadataProvider, RowRepository, StatementExecutor};
use crate::domain::schema::{ColumnInfo, IndexInfo, KeyRole, SchemaInfo, TableInfo, PRIMARY_INDEX};
use crate::domain::table_diff::RowMap;
use crate::domain::value_objects::{ColumnName, TableName};
use crate::error::{Result, SyncError};

/// In-memory implementation of the database ports.
///
/// Wraps a previously captured [`SchemaInfo`] (e.g. deserialised from JSON)
/// plus optional row data, so comparisons can run without a live server.
/// Executed statements are recorded, not applied.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    schema: SchemaInfo,
    rows: BTreeMap<String, Vec<RowMap>>,
    executed: Mutex<Vec<String>>,
}

impl MemoryDatabase {
    pub fn new(schema: SchemaInfo) -> Self {
        Self {
            schema,
            ..Default::default()
        }
    }

    /// Attach the rows of `table`.
    pub fn with_rows(mut self, table: &str, rows: Vec<RowMap>) -> Self {
        self.rows.insert(table.to_string(), rows);
        self
    }

    /// Statements passed to [`StatementExecutor::execute`], in call order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn table(&self, table: &TableName, operation: &'static str) -> Result<&TableInfo> {
        self.schema
            .tables
            .get(&table.0)
            .ok_or_else(|| SyncError::Metadata {
                operation,
                object: table.0.clone(),
                source: sqlx::Error::RowNotFound,
            })
    }
}

#[async_trait]
impl MetadataProvider for MemoryDatabase {
    async fn list_tables(&self) -> Result<Vec<TableName>> {
        Ok(self.schema.tables.keys().map(|t| TableName(t.clone())).collect())
    }

    async fn list_columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>> {
        let mut columns = self.table(table, "list columns")?.columns.clone();
        columns.sort_by_key(|c| c.position);
        Ok(columns)
    }

    async fn list_indexes(&self, table: &TableName) -> Result<Vec<IndexInfo>> {
        let mut indexes = self.table(table, "list indexes")?.indexes.clone();
        indexes.sort_by(|a, b| a.name.cmp(&b.name).then(a.seq_in_index.cmp(&b.seq_in_index)));
        Ok(indexes)
    }

    async fn create_statement(&self, table: &TableName) -> Result<String> {
        Ok(self.table(table, "show create table")?.create_sql.clone())
    }

    async fn primary_keys(&self, table: &TableName) -> Result<Vec<ColumnName>> {
        let info = self.table(table, "list primary keys")?;
        if let Some(cols) = info.index_columns().get(PRIMARY_INDEX) {
            return Ok(cols.iter().map(|c| ColumnName(c.to_string())).collect());
        }
        let mut columns: Vec<&ColumnInfo> = info
            .columns
            .iter()
            .filter(|c| c.key == KeyRole::Primary)
            .collect();
        columns.sort_by_key(|c| c.position);
        Ok(columns.into_iter().map(|c| ColumnName(c.name.clone())).collect())
    }

    async fn row_count(&self, table: &TableName) -> Result<u64> {
        self.table(table, "count rows")?;
        Ok(self.rows.get(&table.0).map_or(0, |r| r.len() as u64))
    }
}

#[async_trait]
impl RowRepository for MemoryDatabase {
    async fn fetch_rows(&self, table: &TableName, columns: &[ColumnName]) -> Result<Vec<RowMap>> {
        if !self.schema.tables.contains_key(&table.0) {
            return Err(SyncError::RowQuery {
                table: table.0.clone(),
                source: sqlx::Error::RowNotFound,
            });
        }
        let rows = self.rows.get(&table.0).map(Vec::as_slice).unwrap_or_default();
        Ok(rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .filter_map(|c| row.get(&c.0).map(|v| (c.0.clone(), v.clone())))
                    .collect()
            })
            .collect())
    }
}

#[async_trait]
impl StatementExecutor for MemoryDatabase {
    async fn execute(&self, statement: &str) -> Result<()> {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(statement.to_string());
        }
        Ok(())
    }
}
