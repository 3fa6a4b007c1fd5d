use crate::domain::{
    changeset::Changeset,
    schema::{ColumnInfo, IndexInfo},
    table_diff::{DataDiffResult, RowMap, RowSnapshot},
    value_objects::{ColumnName, TableName},
};
use crate::error::Result;
use async_trait::async_trait;

/// Port: structural introspection of one database (implemented by MysqlSession).
///
/// Every query is scoped to the session's current database.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Base tables of the current database.
    async fn list_tables(&self) -> Result<Vec<TableName>>;

    /// Columns ordered by ordinal position.
    async fn list_columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>>;

    /// Index membership rows ordered by (index name, sequence in index).
    async fn list_indexes(&self, table: &TableName) -> Result<Vec<IndexInfo>>;

    /// The server's own `CREATE TABLE` statement for `table`.
    async fn create_statement(&self, table: &TableName) -> Result<String>;

    /// Primary-key columns in key order. Empty when the table has none.
    async fn primary_keys(&self, table: &TableName) -> Result<Vec<ColumnName>>;

    async fn row_count(&self, table: &TableName) -> Result<u64>;
}

/// Port: access to data in a table (implemented by MysqlSession)
#[async_trait]
pub trait RowRepository: Send + Sync {
    /// Read every row of `table`, selecting exactly `columns`.
    async fn fetch_rows(&self, table: &TableName, columns: &[ColumnName]) -> Result<Vec<RowMap>>;
}

/// Port: apply a statement that returns no rows.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute(&self, statement: &str) -> Result<()>;
}

/// Port: table data diff algorithm (implemented by TableDiffer)
pub trait Differ: Send + Sync {
    fn diff_table(
        &self,
        source: &RowSnapshot,
        target: &RowSnapshot,
        table: &TableName,
        pk_cols: &[ColumnName],
        columns: &[ColumnName],
    ) -> Vec<DataDiffResult>;
}

/// Port: output formatting (implemented by JsonWriter, SqlWriter)
pub trait OutputWriter: Send + Sync {
    /// Serializes the changeset to a string (JSON, SQL, etc.)
    fn format(&self, changeset: &Changeset) -> anyhow::Result<String>;
    /// Extension of the produced file (e.g. "json", "sql")
    fn extension(&self) -> &'static str;
}
