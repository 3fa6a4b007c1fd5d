use std::sync::Arc;
use tracing::debug;

use crate::domain::ports::RowRepository;
use crate::domain::table_diff::{RowMap, RowSnapshot};
use crate::domain::value_objects::{ColumnName, TableName};
use crate::error::{Result, SyncError};
use crate::infrastructure::db::sql_utils::pk_key;

// ─────────────────────────────────────────────────────────────────────────────
// RowSnapshotService
// ─────────────────────────────────────────────────────────────────────────────

/// Reads one side of a table into a [`RowSnapshot`] keyed by primary key.
///
/// A snapshot is all-or-nothing: any read failure is returned as-is and no
/// partial map is ever produced.
pub struct RowSnapshotService {
    repo: Arc<dyn RowRepository>,
}

impl RowSnapshotService {
    pub fn new(repo: Arc<dyn RowRepository>) -> Self {
        Self { repo }
    }

    /// Fetch every row of `table` over `columns`, keyed by `pk_cols`.
    ///
    /// Fails with a precondition error, before touching the database, when
    /// `pk_cols` is empty.
    pub async fn capture(
        &self,
        table: &TableName,
        columns: &[ColumnName],
        pk_cols: &[ColumnName],
    ) -> Result<RowSnapshot> {
        if pk_cols.is_empty() {
            return Err(SyncError::missing_primary_key(&table.0));
        }

        let rows = self.repo.fetch_rows(table, columns).await?;
        let snapshot = index_rows(rows, pk_cols);
        debug!(table = %table, keys = snapshot.len(), "row snapshot captured");
        Ok(snapshot)
    }
}

/// Key rows by their composite primary key. Two rows with the same key
/// collapse to the later one.
pub fn index_rows(rows: Vec<RowMap>, pk_cols: &[ColumnName]) -> RowSnapshot {
    rows.into_iter().map(|row| (pk_key(&row, pk_cols), row)).collect()
}
