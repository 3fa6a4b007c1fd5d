use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Type alias for a database row represented as a sorted map of column name → JSON value.
pub type RowMap = BTreeMap<String, Value>;

/// Every row of one table keyed by its composite primary-key string.
pub type RowSnapshot = BTreeMap<String, RowMap>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataDiffKind {
    Insert,
    Update,
    Delete,
}

impl DataDiffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataDiffKind::Insert => "insert",
            DataDiffKind::Update => "update",
            DataDiffKind::Delete => "delete",
        }
    }
}

impl std::fmt::Display for DataDiffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row-level difference with the DML that resolves it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataDiffResult {
    pub kind: DataDiffKind,
    pub table_name: String,
    pub primary_key: RowMap,
    /// Target row, present for updates and deletes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_values: Option<RowMap>,
    /// Source row, present for inserts and updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_values: Option<RowMap>,
    pub sql: String,
}

/// Rollup of one table's data comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableDataInfo {
    pub table_name: String,
    pub primary_keys: Vec<String>,
    pub columns: Vec<String>,
    pub source_count: u64,
    pub target_count: u64,
    pub insert_count: usize,
    pub update_count: usize,
    pub delete_count: usize,
}

impl TableDataInfo {
    /// Tally `diffs` into the insert/update/delete counters.
    pub fn tally(mut self, diffs: &[DataDiffResult]) -> Self {
        for d in diffs {
            match d.kind {
                DataDiffKind::Insert => self.insert_count += 1,
                DataDiffKind::Update => self.update_count += 1,
                DataDiffKind::Delete => self.delete_count += 1,
            }
        }
        self
    }

    pub fn total_changes(&self) -> usize {
        self.insert_count + self.update_count + self.delete_count
    }
}

/// Result of comparing one table's rows.
#[derive(Debug, Clone, Serialize)]
pub struct TableDataDiff {
    pub info: TableDataInfo,
    pub diffs: Vec<DataDiffResult>,
}

impl TableDataDiff {
    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(kind: DataDiffKind) -> DataDiffResult {
        DataDiffResult {
            kind,
            table_name: "t".into(),
            primary_key: RowMap::new(),
            old_values: None,
            new_values: None,
            sql: String::new(),
        }
    }

    #[test]
    fn tally_counts_each_kind() {
        let diffs = vec![
            diff(DataDiffKind::Insert),
            diff(DataDiffKind::Insert),
            diff(DataDiffKind::Update),
            diff(DataDiffKind::Delete),
        ];
        let info = TableDataInfo {
            table_name: "t".into(),
            source_count: 10,
            target_count: 9,
            ..Default::default()
        }
        .tally(&diffs);
        assert_eq!(info.insert_count, 2);
        assert_eq!(info.update_count, 1);
        assert_eq!(info.delete_count, 1);
        assert_eq!(info.total_changes(), 4);
        assert_eq!(info.source_count, 10);
    }

    #[test]
    fn absent_value_maps_are_not_serialized() {
        let json = serde_json::to_value(diff(DataDiffKind::Insert)).unwrap();
        assert_eq!(json["kind"], "insert");
        assert!(json.get("old_values").is_none());
    }
}
