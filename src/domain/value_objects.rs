use serde::{Deserialize, Serialize};

use crate::domain::table_diff::DataDiffKind;

/// Newtype for table names
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TableName(pub String);

impl TableName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TableName {
    fn from(s: &str) -> Self {
        TableName(s.to_string())
    }
}

/// Newtype for column names
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ColumnName(pub String);

impl ColumnName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ColumnName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ColumnName {
    fn from(s: &str) -> Self {
        ColumnName(s.to_string())
    }
}

/// Wrap a list of plain names as [`ColumnName`]s.
pub fn column_names<S: AsRef<str>>(names: &[S]) -> Vec<ColumnName> {
    names.iter().map(|n| ColumnName(n.as_ref().to_string())).collect()
}

/// Which kinds of row-level change a data comparison should return.
///
/// Filtering only affects the returned statements; the per-table rollup
/// always counts every difference found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    #[serde(default = "enabled")]
    pub insert: bool,
    #[serde(default = "enabled")]
    pub update: bool,
    #[serde(default = "enabled")]
    pub delete: bool,
}

fn enabled() -> bool {
    true
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            insert: true,
            update: true,
            delete: true,
        }
    }
}

impl SyncOptions {
    pub fn allows(&self, kind: DataDiffKind) -> bool {
        match kind {
            DataDiffKind::Insert => self.insert,
            DataDiffKind::Update => self.update,
            DataDiffKind::Delete => self.delete,
        }
    }
}
