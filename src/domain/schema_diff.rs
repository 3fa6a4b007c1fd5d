use serde::{Deserialize, Serialize};

/// Classification of a schema difference.
///
/// Variant order is the sort rank used for the final result list:
/// `Added < Modified < Removed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Modified,
    Removed,
}

impl DiffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffKind::Added => "added",
            DiffKind::Modified => "modified",
            DiffKind::Removed => "removed",
        }
    }
}

impl std::fmt::Display for DiffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One schema-level difference with the DDL that resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub kind: DiffKind,
    pub table_name: String,
    /// Human-readable description, e.g. `Add column: name`.
    pub detail: String,
    /// Complete statement, always terminated with `;`.
    pub sql: String,
}

/// Counts per [`DiffKind`] over one schema comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchemaSummary {
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
}

impl SchemaSummary {
    pub fn from_results(results: &[DiffResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            match r.kind {
                DiffKind::Added => acc.added += 1,
                DiffKind::Modified => acc.modified += 1,
                DiffKind::Removed => acc.removed += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.added + self.modified + self.removed
    }
}
