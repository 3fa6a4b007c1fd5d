use crate::domain::schema_diff::{DiffResult, SchemaSummary};
use crate::domain::table_diff::{DataDiffResult, TableDataDiff, TableDataInfo};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// What a changeset was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangesetKind {
    Schema,
    Data,
}

/// The output of one comparison run: every synthesized statement plus the
/// rollups, ready for the writers.
#[derive(Debug, Serialize, Clone)]
pub struct Changeset {
    pub changeset_id: String,
    pub kind: ChangesetKind,
    pub source_database: String,
    pub target_database: String,
    pub created_at: String,
    pub schema_diffs: Vec<DiffResult>,
    pub data_diffs: Vec<DataDiffResult>,
    /// One rollup per compared table (data changesets only).
    pub tables: Vec<TableDataInfo>,
    pub summary: Summary,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
    pub total_inserts: usize,
    pub total_updates: usize,
    pub total_deletes: usize,
    pub total_statements: usize,
}

impl Changeset {
    pub fn for_schema(
        source_database: &str,
        target_database: &str,
        diffs: Vec<DiffResult>,
    ) -> Self {
        let counts = SchemaSummary::from_results(&diffs);
        let summary = Summary {
            added: counts.added,
            modified: counts.modified,
            removed: counts.removed,
            total_statements: diffs.len(),
            ..Default::default()
        };
        Self::build(
            ChangesetKind::Schema,
            source_database,
            target_database,
            diffs,
            Vec::new(),
            Vec::new(),
            summary,
        )
    }

    pub fn for_data(
        source_database: &str,
        target_database: &str,
        tables: Vec<TableDataDiff>,
    ) -> Self {
        let mut infos = Vec::with_capacity(tables.len());
        let mut diffs = Vec::new();
        for t in tables {
            infos.push(t.info);
            diffs.extend(t.diffs);
        }

        let total_inserts: usize = infos.iter().map(|t| t.insert_count).sum();
        let total_updates: usize = infos.iter().map(|t| t.update_count).sum();
        let total_deletes: usize = infos.iter().map(|t| t.delete_count).sum();

        let summary = Summary {
            total_inserts,
            total_updates,
            total_deletes,
            total_statements: diffs.len(),
            ..Default::default()
        };
        Self::build(
            ChangesetKind::Data,
            source_database,
            target_database,
            Vec::new(),
            diffs,
            infos,
            summary,
        )
    }

    fn build(
        kind: ChangesetKind,
        source_database: &str,
        target_database: &str,
        schema_diffs: Vec<DiffResult>,
        data_diffs: Vec<DataDiffResult>,
        tables: Vec<TableDataInfo>,
        summary: Summary,
    ) -> Self {
        Changeset {
            changeset_id: format!(
                "cs_{}_{}",
                Utc::now().format("%Y%m%d_%H%M%S"),
                Uuid::new_v4().simple()
            ),
            kind,
            source_database: source_database.to_string(),
            target_database: target_database.to_string(),
            created_at: Utc::now().to_rfc3339(),
            schema_diffs,
            data_diffs,
            tables,
            summary,
        }
    }

    /// Every statement in emission order.
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.schema_diffs
            .iter()
            .map(|d| d.sql.as_str())
            .chain(self.data_diffs.iter().map(|d| d.sql.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.summary.total_statements == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema_diff::DiffKind;

    #[test]
    fn schema_changeset_summarises_kinds() {
        let diffs = vec![
            DiffResult {
                kind: DiffKind::Added,
                table_name: "a".into(),
                detail: String::new(),
                sql: "CREATE TABLE `a` (`id` int);".into(),
            },
            DiffResult {
                kind: DiffKind::Removed,
                table_name: "b".into(),
                detail: String::new(),
                sql: "DROP TABLE `b`;".into(),
            },
        ];
        let cs = Changeset::for_schema("src", "dst", diffs);
        assert!(cs.changeset_id.starts_with("cs_"));
        assert_eq!(cs.kind, ChangesetKind::Schema);
        assert_eq!(cs.summary.added, 1);
        assert_eq!(cs.summary.removed, 1);
        assert_eq!(cs.summary.total_statements, 2);
        assert_eq!(
            cs.statements().collect::<Vec<_>>(),
            vec!["CREATE TABLE `a` (`id` int);", "DROP TABLE `b`;"]
        );
    }

    #[test]
    fn empty_data_changeset() {
        let cs = Changeset::for_data("src", "dst", Vec::new());
        assert!(cs.is_empty());
        assert_eq!(cs.summary, Summary::default());
    }
}
