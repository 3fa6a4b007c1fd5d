use std::fmt::Write as FmtWrite;

use anyhow::Result;

use crate::domain::{
    changeset::{Changeset, ChangesetKind},
    ports::OutputWriter,
};

/// Plain SQL script: a comment header, then every statement in emission
/// order. Statements are not wrapped in a transaction; DDL auto-commits in
/// MySQL anyway.
pub struct SqlWriter;

impl OutputWriter for SqlWriter {
    fn format(&self, changeset: &Changeset) -> Result<String> {
        let mut sql = String::new();
        let s = &changeset.summary;

        writeln!(sql, "-- Changeset: {}", changeset.changeset_id)?;
        writeln!(sql, "-- Source: {}", changeset.source_database)?;
        writeln!(sql, "-- Target: {}", changeset.target_database)?;
        writeln!(sql, "-- Generated: {}", changeset.created_at)?;
        match changeset.kind {
            ChangesetKind::Schema => writeln!(
                sql,
                "-- Summary: {} added, {} modified, {} removed",
                s.added, s.modified, s.removed
            )?,
            ChangesetKind::Data => writeln!(
                sql,
                "-- Summary: {} inserts, {} updates, {} deletes",
                s.total_inserts, s.total_updates, s.total_deletes
            )?,
        }
        writeln!(sql)?;

        for diff in &changeset.schema_diffs {
            writeln!(sql, "-- [{}] {}: {}", diff.kind, diff.table_name, diff.detail)?;
            writeln!(sql, "{}", diff.sql)?;
            writeln!(sql)?;
        }

        let mut current_table: Option<&str> = None;
        for diff in &changeset.data_diffs {
            if current_table != Some(diff.table_name.as_str()) {
                writeln!(sql, "-- ============================================")?;
                writeln!(sql, "-- Table: {}", diff.table_name)?;
                writeln!(sql, "-- ============================================")?;
                writeln!(sql)?;
                current_table = Some(&diff.table_name);
            }
            writeln!(sql, "{}", diff.sql)?;
        }
        if current_table.is_some() {
            writeln!(sql)?;
        }

        Ok(sql)
    }

    fn extension(&self) -> &'static str {
        "sql"
    }
}
