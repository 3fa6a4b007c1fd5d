use crate::domain::{changeset::Changeset, ports::OutputWriter};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use self::{json::JsonWriter, sql::SqlWriter};

pub mod json;
pub mod sql;

/// Every registered writer.
pub fn all_writers() -> Vec<Box<dyn OutputWriter>> {
    vec![Box::new(JsonWriter), Box::new(SqlWriter)]
}

pub fn writer_for(format: &str) -> Option<Box<dyn OutputWriter>> {
    match format {
        "json" => Some(Box::new(JsonWriter)),
        "sql" => Some(Box::new(SqlWriter)),
        _ => None,
    }
}

/// Writes the changeset to `<dir>/<changeset_id>.<ext>` and returns the path.
pub fn write_to_file(
    writer: &dyn OutputWriter,
    changeset: &Changeset,
    dir: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create output dir: {}", dir))?;

    let content = writer.format(changeset)?;
    let path = PathBuf::from(dir).join(format!(
        "{}.{}",
        changeset.changeset_id,
        writer.extension()
    ));
    fs::write(&path, &content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
