use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::ports::StatementExecutor;
use crate::domain::table_definition::{
    accepts_length, non_empty, ColumnDefinition, IndexDefinition, TableDefinition,
};
use crate::error::Result;
use crate::infrastructure::db::dialect::MysqlDialect;
use crate::infrastructure::db::sql_utils::default_clause;

/// Render a complete `CREATE TABLE` statement for `def`.
///
/// Clauses, in order: one per column, `PRIMARY KEY` over every column flagged
/// primary (definition order), one per index. Table options follow the
/// closing parenthesis.
pub fn build_create_table_sql(def: &TableDefinition) -> String {
    let d = MysqlDialect;

    let mut clauses: Vec<String> = def.columns.iter().map(column_clause).collect();

    let primary: Vec<String> = def
        .columns
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| d.quote_ident(&c.name))
        .collect();
    if !primary.is_empty() {
        clauses.push(format!("PRIMARY KEY ({})", primary.join(", ")));
    }

    clauses.extend(def.indexes.iter().map(index_clause));

    let mut sql = format!(
        "CREATE TABLE {} (\n  {}\n) ENGINE={} DEFAULT CHARSET={} COLLATE={}",
        d.quote_ident(&def.name),
        clauses.join(",\n  "),
        def.engine(),
        def.charset(),
        def.collation()
    );
    if let Some(comment) = non_empty(&def.comment) {
        sql.push_str(&format!(" COMMENT={}", d.quote_string(comment)));
    }
    sql.push(';');
    sql
}

fn column_clause(col: &ColumnDefinition) -> String {
    let d = MysqlDialect;
    let mut clause = format!("{} {}", d.quote_ident(&col.name), col.data_type);

    if let Some(length) = col.length.filter(|l| *l > 0) {
        if accepts_length(&col.data_type) {
            clause.push_str(&format!("({})", length));
        }
    }

    clause.push_str(if col.nullable { " NULL" } else { " NOT NULL" });

    if let Some(default) = &col.default_value {
        clause.push(' ');
        clause.push_str(&default_clause(default));
    }
    if col.auto_increment {
        clause.push_str(" AUTO_INCREMENT");
    }
    if col.unique && !col.primary_key {
        clause.push_str(" UNIQUE");
    }
    if let Some(comment) = non_empty(&col.comment) {
        clause.push_str(&format!(" COMMENT {}", d.quote_string(comment)));
    }
    clause
}

fn index_clause(idx: &IndexDefinition) -> String {
    let d = MysqlDialect;
    let columns: Vec<String> = idx.columns.iter().map(|c| d.quote_ident(c)).collect();
    format!(
        "{} {} ({})",
        if idx.unique { "UNIQUE KEY" } else { "KEY" },
        d.quote_ident(&idx.name),
        columns.join(", ")
    )
}

/// Creates tables from declarative definitions.
pub struct TableBuilderService {
    executor: Arc<dyn StatementExecutor>,
}

impl TableBuilderService {
    pub fn new(executor: Arc<dyn StatementExecutor>) -> Self {
        Self { executor }
    }

    /// Build and execute the `CREATE TABLE` for `def`; returns the statement.
    #[instrument(
        name = "create_table",
        skip(self, def),
        fields(db.table = %def.name),
        level = "info"
    )]
    pub async fn create(&self, def: &TableDefinition) -> Result<String> {
        let sql = build_create_table_sql(def);
        self.executor.execute(&sql).await?;
        info!(table = %def.name, "table created");
        Ok(sql)
    }
}
