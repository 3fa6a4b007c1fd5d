use crate::domain::schema::ColumnInfo;
use crate::domain::table_definition::DefaultValue;
use crate::domain::table_diff::RowMap;
use crate::domain::value_objects::{ColumnName, TableName};
use crate::infrastructure::db::dialect::MysqlDialect;
use serde_json::Value;

/// Informational token MySQL 8 reports in `EXTRA` for expression defaults.
/// It is not valid in DDL.
const DEFAULT_GENERATED: &str = "DEFAULT_GENERATED";

// ─────────────────────────────────────────────────────────────────────────────
// Query builders
// ─────────────────────────────────────────────────────────────────────────────

/// Build the full-table scan used for a row snapshot: every requested column,
/// no ordering, no pagination.
///
/// `col_types` is a vec of `(column_name, data_type)` pairs in the order the
/// columns should be selected.
pub fn build_snapshot_query(table: &TableName, col_types: &[(String, String)]) -> String {
    let d = MysqlDialect;
    let col_exprs: Vec<String> = col_types
        .iter()
        .map(|(col_name, data_type)| d.select_expr(col_name, data_type))
        .collect();
    format!("SELECT {} FROM {}", col_exprs.join(", "), d.quote_ident(&table.0))
}

// ─────────────────────────────────────────────────────────────────────────────
// Row helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Stringified form of a value used for keys and comparison. `None` for NULL.
pub fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Build the composite primary key string for a row (used as BTreeMap lookup key).
pub fn pk_key(row: &RowMap, pk_cols: &[ColumnName]) -> String {
    pk_cols
        .iter()
        .map(|col| {
            row.get(&col.0)
                .and_then(value_text)
                .unwrap_or_else(|| "NULL".to_string())
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// `` `a` = 1 AND `b` = 'x' `` over the key columns, in key order.
pub(crate) fn pk_where_clause(row: &RowMap, pk_cols: &[ColumnName]) -> String {
    let d = MysqlDialect;
    pk_cols
        .iter()
        .map(|col| {
            let col_q = d.quote_ident(&col.0);
            match row.get(&col.0).unwrap_or(&Value::Null) {
                Value::Null => format!("{} IS NULL", col_q),
                val => format!("{} = {}", col_q, d.sql_literal(val)),
            }
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

// ─────────────────────────────────────────────────────────────────────────────
// DML
// ─────────────────────────────────────────────────────────────────────────────

/// `INSERT` over the columns of `columns` that are present in `row`.
pub fn insert_statement(table: &TableName, row: &RowMap, columns: &[ColumnName]) -> String {
    let d = MysqlDialect;
    let (cols, vals): (Vec<String>, Vec<String>) = columns
        .iter()
        .filter_map(|c| row.get(&c.0).map(|v| (d.quote_ident(&c.0), d.sql_literal(v))))
        .unzip();
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        d.quote_ident(&table.0),
        cols.join(", "),
        vals.join(", ")
    )
}

/// `UPDATE` setting every non-key column of `row` to its value.
pub fn update_statement(
    table: &TableName,
    row: &RowMap,
    pk_cols: &[ColumnName],
    columns: &[ColumnName],
) -> String {
    let d = MysqlDialect;
    let sets: Vec<String> = columns
        .iter()
        .filter(|c| !pk_cols.contains(c))
        .filter_map(|c| {
            row.get(&c.0)
                .map(|v| format!("{} = {}", d.quote_ident(&c.0), d.sql_literal(v)))
        })
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {};",
        d.quote_ident(&table.0),
        sets.join(", "),
        pk_where_clause(row, pk_cols)
    )
}

pub fn delete_statement(table: &TableName, pk: &RowMap, pk_cols: &[ColumnName]) -> String {
    format!(
        "DELETE FROM {} WHERE {};",
        MysqlDialect.quote_ident(&table.0),
        pk_where_clause(pk, pk_cols)
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// DDL
// ─────────────────────────────────────────────────────────────────────────────

/// Where an added column goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPlacement {
    First,
    After(String),
    /// No predecessor could be resolved; the server appends the column.
    Last,
}

impl ColumnPlacement {
    fn clause(&self) -> String {
        match self {
            ColumnPlacement::First => " FIRST".to_string(),
            ColumnPlacement::After(prev) => format!(" AFTER {}", MysqlDialect.quote_ident(prev)),
            ColumnPlacement::Last => String::new(),
        }
    }
}

/// Render a default through the bare-keyword rule: `CURRENT_TIMESTAMP` and
/// `NULL` stay bare, anything else is quoted.
pub fn default_clause(default: &DefaultValue) -> String {
    match default {
        DefaultValue::Keyword(k) => format!("DEFAULT {}", k.keyword()),
        DefaultValue::Literal(s) => format!("DEFAULT {}", MysqlDialect.quote_string(s)),
    }
}

/// Default reported with `DEFAULT_GENERATED`: an expression, never a literal.
/// Timestamp keywords stay bare; anything else is parenthesised.
fn expression_default(expr: &str) -> String {
    let upper = expr.trim().to_uppercase();
    if upper.starts_with("CURRENT_TIMESTAMP") || upper == "NULL" {
        format!("DEFAULT {}", expr.trim())
    } else {
        format!("DEFAULT ({})", expr.trim())
    }
}

/// Column definition for `ADD COLUMN` / `MODIFY COLUMN`, built from introspected metadata.
pub fn column_definition(col: &ColumnInfo) -> String {
    let mut def = col.column_type.clone();
    if !col.nullable {
        def.push_str(" NOT NULL");
    }
    let (generated, extra): (Vec<&str>, Vec<&str>) = col
        .extra
        .split_whitespace()
        .partition(|t| t.eq_ignore_ascii_case(DEFAULT_GENERATED));
    if let Some(default) = &col.default {
        def.push(' ');
        if generated.is_empty() {
            def.push_str(&default_clause(&DefaultValue::from(default.as_str())));
        } else {
            def.push_str(&expression_default(default));
        }
    }
    if !extra.is_empty() {
        def.push(' ');
        def.push_str(&extra.join(" "));
    }
    def
}

/// Make sure `sql` ends with exactly one statement terminator.
pub fn terminate(sql: &str) -> String {
    let trimmed = sql.trim_end();
    if trimmed.ends_with(';') {
        trimmed.to_string()
    } else {
        format!("{};", trimmed)
    }
}

pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE {};", MysqlDialect.quote_ident(table))
}

pub fn add_column(table: &str, col: &ColumnInfo, placement: &ColumnPlacement) -> String {
    let d = MysqlDialect;
    format!(
        "ALTER TABLE {} ADD COLUMN {} {}{};",
        d.quote_ident(table),
        d.quote_ident(&col.name),
        column_definition(col),
        placement.clause()
    )
}

pub fn drop_column(table: &str, column: &str) -> String {
    let d = MysqlDialect;
    format!(
        "ALTER TABLE {} DROP COLUMN {};",
        d.quote_ident(table),
        d.quote_ident(column)
    )
}

pub fn modify_column(table: &str, col: &ColumnInfo) -> String {
    let d = MysqlDialect;
    format!(
        "ALTER TABLE {} MODIFY COLUMN {} {};",
        d.quote_ident(table),
        d.quote_ident(&col.name),
        column_definition(col)
    )
}

fn index_column_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| MysqlDialect.quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn add_index(table: &str, index: &str, columns: &[&str]) -> String {
    let d = MysqlDialect;
    format!(
        "ALTER TABLE {} ADD INDEX {} ({});",
        d.quote_ident(table),
        d.quote_ident(index),
        index_column_list(columns)
    )
}

pub fn drop_index(table: &str, index: &str) -> String {
    let d = MysqlDialect;
    format!(
        "ALTER TABLE {} DROP INDEX {};",
        d.quote_ident(table),
        d.quote_ident(index)
    )
}

/// Drop and re-add an index in a single statement.
pub fn recreate_index(table: &str, index: &str, columns: &[&str]) -> String {
    let d = MysqlDialect;
    let idx = d.quote_ident(index);
    format!(
        "ALTER TABLE {} DROP INDEX {}, ADD INDEX {} ({});",
        d.quote_ident(table),
        idx,
        idx,
        index_column_list(columns)
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::KeyRole;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> RowMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn cols(names: &[&str]) -> Vec<ColumnName> {
        names.iter().map(|n| ColumnName(n.to_string())).collect()
    }

    fn column(name: &str, ty: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.into(),
            column_type: ty.into(),
            nullable: false,
            key: KeyRole::None,
            default: None,
            extra: String::new(),
            position: 1,
        }
    }

    #[test]
    fn test_build_snapshot_query_selects_all_columns_unordered() {
        let table = TableName("pricing_rules".into());
        let col_types = vec![
            ("id".to_string(), "int".to_string()),
            ("ratio".to_string(), "double".to_string()),
            ("payload".to_string(), "varbinary".to_string()),
        ];
        let q = build_snapshot_query(&table, &col_types);
        assert_eq!(
            q,
            "SELECT CONVERT(`id` USING utf8mb4) AS `id`, `ratio`, HEX(`payload`) AS `payload` \
             FROM `pricing_rules`"
        );
        assert!(!q.contains("ORDER BY"));
    }

    #[test]
    fn test_pk_key_composite_in_key_order() {
        let r = row(&[
            ("region", json!("FR")),
            ("category", json!("books")),
            ("rate", json!(0.055)),
        ]);
        assert_eq!(pk_key(&r, &cols(&["region", "category"])), "FR|books");
        assert_eq!(pk_key(&r, &cols(&["category", "region"])), "books|FR");
    }

    #[test]
    fn test_pk_key_stringifies_numbers_and_nulls() {
        let r = row(&[("id", json!(7)), ("sub", Value::Null)]);
        assert_eq!(pk_key(&r, &cols(&["id", "sub"])), "7|NULL");
        assert_eq!(pk_key(&r, &cols(&["missing"])), "NULL");
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!("5")), Some("5".into()));
        assert_eq!(value_text(&json!(5)), Some("5".into()));
        assert_eq!(value_text(&json!(true)), Some("true".into()));
        assert_eq!(value_text(&Value::Null), None);
    }

    #[test]
    fn test_pk_where_clause_null_is_null() {
        let r = row(&[("id", Value::Null)]);
        assert_eq!(pk_where_clause(&r, &cols(&["id"])), "`id` IS NULL");
    }

    #[test]
    fn test_insert_statement_uses_present_columns_in_order() {
        let table = TableName("t".into());
        let r = row(&[("name", json!("Ann")), ("id", json!(2))]);
        assert_eq!(
            insert_statement(&table, &r, &cols(&["id", "name", "email"])),
            "INSERT INTO `t` (`id`, `name`) VALUES (2, 'Ann');"
        );
    }

    #[test]
    fn test_update_statement_sets_non_key_columns() {
        let table = TableName("t".into());
        let r = row(&[("id", json!(1)), ("name", json!("Bob")), ("age", json!(30))]);
        assert_eq!(
            update_statement(&table, &r, &cols(&["id"]), &cols(&["id", "name", "age"])),
            "UPDATE `t` SET `name` = 'Bob', `age` = 30 WHERE `id` = 1;"
        );
    }

    #[test]
    fn test_delete_statement_composite_key() {
        let table = TableName("rates".into());
        let pk = row(&[("region", json!("FR")), ("year", json!(2024))]);
        assert_eq!(
            delete_statement(&table, &pk, &cols(&["year", "region"])),
            "DELETE FROM `rates` WHERE `year` = 2024 AND `region` = 'FR';"
        );
    }

    #[test]
    fn test_column_definition_rendering() {
        let mut c = column("created_at", "timestamp");
        c.default = Some("CURRENT_TIMESTAMP".into());
        c.extra = "DEFAULT_GENERATED on update CURRENT_TIMESTAMP".into();
        assert_eq!(
            column_definition(&c),
            "timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP on update CURRENT_TIMESTAMP"
        );

        let mut n = column("nick", "varchar(20)");
        n.nullable = true;
        n.default = Some("it's".into());
        assert_eq!(column_definition(&n), "varchar(20) DEFAULT 'it''s'");

        let mut id = column("id", "int");
        id.extra = "auto_increment".into();
        assert_eq!(column_definition(&id), "int NOT NULL auto_increment");
    }

    #[test]
    fn test_column_definition_expression_defaults() {
        let mut ts = column("created_at", "datetime(3)");
        ts.default = Some("CURRENT_TIMESTAMP(3)".into());
        ts.extra = "DEFAULT_GENERATED".into();
        assert_eq!(
            column_definition(&ts),
            "datetime(3) NOT NULL DEFAULT CURRENT_TIMESTAMP(3)"
        );

        let mut id = column("public_id", "char(36)");
        id.default = Some("uuid()".into());
        id.extra = "DEFAULT_GENERATED".into();
        assert_eq!(column_definition(&id), "char(36) NOT NULL DEFAULT (uuid())");

        let mut literal = column("label", "varchar(10)");
        literal.default = Some("uuid()".into());
        assert_eq!(column_definition(&literal), "varchar(10) NOT NULL DEFAULT 'uuid()'");
    }

    #[test]
    fn test_add_column_placement() {
        let c = column("name", "VARCHAR");
        assert_eq!(
            add_column("t", &c, &ColumnPlacement::After("id".into())),
            "ALTER TABLE `t` ADD COLUMN `name` VARCHAR NOT NULL AFTER `id`;"
        );
        assert_eq!(
            add_column("t", &c, &ColumnPlacement::First),
            "ALTER TABLE `t` ADD COLUMN `name` VARCHAR NOT NULL FIRST;"
        );
        assert_eq!(
            add_column("t", &c, &ColumnPlacement::Last),
            "ALTER TABLE `t` ADD COLUMN `name` VARCHAR NOT NULL;"
        );
    }

    #[test]
    fn test_index_statements() {
        assert_eq!(
            add_index("t", "idx_ab", &["a", "b"]),
            "ALTER TABLE `t` ADD INDEX `idx_ab` (`a`, `b`);"
        );
        assert_eq!(drop_index("t", "idx_ab"), "ALTER TABLE `t` DROP INDEX `idx_ab`;");
        assert_eq!(
            recreate_index("t", "idx_ab", &["b", "a"]),
            "ALTER TABLE `t` DROP INDEX `idx_ab`, ADD INDEX `idx_ab` (`b`, `a`);"
        );
    }

    #[test]
    fn test_terminate() {
        assert_eq!(terminate("CREATE TABLE `t` (`id` int)"), "CREATE TABLE `t` (`id` int);");
        assert_eq!(terminate("DROP TABLE `t`;\n"), "DROP TABLE `t`;");
    }
}
