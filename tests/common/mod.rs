#![allow(dead_code)]

use serde_json::Value;
use syncdiff::{ColumnInfo, IndexInfo, KeyRole, RowMap, SchemaInfo, TableInfo};

pub fn col(name: &str, column_type: &str, position: u32) -> ColumnInfo {
    ColumnInfo {
        name: name.into(),
        column_type: column_type.into(),
        nullable: false,
        key: KeyRole::None,
        default: None,
        extra: String::new(),
        position,
    }
}

pub fn pk_col(name: &str, column_type: &str, position: u32) -> ColumnInfo {
    ColumnInfo {
        key: KeyRole::Primary,
        ..col(name, column_type, position)
    }
}

pub fn idx(name: &str, column: &str, seq_in_index: u32) -> IndexInfo {
    IndexInfo {
        name: name.into(),
        unique: name == "PRIMARY",
        column: column.into(),
        seq_in_index,
    }
}

pub fn table(name: &str, columns: Vec<ColumnInfo>, indexes: Vec<IndexInfo>) -> TableInfo {
    TableInfo {
        name: name.into(),
        create_sql: format!("CREATE TABLE `{}` (\n  `id` int NOT NULL\n)", name),
        columns,
        indexes,
    }
}

pub fn schema(database: &str, tables: Vec<TableInfo>) -> SchemaInfo {
    SchemaInfo::new(database, tables)
}

pub fn row(pairs: &[(&str, Value)]) -> RowMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// A mixed pair of schemas touching every kind of difference.
pub fn busy_pair() -> (SchemaInfo, SchemaInfo) {
    let source = schema(
        "app_dev",
        vec![
            table(
                "users",
                vec![
                    pk_col("id", "bigint", 1),
                    col("email", "varchar(255)", 2),
                    col("nickname", "varchar(50)", 3),
                ],
                vec![idx("PRIMARY", "id", 1), idx("idx_email", "email", 1)],
            ),
            table("orders", vec![pk_col("id", "int", 1)], vec![idx("PRIMARY", "id", 1)]),
        ],
    );
    let target = schema(
        "app",
        vec![
            table(
                "users",
                vec![
                    pk_col("id", "int", 1),
                    col("email", "varchar(255)", 2),
                    col("legacy_flag", "tinyint(1)", 3),
                ],
                vec![idx("PRIMARY", "id", 1), idx("idx_legacy", "legacy_flag", 1)],
            ),
            table("audit_log", vec![pk_col("id", "int", 1)], vec![idx("PRIMARY", "id", 1)]),
        ],
    );
    (source, target)
}
