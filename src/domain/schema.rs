use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name MySQL gives the primary-key index. Excluded from index diffing.
pub const PRIMARY_INDEX: &str = "PRIMARY";

/// Role a column plays in the table's keys (`information_schema.COLUMNS.COLUMN_KEY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    #[default]
    None,
    Primary,
    Unique,
    Index,
}

impl KeyRole {
    /// Map the raw `COLUMN_KEY` value (`PRI`, `UNI`, `MUL`, empty).
    pub fn from_column_key(key: &str) -> Self {
        match key {
            "PRI" => KeyRole::Primary,
            "UNI" => KeyRole::Unique,
            "MUL" => KeyRole::Index,
            _ => KeyRole::None,
        }
    }
}

/// One column as reported by introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Full declared type, e.g. `varchar(50)` or `int unsigned`.
    pub column_type: String,
    pub nullable: bool,
    pub key: KeyRole,
    pub default: Option<String>,
    /// Extra modifiers, e.g. `auto_increment`.
    pub extra: String,
    /// 1-based ordinal position, unique within its table.
    pub position: u32,
}

impl ColumnInfo {
    /// Structural equality used by the schema differencer. The name is the
    /// join key and is not compared; neither is the key role, which the index
    /// comparison covers.
    pub fn same_definition(&self, other: &ColumnInfo) -> bool {
        self.column_type == other.column_type
            && self.nullable == other.nullable
            && self.extra == other.extra
            && self.default == other.default
    }
}

/// One (index, column) membership row. Rows sharing a name form one
/// composite index, ordered by `seq_in_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub unique: bool,
    pub column: String,
    pub seq_in_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    /// `SHOW CREATE TABLE` output, used verbatim when the table is missing.
    pub create_sql: String,
    /// Ordered by position.
    pub columns: Vec<ColumnInfo>,
    pub indexes: Vec<IndexInfo>,
}

impl TableInfo {
    /// Linear scan for the column at `position`.
    pub fn column_at(&self, position: u32) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.position == position)
    }

    /// Group index membership rows into `index name -> ordered column names`.
    pub fn index_columns(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut grouped: BTreeMap<&str, Vec<&IndexInfo>> = BTreeMap::new();
        for idx in &self.indexes {
            grouped.entry(idx.name.as_str()).or_default().push(idx);
        }
        grouped
            .into_iter()
            .map(|(name, mut members)| {
                members.sort_by_key(|m| m.seq_in_index);
                (name, members.into_iter().map(|m| m.column.as_str()).collect())
            })
            .collect()
    }
}

/// Immutable capture of one database's structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub database: String,
    pub tables: BTreeMap<String, TableInfo>,
}

impl SchemaInfo {
    /// Build a schema from a list of tables. Table names are the map key, so a
    /// repeated name keeps the last definition.
    pub fn new(database: impl Into<String>, tables: impl IntoIterator<Item = TableInfo>) -> Self {
        Self {
            database: database.into(),
            tables: tables.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(name: &str, column: &str, seq: u32) -> IndexInfo {
        IndexInfo {
            name: name.into(),
            unique: false,
            column: column.into(),
            seq_in_index: seq,
        }
    }

    fn col(name: &str, position: u32) -> ColumnInfo {
        ColumnInfo {
            name: name.into(),
            column_type: "int".into(),
            nullable: false,
            key: KeyRole::None,
            default: None,
            extra: String::new(),
            position,
        }
    }

    #[test]
    fn key_role_from_column_key() {
        assert_eq!(KeyRole::from_column_key("PRI"), KeyRole::Primary);
        assert_eq!(KeyRole::from_column_key("UNI"), KeyRole::Unique);
        assert_eq!(KeyRole::from_column_key("MUL"), KeyRole::Index);
        assert_eq!(KeyRole::from_column_key(""), KeyRole::None);
    }

    #[test]
    fn index_columns_groups_and_orders_by_sequence() {
        let table = TableInfo {
            name: "t".into(),
            create_sql: String::new(),
            columns: vec![],
            indexes: vec![
                idx("idx_ab", "b", 2),
                idx("PRIMARY", "id", 1),
                idx("idx_ab", "a", 1),
            ],
        };
        let map = table.index_columns();
        assert_eq!(map["idx_ab"], vec!["a", "b"]);
        assert_eq!(map["PRIMARY"], vec!["id"]);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["PRIMARY", "idx_ab"]);
    }

    #[test]
    fn same_definition_treats_defaults_as_options() {
        let a = col("x", 1);
        let mut b = col("x", 2);
        assert!(a.same_definition(&b), "position is not part of the definition");

        b.default = Some("0".into());
        assert!(!a.same_definition(&b));

        let mut c = a.clone();
        c.default = Some("0".into());
        assert!(c.same_definition(&b));
    }

    #[test]
    fn column_at_scans_by_position() {
        let table = TableInfo {
            name: "t".into(),
            create_sql: String::new(),
            columns: vec![col("id", 1), col("name", 2)],
            indexes: vec![],
        };
        assert_eq!(table.column_at(2).map(|c| c.name.as_str()), Some("name"));
        assert!(table.column_at(3).is_none());
    }
}
