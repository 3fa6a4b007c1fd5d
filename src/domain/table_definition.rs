use serde::{Deserialize, Serialize};

/// Default storage engine when a definition leaves it blank.
pub const DEFAULT_ENGINE: &str = "InnoDB";
/// Default charset when a definition leaves it blank.
pub const DEFAULT_CHARSET: &str = "utf8mb4";
/// Collation paired with [`DEFAULT_CHARSET`].
pub const DEFAULT_COLLATION: &str = "utf8mb4_unicode_ci";

/// Column types offered when authoring a table definition.
pub const COMMON_DATA_TYPES: &[&str] = &[
    "INT", "BIGINT", "TINYINT", "SMALLINT", "DECIMAL", "FLOAT", "DOUBLE", "VARCHAR", "CHAR",
    "TEXT", "MEDIUMTEXT", "LONGTEXT", "DATE", "DATETIME", "TIMESTAMP", "TIME", "YEAR", "BOOLEAN",
    "JSON", "BLOB", "MEDIUMBLOB", "LONGBLOB", "ENUM", "SET",
];

pub const TABLE_ENGINES: &[&str] = &["InnoDB", "MyISAM", "MEMORY", "CSV", "ARCHIVE"];

pub const CHARSETS: &[&str] = &["utf8mb4", "utf8", "latin1", "ascii", "gbk", "gb2312"];

/// Defaults rendered as bare SQL keywords instead of quoted literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BareDefault {
    CurrentTimestamp,
    Null,
}

impl BareDefault {
    pub const ALL: [BareDefault; 2] = [BareDefault::CurrentTimestamp, BareDefault::Null];

    pub fn keyword(&self) -> &'static str {
        match self {
            BareDefault::CurrentTimestamp => "CURRENT_TIMESTAMP",
            BareDefault::Null => "NULL",
        }
    }
}

/// A column default: either one of the bare keywords or a literal that is
/// quoted and escaped when rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DefaultValue {
    Keyword(BareDefault),
    Literal(String),
}

impl From<String> for DefaultValue {
    fn from(raw: String) -> Self {
        match BareDefault::ALL.iter().find(|k| k.keyword() == raw) {
            Some(k) => DefaultValue::Keyword(*k),
            None => DefaultValue::Literal(raw),
        }
    }
}

impl From<&str> for DefaultValue {
    fn from(raw: &str) -> Self {
        DefaultValue::from(raw.to_string())
    }
}

impl From<DefaultValue> for String {
    fn from(v: DefaultValue) -> Self {
        match v {
            DefaultValue::Keyword(k) => k.keyword().to_string(),
            DefaultValue::Literal(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnDefinition {
    pub name: String,
    /// Base type without length, e.g. `VARCHAR`.
    #[serde(rename = "type")]
    pub data_type: String,
    /// Only rendered for types that accept a length.
    pub length: Option<u32>,
    pub nullable: bool,
    pub default_value: Option<DefaultValue>,
    pub auto_increment: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexDefinition {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// Declarative input for `CREATE TABLE` generation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub indexes: Vec<IndexDefinition>,
    pub engine: Option<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub comment: Option<String>,
}

impl TableDefinition {
    pub fn engine(&self) -> &str {
        non_empty(&self.engine).unwrap_or(DEFAULT_ENGINE)
    }

    pub fn charset(&self) -> &str {
        non_empty(&self.charset).unwrap_or(DEFAULT_CHARSET)
    }

    pub fn collation(&self) -> &str {
        non_empty(&self.collation).unwrap_or(DEFAULT_COLLATION)
    }
}

pub(crate) fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// `true` for types that take a `(length)` suffix.
pub fn accepts_length(data_type: &str) -> bool {
    matches!(
        data_type.to_uppercase().as_str(),
        "VARCHAR" | "CHAR" | "DECIMAL" | "FLOAT" | "DOUBLE"
    )
}
