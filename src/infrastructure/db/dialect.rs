use serde_json::{Number, Value};
use sqlx::any::AnyRow;
use sqlx::{Column, Row, TypeInfo};

// ─────────────────────────────────────────────────────────────────────────────
// MySQL dialect
// ─────────────────────────────────────────────────────────────────────────────

/// SQL dialect for MySQL / MariaDB: identifier quoting, literal rendering and
/// row decoding.
///
/// Literal rendering is the value codec every statement builder goes
/// through. Its string escaping only doubles single quotes; backslashes are
/// left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Quote an identifier with backticks: `` `col` ``.
    pub fn quote_ident(&self, s: &str) -> String {
        format!("`{}`", s.replace('`', "``"))
    }

    /// Double every single quote. No other character is escaped.
    pub fn escape_string(&self, s: &str) -> String {
        s.replace('\'', "''")
    }

    /// `'escaped'`
    pub fn quote_string(&self, s: &str) -> String {
        format!("'{}'", self.escape_string(s))
    }

    /// Format a JSON `Value` as a MySQL literal.
    /// - NULL          → `NULL`
    /// - Bool          → `1` / `0`
    /// - Number        → bare number
    /// - String        → `'escaped'`
    /// - Object/Array  → serialised JSON, quoted like a string
    pub fn sql_literal(&self, val: &Value) -> String {
        match val {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => self.quote_string(s),
            Value::Array(_) | Value::Object(_) => self.quote_string(&val.to_string()),
        }
    }

    /// Produce the cast expression that coerces a column to text.
    /// MySQL hands the result to `sqlx::AnyRow` as BLOB; the decoder reads raw bytes.
    pub fn cast_to_text(&self, col_quoted: &str) -> String {
        format!("CONVERT({} USING utf8mb4) AS {}", col_quoted, col_quoted)
    }

    /// Return `true` if `data_type` (an `information_schema.data_type` value)
    /// is decoded by `sqlx::AnyRow` without any cast.
    pub fn is_native_type(&self, data_type: &str) -> bool {
        data_type.eq_ignore_ascii_case("double")
    }

    /// Byte-string columns. The Any driver cannot hand these over raw, so they
    /// travel hex-encoded and are normalised to text in the decoder.
    pub fn is_binary_type(&self, data_type: &str) -> bool {
        matches!(
            data_type.to_lowercase().as_str(),
            "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob"
        )
    }

    /// Select expression for one column of a row snapshot. No column is ever
    /// selected bare except DOUBLE.
    pub fn select_expr(&self, column: &str, data_type: &str) -> String {
        let q = self.quote_ident(column);
        if self.is_native_type(data_type) {
            q
        } else if self.is_binary_type(data_type) {
            format!("HEX({}) AS {}", q, q)
        } else if data_type.eq_ignore_ascii_case("bit") {
            format!("CAST({} + 0 AS CHAR) AS {}", q, q)
        } else {
            self.cast_to_text(&q)
        }
    }

    /// Decode the column at `idx` using `type_hint` (an `information_schema`
    /// `data_type` string) to reconstruct the correct `Value` variant.
    pub fn decode_column(
        &self,
        row: &AnyRow,
        idx: usize,
        type_hint: &str,
    ) -> Result<Value, sqlx::Error> {
        if self.is_native_type(type_hint) {
            return Ok(row
                .try_get::<Option<f64>, _>(idx)?
                .and_then(Number::from_f64)
                .map_or(Value::Null, Value::Number));
        }
        Ok(self.value_from_text(type_hint, read_text(row, idx)?))
    }

    /// Turn the text form produced by [`select_expr`](Self::select_expr) back
    /// into a `Value`.
    ///
    /// Integers, BIT and FLOAT become numbers; binary columns arrive as hex
    /// and become their (lossy) UTF-8 string. DECIMAL stays a string so no
    /// precision is lost.
    pub fn value_from_text(&self, type_hint: &str, text: Option<String>) -> Value {
        let Some(s) = text else {
            return Value::Null;
        };
        match type_hint.to_uppercase().as_str() {
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" | "YEAR"
            | "BIT" => parse_integer(&s).unwrap_or(Value::String(s)),
            "FLOAT" => s
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map_or(Value::String(s), Value::Number),
            hint if self.is_binary_type(hint) => match hex::decode(&s) {
                Ok(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
                Err(_) => Value::String(s),
            },
            _ => Value::String(s),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared decoding helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Read a column as text. MySQL returns converted and binary columns as BLOB
/// to sqlx AnyRow; those bytes are normalised to a (lossy) UTF-8 string.
pub(crate) fn read_text(row: &AnyRow, idx: usize) -> Result<Option<String>, sqlx::Error> {
    let type_name = row.column(idx).type_info().name();
    if type_name == "BLOB" {
        let bytes: Option<Vec<u8>> = row.try_get(idx)?;
        Ok(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
    } else {
        row.try_get(idx)
    }
}

fn parse_integer(s: &str) -> Option<Value> {
    if let Ok(v) = s.parse::<i64>() {
        return Some(Value::Number(v.into()));
    }
    s.parse::<u64>().ok().map(|v| Value::Number(v.into()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_ident() {
        let d = MysqlDialect;
        assert_eq!(d.quote_ident("my_table"), "`my_table`");
        assert_eq!(d.quote_ident("ta`ble"), "`ta``ble`");
    }

    #[test]
    fn test_sql_literal_null() {
        assert_eq!(MysqlDialect.sql_literal(&Value::Null), "NULL");
    }

    #[test]
    fn test_sql_literal_bool_is_numeric() {
        assert_eq!(MysqlDialect.sql_literal(&Value::Bool(true)), "1");
        assert_eq!(MysqlDialect.sql_literal(&Value::Bool(false)), "0");
    }

    #[test]
    fn test_sql_literal_number_is_bare() {
        assert_eq!(MysqlDialect.sql_literal(&json!(42)), "42");
        assert_eq!(MysqlDialect.sql_literal(&json!(19.99)), "19.99");
        assert_eq!(MysqlDialect.sql_literal(&json!(-7)), "-7");
    }

    #[test]
    fn test_sql_literal_string_doubles_quotes() {
        assert_eq!(MysqlDialect.sql_literal(&json!("O'Brien")), "'O''Brien'");
        assert_eq!(MysqlDialect.sql_literal(&json!("5")), "'5'");
    }

    #[test]
    fn test_sql_literal_leaves_backslashes_alone() {
        assert_eq!(MysqlDialect.sql_literal(&json!(r"C:\temp")), r"'C:\temp'");
    }

    #[test]
    fn test_sql_literal_json_is_quoted_text() {
        let lit = MysqlDialect.sql_literal(&json!({"k": "it's"}));
        assert_eq!(lit, r#"'{"k":"it''s"}'"#);
    }

    #[test]
    fn test_cast_to_text() {
        assert_eq!(
            MysqlDialect.cast_to_text("`price`"),
            "CONVERT(`price` USING utf8mb4) AS `price`"
        );
    }

    #[test]
    fn test_select_expr_by_type() {
        let d = MysqlDialect;
        assert_eq!(d.select_expr("ratio", "double"), "`ratio`");
        assert_eq!(d.select_expr("id", "int"), "CONVERT(`id` USING utf8mb4) AS `id`");
        assert_eq!(d.select_expr("weight", "float"), "CONVERT(`weight` USING utf8mb4) AS `weight`");
        assert_eq!(
            d.select_expr("price", "decimal"),
            "CONVERT(`price` USING utf8mb4) AS `price`"
        );
        assert_eq!(d.select_expr("enabled", "bit"), "CAST(`enabled` + 0 AS CHAR) AS `enabled`");
        assert_eq!(d.select_expr("uid", "binary"), "HEX(`uid`) AS `uid`");
        assert_eq!(d.select_expr("avatar", "BLOB"), "HEX(`avatar`) AS `avatar`");
    }

    #[test]
    fn test_only_double_is_selected_bare() {
        let d = MysqlDialect;
        for ty in [
            "bit", "binary", "varbinary", "tinyblob", "blob", "mediumblob", "longblob", "float",
            "int", "varchar", "json",
        ] {
            assert_ne!(d.select_expr("c", ty), "`c`", "{ty} selected bare");
        }
    }

    #[test]
    fn test_value_from_text_numbers() {
        let d = MysqlDialect;
        assert_eq!(d.value_from_text("int", Some("42".into())), json!(42));
        assert_eq!(d.value_from_text("BIGINT", Some("-7".into())), json!(-7));
        assert_eq!(d.value_from_text("bit", Some("1".into())), json!(1));
        assert_eq!(d.value_from_text("float", Some("0.1".into())), json!(0.1));
        assert_eq!(d.sql_literal(&d.value_from_text("float", Some("0.1".into()))), "0.1");
        assert_eq!(d.value_from_text("decimal", Some("19.99".into())), json!("19.99"));
        assert_eq!(d.value_from_text("int", None), Value::Null);
    }

    #[test]
    fn test_value_from_text_binary_is_normalised() {
        let d = MysqlDialect;
        assert_eq!(d.value_from_text("varbinary", Some("616263".into())), json!("abc"));
        assert_eq!(d.value_from_text("blob", Some(String::new())), json!(""));
        let uuid_key = d.value_from_text("binary", Some("00FF10".into()));
        assert_eq!(uuid_key, json!("\u{0}\u{FFFD}\u{10}"));
        assert_eq!(d.value_from_text("binary", None), Value::Null);
    }

    #[test]
    fn test_value_from_text_keeps_other_text() {
        let d = MysqlDialect;
        assert_eq!(
            d.value_from_text("datetime", Some("2024-01-02 03:04:05".into())),
            json!("2024-01-02 03:04:05")
        );
        assert_eq!(d.value_from_text("varchar", Some("5".into())), json!("5"));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), Some(json!(42)));
        assert_eq!(parse_integer("-1"), Some(json!(-1)));
        assert_eq!(parse_integer("18446744073709551615"), Some(json!(u64::MAX)));
        assert_eq!(parse_integer("4.5"), None);
    }
}
