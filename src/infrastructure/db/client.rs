use async_trait::async_trait;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Connection, Row};
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::ports::{MetadataProvider, RowRepository, StatementExecutor};
use crate::domain::schema::{ColumnInfo, IndexInfo, KeyRole};
use crate::domain::table_diff::RowMap;
use crate::domain::value_objects::{ColumnName, TableName};
use crate::error::{Result, SyncError};
use crate::infrastructure::config::ConnectionConfig;
use crate::infrastructure::db::dialect::{read_text, MysqlDialect};
use crate::infrastructure::db::row_mapper::row_to_map;
use crate::infrastructure::db::sql_utils::build_snapshot_query;

/// Schemas every MySQL server carries; hidden from database listings.
const SYSTEM_DATABASES: &[&str] = &["information_schema", "mysql", "performance_schema", "sys"];

const LIST_TABLES_SQL: &str = "SELECT TABLE_NAME \
     FROM information_schema.TABLES \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' \
     ORDER BY TABLE_NAME";

const LIST_COLUMNS_SQL: &str = "SELECT COLUMN_NAME, COLUMN_TYPE, IS_NULLABLE, COLUMN_KEY, \
     COLUMN_DEFAULT, EXTRA, CAST(ORDINAL_POSITION AS SIGNED) \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
     ORDER BY ORDINAL_POSITION";

const COLUMN_TYPES_SQL: &str = "SELECT COLUMN_NAME, DATA_TYPE \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
     ORDER BY ORDINAL_POSITION";

const LIST_INDEXES_SQL: &str = "SELECT INDEX_NAME, CAST(NON_UNIQUE AS SIGNED), COLUMN_NAME, \
     CAST(SEQ_IN_INDEX AS SIGNED) \
     FROM information_schema.STATISTICS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
     ORDER BY INDEX_NAME, SEQ_IN_INDEX";

const PRIMARY_KEYS_SQL: &str = "SELECT COLUMN_NAME \
     FROM information_schema.KEY_COLUMN_USAGE \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND CONSTRAINT_NAME = 'PRIMARY' \
     ORDER BY ORDINAL_POSITION";

/// A live session against one MySQL database.
pub struct MysqlSession {
    pool: AnyPool,
    database: String,
    dialect: MysqlDialect,
}

/// Connect to the database described in `cfg` and return a `MysqlSession`.
///
/// The session is only returned once the server answered a ping.
pub async fn connect(cfg: &ConnectionConfig) -> Result<MysqlSession> {
    let pool = open_pool(cfg, &cfg.url(), &cfg.database).await?;

    debug!("Connected to {}/{}", cfg.address(), cfg.database);

    Ok(MysqlSession {
        pool,
        database: cfg.database.clone(),
        dialect: MysqlDialect,
    })
}

async fn open_pool(cfg: &ConnectionConfig, url: &str, database: &str) -> Result<AnyPool> {
    sqlx::any::install_default_drivers();

    let conn_err = |source| SyncError::Connection {
        host: cfg.address(),
        database: database.to_string(),
        source,
    };

    let pool = AnyPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await
        .map_err(conn_err)?;

    let mut conn = pool.acquire().await.map_err(conn_err)?;
    conn.ping().await.map_err(conn_err)?;

    Ok(pool)
}

/// Read a text column, treating NULL as empty.
fn text(row: &AnyRow, idx: usize) -> std::result::Result<String, sqlx::Error> {
    Ok(read_text(row, idx)?.unwrap_or_default())
}

fn small_uint(row: &AnyRow, idx: usize) -> std::result::Result<u32, sqlx::Error> {
    let v: i64 = row.try_get(idx)?;
    Ok(u32::try_from(v).unwrap_or_default())
}

impl MysqlSession {
    /// Release the session. Call once per successful [`connect`].
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Closed session for {}", self.database);
    }

    async fn fetch_table_meta(
        &self,
        sql: &str,
        table: &TableName,
        operation: &'static str,
    ) -> Result<Vec<AnyRow>> {
        debug!("Executing: {} [{}]", sql, table);
        sqlx::query(sql)
            .bind(&table.0)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| metadata_err(operation, &table.0, source))
    }

    /// Query `information_schema.columns` for `(column_name, data_type)` pairs.
    async fn fetch_column_types(&self, table: &TableName) -> Result<BTreeMap<String, String>> {
        let rows = self
            .fetch_table_meta(COLUMN_TYPES_SQL, table, "list column types")
            .await?;

        rows.iter()
            .map(|row| Ok::<_, sqlx::Error>((text(row, 0)?, text(row, 1)?)))
            .collect::<std::result::Result<_, _>>()
            .map_err(|source| metadata_err("list column types", &table.0, source))
    }
}

fn metadata_err(operation: &'static str, object: &str, source: sqlx::Error) -> SyncError {
    SyncError::Metadata {
        operation,
        object: object.to_string(),
        source,
    }
}

#[async_trait]
impl MetadataProvider for MysqlSession {
    async fn list_tables(&self) -> Result<Vec<TableName>> {
        debug!("Executing: {}", LIST_TABLES_SQL);
        let rows = sqlx::query(LIST_TABLES_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| metadata_err("list tables", &self.database, source))?;

        rows.iter()
            .map(|row| text(row, 0).map(TableName))
            .collect::<std::result::Result<_, _>>()
            .map_err(|source| metadata_err("list tables", &self.database, source))
    }

    async fn list_columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>> {
        let rows = self
            .fetch_table_meta(LIST_COLUMNS_SQL, table, "list columns")
            .await?;

        rows.iter()
            .map(|row| {
                Ok::<_, sqlx::Error>(ColumnInfo {
                    name: text(row, 0)?,
                    column_type: text(row, 1)?,
                    nullable: text(row, 2)? == "YES",
                    key: KeyRole::from_column_key(&text(row, 3)?),
                    default: read_text(row, 4)?,
                    extra: text(row, 5)?,
                    position: small_uint(row, 6)?,
                })
            })
            .collect::<std::result::Result<_, _>>()
            .map_err(|source| metadata_err("list columns", &table.0, source))
    }

    async fn list_indexes(&self, table: &TableName) -> Result<Vec<IndexInfo>> {
        let rows = self
            .fetch_table_meta(LIST_INDEXES_SQL, table, "list indexes")
            .await?;

        rows.iter()
            .map(|row| {
                Ok::<_, sqlx::Error>(IndexInfo {
                    name: text(row, 0)?,
                    unique: row.try_get::<i64, _>(1)? == 0,
                    column: text(row, 2)?,
                    seq_in_index: small_uint(row, 3)?,
                })
            })
            .collect::<std::result::Result<_, _>>()
            .map_err(|source| metadata_err("list indexes", &table.0, source))
    }

    async fn create_statement(&self, table: &TableName) -> Result<String> {
        let sql = format!("SHOW CREATE TABLE {}", self.dialect.quote_ident(&table.0));
        debug!("Executing: {}", sql);
        let row = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|source| metadata_err("show create table", &table.0, source))?;
        text(&row, 1).map_err(|source| metadata_err("show create table", &table.0, source))
    }

    async fn primary_keys(&self, table: &TableName) -> Result<Vec<ColumnName>> {
        let rows = self
            .fetch_table_meta(PRIMARY_KEYS_SQL, table, "list primary keys")
            .await?;

        rows.iter()
            .map(|row| text(row, 0).map(ColumnName))
            .collect::<std::result::Result<_, _>>()
            .map_err(|source| metadata_err("list primary keys", &table.0, source))
    }

    async fn row_count(&self, table: &TableName) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.dialect.quote_ident(&table.0));
        debug!("Executing: {}", sql);
        let count: i64 = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .and_then(|row| row.try_get(0))
            .map_err(|source| metadata_err("count rows", &table.0, source))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

#[async_trait]
impl RowRepository for MysqlSession {
    async fn fetch_rows(&self, table: &TableName, columns: &[ColumnName]) -> Result<Vec<RowMap>> {
        // Non-native columns are converted to text server-side and the mapper
        // rebuilds numbers from the information_schema type hint.
        let type_map = self.fetch_column_types(table).await?;
        let col_types: Vec<(String, String)> = columns
            .iter()
            .map(|c| {
                let data_type = type_map.get(&c.0).cloned().unwrap_or_default();
                (c.0.clone(), data_type)
            })
            .collect();
        let query = build_snapshot_query(table, &col_types);

        debug!("Executing: {}", query);

        let row_err = |source| SyncError::RowQuery {
            table: table.0.clone(),
            source,
        };

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(row_err)?;

        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            result.push(row_to_map(row, &type_map, &self.dialect).map_err(row_err)?);
        }
        Ok(result)
    }
}

#[async_trait]
impl StatementExecutor for MysqlSession {
    async fn execute(&self, statement: &str) -> Result<()> {
        execute_on(&self.pool, statement).await
    }
}

async fn execute_on(pool: &AnyPool, statement: &str) -> Result<()> {
    debug!("Executing: {}", statement);
    sqlx::raw_sql(statement)
        .execute(pool)
        .await
        .map_err(|source| SyncError::StatementExecution {
            statement: statement.to_string(),
            source,
        })?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Server-level helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Open and close a session, surfacing any connection failure.
pub async fn test_connection(cfg: &ConnectionConfig) -> Result<()> {
    let session = connect(cfg).await?;
    session.close().await;
    Ok(())
}

/// User databases on the server, system schemas excluded.
pub async fn list_databases(cfg: &ConnectionConfig) -> Result<Vec<String>> {
    let pool = open_pool(cfg, &cfg.server_url(), "").await?;
    let result = sqlx::query("SHOW DATABASES")
        .fetch_all(&pool)
        .await
        .and_then(|rows| {
            rows.iter()
                .map(|row| text(row, 0))
                .collect::<std::result::Result<Vec<_>, _>>()
        })
        .map_err(|source| metadata_err("show databases", &cfg.address(), source));
    pool.close().await;

    Ok(result?
        .into_iter()
        .filter(|name| !SYSTEM_DATABASES.contains(&name.as_str()))
        .collect())
}

pub async fn create_database(
    cfg: &ConnectionConfig,
    name: &str,
    charset: Option<&str>,
    collation: Option<&str>,
) -> Result<()> {
    let d = MysqlDialect;
    let mut sql = format!("CREATE DATABASE {}", d.quote_ident(name));
    if let Some(charset) = charset.filter(|c| !c.is_empty()) {
        sql.push_str(&format!(" CHARACTER SET {}", charset));
    }
    if let Some(collation) = collation.filter(|c| !c.is_empty()) {
        sql.push_str(&format!(" COLLATE {}", collation));
    }
    run_on_server(cfg, &sql).await
}

pub async fn drop_database(cfg: &ConnectionConfig, name: &str) -> Result<()> {
    let sql = format!("DROP DATABASE {}", MysqlDialect.quote_ident(name));
    run_on_server(cfg, &sql).await
}

async fn run_on_server(cfg: &ConnectionConfig, sql: &str) -> Result<()> {
    let pool = open_pool(cfg, &cfg.server_url(), "").await?;
    let result = execute_on(&pool, sql).await;
    pool.close().await;
    result
}
