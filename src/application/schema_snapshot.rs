use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::ports::MetadataProvider;
use crate::domain::schema::{SchemaInfo, TableInfo};
use crate::error::Result;

/// Captures the structure of one database through a [`MetadataProvider`].
pub struct SchemaSnapshotService {
    provider: Arc<dyn MetadataProvider>,
}

impl SchemaSnapshotService {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self { provider }
    }

    /// Read every base table: columns, then indexes, then the server's own
    /// `CREATE TABLE`. The first failing query aborts the whole capture.
    #[instrument(name = "schema_snapshot", skip(self), level = "info")]
    pub async fn capture(&self, database: &str) -> Result<SchemaInfo> {
        let tables = self.provider.list_tables().await?;
        let mut infos = Vec::with_capacity(tables.len());

        for table in tables {
            let columns = self.provider.list_columns(&table).await?;
            let indexes = self.provider.list_indexes(&table).await?;
            let create_sql = self.provider.create_statement(&table).await?;
            debug!(
                table = %table,
                columns = columns.len(),
                indexes = indexes.len(),
                "table captured"
            );

            infos.push(TableInfo {
                name: table.0,
                create_sql,
                columns,
                indexes,
            });
        }

        info!(database, tables = infos.len(), "schema snapshot captured");
        Ok(SchemaInfo::new(database, infos))
    }
}
