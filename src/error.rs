//! Error types for schema and data comparison.

/// Errors surfaced by snapshot construction, diffing and table creation.
///
/// Nothing is retried internally: every variant reaches the caller as soon as
/// it occurs, carrying the table or statement it concerns.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Opening a session or the reachability ping failed.
    #[error("Failed to connect to database '{database}' on {host}")]
    Connection {
        /// Host (and port) that was dialled.
        host: String,
        /// Database the session was opened for (empty for server-level sessions).
        database: String,
        #[source]
        source: sqlx::Error,
    },

    /// An introspection query failed; no partial snapshot is returned.
    #[error("Metadata query '{operation}' failed for '{object}'")]
    Metadata {
        /// What was being introspected ("list columns", "show create table", ...).
        operation: &'static str,
        /// Table or database the query targeted.
        object: String,
        #[source]
        source: sqlx::Error,
    },

    /// The full-table scan backing a row snapshot failed.
    #[error("Failed to read rows from table '{table}'")]
    RowQuery {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    /// The operation was rejected before touching any data.
    #[error("Table '{table}' cannot be compared: {reason}")]
    Precondition { table: String, reason: String },

    /// A DDL statement could not be applied.
    #[error("Failed to execute statement: {statement}")]
    StatementExecution {
        statement: String,
        #[source]
        source: sqlx::Error,
    },
}

impl SyncError {
    /// Shorthand for the "no primary key" precondition failure.
    pub fn missing_primary_key(table: &str) -> Self {
        SyncError::Precondition {
            table: table.to_string(),
            reason: "table has no primary key".to_string(),
        }
    }

    /// Returns `true` for [`SyncError::Precondition`].
    pub fn is_precondition(&self) -> bool {
        matches!(self, SyncError::Precondition { .. })
    }
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_primary_key_is_precondition() {
        let err = SyncError::missing_primary_key("audit_log");
        assert!(err.is_precondition());
        assert_eq!(
            err.to_string(),
            "Table 'audit_log' cannot be compared: table has no primary key"
        );
    }

    #[test]
    fn metadata_error_keeps_driver_source() {
        use std::error::Error;
        let err = SyncError::Metadata {
            operation: "list columns",
            object: "users".into(),
            source: sqlx::Error::Protocol("lost connection".into()),
        };
        assert!(err.source().is_some());
        assert!(!err.is_precondition());
        assert!(err.to_string().contains("users"));
    }
}
