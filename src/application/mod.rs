pub mod diff;
pub mod monitoring;
pub mod schema_diff;
pub mod schema_snapshot;
pub mod snapshot;
pub mod table_builder;
