pub mod changeset;
pub mod ports;
pub mod schema;
pub mod schema_diff;
pub mod table_definition;
pub mod table_diff;
pub mod value_objects;
