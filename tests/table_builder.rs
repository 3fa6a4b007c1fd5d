use std::io::Write;
use std::sync::Arc;

use syncdiff::application::table_builder::TableBuilderService;
use syncdiff::{build_create_table_sql, MemoryDatabase, SchemaInfo, TableDefinition};

const DEFINITION: &str = r#"
name = "customers"
comment = "CRM import"

[[columns]]
name = "id"
type = "BIGINT"
auto_increment = true
primary_key = true

[[columns]]
name = "email"
type = "VARCHAR"
length = 191
unique = true

[[columns]]
name = "status"
type = "VARCHAR"
length = 16
default_value = "active"

[[columns]]
name = "updated_at"
type = "TIMESTAMP"
nullable = true
default_value = "NULL"

[[indexes]]
name = "idx_status"
columns = ["status", "updated_at"]
"#;

fn load() -> TableDefinition {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DEFINITION.as_bytes()).unwrap();
    let content = std::fs::read_to_string(file.path()).unwrap();
    toml::from_str(&content).unwrap()
}

#[test]
fn definition_file_renders_complete_statement() {
    let sql = build_create_table_sql(&load());
    assert_eq!(
        sql,
        "CREATE TABLE `customers` (\n  \
         `id` BIGINT NOT NULL AUTO_INCREMENT,\n  \
         `email` VARCHAR(191) NOT NULL UNIQUE,\n  \
         `status` VARCHAR(16) NOT NULL DEFAULT 'active',\n  \
         `updated_at` TIMESTAMP NULL DEFAULT NULL,\n  \
         PRIMARY KEY (`id`),\n  \
         KEY `idx_status` (`status`, `updated_at`)\n\
         ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci COMMENT='CRM import';"
    );
}

#[tokio::test]
async fn apply_path_executes_exactly_the_rendered_statement() {
    let def = load();
    let db = Arc::new(MemoryDatabase::new(SchemaInfo::default()));

    let executed = TableBuilderService::new(db.clone()).create(&def).await.unwrap();
    assert_eq!(executed, build_create_table_sql(&def));
    assert_eq!(db.executed(), vec![executed]);
}
