// Bootstrap of the two-table demo schema through the typed schema layer,
// config loading, and the demo caller's full data flow.

use anyhow::Result;
use sqlite_gateway::{
    ColumnConstraint, ColumnDefinition, DataType, ForeignKey, Params, Schema, SqlCommand,
    SqliteConfig, SqliteGateway, TableDefinition, Value,
};
use tempfile::NamedTempFile;

fn demo_schema() -> Schema {
    Schema::new()
        .add_table(
            TableDefinition::new("users")
                .add_column(
                    ColumnDefinition::new("id", DataType::Integer)
                        .with_constraint(ColumnConstraint::PrimaryKey)
                        .with_constraint(ColumnConstraint::NotNull),
                )
                .add_column(
                    ColumnDefinition::new("name", DataType::Text)
                        .with_constraint(ColumnConstraint::NotNull)
                        .with_constraint(ColumnConstraint::Unique),
                )
                .add_column(
                    ColumnDefinition::new("creationDate", DataType::Integer)
                        .with_constraint(ColumnConstraint::NotNull),
                ),
        )
        .add_table(
            TableDefinition::new("userDetails")
                .add_column(
                    ColumnDefinition::new("id", DataType::Integer)
                        .with_constraint(ColumnConstraint::PrimaryKey)
                        .with_constraint(ColumnConstraint::NotNull),
                )
                .add_column(
                    ColumnDefinition::new("lastClick", DataType::Integer)
                        .with_constraint(ColumnConstraint::NotNull),
                )
                .add_column(
                    ColumnDefinition::new("userId", DataType::Integer)
                        .with_constraint(ColumnConstraint::NotNull),
                )
                .add_foreign_key(ForeignKey::new("userId", "users", "id")),
        )
}

fn insert_demo_user(name: &str, creation_date: i64) -> SqlCommand {
    SqlCommand::new("INSERT INTO users (name, creationDate) VALUES (:name, :creationDate)")
        .with_params(
            Params::new()
                .with_value("name", name)
                .with_value("creationDate", creation_date),
        )
}

#[test]
fn tables_render_idempotent_ddl() {
    let schema = demo_schema();
    assert_eq!(
        schema.tables[0].create_sql(),
        "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY NOT NULL, name TEXT NOT NULL UNIQUE, creationDate INTEGER NOT NULL);"
    );
    assert_eq!(
        schema.tables[1].create_sql(),
        "CREATE TABLE IF NOT EXISTS userDetails (id INTEGER PRIMARY KEY NOT NULL, lastClick INTEGER NOT NULL, userId INTEGER NOT NULL, FOREIGN KEY (userId) REFERENCES users(id));"
    );
}

#[test]
fn bootstrap_is_idempotent() -> Result<()> {
    let gateway = SqliteGateway::open_in_memory()?;
    gateway.initialize_schema(&demo_schema())?;
    gateway.initialize_schema(&demo_schema())?;

    assert_eq!(gateway.execute(&insert_demo_user("test0", 1000)), 1);
    Ok(())
}

#[test]
fn from_config_leaves_tables_queryable() -> Result<()> {
    let file = NamedTempFile::new()?;
    let config = SqliteConfig::new(file.path().to_str().unwrap(), demo_schema());
    let gateway = SqliteGateway::from_config(&config)?;

    let rows = gateway.query(&SqlCommand::new("SELECT COUNT(*) FROM userDetails"), false)?;
    assert_eq!(rows, vec![vec![Value::Integer(0)]]);
    Ok(())
}

#[test]
fn config_deserializes_from_json() -> Result<()> {
    let json = r#"{
        "db_path": "demo.sqlite3",
        "schema": {
            "tables": [
                {
                    "name": "users",
                    "columns": [
                        { "name": "id", "data_type": "Integer", "constraints": ["PrimaryKey"] }
                    ],
                    "foreign_keys": []
                }
            ]
        }
    }"#;

    let config: SqliteConfig = serde_json::from_str(json)?;
    assert_eq!(config.db_path, "demo.sqlite3");
    assert_eq!(
        config.schema.tables[0].create_sql(),
        "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY);"
    );

    // Cell values serialize too, for callers shipping result sets onward.
    assert_eq!(serde_json::to_string(&Value::Integer(5))?, r#"{"Integer":5}"#);
    assert_eq!(serde_json::to_string(&Value::Null)?, r#""Null""#);
    Ok(())
}

// The demo caller's click cycle: insert a user, look up its id, attach a
// detail row, update it, check both counts, then clear both tables.
#[test]
fn demo_click_flow() -> Result<()> {
    let gateway = SqliteGateway::open_in_memory()?;
    gateway.initialize_schema(&demo_schema())?;

    assert_eq!(gateway.execute(&insert_demo_user("test0", 1000)), 1);

    let id_rows = gateway.query(
        &SqlCommand::new("SELECT id FROM users WHERE name = :name")
            .with_params(Params::new().with_value("name", "test0")),
        false,
    )?;
    let user_id = id_rows[0][0].clone();

    let insert_detail =
        SqlCommand::new("INSERT INTO userDetails (lastClick, userId) VALUES (:lastClick, :userId)")
            .with_params(
                Params::new()
                    .with_value("lastClick", 2000_i64)
                    .with_value("userId", user_id.clone()),
            );
    assert_eq!(gateway.execute(&insert_detail), 1);

    let update_detail =
        SqlCommand::new("UPDATE userDetails SET lastClick = :lastClick WHERE userId = :userId")
            .with_params(
                Params::new()
                    .with_value("lastClick", 3000_i64)
                    .with_value("userId", user_id),
            );
    assert_eq!(gateway.execute(&update_detail), 1);

    let users = gateway.query(&SqlCommand::new("SELECT COUNT(*) FROM users"), false)?;
    let details = gateway.query(&SqlCommand::new("SELECT COUNT(*) FROM userDetails"), false)?;
    assert_eq!(users, vec![vec![Value::Integer(1)]]);
    assert_eq!(details, vec![vec![Value::Integer(1)]]);

    assert_eq!(gateway.execute(&SqlCommand::new("DELETE FROM userDetails")), 1);
    assert_eq!(gateway.execute(&SqlCommand::new("DELETE FROM users")), 1);
    Ok(())
}
