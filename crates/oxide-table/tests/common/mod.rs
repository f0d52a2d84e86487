#![allow(dead_code)]

use oxide_table::{ColumnDef, LogicalType, Schema, SqliteStore, Table};
use sqlx::sqlite::SqlitePoolOptions;

pub async fn store() -> SqliteStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap_or_else(|e| panic!("Failed to open in-memory database: {e}"));
    SqliteStore::new(pool)
}

/// `{id: int/auto/primary, token: string/unique, ts: datetime}`
pub fn tokens_schema() -> Schema {
    Schema::define(
        "tokens",
        vec![
            ColumnDef::new("id", LogicalType::Int)
                .primary_key()
                .auto_increment(),
            ColumnDef::new("token", LogicalType::String).unique(),
            ColumnDef::new("ts", LogicalType::DateTime),
        ],
    )
    .unwrap()
}

pub fn profiles_schema() -> Schema {
    Schema::define(
        "profiles",
        vec![
            ColumnDef::new("id", LogicalType::Int)
                .primary_key()
                .auto_increment(),
            ColumnDef::new("name", LogicalType::String),
            ColumnDef::new("score", LogicalType::Float),
            ColumnDef::new("meta", LogicalType::OpaqueBlob),
            ColumnDef::new("updated", LogicalType::DateTime)
                .default_expr("CURRENT_TIMESTAMP")
                .on_update("CURRENT_TIMESTAMP"),
        ],
    )
    .unwrap()
}

pub async fn tokens_table() -> Table<SqliteStore> {
    Table::new(store().await, tokens_schema()).await.unwrap()
}

pub async fn profiles_table() -> Table<SqliteStore> {
    Table::new(store().await, profiles_schema()).await.unwrap()
}
