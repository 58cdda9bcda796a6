//! Item repository for database operations

use crate::instrumentation::track_operation;
use chrono::{DateTime, Utc};
use items_api_shared::Item;
use sqlx::PgPool;

/// Item record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Item repository for database operations
pub struct ItemRepository;

impl ItemRepository {
    /// List items, oldest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<ItemRecord>, sqlx::Error> {
        track_operation("get_items", async {
            sqlx::query_as::<_, ItemRecord>(
                r#"
                SELECT id, name, description, created_at, updated_at
                FROM items
                ORDER BY id
                LIMIT $1 OFFSET $2
                "#,
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
        })
        .await
    }

    /// Find item by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<ItemRecord>, sqlx::Error> {
        track_operation("get_item", async {
            sqlx::query_as::<_, ItemRecord>(
                r#"
                SELECT id, name, description, created_at, updated_at
                FROM items
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(pool)
            .await
        })
        .await
    }

    /// Create a new item
    pub async fn create(
        pool: &PgPool,
        name: &str,
        description: &str,
    ) -> Result<ItemRecord, sqlx::Error> {
        track_operation("create_item", async {
            sqlx::query_as::<_, ItemRecord>(
                r#"
                INSERT INTO items (name, description)
                VALUES ($1, $2)
                RETURNING id, name, description, created_at, updated_at
                "#,
            )
            .bind(name)
            .bind(description)
            .fetch_one(pool)
            .await
        })
        .await
    }

    /// Replace an item's name and description
    ///
    /// Returns `None` when no item has the given ID.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        name: &str,
        description: &str,
    ) -> Result<Option<ItemRecord>, sqlx::Error> {
        track_operation("update_item", async {
            sqlx::query_as::<_, ItemRecord>(
                r#"
                UPDATE items SET
                    name = $2,
                    description = $3,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id, name, description, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(name)
            .bind(description)
            .fetch_optional(pool)
            .await
        })
        .await
    }

    /// Delete an item, returning whether a row was removed
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        track_operation("delete_item", async {
            sqlx::query("DELETE FROM items WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .map(|result| result.rows_affected() > 0)
        })
        .await
    }
}
