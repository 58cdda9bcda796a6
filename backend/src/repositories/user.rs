//! User repository for database operations

use crate::instrumentation::track_operation;
use chrono::{DateTime, Utc};
use items_api_shared::User;
use sqlx::PgPool;

/// User record from database, including the credential hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            email: record.email,
            created_at: record.created_at,
        }
    }
}

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Insert a new user
    ///
    /// A duplicate username or email surfaces as a unique violation from
    /// the database.
    pub async fn create(
        pool: &PgPool,
        username: &str,
        password_hash: &str,
        email: &str,
    ) -> Result<UserRecord, sqlx::Error> {
        track_operation("create_user", async {
            sqlx::query_as::<_, UserRecord>(
                r#"
                INSERT INTO users (username, password_hash, email)
                VALUES ($1, $2, $3)
                RETURNING id, username, password_hash, email, created_at
                "#,
            )
            .bind(username)
            .bind(password_hash)
            .bind(email)
            .fetch_one(pool)
            .await
        })
        .await
    }

    /// Find user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        track_operation("get_user", async {
            sqlx::query_as::<_, UserRecord>(
                r#"
                SELECT id, username, password_hash, email, created_at
                FROM users
                WHERE username = $1
                "#,
            )
            .bind(username)
            .fetch_optional(pool)
            .await
        })
        .await
    }
}
