//! Repositories for database operations

use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::UserRecord;

pub mod listing;

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, email, created_at, product_listed
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let product_listed: serde_json::Value = row.get("product_listed");
                let user = UserRecord {
                    id: row.get("id"),
                    full_name: row.get("full_name"),
                    email: row.get("email"),
                    created_at: row.get("created_at"),
                    product_listed: serde_json::from_value(product_listed)?,
                };
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Append a listing reference to the owner's `product_listed` cache
    ///
    /// Secondary write with no transaction around it; the caller decides
    /// whether a failure here aborts anything.
    pub async fn append_product_listed(&self, user_id: Uuid, listing_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET product_listed = product_listed || $2::jsonb
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(serde_json::json!([listing_id]))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
