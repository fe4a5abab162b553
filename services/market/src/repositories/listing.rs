//! Listing repository for database operations

use anyhow::Result;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::UserRecord;
use crate::models::listing::{Listing, ListingUpdate, ListingWithOwner, NewListing};

const LISTING_COLUMNS: &str = "id, title, description, brand, price, user_id, category, \
     subcategory, images, state, city, features, location, posted_by, is_expired, expiry_date, \
     views, created_at, updated_at";

/// Listing repository for database operations
#[derive(Clone)]
pub struct ListingRepository {
    pool: PgPool,
}

impl ListingRepository {
    /// Create a new listing repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new listing with `is_expired = false`
    pub async fn insert(&self, new: &NewListing) -> Result<Listing> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO listings
                (id, title, description, brand, price, user_id, category, subcategory,
                 images, state, city, features, location, posted_by, is_expired,
                 expiry_date, views, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, FALSE,
                 $15, '[]'::jsonb, NOW(), NOW())
            RETURNING {LISTING_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.brand)
        .bind(&new.price)
        .bind(new.user_id)
        .bind(&new.category)
        .bind(&new.subcategory)
        .bind(serde_json::to_value(&new.images)?)
        .bind(&new.state)
        .bind(&new.city)
        .bind(&new.features)
        .bind(serde_json::to_value(&new.location)?)
        .bind(serde_json::to_value(&new.posted_by)?)
        .bind(&new.expiry_date)
        .fetch_one(&self.pool)
        .await?;

        listing_from_row(&row)
    }

    /// Find a listing by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>> {
        let row = sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(listing_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Update a listing's scalar fields, appending any new images
    ///
    /// Images are only ever appended; an empty `new_images` leaves the stored
    /// sequence untouched.
    pub async fn update(&self, id: Uuid, update: &ListingUpdate) -> Result<Option<Listing>> {
        let row = if update.new_images.is_empty() {
            sqlx::query(&format!(
                r#"
                UPDATE listings
                SET title = $2, description = $3, brand = $4, price = $5, category = $6,
                    subcategory = $7, state = $8, city = $9, features = $10, location = $11,
                    is_expired = $12, updated_at = NOW()
                WHERE id = $1
                RETURNING {LISTING_COLUMNS}
                "#
            ))
            .bind(id)
            .bind(&update.title)
            .bind(&update.description)
            .bind(&update.brand)
            .bind(&update.price)
            .bind(&update.category)
            .bind(&update.subcategory)
            .bind(&update.state)
            .bind(&update.city)
            .bind(&update.features)
            .bind(serde_json::to_value(&update.location)?)
            .bind(update.is_expired)
            .fetch_optional(&self.pool)
            .await?
        } else {
            sqlx::query(&format!(
                r#"
                UPDATE listings
                SET title = $2, description = $3, brand = $4, price = $5, category = $6,
                    subcategory = $7, state = $8, city = $9, features = $10, location = $11,
                    is_expired = $12, images = images || $13::jsonb, updated_at = NOW()
                WHERE id = $1
                RETURNING {LISTING_COLUMNS}
                "#
            ))
            .bind(id)
            .bind(&update.title)
            .bind(&update.description)
            .bind(&update.brand)
            .bind(&update.price)
            .bind(&update.category)
            .bind(&update.subcategory)
            .bind(&update.state)
            .bind(&update.city)
            .bind(&update.features)
            .bind(serde_json::to_value(&update.location)?)
            .bind(update.is_expired)
            .bind(serde_json::to_value(&update.new_images)?)
            .fetch_optional(&self.pool)
            .await?
        };

        match row {
            Some(row) => Ok(Some(listing_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Append a view record, with no dedup by viewer
    pub async fn record_view(&self, listing_id: Uuid, viewer_id: Uuid) -> Result<bool> {
        let entry = serde_json::json!([{
            "userId": viewer_id,
            "viewedAt": Utc::now(),
        }]);

        let result = sqlx::query(
            r#"
            UPDATE listings
            SET views = views || $2::jsonb, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(listing_id)
        .bind(entry)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get all listings with their owners resolved
    pub async fn get_all_with_owner(&self) -> Result<Vec<ListingWithOwner>> {
        let rows = sqlx::query(&owner_join_query(None))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(listing_with_owner_from_row).collect()
    }

    /// Get all listings owned by one user, owner resolved
    pub async fn get_by_owner(&self, user_id: Uuid) -> Result<Vec<ListingWithOwner>> {
        let rows = sqlx::query(&owner_join_query(Some("l.user_id = $1")))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(listing_with_owner_from_row).collect()
    }
}

fn owner_join_query(filter: Option<&str>) -> String {
    let where_clause = filter.map(|f| format!("WHERE {f}")).unwrap_or_default();
    format!(
        r#"
        SELECT l.id, l.title, l.description, l.brand, l.price, l.user_id, l.category,
               l.subcategory, l.images, l.state, l.city, l.features, l.location,
               l.posted_by, l.is_expired, l.expiry_date, l.views, l.created_at,
               l.updated_at,
               u.id AS owner_id, u.full_name AS owner_full_name, u.email AS owner_email,
               u.created_at AS owner_created_at, u.product_listed AS owner_product_listed
        FROM listings l
        LEFT JOIN users u ON u.id = l.user_id
        {where_clause}
        ORDER BY l.created_at DESC
        "#
    )
}

fn listing_from_row(row: &PgRow) -> Result<Listing> {
    let images: serde_json::Value = row.get("images");
    let location: serde_json::Value = row.get("location");
    let posted_by: serde_json::Value = row.get("posted_by");
    let views: serde_json::Value = row.get("views");

    Ok(Listing {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        brand: row.get("brand"),
        price: row.get("price"),
        user_id: row.get("user_id"),
        category: row.get("category"),
        subcategory: row.get("subcategory"),
        images: serde_json::from_value(images)?,
        state: row.get("state"),
        city: row.get("city"),
        features: row.get("features"),
        location: serde_json::from_value(location)?,
        posted_by: serde_json::from_value(posted_by)?,
        is_expired: row.get("is_expired"),
        expiry_date: row.get("expiry_date"),
        views: serde_json::from_value(views)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn listing_with_owner_from_row(row: &PgRow) -> Result<ListingWithOwner> {
    let listing = listing_from_row(row)?;

    let owner_id: Option<Uuid> = row.get("owner_id");
    let user = match owner_id {
        Some(id) => {
            let product_listed: serde_json::Value = row.get("owner_product_listed");
            Some(UserRecord {
                id,
                full_name: row.get("owner_full_name"),
                email: row.get("owner_email"),
                created_at: row.get("owner_created_at"),
                product_listed: serde_json::from_value(product_listed)?,
            })
        }
        None => None,
    };

    Ok(ListingWithOwner { listing, user })
}
