use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::ModelError;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: Uuid,
    pub label: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateBanner {
    pub label: String,
    pub image: String,
}

pub type UpdateBanner = CreateBanner;

impl Banner {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Banner>(
            "SELECT id, label, image, created_at, updated_at
               FROM banners
              ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Banner>(
            "SELECT id, label, image, created_at, updated_at
               FROM banners
              WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateBanner) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Banner>(
            "INSERT INTO banners (id, label, image)
             VALUES ($1, $2, $3)
             RETURNING id, label, image, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&data.label)
        .bind(&data.image)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateBanner,
    ) -> Result<Self, ModelError> {
        sqlx::query_as::<_, Banner>(
            "UPDATE banners
                SET label = $2, image = $3, updated_at = CURRENT_TIMESTAMP
              WHERE id = $1
             RETURNING id, label, image, created_at, updated_at",
        )
        .bind(id)
        .bind(&data.label)
        .bind(&data.image)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound { entity: "banner" })
    }

    /// Delete a banner. Fails while any category still references it.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<Self, ModelError> {
        let references = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM category_banners WHERE banner_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        if references > 0 {
            return Err(ModelError::Referenced {
                entity: "banner",
                dependents: "categories",
                count: references,
            });
        }

        sqlx::query_as::<_, Banner>(
            "DELETE FROM banners
              WHERE id = $1
             RETURNING id, label, image, created_at, updated_at",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound { entity: "banner" })
    }
}
