use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::ModelError;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateBrand {
    pub title: String,
    pub description: Option<String>,
    pub logo: Option<String>,
}

pub type UpdateBrand = CreateBrand;

impl Brand {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Brand>(
            "SELECT id, title, description, logo, created_at, updated_at
               FROM brands
              ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Brand>(
            "SELECT id, title, description, logo, created_at, updated_at
               FROM brands
              WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateBrand) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Brand>(
            "INSERT INTO brands (id, title, description, logo)
             VALUES ($1, $2, $3, $4)
             RETURNING id, title, description, logo, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.logo)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateBrand,
    ) -> Result<Self, ModelError> {
        sqlx::query_as::<_, Brand>(
            "UPDATE brands
                SET title = $2, description = $3, logo = $4, updated_at = CURRENT_TIMESTAMP
              WHERE id = $1
             RETURNING id, title, description, logo, created_at, updated_at",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.logo)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound { entity: "brand" })
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<Self, ModelError> {
        sqlx::query_as::<_, Brand>(
            "DELETE FROM brands
              WHERE id = $1
             RETURNING id, title, description, logo, created_at, updated_at",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound { entity: "brand" })
    }
}
