use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::ModelError;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

pub type UpdateAddress = CreateAddress;

impl Address {
    pub async fn find_by_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Address>(
            "SELECT id, user_id, address, city, postal_code, country, phone, \
             created_at, updated_at
               FROM addresses
              WHERE user_id = $1
              ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Address>(
            "SELECT id, user_id, address, city, postal_code, country, phone, \
             created_at, updated_at
               FROM addresses
              WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        user_id: Uuid,
        data: &CreateAddress,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Address>(
            "INSERT INTO addresses (id, user_id, address, city, postal_code, country, phone)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, user_id, address, city, postal_code, country, phone, \
             created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.postal_code)
        .bind(&data.country)
        .bind(&data.phone)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateAddress,
    ) -> Result<Self, ModelError> {
        sqlx::query_as::<_, Address>(
            "UPDATE addresses
                SET address = $2, city = $3, postal_code = $4, country = $5, phone = $6, \
                    updated_at = CURRENT_TIMESTAMP
              WHERE id = $1
             RETURNING id, user_id, address, city, postal_code, country, phone, \
             created_at, updated_at",
        )
        .bind(id)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.postal_code)
        .bind(&data.country)
        .bind(&data.phone)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound { entity: "address" })
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<Self, ModelError> {
        sqlx::query_as::<_, Address>(
            "DELETE FROM addresses
              WHERE id = $1
             RETURNING id, user_id, address, city, postal_code, country, phone, \
             created_at, updated_at",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound { entity: "address" })
    }
}
