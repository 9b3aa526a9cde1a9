use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::{address::Address, order::Order, ModelError};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UserWithOrders {
    #[serde(flatten)]
    #[ts(flatten)]
    pub user: User,
    pub orders: Vec<Order>,
}

/// Detail view: the user with orders and addresses included.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UserDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub user: User,
    pub orders: Vec<Order>,
    pub addresses: Vec<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_banned: bool,
}

impl User {
    /// The 20 most recently updated users, with their orders.
    pub async fn find_recent_with_orders(
        pool: &SqlitePool,
    ) -> Result<Vec<UserWithOrders>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, phone, is_banned, created_at, updated_at
               FROM users
              ORDER BY updated_at DESC
              LIMIT 20",
        )
        .fetch_all(pool)
        .await?;

        let mut result = Vec::with_capacity(users.len());
        for user in users {
            let orders = Order::find_by_user(pool, user.id).await?;
            result.push(UserWithOrders { user, orders });
        }
        Ok(result)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, phone, is_banned, created_at, updated_at
               FROM users
              WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_detail(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<UserDetail>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(user) => {
                let orders = Order::find_by_user(pool, user.id).await?;
                let addresses = Address::find_by_user(pool, user.id).await?;
                Ok(Some(UserDetail { user, orders, addresses }))
            }
            None => Ok(None),
        }
    }

    pub async fn create(pool: &SqlitePool, data: &CreateUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, phone)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, email, phone, is_banned, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .fetch_one(pool)
        .await
    }

    pub async fn update(pool: &SqlitePool, id: Uuid, data: &UpdateUser) -> Result<Self, ModelError> {
        sqlx::query_as::<_, User>(
            "UPDATE users
                SET name = $2, email = $3, phone = $4, is_banned = $5, \
                    updated_at = CURRENT_TIMESTAMP
              WHERE id = $1
             RETURNING id, name, email, phone, is_banned, created_at, updated_at",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(data.is_banned)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound { entity: "user" })
    }

    /// Delete a user. Addresses cascade; orders are kept as history,
    /// so a user with orders cannot be deleted.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<Self, ModelError> {
        let references =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE user_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;
        if references > 0 {
            return Err(ModelError::Referenced {
                entity: "user",
                dependents: "orders",
                count: references,
            });
        }

        sqlx::query_as::<_, User>(
            "DELETE FROM users
              WHERE id = $1
             RETURNING id, name, email, phone, is_banned, created_at, updated_at",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound { entity: "user" })
    }
}
