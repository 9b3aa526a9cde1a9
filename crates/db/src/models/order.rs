use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::{ModelError, PAGE_SIZE};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub number: i64,
    pub user_id: Uuid,
    pub payable: f64,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub count: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct OrderWithItems {
    #[serde(flatten)]
    #[ts(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl std::ops::Deref for OrderWithItems {
    type Target = Order;
    fn deref(&self) -> &Self::Target {
        &self.order
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub user_id: Uuid,
    pub items: Vec<CreateOrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    pub product_id: Uuid,
    pub count: i64,
}

/// Sort keys accepted by the order list. Unknown values fall back to
/// `Newest`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize, Deserialize, TS,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderSort {
    HighestPayable,
    LowestPayable,
    #[default]
    Newest,
}

/// Validated query descriptor for the order list page. Absent fields
/// add no predicate, so the storage default (no filter) applies.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderListSpec {
    pub user_id: Option<Uuid>,
    pub is_paid: Option<bool>,
    /// Case-insensitive substring match against the category titles
    /// of ordered products.
    pub category: Option<String>,
    pub min_payable: Option<f64>,
    pub max_payable: Option<f64>,
    pub sort: OrderSort,
    pub page: u32,
}

impl Default for OrderListSpec {
    fn default() -> Self {
        Self {
            user_id: None,
            is_paid: None,
            category: None,
            min_payable: None,
            max_payable: None,
            sort: OrderSort::default(),
            page: 1,
        }
    }
}

impl OrderListSpec {
    pub fn offset(&self) -> i64 {
        (i64::from(self.page.max(1)) - 1) * PAGE_SIZE
    }
}

impl Order {
    pub async fn find_many(
        pool: &SqlitePool,
        spec: &OrderListSpec,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT o.id, o.number, o.user_id, o.payable, o.is_paid, o.created_at, o.updated_at \
             FROM orders o WHERE 1 = 1",
        );

        if let Some(user_id) = spec.user_id {
            qb.push(" AND o.user_id = ").push_bind(user_id);
        }
        if let Some(is_paid) = spec.is_paid {
            qb.push(" AND o.is_paid = ").push_bind(is_paid);
        }
        if let Some(min) = spec.min_payable {
            qb.push(" AND o.payable >= ").push_bind(min);
        }
        if let Some(max) = spec.max_payable {
            qb.push(" AND o.payable <= ").push_bind(max);
        }
        if let Some(category) = &spec.category {
            qb.push(
                " AND EXISTS (SELECT 1 FROM order_items oi \
                 JOIN product_categories pc ON pc.product_id = oi.product_id \
                 JOIN categories c ON c.id = pc.category_id \
                 WHERE oi.order_id = o.id AND c.title LIKE '%' || ",
            )
            .push_bind(category.clone())
            .push(" || '%')");
        }

        match spec.sort {
            OrderSort::HighestPayable => qb.push(" ORDER BY o.payable DESC"),
            OrderSort::LowestPayable => qb.push(" ORDER BY o.payable ASC"),
            OrderSort::Newest => qb.push(" ORDER BY o.created_at DESC"),
        };

        qb.push(" LIMIT ")
            .push_bind(PAGE_SIZE)
            .push(" OFFSET ")
            .push_bind(spec.offset());

        qb.build_query_as::<Order>().fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            "SELECT id, number, user_id, payable, is_paid, created_at, updated_at
               FROM orders
              WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id_with_items(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<OrderWithItems>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(order) => {
                let items = Self::items(pool, order.id).await?;
                Ok(Some(OrderWithItems { order, items }))
            }
            None => Ok(None),
        }
    }

    pub async fn find_by_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            "SELECT id, number, user_id, payable, is_paid, created_at, updated_at
               FROM orders
              WHERE user_id = $1
              ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn items(pool: &SqlitePool, order_id: Uuid) -> Result<Vec<OrderItem>, sqlx::Error> {
        sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, count, price
               FROM order_items
              WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(pool)
        .await
    }

    /// Create an order from a line-item selection. Unit prices come
    /// from the current product price minus its discount; the payable
    /// total is derived, never supplied by the caller.
    pub async fn create(pool: &SqlitePool, data: &CreateOrder) -> Result<OrderWithItems, ModelError> {
        let mut tx = pool.begin().await?;

        let mut lines = Vec::with_capacity(data.items.len());
        let mut payable = 0.0;
        for item in &data.items {
            let (price, discount) = sqlx::query_as::<_, (f64, f64)>(
                "SELECT price, discount FROM products WHERE id = $1",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ModelError::NotFound { entity: "product" })?;

            let unit = price - discount;
            payable += unit * item.count as f64;
            lines.push((item.product_id, item.count, unit));
        }

        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (id, number, user_id, payable)
             VALUES ($1, (SELECT COALESCE(MAX(number), 0) + 1 FROM orders), $2, $3)
             RETURNING id, number, user_id, payable, is_paid, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(payable)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for (product_id, count, unit) in lines {
            let item = sqlx::query_as::<_, OrderItem>(
                "INSERT INTO order_items (id, order_id, product_id, count, price)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING id, order_id, product_id, count, price",
            )
            .bind(Uuid::new_v4())
            .bind(order.id)
            .bind(product_id)
            .bind(count)
            .bind(unit)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        tx.commit().await?;
        Ok(OrderWithItems { order, items })
    }

    pub async fn set_paid(pool: &SqlitePool, id: Uuid, is_paid: bool) -> Result<Self, ModelError> {
        sqlx::query_as::<_, Order>(
            "UPDATE orders
                SET is_paid = $2, updated_at = CURRENT_TIMESTAMP
              WHERE id = $1
             RETURNING id, number, user_id, payable, is_paid, created_at, updated_at",
        )
        .bind(id)
        .bind(is_paid)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound { entity: "order" })
    }
}
