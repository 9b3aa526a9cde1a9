use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool, Transaction};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::{category::Category, ModelError, PAGE_SIZE};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(json)]
    pub images: Vec<String>,
    #[sqlx(json)]
    pub keywords: Vec<String>,
    #[sqlx(json)]
    pub metadata: serde_json::Value,
    pub price: f64,
    pub discount: f64,
    pub stock: i64,
    pub is_featured: bool,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ProductWithCategories {
    #[serde(flatten)]
    #[ts(flatten)]
    pub product: Product,
    pub categories: Vec<Category>,
}

impl std::ops::Deref for ProductWithCategories {
    type Target = Product;
    fn deref(&self) -> &Self::Target {
        &self.product
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub price: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_available: bool,
    pub category_ids: Vec<Uuid>,
}

pub type UpdateProduct = CreateProduct;

/// Sort keys accepted by the product list. Unknown values fall back
/// to `Popular`; `Featured` keeps the same order-count ordering the
/// storefront uses for its default view.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize, Deserialize, TS,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    Featured,
    MostExpensive,
    LeastExpensive,
    #[default]
    Popular,
}

/// Validated query descriptor for the product list page.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListSpec {
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
    /// Case-insensitive substring match against category titles.
    pub category: Option<String>,
    pub category_id: Option<Uuid>,
    pub sort: ProductSort,
    pub page: u32,
}

impl Default for ProductListSpec {
    fn default() -> Self {
        Self {
            is_available: None,
            is_featured: None,
            category: None,
            category_id: None,
            sort: ProductSort::default(),
            page: 1,
        }
    }
}

impl ProductListSpec {
    pub fn offset(&self) -> i64 {
        (i64::from(self.page.max(1)) - 1) * PAGE_SIZE
    }
}

impl Product {
    pub async fn find_many(
        pool: &SqlitePool,
        spec: &ProductListSpec,
    ) -> Result<Vec<ProductWithCategories>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT p.id, p.title, p.description, p.images, p.keywords, p.metadata, \
             p.price, p.discount, p.stock, p.is_featured, p.is_available, \
             p.created_at, p.updated_at \
             FROM products p WHERE 1 = 1",
        );

        if let Some(is_available) = spec.is_available {
            qb.push(" AND p.is_available = ").push_bind(is_available);
        }
        if let Some(is_featured) = spec.is_featured {
            qb.push(" AND p.is_featured = ").push_bind(is_featured);
        }
        if let Some(category_id) = spec.category_id {
            qb.push(
                " AND EXISTS (SELECT 1 FROM product_categories pc \
                 WHERE pc.product_id = p.id AND pc.category_id = ",
            )
            .push_bind(category_id)
            .push(")");
        }
        if let Some(category) = &spec.category {
            qb.push(
                " AND EXISTS (SELECT 1 FROM product_categories pc \
                 JOIN categories c ON c.id = pc.category_id \
                 WHERE pc.product_id = p.id AND c.title LIKE '%' || ",
            )
            .push_bind(category.clone())
            .push(" || '%')");
        }

        match spec.sort {
            ProductSort::MostExpensive => {
                qb.push(" ORDER BY p.price DESC");
            }
            ProductSort::LeastExpensive => {
                qb.push(" ORDER BY p.price ASC");
            }
            ProductSort::Featured | ProductSort::Popular => {
                qb.push(
                    " ORDER BY (SELECT COUNT(*) FROM order_items oi \
                     WHERE oi.product_id = p.id) DESC, p.created_at DESC",
                );
            }
        }

        qb.push(" LIMIT ")
            .push_bind(PAGE_SIZE)
            .push(" OFFSET ")
            .push_bind(spec.offset());

        let products = qb.build_query_as::<Product>().fetch_all(pool).await?;

        let mut result = Vec::with_capacity(products.len());
        for product in products {
            let categories = Self::categories(pool, product.id).await?;
            result.push(ProductWithCategories { product, categories });
        }
        Ok(result)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            "SELECT id, title, description, images, keywords, metadata, price, discount, \
             stock, is_featured, is_available, created_at, updated_at
               FROM products
              WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id_with_categories(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<ProductWithCategories>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(product) => {
                let categories = Self::categories(pool, product.id).await?;
                Ok(Some(ProductWithCategories { product, categories }))
            }
            None => Ok(None),
        }
    }

    /// Categories in selection order.
    pub async fn categories(
        pool: &SqlitePool,
        product_id: Uuid,
    ) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT c.id, c.title, c.description, c.created_at, c.updated_at
               FROM categories c
               JOIN product_categories pc ON pc.category_id = c.id
              WHERE pc.product_id = $1
              ORDER BY pc.position ASC",
        )
        .bind(product_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateProduct,
    ) -> Result<ProductWithCategories, ModelError> {
        let mut tx = pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products \
             (id, title, description, images, keywords, metadata, price, discount, stock, \
              is_featured, is_available)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id, title, description, images, keywords, metadata, price, discount, \
             stock, is_featured, is_available, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(sqlx::types::Json(&data.images))
        .bind(sqlx::types::Json(&data.keywords))
        .bind(sqlx::types::Json(&data.metadata))
        .bind(data.price)
        .bind(data.discount)
        .bind(data.stock)
        .bind(data.is_featured)
        .bind(data.is_available)
        .fetch_one(&mut *tx)
        .await?;

        connect_categories(&mut tx, product.id, &data.category_ids).await?;
        tx.commit().await?;

        let categories = Self::categories(pool, product.id).await?;
        Ok(ProductWithCategories { product, categories })
    }

    /// Update scalar fields and replace the category selection with
    /// exactly the given list.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProduct,
    ) -> Result<ProductWithCategories, ModelError> {
        let mut tx = pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            "UPDATE products
                SET title = $2, description = $3, images = $4, keywords = $5, metadata = $6, \
                    price = $7, discount = $8, stock = $9, is_featured = $10, \
                    is_available = $11, updated_at = CURRENT_TIMESTAMP
              WHERE id = $1
             RETURNING id, title, description, images, keywords, metadata, price, discount, \
             stock, is_featured, is_available, created_at, updated_at",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(sqlx::types::Json(&data.images))
        .bind(sqlx::types::Json(&data.keywords))
        .bind(sqlx::types::Json(&data.metadata))
        .bind(data.price)
        .bind(data.discount)
        .bind(data.stock)
        .bind(data.is_featured)
        .bind(data.is_available)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ModelError::NotFound { entity: "product" })?;

        set_categories(&mut tx, id, &data.category_ids).await?;
        tx.commit().await?;

        let categories = Self::categories(pool, id).await?;
        Ok(ProductWithCategories { product, categories })
    }

    /// Delete a product. Fails while any order item still references it.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<Self, ModelError> {
        let references =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_items WHERE product_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;
        if references > 0 {
            return Err(ModelError::Referenced {
                entity: "product",
                dependents: "order items",
                count: references,
            });
        }

        sqlx::query_as::<_, Product>(
            "DELETE FROM products
              WHERE id = $1
             RETURNING id, title, description, images, keywords, metadata, price, discount, \
             stock, is_featured, is_available, created_at, updated_at",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound { entity: "product" })
    }
}

/// Additive relation operator used at creation time.
pub async fn connect_categories(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: Uuid,
    category_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    for (position, category_id) in category_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO product_categories (product_id, category_id, position)
             VALUES ($1, $2, $3)",
        )
        .bind(product_id)
        .bind(category_id)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Replace-all relation operator used at update time.
pub async fn set_categories(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: Uuid,
    category_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut **tx)
        .await?;
    connect_categories(tx, product_id, category_ids).await
}
