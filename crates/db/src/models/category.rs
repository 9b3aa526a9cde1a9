use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use ts_rs::TS;
use uuid::Uuid;

use super::{banner::Banner, ModelError};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category with its banner selection, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CategoryWithBanners {
    #[serde(flatten)]
    #[ts(flatten)]
    pub category: Category,
    pub banners: Vec<Banner>,
}

impl std::ops::Deref for CategoryWithBanners {
    type Target = Category;
    fn deref(&self) -> &Self::Target {
        &self.category
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    pub title: String,
    pub description: String,
    pub banner_ids: Vec<Uuid>,
}

pub type UpdateCategory = CreateCategory;

impl Category {
    pub async fn find_all_with_banners(
        pool: &SqlitePool,
    ) -> Result<Vec<CategoryWithBanners>, sqlx::Error> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, title, description, created_at, updated_at
               FROM categories
              ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await?;

        let mut result = Vec::with_capacity(categories.len());
        for category in categories {
            let banners = Self::banners(pool, category.id).await?;
            result.push(CategoryWithBanners { category, banners });
        }
        Ok(result)
    }

    pub async fn find_by_id_with_banners(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<CategoryWithBanners>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, title, description, created_at, updated_at
               FROM categories
              WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match category {
            Some(category) => {
                let banners = Self::banners(pool, category.id).await?;
                Ok(Some(CategoryWithBanners { category, banners }))
            }
            None => Ok(None),
        }
    }

    /// Banners in selection order.
    pub async fn banners(pool: &SqlitePool, category_id: Uuid) -> Result<Vec<Banner>, sqlx::Error> {
        sqlx::query_as::<_, Banner>(
            "SELECT b.id, b.label, b.image, b.created_at, b.updated_at
               FROM banners b
               JOIN category_banners cb ON cb.banner_id = b.id
              WHERE cb.category_id = $1
              ORDER BY cb.position ASC",
        )
        .bind(category_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateCategory,
    ) -> Result<CategoryWithBanners, ModelError> {
        let mut tx = pool.begin().await?;

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, title, description)
             VALUES ($1, $2, $3)
             RETURNING id, title, description, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .fetch_one(&mut *tx)
        .await?;

        connect_banners(&mut tx, category.id, &data.banner_ids).await?;
        tx.commit().await?;

        let banners = Self::banners(pool, category.id).await?;
        Ok(CategoryWithBanners { category, banners })
    }

    /// Update scalar fields and replace the banner selection with
    /// exactly the given list.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCategory,
    ) -> Result<CategoryWithBanners, ModelError> {
        let mut tx = pool.begin().await?;

        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories
                SET title = $2, description = $3, updated_at = CURRENT_TIMESTAMP
              WHERE id = $1
             RETURNING id, title, description, created_at, updated_at",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ModelError::NotFound { entity: "category" })?;

        set_banners(&mut tx, id, &data.banner_ids).await?;
        tx.commit().await?;

        let banners = Self::banners(pool, id).await?;
        Ok(CategoryWithBanners { category, banners })
    }

    /// Delete a category. Fails while any product still references it.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<Self, ModelError> {
        let references = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM product_categories WHERE category_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        if references > 0 {
            return Err(ModelError::Referenced {
                entity: "category",
                dependents: "products",
                count: references,
            });
        }

        sqlx::query_as::<_, Category>(
            "DELETE FROM categories
              WHERE id = $1
             RETURNING id, title, description, created_at, updated_at",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound { entity: "category" })
    }
}

/// Additive relation operator used at creation time.
pub async fn connect_banners(
    tx: &mut Transaction<'_, Sqlite>,
    category_id: Uuid,
    banner_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    for (position, banner_id) in banner_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO category_banners (category_id, banner_id, position)
             VALUES ($1, $2, $3)",
        )
        .bind(category_id)
        .bind(banner_id)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Replace-all relation operator used at update time.
pub async fn set_banners(
    tx: &mut Transaction<'_, Sqlite>,
    category_id: Uuid,
    banner_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM category_banners WHERE category_id = $1")
        .bind(category_id)
        .execute(&mut **tx)
        .await?;
    connect_banners(tx, category_id, banner_ids).await
}
