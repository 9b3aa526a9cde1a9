use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
    Router,
};
use db::models::category::{Category, CategoryWithBanners, CreateCategory, UpdateCategory};
use uuid::Uuid;

use crate::{auth::CallerIdentity, error::ApiError, AppState};

fn validate(data: &CreateCategory) -> Result<(), ApiError> {
    if data.title.trim().is_empty() {
        return Err(ApiError::required("Title"));
    }
    if data.description.trim().is_empty() {
        return Err(ApiError::required("Description"));
    }
    if data.banner_ids.is_empty() {
        return Err(ApiError::required("Banner IDs"));
    }
    Ok(())
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<CategoryWithBanners>>, ApiError> {
    let categories = Category::find_all_with_banners(&state.pool)
        .await
        .map_err(|e| ApiError::db("CATEGORIES_GET", e))?;
    Ok(ResponseJson(categories))
}

/// POST /api/categories
pub async fn create_category(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateCategory>,
) -> Result<ResponseJson<CategoryWithBanners>, ApiError> {
    validate(&payload)?;
    let category = Category::create(&state.pool, &payload)
        .await
        .map_err(|e| ApiError::model("CATEGORY_POST", e))?;
    Ok(ResponseJson(category))
}

/// GET /api/categories/{id}
pub async fn get_category(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<CategoryWithBanners>, ApiError> {
    Category::find_by_id_with_banners(&state.pool, id)
        .await
        .map_err(|e| ApiError::db("CATEGORY_GET", e))?
        .map(ResponseJson)
        .ok_or(ApiError::NotFound("category"))
}

/// PATCH /api/categories/{id} — scalar fields plus a full replacement
/// of the banner selection.
pub async fn update_category(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateCategory>,
) -> Result<ResponseJson<CategoryWithBanners>, ApiError> {
    validate(&payload)?;
    let category = Category::update(&state.pool, id, &payload)
        .await
        .map_err(|e| ApiError::model("CATEGORY_PATCH", e))?;
    Ok(ResponseJson(category))
}

/// DELETE /api/categories/{id}
pub async fn delete_category(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<Category>, ApiError> {
    let category = Category::delete(&state.pool, id)
        .await
        .map_err(|e| ApiError::model("CATEGORY_DELETE", e))?;
    Ok(ResponseJson(category))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
}
