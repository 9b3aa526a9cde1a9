use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
    Router,
};
use db::models::brand::{Brand, CreateBrand, UpdateBrand};
use uuid::Uuid;

use crate::{auth::CallerIdentity, error::ApiError, AppState};

fn validate(data: &CreateBrand) -> Result<(), ApiError> {
    if data.title.trim().is_empty() {
        return Err(ApiError::required("Title"));
    }
    Ok(())
}

/// GET /api/brands
pub async fn list_brands(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<Brand>>, ApiError> {
    let brands = Brand::find_all(&state.pool)
        .await
        .map_err(|e| ApiError::db("BRANDS_GET", e))?;
    Ok(ResponseJson(brands))
}

/// POST /api/brands
pub async fn create_brand(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateBrand>,
) -> Result<ResponseJson<Brand>, ApiError> {
    validate(&payload)?;
    let brand = Brand::create(&state.pool, &payload)
        .await
        .map_err(|e| ApiError::db("BRAND_POST", e))?;
    Ok(ResponseJson(brand))
}

/// GET /api/brands/{id}
pub async fn get_brand(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<Brand>, ApiError> {
    Brand::find_by_id(&state.pool, id)
        .await
        .map_err(|e| ApiError::db("BRAND_GET", e))?
        .map(ResponseJson)
        .ok_or(ApiError::NotFound("brand"))
}

/// PATCH /api/brands/{id}
pub async fn update_brand(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateBrand>,
) -> Result<ResponseJson<Brand>, ApiError> {
    validate(&payload)?;
    let brand = Brand::update(&state.pool, id, &payload)
        .await
        .map_err(|e| ApiError::model("BRAND_PATCH", e))?;
    Ok(ResponseJson(brand))
}

/// DELETE /api/brands/{id}
pub async fn delete_brand(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<Brand>, ApiError> {
    let brand = Brand::delete(&state.pool, id)
        .await
        .map_err(|e| ApiError::model("BRAND_DELETE", e))?;
    Ok(ResponseJson(brand))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/brands", get(list_brands).post(create_brand))
        .route(
            "/brands/{id}",
            get(get_brand).patch(update_brand).delete(delete_brand),
        )
}
