use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
    Router,
};
use db::models::banner::{Banner, CreateBanner, UpdateBanner};
use uuid::Uuid;

use crate::{auth::CallerIdentity, error::ApiError, AppState};

fn validate(data: &CreateBanner) -> Result<(), ApiError> {
    if data.label.trim().is_empty() {
        return Err(ApiError::required("Label"));
    }
    if data.image.trim().is_empty() {
        return Err(ApiError::required("Image"));
    }
    Ok(())
}

/// GET /api/banners
pub async fn list_banners(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<Banner>>, ApiError> {
    let banners = Banner::find_all(&state.pool)
        .await
        .map_err(|e| ApiError::db("BANNERS_GET", e))?;
    Ok(ResponseJson(banners))
}

/// POST /api/banners
pub async fn create_banner(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateBanner>,
) -> Result<ResponseJson<Banner>, ApiError> {
    validate(&payload)?;
    let banner = Banner::create(&state.pool, &payload)
        .await
        .map_err(|e| ApiError::db("BANNER_POST", e))?;
    Ok(ResponseJson(banner))
}

/// GET /api/banners/{id}
pub async fn get_banner(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<Banner>, ApiError> {
    Banner::find_by_id(&state.pool, id)
        .await
        .map_err(|e| ApiError::db("BANNER_GET", e))?
        .map(ResponseJson)
        .ok_or(ApiError::NotFound("banner"))
}

/// PATCH /api/banners/{id}
pub async fn update_banner(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateBanner>,
) -> Result<ResponseJson<Banner>, ApiError> {
    validate(&payload)?;
    let banner = Banner::update(&state.pool, id, &payload)
        .await
        .map_err(|e| ApiError::model("BANNER_PATCH", e))?;
    Ok(ResponseJson(banner))
}

/// DELETE /api/banners/{id}
pub async fn delete_banner(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<Banner>, ApiError> {
    let banner = Banner::delete(&state.pool, id)
        .await
        .map_err(|e| ApiError::model("BANNER_DELETE", e))?;
    Ok(ResponseJson(banner))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/banners", get(list_banners).post(create_banner))
        .route(
            "/banners/{id}",
            get(get_banner).patch(update_banner).delete(delete_banner),
        )
}
