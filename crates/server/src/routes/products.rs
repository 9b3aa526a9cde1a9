use axum::{
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
    Router,
};
use db::models::product::{CreateProduct, Product, ProductWithCategories, UpdateProduct};
use services::services::list_query::{self, RawProductListParams};
use uuid::Uuid;

use crate::{auth::CallerIdentity, error::ApiError, AppState};

fn validate(data: &CreateProduct) -> Result<(), ApiError> {
    if data.title.trim().is_empty() {
        return Err(ApiError::required("Title"));
    }
    if data.price <= 0.0 {
        return Err(ApiError::required("Price"));
    }
    if data.category_ids.is_empty() {
        return Err(ApiError::required("Category IDs"));
    }
    Ok(())
}

/// GET /api/products — one page of the filtered catalog. Malformed
/// query values fall back to their defaults instead of failing.
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<RawProductListParams>,
) -> Result<ResponseJson<Vec<ProductWithCategories>>, ApiError> {
    let spec = list_query::product_list_spec(&params);
    let products = Product::find_many(&state.pool, &spec)
        .await
        .map_err(|e| ApiError::db("PRODUCTS_GET", e))?;
    Ok(ResponseJson(products))
}

/// POST /api/products
pub async fn create_product(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateProduct>,
) -> Result<ResponseJson<ProductWithCategories>, ApiError> {
    validate(&payload)?;
    let product = Product::create(&state.pool, &payload)
        .await
        .map_err(|e| ApiError::model("PRODUCT_POST", e))?;
    Ok(ResponseJson(product))
}

/// GET /api/products/{id}
pub async fn get_product(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ProductWithCategories>, ApiError> {
    Product::find_by_id_with_categories(&state.pool, id)
        .await
        .map_err(|e| ApiError::db("PRODUCT_GET", e))?
        .map(ResponseJson)
        .ok_or(ApiError::NotFound("product"))
}

/// PATCH /api/products/{id} — scalar fields plus a full replacement
/// of the category selection.
pub async fn update_product(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateProduct>,
) -> Result<ResponseJson<ProductWithCategories>, ApiError> {
    validate(&payload)?;
    let product = Product::update(&state.pool, id, &payload)
        .await
        .map_err(|e| ApiError::model("PRODUCT_PATCH", e))?;
    Ok(ResponseJson(product))
}

/// DELETE /api/products/{id}
pub async fn delete_product(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<Product>, ApiError> {
    let product = Product::delete(&state.pool, id)
        .await
        .map_err(|e| ApiError::model("PRODUCT_DELETE", e))?;
    Ok(ResponseJson(product))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
}
