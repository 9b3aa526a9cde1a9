use axum::{
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
    Router,
};
use db::models::order::{CreateOrder, Order, OrderWithItems};
use serde::Deserialize;
use services::services::list_query::{self, OrderRow, RawOrderListParams};
use uuid::Uuid;

use crate::{auth::CallerIdentity, error::ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPaid {
    pub is_paid: bool,
}

/// GET /api/orders — one page of the admin order table, already
/// formatted for display. Malformed query values fall back to their
/// defaults instead of failing.
pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<RawOrderListParams>,
) -> Result<ResponseJson<Vec<OrderRow>>, ApiError> {
    let spec = list_query::order_list_spec(&params);
    let orders = Order::find_many(&state.pool, &spec)
        .await
        .map_err(|e| ApiError::db("ORDERS_GET", e))?;
    let rows = orders.iter().map(list_query::order_row).collect();
    Ok(ResponseJson(rows))
}

/// POST /api/orders — creates an order from a line-item selection;
/// unit prices and the payable total are derived server-side.
pub async fn create_order(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateOrder>,
) -> Result<ResponseJson<OrderWithItems>, ApiError> {
    if payload.items.is_empty() {
        return Err(ApiError::required("Items"));
    }
    let order = Order::create(&state.pool, &payload)
        .await
        .map_err(|e| ApiError::model("ORDER_POST", e))?;
    Ok(ResponseJson(order))
}

/// GET /api/orders/{id} — the order with its line items.
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<OrderWithItems>, ApiError> {
    Order::find_by_id_with_items(&state.pool, id)
        .await
        .map_err(|e| ApiError::db("ORDER_GET", e))?
        .map(ResponseJson)
        .ok_or(ApiError::NotFound("order"))
}

/// PATCH /api/orders/{id} — toggle the paid flag.
pub async fn update_order(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<SetPaid>,
) -> Result<ResponseJson<Order>, ApiError> {
    let order = Order::set_paid(&state.pool, id, payload.is_paid)
        .await
        .map_err(|e| ApiError::model("ORDER_PATCH", e))?;
    Ok(ResponseJson(order))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order).patch(update_order))
}
