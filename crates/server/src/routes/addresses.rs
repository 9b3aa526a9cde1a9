use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
    Router,
};
use db::models::address::{Address, CreateAddress, UpdateAddress};
use uuid::Uuid;

use crate::{auth::CallerIdentity, error::ApiError, AppState};

fn validate(data: &CreateAddress) -> Result<(), ApiError> {
    if data.address.trim().is_empty() {
        return Err(ApiError::required("Address"));
    }
    if data.city.trim().is_empty() {
        return Err(ApiError::required("City"));
    }
    if data.postal_code.trim().is_empty() {
        return Err(ApiError::required("Postal code"));
    }
    if data.country.trim().is_empty() {
        return Err(ApiError::required("Country"));
    }
    Ok(())
}

/// Addresses not owned by the caller are indistinguishable from
/// missing ones.
async fn owned_by(
    state: &AppState,
    caller: Uuid,
    id: Uuid,
    operation: &'static str,
) -> Result<Address, ApiError> {
    Address::find_by_id(&state.pool, id)
        .await
        .map_err(|e| ApiError::db(operation, e))?
        .filter(|address| address.user_id == caller)
        .ok_or(ApiError::NotFound("address"))
}

/// GET /api/addresses — the caller's addresses.
pub async fn list_addresses(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<Address>>, ApiError> {
    let addresses = Address::find_by_user(&state.pool, caller)
        .await
        .map_err(|e| ApiError::db("ADDRESSES_GET", e))?;
    Ok(ResponseJson(addresses))
}

/// POST /api/addresses — created for the caller.
pub async fn create_address(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateAddress>,
) -> Result<ResponseJson<Address>, ApiError> {
    validate(&payload)?;
    let address = Address::create(&state.pool, caller, &payload)
        .await
        .map_err(|e| ApiError::db("ADDRESS_POST", e))?;
    Ok(ResponseJson(address))
}

/// GET /api/addresses/{id}
pub async fn get_address(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<Address>, ApiError> {
    let address = owned_by(&state, caller, id, "ADDRESS_GET").await?;
    Ok(ResponseJson(address))
}

/// PATCH /api/addresses/{id}
pub async fn update_address(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateAddress>,
) -> Result<ResponseJson<Address>, ApiError> {
    validate(&payload)?;
    owned_by(&state, caller, id, "ADDRESS_PATCH").await?;
    let address = Address::update(&state.pool, id, &payload)
        .await
        .map_err(|e| ApiError::model("ADDRESS_PATCH", e))?;
    Ok(ResponseJson(address))
}

/// DELETE /api/addresses/{id}
pub async fn delete_address(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<Address>, ApiError> {
    owned_by(&state, caller, id, "ADDRESS_DELETE").await?;
    let address = Address::delete(&state.pool, id)
        .await
        .map_err(|e| ApiError::model("ADDRESS_DELETE", e))?;
    Ok(ResponseJson(address))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/addresses", get(list_addresses).post(create_address))
        .route(
            "/addresses/{id}",
            get(get_address).patch(update_address).delete(delete_address),
        )
}
