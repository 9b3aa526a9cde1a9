use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod error;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
