use axum::Router;

use crate::AppState;

pub mod addresses;
pub mod banners;
pub mod brands;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(banners::router())
        .merge(brands::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(users::router())
        .merge(addresses::router())
        .merge(orders::router())
}
