use axum::Router;
use tower_cookies::CookieManagerLayer;

use crate::state::AppState;

pub mod accounts;
pub mod doc;
pub mod health;
pub mod menu_items;
pub mod orders;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(menu_items::router())
        .merge(orders::router())
        .merge(accounts::router())
        .layer(CookieManagerLayer::new())
}
