use axum::Router;

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod preparedness;
pub mod repo;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::household_routes())
        .merge(handlers::member_routes())
        .merge(handlers::inventory_routes())
}
