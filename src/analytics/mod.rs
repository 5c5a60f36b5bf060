pub mod dto;
pub mod handlers;
pub mod repo;
pub mod view;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
