pub mod dto;
pub mod handlers;
pub mod repo;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router(upload_max_bytes: usize) -> Router<AppState> {
    handlers::routes(upload_max_bytes)
}
