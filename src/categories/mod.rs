pub mod dto;
pub mod entity;
pub mod handlers;
pub(crate) mod repo;
mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
