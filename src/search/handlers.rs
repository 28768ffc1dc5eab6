use axum::{routing::post, Json, Router};
use tracing::instrument;

use super::dto::{SearchRequest, SearchResult};
use super::services;
use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/test_searches", post(search))
}

#[instrument]
pub async fn search(Json(body): Json<SearchRequest>) -> Result<Json<SearchResult>, AppError> {
    Ok(Json(services::process(&body)?))
}
