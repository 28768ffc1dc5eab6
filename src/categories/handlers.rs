use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::{CategoryInput, CategoryRead};
use super::services;
use crate::{
    auth::extractors::{AuthUser, MaybeAuthUser},
    error::AppError,
    iri::category_iri,
    pagination::Pagination,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category)
                .put(replace_category)
                .patch(patch_category)
                .delete(delete_category),
        )
}

#[instrument(skip(state, principal))]
pub async fn list_categories(
    State(state): State<AppState>,
    MaybeAuthUser(principal): MaybeAuthUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<CategoryRead>>, AppError> {
    let items = services::list(&state.db, principal.as_ref(), &page).await?;
    Ok(Json(items))
}

#[instrument(skip(state, principal))]
pub async fn get_category(
    State(state): State<AppState>,
    MaybeAuthUser(principal): MaybeAuthUser,
    Path(id): Path<i64>,
) -> Result<Json<CategoryRead>, AppError> {
    Ok(Json(services::get(&state.db, principal.as_ref(), id).await?))
}

#[instrument(skip(state, principal, body))]
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(body): Json<CategoryInput>,
) -> Result<(StatusCode, HeaderMap, Json<CategoryRead>), AppError> {
    let created = services::create(&state.db, &principal, body).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&category_iri(created.id)) {
        headers.insert(LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(created)))
}

#[instrument(skip(state, principal, body))]
pub async fn replace_category(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<CategoryInput>,
) -> Result<Json<CategoryRead>, AppError> {
    Ok(Json(services::update(&state.db, &principal, id, body, true).await?))
}

#[instrument(skip(state, principal, body))]
pub async fn patch_category(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<CategoryInput>,
) -> Result<Json<CategoryRead>, AppError> {
    Ok(Json(services::update(&state.db, &principal, id, body, false).await?))
}

#[instrument(skip(state, principal))]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::delete(&state.db, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
