use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::{ProductInput, ProductRead};
use super::services;
use crate::{
    auth::extractors::{AuthUser, MaybeAuthUser},
    error::AppError,
    iri::product_iri,
    pagination::Pagination,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product)
                .put(replace_product)
                .patch(patch_product)
                .delete(delete_product),
        )
}

#[instrument(skip(state, principal))]
pub async fn list_products(
    State(state): State<AppState>,
    MaybeAuthUser(principal): MaybeAuthUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ProductRead>>, AppError> {
    let items = services::list(&state.db, principal.as_ref(), &page).await?;
    Ok(Json(items))
}

#[instrument(skip(state, principal))]
pub async fn get_product(
    State(state): State<AppState>,
    MaybeAuthUser(principal): MaybeAuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ProductRead>, AppError> {
    Ok(Json(services::get(&state.db, principal.as_ref(), id).await?))
}

#[instrument(skip(state, principal, body))]
pub async fn create_product(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(body): Json<ProductInput>,
) -> Result<(StatusCode, HeaderMap, Json<ProductRead>), AppError> {
    let created = services::create(&state.db, &principal, body).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&product_iri(created.id)) {
        headers.insert(LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(created)))
}

#[instrument(skip(state, principal, body))]
pub async fn replace_product(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<ProductInput>,
) -> Result<Json<ProductRead>, AppError> {
    Ok(Json(services::update(&state.db, &principal, id, body, true).await?))
}

#[instrument(skip(state, principal, body))]
pub async fn patch_product(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<ProductInput>,
) -> Result<Json<ProductRead>, AppError> {
    Ok(Json(services::update(&state.db, &principal, id, body, false).await?))
}

#[instrument(skip(state, principal))]
pub async fn delete_product(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::delete(&state.db, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
