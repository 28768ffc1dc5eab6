use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::AuthUser,
        repo_types::User,
        services::{hash_password, initial_roles, is_valid_email, verify_password, JwtKeys},
    },
    error::AppError,
    state::AppState,
    validation::conflict_or_internal,
};

pub(crate) const EMAIL_TAKEN: &str = "Email already registered";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(keys: &JwtKeys, user: User) -> Result<AuthResponse, AppError> {
    let roles = user.parsed_roles();
    let access_token = keys.sign_access(user.id, &roles)?;
    let refresh_token = keys.sign_refresh(user.id)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            email: user.email,
            roles,
        },
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::invalid("email", "This value is not a valid email address."));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(AppError::invalid(
            "password",
            "This value is too short. It should have 8 characters or more.",
        ));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict(EMAIL_TAKEN.into()));
    }

    let hash = hash_password(&payload.password)?;
    let roles: Vec<String> = initial_roles(state.config.is_admin_email(&payload.email))
        .iter()
        .map(|r| r.as_str().to_string())
        .collect();
    let user = User::create(&state.db, &payload.email, &hash, &roles)
        .await
        .map_err(|e| conflict_or_internal(e, EMAIL_TAKEN))?;

    info!(user_id = %user.id, email = %user.email, roles = ?user.roles, "user registered");
    let keys = JwtKeys::from_ref(&state);
    Ok((StatusCode::CREATED, Json(issue_tokens(&keys, user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    let keys = JwtKeys::from_ref(&state);
    Ok(Json(issue_tokens(&keys, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    // Roles are reloaded so that grants and revocations apply on refresh.
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    Ok(Json(issue_tokens(&keys, user)?))
}

#[instrument(skip(state, principal))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = User::find_by_id(&state.db, principal.user_id)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %principal.user_id, "user not found");
            AppError::Unauthorized("User not found".into())
        })?;

    let roles = user.parsed_roles();
    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
        roles,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::policy::Role;

    #[test]
    fn public_user_serializes_role_names() {
        let response = PublicUser {
            id: uuid::Uuid::new_v4(),
            email: "test@example.com".to_string(),
            roles: vec![Role::User, Role::Admin],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["email"], "test@example.com");
        assert_eq!(json["roles"], serde_json::json!(["ROLE_USER", "ROLE_ADMIN"]));
    }
}
