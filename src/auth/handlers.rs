use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, TokenResponse},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::verify_password,
    },
    error::ApiError,
    state::AppState,
    users::repo::User,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh_token", post(refresh_token))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = User::find_by_login(&state.db, &payload.username).await?;

    let user = match user {
        Some(u) if verify_password(&payload.password, &u.password_hash) => u,
        _ => {
            warn!(login = %payload.username, "login rejected");
            return Err(ApiError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }
    };

    let token = JwtKeys::from_ref(&state)
        .sign(&user.email)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(token)))
}

/// Mints a fresh token for a caller whose current token is still valid.
/// An expired token fails here exactly like on any other protected call.
#[instrument(skip(state, user))]
pub async fn refresh_token(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = JwtKeys::from_ref(&state)
        .sign(&user.email)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(user_id = %user.id, "token refreshed");
    Ok(Json(TokenResponse::bearer(token)))
}
