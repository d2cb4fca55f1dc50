use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{error::ApiError, state::AppState, users::repo::User};

use super::jwt::JwtKeys;

const CREDENTIALS_ERROR: &str = "Could not validate credentials";

/// Resolves the bearer token to the caller's user record.
///
/// Every failure mode (missing header, bad signature, expired token, subject
/// no longer in the store) collapses to the same 401 so account existence is
/// never leaked through the auth path. Performs exactly one store lookup.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = || ApiError::Unauthorized(CREDENTIALS_ERROR.to_string());

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(unauthorized)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            unauthorized()
        })?;

        let user = User::find_by_email(&state.db, &claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(subject = %claims.sub, "token subject not found");
                unauthorized()
            })?;

        Ok(CurrentUser(user))
    }
}
