use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{extractors::CurrentUser, password::hash_password},
    error::ApiError,
    state::AppState,
    users::{
        dto::{
            is_valid_email, CreateUserRequest, ListUserResponse, Pagination, UpdateUserRequest,
            UserResponse,
        },
        repo::User,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create))
        .route("/users", get(find_all))
        .route("/users/:user_id", get(find))
        .route("/users/:user_id", put(update))
        .route("/users/:user_id", delete(remove))
}

fn validate_credentials(email: &str, password: Option<&str>) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::Validation("Invalid email".to_string()));
    }
    if let Some(password) = password {
        if password.len() < 8 {
            return Err(ApiError::Validation("Password too short".to_string()));
        }
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_credentials(&payload.email, Some(payload.password.as_str()))?;

    // One probe for either collision; username takes priority when both hit.
    if let Some(existing) =
        User::find_by_username_or_email(&state.db, &payload.username, &payload.email).await?
    {
        if existing.username == payload.username {
            warn!(username = %payload.username, "username already registered");
            return Err(ApiError::Conflict("Username already registered".to_string()));
        }
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let hash = hash_password(&payload.password).map_err(|e| ApiError::Internal(e.to_string()))?;
    let user = User::create(&state.db, &payload.username, &payload.email, &hash).await?;

    info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state))]
pub async fn find_all(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ListUserResponse>, ApiError> {
    pagination.validate()?;
    let users = User::list(&state.db, pagination.skip, pagination.limit).await?;
    Ok(Json(ListUserResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn find(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, current, payload))]
pub async fn update(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    CurrentUser(current): CurrentUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    // Ownership first, field validation second.
    if current.id != user_id {
        warn!(caller = %current.id, target = %user_id, "cross-account user update");
        return Err(ApiError::Forbidden(
            "Not authorized to update this user".to_string(),
        ));
    }
    validate_credentials(&payload.email, payload.password.as_deref())?;

    let hash = match &payload.password {
        Some(password) => {
            Some(hash_password(password).map_err(|e| ApiError::Internal(e.to_string()))?)
        }
        None => None,
    };

    let user = User::update(
        &state.db,
        user_id,
        &payload.username,
        &payload.email,
        hash.as_deref(),
    )
    .await?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state, current))]
pub async fn remove(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    CurrentUser(current): CurrentUser,
) -> Result<StatusCode, ApiError> {
    if current.id != user_id {
        warn!(caller = %current.id, target = %user_id, "cross-account user delete");
        return Err(ApiError::Forbidden(
            "Not authorized to delete this user".to_string(),
        ));
    }

    User::delete_cascading(&state.db, user_id).await?;

    info!(user_id = %user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
