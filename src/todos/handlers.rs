use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::CurrentUser,
    error::ApiError,
    state::AppState,
    todos::{
        dto::{CreateTodoRequest, ListTodoResponse, TodoFilter, TodoResponse, UpdateTodoRequest},
        repo::Todo,
    },
    users::repo::User,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/todos", post(create))
        .route("/todos", get(find_all))
        .route("/todos/:todo_id", get(find))
        .route("/todos/:todo_id", put(update))
        .route("/todos/:todo_id", delete(remove))
}

/// Loads the todo and applies the ownership check: a missing record is 404,
/// a record owned by someone else is 403. Existence is revealed here because
/// the caller already holds the id; the action names the attempted verb.
async fn owned_todo(
    state: &AppState,
    todo_id: Uuid,
    caller: &User,
    action: &str,
) -> Result<Todo, ApiError> {
    let todo = Todo::find_by_id(&state.db, todo_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;

    if todo.user_id != caller.id {
        warn!(caller = %caller.id, todo = %todo_id, action, "cross-account todo access");
        return Err(ApiError::Forbidden(format!(
            "Not authorized to {action} this todo"
        )));
    }
    Ok(todo)
}

#[instrument(skip(state, user, payload))]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiError> {
    // Owner is always the caller; no ownership field is accepted from input.
    let todo = Todo::create(
        &state.db,
        user.id,
        &payload.title,
        payload.description.as_deref(),
        payload.state,
    )
    .await?;

    info!(todo_id = %todo.id, user_id = %user.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo.into())))
}

#[instrument(skip(state, user))]
pub async fn find_all(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<TodoFilter>,
) -> Result<Json<ListTodoResponse>, ApiError> {
    filter.validate()?;
    let todos = Todo::list_by_owner(&state.db, user.id, &filter).await?;
    Ok(Json(ListTodoResponse {
        todos: todos.into_iter().map(TodoResponse::from).collect(),
    }))
}

#[instrument(skip(state, user))]
pub async fn find(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(todo_id): Path<Uuid>,
) -> Result<Json<TodoResponse>, ApiError> {
    let todo = owned_todo(&state, todo_id, &user, "access").await?;
    Ok(Json(todo.into()))
}

#[instrument(skip(state, user, payload))]
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(todo_id): Path<Uuid>,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Json<TodoResponse>, ApiError> {
    owned_todo(&state, todo_id, &user, "update").await?;

    let todo = Todo::update(
        &state.db,
        todo_id,
        payload.title.as_deref(),
        payload.description.as_deref(),
        payload.state,
    )
    .await?;

    info!(todo_id = %todo.id, "todo updated");
    Ok(Json(todo.into()))
}

#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(todo_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    owned_todo(&state, todo_id, &user, "delete").await?;
    Todo::delete(&state.db, todo_id).await?;

    info!(todo_id = %todo_id, "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}
