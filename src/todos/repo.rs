use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::todos::dto::{TodoFilter, TodoState};

/// Todo record in the database; `user_id` is immutable after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub state: TodoState,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Todo {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        title: &str,
        description: Option<&str>,
        state: TodoState,
    ) -> Result<Todo, ApiError> {
        let todo = sqlx::query_as::<_, Todo>(
            "INSERT INTO todos (title, description, state, user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, title, description, state, user_id, created_at, updated_at",
        )
        .bind(title)
        .bind(description)
        .bind(state)
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(todo)
    }

    /// Owner-scoped listing. Filters are conjunctive: title/description are
    /// case-sensitive substring matches, state is an exact match.
    pub async fn list_by_owner(
        db: &PgPool,
        user_id: Uuid,
        filter: &TodoFilter,
    ) -> Result<Vec<Todo>, ApiError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, title, description, state, user_id, created_at, updated_at
             FROM todos WHERE user_id = ",
        );
        qb.push_bind(user_id);

        if let Some(title) = &filter.title {
            qb.push(" AND title LIKE ");
            qb.push_bind(format!("%{title}%"));
        }
        if let Some(description) = &filter.description {
            qb.push(" AND description LIKE ");
            qb.push_bind(format!("%{description}%"));
        }
        if let Some(state) = filter.state {
            qb.push(" AND state = ");
            qb.push_bind(state);
        }

        qb.push(" ORDER BY created_at, id LIMIT ");
        qb.push_bind(filter.limit);
        qb.push(" OFFSET ");
        qb.push_bind(filter.skip);

        let todos = qb.build_query_as::<Todo>().fetch_all(db).await?;
        Ok(todos)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Todo>, ApiError> {
        let todo = sqlx::query_as::<_, Todo>(
            "SELECT id, title, description, state, user_id, created_at, updated_at
             FROM todos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(todo)
    }

    /// Sparse patch: absent fields keep their stored value. The row may have
    /// been deleted since the ownership check; that is still a missing todo,
    /// not a server fault.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        state: Option<TodoState>,
    ) -> Result<Todo, ApiError> {
        let todo = sqlx::query_as::<_, Todo>(
            "UPDATE todos
             SET title = COALESCE($1, title),
                 description = COALESCE($2, description),
                 state = COALESCE($3, state),
                 updated_at = now()
             WHERE id = $4
             RETURNING id, title, description, state, user_id, created_at, updated_at",
        )
        .bind(title)
        .bind(description)
        .bind(state)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;
        Ok(todo)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
