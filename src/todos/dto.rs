use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::todos::repo::Todo;

/// Label for a todo, not a workflow: any state may move to any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "todo_state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoState {
    #[default]
    New,
    Pending,
    InProgress,
    Done,
    Archived,
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub state: TodoState,
}

/// Sparse patch: only supplied fields are applied.
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub state: Option<TodoState>,
}

#[derive(Debug, Serialize)]
pub struct TodoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub state: TodoState,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            state: todo.state,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListTodoResponse {
    pub todos: Vec<TodoResponse>,
}

/// Listing filters, always combined with the caller's ownership scope.
/// All present filters apply conjunctively.
#[derive(Debug, Deserialize)]
pub struct TodoFilter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub state: Option<TodoState>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

impl Default for TodoFilter {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            state: None,
            skip: 0,
            limit: default_limit(),
        }
    }
}

impl TodoFilter {
    pub fn validate(&self) -> Result<(), ApiError> {
        for (name, value) in [("title", &self.title), ("description", &self.description)] {
            if let Some(value) = value {
                let len = value.chars().count();
                if !(3..=20).contains(&len) {
                    return Err(ApiError::Validation(format!(
                        "{name} filter must be between 3 and 20 characters"
                    )));
                }
            }
        }
        if self.skip < 0 {
            return Err(ApiError::Validation("skip must be non-negative".to_string()));
        }
        if self.limit <= 0 {
            return Err(ApiError::Validation("limit must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_serializes_as_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&TodoState::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(serde_json::to_string(&TodoState::New).unwrap(), "\"NEW\"");
    }

    #[test]
    fn state_rejects_unknown_values() {
        assert!(serde_json::from_str::<TodoState>("\"INVALID_STATE\"").is_err());
    }

    #[test]
    fn create_request_defaults_state_to_new() {
        let req: CreateTodoRequest = serde_json::from_str(r#"{"title":"buy milk"}"#).unwrap();
        assert_eq!(req.state, TodoState::New);
        assert!(req.description.is_none());
    }

    #[test]
    fn filter_defaults_to_skip_0_limit_10() {
        let f: TodoFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(f.skip, 0);
        assert_eq!(f.limit, 10);
        assert!(f.validate().is_ok());
    }

    #[test]
    fn filter_enforces_3_to_20_char_bounds() {
        let ok = TodoFilter {
            title: Some("abc".into()),
            description: Some("a".repeat(20)),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let short = TodoFilter {
            title: Some("ab".into()),
            ..Default::default()
        };
        assert!(short.validate().is_err());

        let long = TodoFilter {
            description: Some("a".repeat(21)),
            ..Default::default()
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn filter_rejects_bad_pagination() {
        let f = TodoFilter {
            limit: 0,
            ..Default::default()
        };
        assert!(f.validate().is_err());
        let f = TodoFilter {
            skip: -5,
            ..Default::default()
        };
        assert!(f.validate().is_err());
    }
}
