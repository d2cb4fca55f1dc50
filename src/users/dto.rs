use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::users::repo::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Full replacement of username/email; password is the only optional field.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListUserResponse {
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

impl Pagination {
    pub fn validate(&self) -> Result<(), ApiError> {
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
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("user@test.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
    }

    #[test]
    fn email_regex_rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("user @test.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn pagination_defaults_to_skip_0_limit_10() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.skip, 0);
        assert_eq!(p.limit, 10);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn pagination_rejects_out_of_range_values() {
        let p = Pagination { skip: -1, limit: 10 };
        assert!(p.validate().is_err());
        let p = Pagination { skip: 0, limit: 0 };
        assert!(p.validate().is_err());
    }

    #[test]
    fn update_request_password_is_optional() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"username":"u","email":"u@test.com"}"#).unwrap();
        assert!(req.password.is_none());
    }
}
