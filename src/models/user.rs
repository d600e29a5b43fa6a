use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::auth::USERNAME_REGEX;

/// A registered identity as returned by the API. The password hash is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Full replacement payload for `PUT /users/{id}` and `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct UserInput {
    #[validate(
        length(min = 1, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Name must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub name: String,
    #[validate(email)]
    pub email: String,
    // Input only; it is hashed before it reaches the users table.
    #[validate(length(min = 1))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_user_input_validation() {
        let input = UserInput {
            name: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(input.validate().is_ok());

        let input = UserInput {
            name: "testuser".to_string(),
            email: "invalid-email".to_string(),
            password: "pw".to_string(),
        };
        assert!(input.validate().is_err());

        let input = UserInput {
            name: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password: "".to_string(),
        };
        assert!(input.validate().is_err());
    }
}
