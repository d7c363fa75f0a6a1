//! User account entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::UserId;

/// Minimum username length.
pub const USERNAME_MIN: usize = 3;
/// Maximum username length.
pub const USERNAME_MAX: usize = 80;

/// Validation failures raised by [`User::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    #[error("username must be at least {USERNAME_MIN} characters")]
    UsernameTooShort,
    #[error("username must be at most {USERNAME_MAX} characters")]
    UsernameTooLong,
    #[error("username must not contain surrounding whitespace")]
    UsernamePadded,
    #[error("password hash must not be empty")]
    EmptyPasswordHash,
}

/// A registered account. Usernames are unique; email is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: Option<String>,
    #[serde(skip_serializing)]
    password_hash: String,
    first_name: String,
    last_name: String,
    is_admin: bool,
    active: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Unvalidated user fields.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Validate a draft into a user.
    pub fn new(draft: UserDraft) -> Result<Self, UserValidationError> {
        if draft.username.trim() != draft.username {
            return Err(UserValidationError::UsernamePadded);
        }
        if draft.username.chars().count() < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort);
        }
        if draft.username.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong);
        }
        if draft.password_hash.is_empty() {
            return Err(UserValidationError::EmptyPasswordHash);
        }
        Ok(Self {
            id: draft.id,
            username: draft.username,
            email: draft.email,
            password_hash: draft.password_hash,
            first_name: draft.first_name,
            last_name: draft.last_name,
            is_admin: draft.is_admin,
            active: draft.active,
            last_login: draft.last_login,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    pub fn last_name(&self) -> &str {
        self.last_name.as_str()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Whether the account may sign in.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Snapshot with a recorded login time.
    pub fn with_last_login(mut self, at: DateTime<Utc>) -> Self {
        self.last_login = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn draft() -> UserDraft {
        let now = Utc::now();
        UserDraft {
            id: UserId::random(),
            username: "oyuncu42".to_owned(),
            email: None,
            password_hash: "$argon2id$stub".to_owned(),
            first_name: "Deniz".to_owned(),
            last_name: "Kaya".to_owned(),
            is_admin: false,
            active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn accepts_a_valid_draft(draft: UserDraft) {
        let user = User::new(draft).expect("valid user");
        assert_eq!(user.username(), "oyuncu42");
        assert_eq!(user.full_name(), "Deniz Kaya");
        assert!(user.is_active());
    }

    #[rstest]
    fn rejects_short_usernames(mut draft: UserDraft) {
        draft.username = "ab".to_owned();
        let err = User::new(draft).expect_err("too short");
        assert_eq!(err, UserValidationError::UsernameTooShort);
    }

    #[rstest]
    fn rejects_padded_usernames(mut draft: UserDraft) {
        draft.username = " oyuncu42".to_owned();
        let err = User::new(draft).expect_err("padded");
        assert_eq!(err, UserValidationError::UsernamePadded);
    }

    #[rstest]
    fn rejects_empty_password_hash(mut draft: UserDraft) {
        draft.password_hash = String::new();
        let err = User::new(draft).expect_err("empty hash");
        assert_eq!(err, UserValidationError::EmptyPasswordHash);
    }
}
