//! Authentication use-case service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::password::{hash_password, verify_password, PasswordError};
use crate::domain::ports::{AuthOps, LoginRequest, RegisterRequest, StoreError, UserRepository};
use crate::domain::user::{User, UserDraft};
use crate::domain::{Error, Identity, UserId};
use pagination::{Page, PageRequest};

/// Authentication operations over the user repository.
#[derive(Clone)]
pub struct AuthService<U> {
    users: Arc<U>,
}

impl<U> AuthService<U> {
    /// Create a new service with the user repository.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

fn map_password_error(error: PasswordError) -> Error {
    match error {
        PasswordError::TooShort => Error::invalid_request(error.to_string()),
        PasswordError::Hashing { .. } | PasswordError::MalformedHash => {
            Error::internal(error.to_string())
        }
    }
}

/// One message for both unknown usernames and wrong passwords, so the
/// response does not reveal which usernames exist.
fn bad_credentials() -> Error {
    Error::unauthorized("invalid username or password")
}

#[async_trait]
impl<U> AuthOps for AuthService<U>
where
    U: UserRepository,
{
    async fn register(&self, request: RegisterRequest) -> Result<User, Error> {
        if self
            .users
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(Error::conflict("username is already taken"));
        }

        let password_hash = hash_password(&request.password).map_err(map_password_error)?;
        let now = Utc::now();
        let user = User::new(UserDraft {
            id: UserId::random(),
            username: request.username,
            email: request.email.filter(|e| !e.trim().is_empty()),
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            is_admin: false,
            active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.users.insert(&user).await.map_err(|err| match err {
            StoreError::Conflict { .. } => Error::conflict("username is already taken"),
            other => other.into(),
        })?;

        tracing::info!(user = %user.id(), username = user.username(), "account registered");
        Ok(user)
    }

    async fn login(&self, request: LoginRequest) -> Result<User, Error> {
        let user = self
            .users
            .find_by_username(&request.username)
            .await?
            .ok_or_else(bad_credentials)?;

        let verified = verify_password(&request.password, user.password_hash())
            .map_err(map_password_error)?;
        if !verified {
            return Err(bad_credentials());
        }
        if !user.is_active() {
            return Err(Error::unauthorized("account is disabled"));
        }

        self.users.record_login(&user.id(), Utc::now()).await?;
        tracing::info!(user = %user.id(), "login succeeded");
        Ok(user)
    }

    async fn identity_for(&self, user_id: UserId) -> Result<Identity, Error> {
        let user = self.current_user(user_id).await?;
        Ok(if user.is_admin() {
            Identity::admin(user.id())
        } else {
            Identity::user(user.id())
        })
    }

    async fn current_user(&self, user_id: UserId) -> Result<User, Error> {
        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("session user no longer exists"))?;

        if !user.is_active() {
            return Err(Error::unauthorized("account is disabled"));
        }
        Ok(user)
    }

    async fn list_users(
        &self,
        identity: Identity,
        page: PageRequest,
    ) -> Result<Page<User>, Error> {
        identity.require_admin()?;
        Ok(self.users.list(page).await?)
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
