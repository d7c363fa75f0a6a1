//! Acting identity passed explicitly into domain services.
//!
//! The HTTP adapter resolves the session into an [`Identity`] once per
//! request; services never consult ambient session state themselves.

use crate::domain::{Error, UserId};

/// Who is performing the current operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    id: Option<UserId>,
    is_admin: bool,
}

impl Identity {
    /// An unauthenticated caller.
    pub fn guest() -> Self {
        Self {
            id: None,
            is_admin: false,
        }
    }

    /// A signed-in customer.
    pub fn user(id: UserId) -> Self {
        Self {
            id: Some(id),
            is_admin: false,
        }
    }

    /// A signed-in administrator.
    pub fn admin(id: UserId) -> Self {
        Self {
            id: Some(id),
            is_admin: true,
        }
    }

    /// Whether the caller is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }

    /// Whether the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// The caller's user id, if authenticated.
    pub fn user_id(&self) -> Option<UserId> {
        self.id
    }

    /// Require a signed-in caller.
    pub fn require_user(&self) -> Result<UserId, Error> {
        self.id.ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require a signed-in administrator.
    pub fn require_admin(&self) -> Result<UserId, Error> {
        let id = self.require_user()?;
        if !self.is_admin {
            return Err(Error::forbidden("admin role required"));
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    fn guest_has_no_rights() {
        let guest = Identity::guest();
        assert!(!guest.is_authenticated());
        assert_eq!(
            guest.require_user().expect_err("guest").code(),
            ErrorCode::Unauthorized
        );
    }

    #[rstest]
    fn user_is_not_admin() {
        let identity = Identity::user(UserId::random());
        assert!(identity.is_authenticated());
        assert_eq!(
            identity.require_admin().expect_err("not admin").code(),
            ErrorCode::Forbidden
        );
    }

    #[rstest]
    fn admin_passes_both_guards() {
        let id = UserId::random();
        let identity = Identity::admin(id);
        assert_eq!(identity.require_user().expect("user"), id);
        assert_eq!(identity.require_admin().expect("admin"), id);
    }
}
