use std::sync::Arc;

use rstest::{fixture, rstest};

use super::AuthService;
use crate::domain::ports::{AuthOps, LoginRequest, RegisterRequest};
use crate::domain::{ErrorCode, Identity, UserId};
use crate::test_support::{user_fixture, MemoryStore};
use pagination::PageRequest;

struct Harness {
    store: Arc<MemoryStore>,
    service: AuthService<MemoryStore>,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let service = AuthService::new(Arc::clone(&store));
    Harness { store, service }
}

fn register_request(username: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_owned(),
        password: "sifre123".to_owned(),
        email: Some("ayse@example.com".to_owned()),
        first_name: "Ayse".to_owned(),
        last_name: "Yilmaz".to_owned(),
    }
}

#[rstest]
#[actix_rt::test]
async fn registration_stores_a_hashed_password(harness: Harness) {
    let user = harness
        .service
        .register(register_request("ayse"))
        .await
        .expect("registration succeeds");

    assert_eq!(user.username(), "ayse");
    assert!(!user.is_admin());
    assert_ne!(user.password_hash(), "sifre123");
    assert!(user.password_hash().starts_with("$argon2"));
}

#[rstest]
#[actix_rt::test]
async fn duplicate_usernames_are_rejected(harness: Harness) {
    harness
        .service
        .register(register_request("ayse"))
        .await
        .expect("first registration succeeds");

    let err = harness
        .service
        .register(register_request("ayse"))
        .await
        .expect_err("duplicate rejected");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[actix_rt::test]
async fn short_passwords_are_rejected(harness: Harness) {
    let err = harness
        .service
        .register(RegisterRequest {
            password: "kisa".to_owned(),
            ..register_request("ayse")
        })
        .await
        .expect_err("short password rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[actix_rt::test]
async fn login_verifies_credentials_and_stamps_the_time(harness: Harness) {
    let registered = harness
        .service
        .register(register_request("ayse"))
        .await
        .expect("registration succeeds");
    assert!(registered.last_login().is_none());

    let user = harness
        .service
        .login(LoginRequest {
            username: "ayse".to_owned(),
            password: "sifre123".to_owned(),
        })
        .await
        .expect("login succeeds");
    assert_eq!(user.id(), registered.id());

    let identity = harness
        .service
        .identity_for(user.id())
        .await
        .expect("identity resolves");
    assert!(identity.is_authenticated());
    assert!(!identity.is_admin());
}

#[rstest]
#[case::wrong_password("ayse", "yanlis1")]
#[case::unknown_user("bilinmeyen", "sifre123")]
#[actix_rt::test]
async fn bad_credentials_share_one_error_message(
    harness: Harness,
    #[case] username: &str,
    #[case] password: &str,
) {
    harness
        .service
        .register(register_request("ayse"))
        .await
        .expect("registration succeeds");

    let err = harness
        .service
        .login(LoginRequest {
            username: username.to_owned(),
            password: password.to_owned(),
        })
        .await
        .expect_err("login rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "invalid username or password");
}

#[rstest]
#[actix_rt::test]
async fn admins_resolve_to_an_admin_identity(harness: Harness) {
    let admin = user_fixture("yonetici", "gizli12", true);
    harness.store.seed_user(admin.clone());

    let identity = harness
        .service
        .identity_for(admin.id())
        .await
        .expect("identity resolves");
    assert!(identity.is_admin());
}

#[rstest]
#[actix_rt::test]
async fn a_vanished_session_user_is_unauthorized(harness: Harness) {
    let err = harness
        .service
        .identity_for(UserId::random())
        .await
        .expect_err("missing user rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[actix_rt::test]
async fn the_current_account_resolves_from_its_id(harness: Harness) {
    let user = harness
        .service
        .register(register_request("ayse"))
        .await
        .expect("registration succeeds");

    let fetched = harness
        .service
        .current_user(user.id())
        .await
        .expect("account resolves");
    assert_eq!(fetched.username(), "ayse");
}

#[rstest]
#[actix_rt::test]
async fn the_user_listing_is_admin_only(harness: Harness) {
    let admin = user_fixture("yonetici", "gizli12", true);
    harness.store.seed_user(admin.clone());
    harness
        .service
        .register(register_request("ayse"))
        .await
        .expect("registration succeeds");

    let err = harness
        .service
        .list_users(Identity::guest(), PageRequest::default())
        .await
        .expect_err("guest rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);

    let page = harness
        .service
        .list_users(Identity::admin(admin.id()), PageRequest::default())
        .await
        .expect("admin listing succeeds");
    assert_eq!(page.items.len(), 2);
}
