//! Integration tests for tokens checked against changed shop state.

use shopql_auth::{
    AuthConfig, Authentication, InvalidReason, StaticKeyRegistry, ValidationOutcome,
};

use crate::common::{ADMIN, CUSTOMER, TestHarness, fixed_now};

fn rejection(request: &Authentication) -> Option<InvalidReason> {
    request.is_logged().unwrap_err().reason()
}

#[test]
fn test_shop_id_change_invalidates_token() {
    let harness = TestHarness::new();
    let token = harness.login(CUSTOMER);

    harness.legacy.set_shop_id(2);
    let request = harness.bearer(&token);
    assert_eq!(rejection(&request), Some(InvalidReason::ShopIdMismatch));

    // same token is fine again once the shop id is restored
    harness.legacy.set_shop_id(1);
    assert!(request.is_logged().unwrap());
}

#[test]
fn test_shop_url_change_invalidates_token() {
    let harness = TestHarness::new();
    let token = harness.login(CUSTOMER);

    harness.legacy.set_shop_url("http://other.example/");
    let reason = rejection(&harness.bearer(&token));
    assert!(matches!(
        reason,
        Some(InvalidReason::IssuerMismatch | InvalidReason::AudienceMismatch)
    ));
}

#[test]
fn test_blocked_user_is_rejected() {
    let harness = TestHarness::new();
    let token = harness.login(CUSTOMER);
    let request = harness.bearer(&token);
    assert!(request.is_logged().unwrap());

    harness.legacy.set_groups(CUSTOMER.2, ["oxidblocked"]);
    let err = request.is_logged().unwrap_err();
    assert_eq!(err.reason(), Some(InvalidReason::UserBlocked));
    assert_eq!(err.http_status(), 403);
    assert!(request.user_name().is_err());
}

#[test]
fn test_anonymous_user_is_not_logged() {
    let harness = TestHarness::new();
    let token = harness.login(CUSTOMER);
    harness.legacy.set_groups(CUSTOMER.2, ["oxidanonymous"]);
    let request = harness.bearer(&token);

    assert!(!request.is_logged().unwrap());
    assert!(request.is_user_anonymous().unwrap());
    assert_eq!(request.outcome().unwrap(), ValidationOutcome::Anonymous);
    assert_eq!(request.user_id().unwrap(), CUSTOMER.2);
    assert!(
        request
            .validator()
            .validate_token(request.token().unwrap(), fixed_now())
            .is_ok()
    );
}

#[test]
fn test_custom_group_markers() {
    let harness = TestHarness::with_config(AuthConfig {
        blocked_group: "banned".to_string(),
        anonymous_group: "guests".to_string(),
        ..AuthConfig::default()
    });
    let token = harness.login(CUSTOMER);
    let request = harness.bearer(&token);

    harness.legacy.set_groups(CUSTOMER.2, ["oxidblocked"]);
    assert!(request.is_logged().unwrap());

    harness.legacy.set_groups(CUSTOMER.2, ["guests"]);
    assert!(request.is_user_anonymous().unwrap());
    assert!(!request.is_logged().unwrap());

    harness.legacy.set_groups(CUSTOMER.2, ["banned"]);
    assert_eq!(rejection(&request), Some(InvalidReason::UserBlocked));
}

#[test]
fn test_token_expires() {
    let harness = TestHarness::new();
    let token = harness.login(ADMIN);

    let almost = harness
        .auth
        .clone()
        .with_clock(|| fixed_now() + chrono::Duration::hours(8) - chrono::Duration::seconds(1))
        .with_token(Some(token.clone()));
    assert!(almost.is_logged().unwrap());

    let expired = harness
        .auth
        .clone()
        .with_clock(|| fixed_now() + chrono::Duration::hours(8))
        .with_token(Some(token));
    assert_eq!(rejection(&expired), Some(InvalidReason::Expired));
}

#[test]
fn test_key_rotation_invalidates_token() {
    let harness = TestHarness::new();
    let token = harness.login(ADMIN);

    let rotated = StaticKeyRegistry::from_secret(
        "Ul4mQzWz2qPbTq6yR0hJ9cVvN3kXe8sLa1oG7dFtB5nM2wKxYj0pCiHuE4rZgSfD",
    )
    .unwrap();
    let request = Authentication::new(
        harness.legacy.clone(),
        std::sync::Arc::new(rotated),
        AuthConfig::default(),
    )
    .with_clock(fixed_now)
    .with_token(Some(token));

    assert_eq!(rejection(&request), Some(InvalidReason::BadSignature));
}

#[test]
fn test_requests_share_collaborators() {
    let harness = TestHarness::new();
    let customer = harness.bearer(&harness.login(CUSTOMER));
    let admin = harness.bearer(&harness.login(ADMIN));

    harness.legacy.set_groups(ADMIN.2, ["oxidblocked"]);
    assert!(customer.is_logged().unwrap());
    assert!(admin.is_logged().is_err());
}
