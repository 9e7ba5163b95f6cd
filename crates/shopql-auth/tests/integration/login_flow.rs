//! Integration tests for login and request-scoped queries.

use shopql_auth::{
    AuthConfig, AuthError, InvalidReason, TokenBuilder, TokenCodec, TokenHooks, UserIdentity,
    ValidationOutcome,
};

use crate::common::{ADMIN, CUSTOMER, SHOP_URL, TestHarness, fixed_now};

#[test]
fn test_login_then_request_is_logged() {
    let harness = TestHarness::new();
    let token = harness.login(CUSTOMER);
    let request = harness.bearer(&token);

    assert!(request.is_logged().unwrap());
    assert_eq!(request.user_id().unwrap(), CUSTOMER.2);
    assert_eq!(request.user_name().unwrap(), CUSTOMER.0);
    assert!(!request.is_user_anonymous().unwrap());
}

#[test]
fn test_issued_claims() {
    let harness = TestHarness::new();
    let token = harness.login(ADMIN);

    assert_eq!(token.claims().iss, SHOP_URL);
    assert!(token.claims().aud.contains(SHOP_URL));
    assert_eq!(token.shop_id(), Some(1));
    assert_eq!(token.issued_at(), Some(fixed_now()));
    assert_eq!(token.not_before(), Some(fixed_now()));
    assert_eq!(
        token.expires_at(),
        Some(fixed_now() + chrono::Duration::hours(8))
    );
}

#[test]
fn test_login_with_wrong_credentials() {
    let harness = TestHarness::new();

    let err = harness.auth.login(CUSTOMER.0, "wrong").unwrap_err();
    assert!(matches!(err, AuthError::InvalidLogin));
    assert_eq!(err.http_status(), 401);

    assert!(harness.auth.login("nobody@example.com", "x").is_err());
}

#[test]
fn test_request_without_token() {
    let harness = TestHarness::new();
    let request = harness.request(None);

    assert!(request.token().is_none());
    assert!(!request.is_logged().unwrap());
    assert_eq!(request.outcome().unwrap(), ValidationOutcome::NoToken);

    let err = request.user_id().unwrap_err();
    assert_eq!(err.reason(), Some(InvalidReason::MissingToken));
    assert!(err.is_client_error());

    let err = request.user_name().unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(_)));
}

#[test]
fn test_non_bearer_header_means_no_token() {
    let harness = TestHarness::new();
    let request = harness.request(Some("Basic dXNlcjpwYXNz"));
    assert!(!request.is_logged().unwrap());
}

#[test]
fn test_malformed_bearer_is_rejected_at_decode() {
    let err = TokenCodec::decode_bearer(Some("Bearer not.a.jwt")).unwrap_err();
    assert!(matches!(err, AuthError::MalformedToken(_)));
    assert_eq!(err.http_status(), 400);
}

#[test]
fn test_hooks_amend_login_tokens() {
    let harness = TestHarness::new();
    let auth = harness.auth.clone().with_hooks(
        TokenHooks::new()
            .with(|b: &mut TokenBuilder, id: &UserIdentity| -> shopql_auth::Result<()> {
                b.with_claim("groups", id.groups.iter().cloned().collect::<Vec<_>>())?;
                Ok(())
            })
            .with(|b: &mut TokenBuilder, _: &UserIdentity| -> shopql_auth::Result<()> {
                b.permitted_for("http://storefront.example/");
                Ok(())
            }),
    );

    let token = auth.login(ADMIN.0, ADMIN.1).unwrap();
    assert_eq!(
        token.claims().get("groups"),
        Some(&serde_json::json!(["oxidadmin"]))
    );
    assert!(token.claims().aud.contains("http://storefront.example/"));

    // an extra audience still contains the shop url
    assert!(harness.bearer(&token).is_logged().unwrap());
}

#[test]
fn test_hook_cannot_override_shop_claims() {
    let harness = TestHarness::new();
    let auth = harness.auth.clone().with_hooks(TokenHooks::new().with(
        |b: &mut TokenBuilder, _: &UserIdentity| -> shopql_auth::Result<()> {
            b.with_claim("shopid", 99)?;
            Ok(())
        },
    ));

    let err = auth.login(ADMIN.0, ADMIN.1).unwrap_err();
    assert!(matches!(err, AuthError::ReservedClaim(ref name) if name == "shopid"));
    assert!(!err.is_client_error());
}

#[test]
fn test_configured_lifetime() {
    let harness = TestHarness::with_config(AuthConfig {
        token_lifetime_secs: 60,
        ..AuthConfig::default()
    });
    let token = harness.login(CUSTOMER);
    assert_eq!(
        token.expires_at(),
        Some(fixed_now() + chrono::Duration::seconds(60))
    );
}
