//! Integration tests for palisade-csrf

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use palisade_core::HttpRequest;
use palisade_csrf::*;
use proptest::prelude::*;

const SECRET: &[u8] = b"integration_secret_key_32_bytes!";

fn codec() -> TokenCodec {
    TokenCodec::new(&CsrfConfig::new(SECRET.to_vec()).unwrap()).unwrap()
}

#[test]
fn test_csrf_config_creation() {
    let secret = CsrfConfig::generate_secret();
    assert_eq!(secret.len(), 32);

    let config = CsrfConfig::new(secret).unwrap();
    assert_eq!(config.cookie_name, "csrftoken");
    assert_eq!(config.cookie_same_site, SameSite::Strict);
}

#[test]
fn test_csrf_config_builder() {
    let config = CsrfConfig::default()
        .with_cookie_name("_csrf")
        .with_header_name("X-XSRF-TOKEN")
        .with_cookie_secure(true)
        .with_cookie_max_age(600);

    assert_eq!(config.cookie_name, "_csrf");
    assert_eq!(config.header_name, "X-XSRF-TOKEN");
    assert!(config.cookie_secure);
    assert_eq!(config.cookie_max_age, 600);
}

#[test]
fn test_csrf_middleware_creation() {
    let middleware = CsrfMiddleware::new(CsrfConfig::default()).unwrap();

    assert!(!middleware.needs_protection(&HttpRequest::new("GET", "/test")));
    assert!(middleware.needs_protection(&HttpRequest::new("POST", "/test")));
}

#[test]
fn test_csrf_middleware_excluded_paths() {
    let config = CsrfConfig::default().with_exclude_paths(vec!["/api/webhook".to_string()]);
    let middleware = CsrfMiddleware::new(config).unwrap();

    assert!(!middleware.needs_protection(&HttpRequest::new("POST", "/api/webhook/github")));
    assert!(middleware.needs_protection(&HttpRequest::new("POST", "/api/users")));
}

#[test]
fn test_custom_names_flow_through() {
    let config = CsrfConfig::new(SECRET.to_vec())
        .unwrap()
        .with_cookie_name("xsrf")
        .with_field_name("_token");
    let middleware = CsrfMiddleware::new(config).unwrap();

    let raw = middleware.generate_token();
    let signed = middleware.codec().sign(&raw);
    let req = HttpRequest::new("POST", "/submit")
        .with_header("Cookie", format!("xsrf={}", signed))
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_body(format!("_token={}", raw.encode()).into_bytes());

    assert_eq!(middleware.verify_request(&req), VerificationResult::Accepted);
}

#[test]
fn test_secret_rotation_invalidates_cookies() {
    let signed = codec().issue();
    let rotated = TokenCodec::new(&CsrfConfig::default()).unwrap();
    assert_eq!(rotated.verify(signed.as_str()), Err(CsrfError::SignatureInvalid));
}

proptest! {
    #[test]
    fn prop_verify_recovers_issued_token(_seed in 0u8..32) {
        let codec = codec();
        let raw = codec.generate_raw();
        let signed = codec.sign(&raw);
        prop_assert_eq!(codec.verify(signed.as_str()), Ok(raw));
    }

    #[test]
    fn prop_any_flipped_byte_is_detected(index in 0usize..64, mask in 1u8..=255) {
        let codec = codec();
        let signed = codec.issue();

        let mut bytes = URL_SAFE_NO_PAD.decode(signed.as_str()).unwrap();
        bytes[index] ^= mask;
        let tampered = URL_SAFE_NO_PAD.encode(&bytes);

        prop_assert_eq!(codec.verify(&tampered), Err(CsrfError::SignatureInvalid));
    }

    #[test]
    fn prop_only_the_raw_token_is_accepted(submission in "[A-Za-z0-9_-]{0,64}") {
        let engine = VerificationEngine::new(codec());
        let raw = engine.codec().generate_raw();
        let signed = engine.codec().sign(&raw);

        let result = engine.verify(Some(signed.as_str()), Some(&submission));
        if submission == raw.encode() {
            prop_assert_eq!(result, VerificationResult::Accepted);
        } else {
            prop_assert!(!result.is_accepted());
        }

        prop_assert_eq!(
            engine.verify(Some(signed.as_str()), Some(&raw.encode())),
            VerificationResult::Accepted
        );
    }

    #[test]
    fn prop_arbitrary_cookies_never_verify(cookie in "\\PC{0,100}") {
        prop_assert!(codec().verify(&cookie).is_err());
    }
}
