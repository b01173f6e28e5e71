// Test assertions for HTTP responses

use crate::TestResponse;
use palisade_core::HttpStatus;

/// Assert that a response has a specific status code
pub fn assert_status(response: &TestResponse, expected: u16) {
    let actual = response.status();
    assert_eq!(
        actual,
        expected,
        "Expected status {}, got {} (body: {:?})",
        expected,
        actual,
        response.body_string()
    );
}

/// Assert that a response has a specific HTTP status
pub fn assert_http_status(response: &TestResponse, expected: HttpStatus) {
    assert_status(response, expected.code());
}

/// Assert that a response has a specific header
pub fn assert_header(response: &TestResponse, key: &str, expected: &str) {
    let actual = response.header(key).map(|s| s.as_str());
    assert_eq!(
        actual,
        Some(expected),
        "Expected header '{}' to be '{}', got {:?}",
        key,
        expected,
        actual
    );
}

/// Assert that a response does not carry a header
pub fn assert_no_header(response: &TestResponse, key: &str) {
    let actual = response.header(key);
    assert!(
        actual.is_none(),
        "Expected no '{}' header, got {:?}",
        key,
        actual
    );
}

/// Assert that a response body contains a string
pub fn assert_body_contains(response: &TestResponse, expected: &str) {
    let body = response.body_string().unwrap_or_default();
    assert!(
        body.contains(expected),
        "Expected body to contain '{}', but it didn't. Body: {}",
        expected,
        body
    );
}

/// Assert that a response is successful (2xx status)
pub fn assert_success(response: &TestResponse) {
    let status = response.status();
    assert!(
        (200..300).contains(&status),
        "Expected successful status (2xx), got {}",
        status
    );
}

/// Assert that a response is a client error (4xx status)
pub fn assert_client_error(response: &TestResponse) {
    let status = response.status();
    assert!(
        (400..500).contains(&status),
        "Expected client error status (4xx), got {}",
        status
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use palisade_core::{Error, HttpResponse};

    #[test]
    fn test_assertions_on_success() {
        let response = TestResponse::Success(
            HttpResponse::text("hello world").with_header("X-Frame-Options", "DENY"),
        );
        assert_status(&response, 200);
        assert_http_status(&response, HttpStatus::Ok);
        assert_success(&response);
        assert_header(&response, "x-frame-options", "DENY");
        assert_no_header(&response, "Set-Cookie");
        assert_body_contains(&response, "world");
    }

    #[test]
    fn test_assertions_on_error() {
        let response = TestResponse::Error(Error::BadRequest("nope".into()));
        assert_status(&response, 400);
        assert_client_error(&response);
        assert_body_contains(&response, "nope");
    }

    #[test]
    #[should_panic(expected = "Expected status 201")]
    fn test_assert_status_panics() {
        assert_status(&TestResponse::Success(HttpResponse::ok()), 201);
    }
}
