//! Fuzz target for token extraction from arbitrary requests.
//!
//! Builds requests with arbitrary bodies and content types around a valid
//! cookie; extraction must never panic and only the real token may pass.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use palisade_core::HttpRequest;
use palisade_csrf::{CsrfConfig, CsrfMiddleware, VerificationResult};

const SECRET: &[u8] = b"fuzzing_secret_key_is_32_bytes!!";

#[derive(Debug, Arbitrary)]
struct FuzzRequest {
    content_type: String,
    body: Vec<u8>,
    headers: Vec<(String, String)>,
}

fuzz_target!(|data: FuzzRequest| {
    let Ok(config) = CsrfConfig::new(SECRET.to_vec()) else {
        return;
    };
    let Ok(csrf) = CsrfMiddleware::new(config) else {
        return;
    };

    let token = csrf.generate_token();
    let signed = csrf.codec().sign(&token);

    let mut req = HttpRequest::new("POST", "/fuzz")
        .with_header("Content-Type", data.content_type)
        .with_body(data.body);
    for (name, value) in data.headers {
        req.headers.insert(name, value);
    }
    req.headers
        .insert("Cookie".to_string(), format!("csrftoken={}", signed));

    // A fresh random token cannot appear in fuzzer input
    assert_ne!(csrf.verify_request(&req), VerificationResult::Accepted);
});
