//! Fuzz target for cookie parsing and signed token verification.
//!
//! No input that was not produced by the codec may verify.

#![no_main]

use libfuzzer_sys::fuzz_target;
use palisade_core::{SetCookie, parse_cookie_header};
use palisade_csrf::{CsrfConfig, TokenCodec};

const SECRET: &[u8] = b"fuzzing_secret_key_is_32_bytes!!";

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(config) = CsrfConfig::new(SECRET.to_vec()) else {
        return;
    };
    let Ok(codec) = TokenCodec::new(&config) else {
        return;
    };

    assert!(codec.verify(input).is_err());

    for (_, value) in parse_cookie_header(input) {
        assert!(codec.verify(&value).is_err());
    }

    if let Some(cookie) = SetCookie::parse(input) {
        let _ = cookie.to_header_value();
    }
});
