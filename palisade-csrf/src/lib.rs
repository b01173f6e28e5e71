//! # Palisade CSRF Protection
//!
//! Double-submit cookie protection against Cross-Site Request Forgery.
//!
//! A safe request (GET, HEAD, OPTIONS) receives a `csrftoken` cookie holding
//! a random token and its HMAC-SHA256 signature. Forms echo the raw token in
//! the `csrf-token` field, scripts send it in the `X-CSRF-TOKEN` header. An
//! unsafe request is accepted only when the cookie signature verifies and
//! the submitted value equals the token inside it.
//!
//! ## Features
//!
//! - **Signed cookies** - HMAC-SHA256 over random tokens, checked in constant time
//! - **Form, header and JSON submission** - with per-route header overrides
//! - **Uniform rejections** - every failure is the same 400 response
//! - **Pluggable signing** - [`TokenSigner`] for key rotation
//!
//! ## Quick Start
//!
//! ```rust
//! use palisade_csrf::{CsrfConfig, CsrfMiddleware};
//!
//! let secret = CsrfConfig::generate_secret();
//! let config = CsrfConfig::new(secret).unwrap()
//!     .with_cookie_secure(true);
//!
//! let csrf = CsrfMiddleware::new(config).unwrap();
//! ```
//!
//! ## Issuing and Verifying
//!
//! ```rust
//! use palisade_csrf::{CsrfConfig, TokenCodec, VerificationEngine, VerificationResult};
//!
//! let codec = TokenCodec::new(&CsrfConfig::default()).unwrap();
//! let raw = codec.generate_raw();
//! let cookie = codec.sign(&raw);
//!
//! let engine = VerificationEngine::new(codec);
//! assert_eq!(
//!     engine.verify(Some(cookie.as_str()), Some(&raw.encode())),
//!     VerificationResult::Accepted
//! );
//! assert_eq!(
//!     engine.verify(Some("wrongvalue"), Some(&raw.encode())),
//!     VerificationResult::SignatureInvalid
//! );
//! ```
//!
//! ## Usage with a Router
//!
//! ```rust
//! use palisade_core::{HttpRequest, HttpResponse, Router};
//! use palisade_csrf::{CsrfConfig, CsrfContext, CsrfMiddleware};
//!
//! let csrf = CsrfMiddleware::new(CsrfConfig::default()).unwrap();
//! let form = csrf.clone();
//!
//! let router = Router::new()
//!     .with_middleware(csrf)
//!     .get("/form", move |req: HttpRequest| {
//!         let input = req
//!             .extension::<CsrfContext>()
//!             .map(|ctx| form.hidden_input(ctx))
//!             .unwrap_or_default();
//!         async move { Ok(HttpResponse::html(format!("<form method=\"post\">{}</form>", input))) }
//!     });
//! # let _ = router;
//! ```

pub mod binding;
pub mod codec;
pub mod config;
pub mod error;
pub mod middleware;
pub mod token;
pub mod verifier;

pub use binding::RequestBinding;
pub use codec::{HmacSigner, TokenCodec, TokenSigner};
pub use config::{CsrfConfig, SameSite};
pub use error::{CsrfError, REJECTION_MESSAGE, Result};
pub use middleware::{CsrfContext, CsrfMiddleware};
pub use token::{RawToken, SignedToken};
pub use verifier::{VerificationEngine, VerificationResult};
