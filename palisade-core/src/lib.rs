//! Core HTTP plumbing for Palisade: request and response types, the
//! middleware chain, a small router, cookie headers and form bodies.
//!
//! ```
//! use palisade_core::*;
//!
//! # tokio_test::block_on(async {
//! let router = Router::new().get("/hello", |_req| async { Ok(HttpResponse::text("hello")) });
//! let response = router.handle(HttpRequest::new("GET", "/hello")).await;
//! assert_eq!(response.status, 200);
//! # });
//! ```

pub mod cookie;
pub mod error;
pub mod form;
pub mod headers;
pub mod http;
pub mod middleware;
pub mod routing;
pub mod status;

pub use cookie::{SameSite, SetCookie, parse_cookie_header};
pub use error::Error;
pub use form::{FormField, FormFile, MultipartParser, encode_form, parse_form_map};
pub use headers::HeaderMap;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use middleware::{HandlerFn, Middleware, MiddlewareChain, Next, ResponseFuture, handler};
pub use routing::{Route, Router};
pub use status::HttpStatus;

pub use async_trait::async_trait;
