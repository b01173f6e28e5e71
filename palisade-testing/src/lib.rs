//! Testing utilities for Palisade.
//!
//! [`TestClient`] drives a [`Router`](palisade_core::Router) in-process and
//! keeps a cookie jar, so multi-request flows (fetch a form, then submit it)
//! read like a browser session.
//!
//! ## Quick Start
//!
//! ```
//! use palisade_core::{HttpResponse, Router};
//! use palisade_testing::*;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let router = Router::new().get("/hello", |_req| async {
//!     Ok(HttpResponse::ok().with_body(b"Hello!".to_vec()))
//! });
//!
//! let client = TestClient::new(Arc::new(router));
//! let response = client.get("/hello").await;
//! assert_status(&response, 200);
//! assert_eq!(response.body_string(), Some("Hello!".to_string()));
//! # });
//! ```
//!
//! ## Forms and Cookies
//!
//! ```
//! use palisade_core::{Error, HttpRequest, HttpResponse, Router, SetCookie};
//! use palisade_testing::*;
//! use std::sync::Arc;
//!
//! async fn login(req: HttpRequest) -> Result<HttpResponse, Error> {
//!     let form = req.form()?;
//!     Ok(HttpResponse::text(format!(
//!         "{}:{}",
//!         form.get("user").cloned().unwrap_or_default(),
//!         req.cookie("visited").unwrap_or_default()
//!     )))
//! }
//!
//! # tokio_test::block_on(async {
//! let router = Router::new()
//!     .get("/login", |_req| async {
//!         let mut response = HttpResponse::ok();
//!         response.set_cookie(&SetCookie::new("visited", "yes"));
//!         Ok(response)
//!     })
//!     .post("/login", login);
//!
//! let client = TestClient::new(Arc::new(router));
//! client.get("/login").await;
//! let response = client.post_form("/login", &[("user", "alice")]).await;
//! assert_body_contains(&response, "alice:yes");
//! # });
//! ```

mod assertions;
mod test_client;

pub use assertions::*;
pub use test_client::*;
