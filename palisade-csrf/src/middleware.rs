use crate::binding::{RequestBinding, path_matches_prefix};
use crate::codec::TokenCodec;
use crate::config::CsrfConfig;
use crate::error::{CsrfError, REJECTION_MESSAGE};
use crate::token::RawToken;
use crate::verifier::{VerificationEngine, VerificationResult};
use async_trait::async_trait;
use palisade_core::{Error, HttpRequest, HttpResponse, Middleware, Next, SetCookie};
use palisade_log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;

/// Token state attached to request extensions for handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsrfContext {
    token: String,
    verified: bool,
}

impl CsrfContext {
    pub fn new(token: &RawToken, verified: bool) -> Self {
        Self {
            token: token.encode(),
            verified,
        }
    }

    /// Raw token in transport form, for forms and headers
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether this request passed verification
    pub fn verified(&self) -> bool {
        self.verified
    }
}

/// CSRF protection middleware
#[derive(Clone)]
pub struct CsrfMiddleware {
    config: Arc<CsrfConfig>,
    binding: RequestBinding,
    engine: VerificationEngine,
}

impl CsrfMiddleware {
    /// Create middleware; fails on an invalid configuration
    pub fn new(config: CsrfConfig) -> Result<Self, CsrfError> {
        let codec = TokenCodec::new(&config)?;
        Ok(Self::with_codec(config, codec))
    }

    /// Create middleware around a custom codec, e.g. one with a rotating signer
    pub fn with_codec(config: CsrfConfig, codec: TokenCodec) -> Self {
        let config = Arc::new(config);
        Self {
            binding: RequestBinding::new(config.clone()),
            engine: VerificationEngine::new(codec),
            config,
        }
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    pub fn codec(&self) -> &TokenCodec {
        self.engine.codec()
    }

    fn path(request: &HttpRequest) -> &str {
        request.path.split('?').next().unwrap_or_default()
    }

    fn is_safe_method(&self, request: &HttpRequest) -> bool {
        self.config
            .safe_methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(&request.method))
    }

    fn is_excluded(&self, request: &HttpRequest) -> bool {
        let path = Self::path(request);
        self.config
            .exclude_paths
            .iter()
            .any(|excluded| path_matches_prefix(path, excluded))
    }

    /// Check if request needs verification
    pub fn needs_protection(&self, request: &HttpRequest) -> bool {
        !self.is_safe_method(request) && !self.is_excluded(request)
    }

    /// Whether a safe request to this path receives a token cookie
    pub fn is_token_path(&self, request: &HttpRequest) -> bool {
        if self.is_excluded(request) {
            return false;
        }
        match &self.config.create_token_paths {
            None => true,
            Some(paths) => {
                let path = Self::path(request);
                paths.iter().any(|prefix| path_matches_prefix(path, prefix))
            }
        }
    }

    pub fn generate_token(&self) -> RawToken {
        self.codec().generate_raw()
    }

    /// Raw token from a valid cookie, if the request carries one
    pub fn existing_token(&self, request: &HttpRequest) -> Option<RawToken> {
        let cookie = self.binding.cookie_value(request)?;
        self.codec().verify(&cookie).ok()
    }

    /// Token to hand out for this request: the cookie's if it verifies,
    /// otherwise a fresh one.
    pub fn token_for(&self, request: &HttpRequest) -> RawToken {
        match self.existing_token(request) {
            Some(token) => {
                debug!("Reusing CSRF token from cookie for {}", Self::path(request));
                token
            }
            None => {
                debug!("Issuing CSRF token for {}", Self::path(request));
                self.generate_token()
            }
        }
    }

    /// Cookie carrying the signed form of `token`
    pub fn cookie_for(&self, token: &RawToken) -> SetCookie {
        let mut cookie = SetCookie::new(&self.config.cookie_name, self.codec().sign(token).into_string())
            .path(&self.config.cookie_path)
            .max_age(self.config.cookie_max_age)
            .secure(self.config.cookie_secure)
            .http_only(self.config.cookie_http_only)
            .same_site(self.config.cookie_same_site);

        if let Some(ref domain) = self.config.cookie_domain {
            cookie = cookie.domain(domain);
        }
        cookie
    }

    /// Add the token cookie to a 2xx or 3xx response
    pub fn add_token_cookie(&self, response: &mut HttpResponse, token: &RawToken) {
        if response.is_success() || response.is_redirection() {
            response.set_cookie(&self.cookie_for(token));
        }
    }

    /// Verify cookie and submission, regardless of method or path
    pub fn verify_request(&self, request: &HttpRequest) -> VerificationResult {
        let cookie = self.binding.cookie_value(request);
        let submission = self.binding.submission(request);
        self.engine.verify(cookie.as_deref(), submission.as_deref())
    }

    /// Validate a request the way the middleware does.
    ///
    /// Requests that need no protection pass; rejections become a 400
    /// carrying the generic message.
    pub fn validate_request(&self, request: &HttpRequest) -> Result<(), Error> {
        if !self.needs_protection(request) {
            return Ok(());
        }
        self.verify_request(request).into_result()?;
        Ok(())
    }

    /// Hidden form input carrying the token
    pub fn hidden_input(&self, context: &CsrfContext) -> String {
        format!(
            r#"<input type="hidden" name="{}" value="{}">"#,
            escape_html(&self.config.field_name),
            escape_html(context.token())
        )
    }
}

impl std::fmt::Debug for CsrfMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfMiddleware")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Middleware for CsrfMiddleware {
    async fn handle(&self, mut req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        if self.is_excluded(&req) {
            return next(req).await;
        }

        if !self.needs_protection(&req) {
            if !self.is_token_path(&req) {
                if let Some(token) = self.existing_token(&req) {
                    req.extensions.insert(CsrfContext::new(&token, false));
                }
                return next(req).await;
            }

            let token = self.token_for(&req);
            req.extensions.insert(CsrfContext::new(&token, false));
            let mut response = next(req).await?;
            self.add_token_cookie(&mut response, &token);
            return Ok(response);
        }

        let cookie = self.binding.cookie_value(&req);
        let submission = self.binding.submission(&req);
        match self.engine.check(cookie.as_deref(), submission.as_deref()) {
            Ok(token) => {
                req.extensions.insert(CsrfContext::new(&token, true));
                next(req).await
            }
            Err(err) => {
                warn!(
                    "CSRF verification failed for {} {}: {}",
                    req.method,
                    Self::path(&req),
                    VerificationResult::from(&err).reason()
                );
                Err(Error::BadRequest(REJECTION_MESSAGE.to_string()))
            }
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use palisade_core::{HttpMethod, Router};

    fn middleware() -> CsrfMiddleware {
        let config = CsrfConfig::new(b"test_secret_key_32_bytes_long!!!".to_vec())
            .unwrap()
            .with_exclude_paths(vec!["/webhooks".to_string()]);
        CsrfMiddleware::new(config).unwrap()
    }

    fn signed_pair(csrf: &CsrfMiddleware) -> (String, String) {
        let raw = csrf.generate_token();
        (csrf.codec().sign(&raw).into_string(), raw.encode())
    }

    #[test]
    fn test_safe_methods() {
        let csrf = middleware();
        for method in [HttpMethod::GET, HttpMethod::HEAD, HttpMethod::OPTIONS] {
            assert!(!csrf.needs_protection(&HttpRequest::new(method.as_str(), "/form")));
        }
        assert!(csrf.needs_protection(&HttpRequest::new("POST", "/form")));
        assert!(csrf.needs_protection(&HttpRequest::new("DELETE", "/form")));
    }

    #[test]
    fn test_excluded_paths() {
        let csrf = middleware();
        assert!(!csrf.needs_protection(&HttpRequest::new("POST", "/webhooks/github")));
        assert!(!csrf.is_token_path(&HttpRequest::new("GET", "/webhooks/github")));
        assert!(!csrf.needs_protection(&HttpRequest::new("POST", "/webhooks")));
        assert!(csrf.needs_protection(&HttpRequest::new("POST", "/webhooksevil")));
        assert!(csrf.is_token_path(&HttpRequest::new("GET", "/webhooksevil")));
    }

    #[test]
    fn test_token_paths() {
        let config = CsrfConfig::default().with_create_token_paths(vec!["/service".to_string()]);
        let csrf = CsrfMiddleware::new(config).unwrap();
        assert!(csrf.is_token_path(&HttpRequest::new("GET", "/service/form?x=1")));
        assert!(!csrf.is_token_path(&HttpRequest::new("GET", "/static/app.js")));
        assert!(!csrf.is_token_path(&HttpRequest::new("GET", "/services")));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = CsrfConfig::default().with_token_size(4);
        assert!(matches!(
            CsrfMiddleware::new(config),
            Err(CsrfError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_cookie_attributes() {
        let csrf = middleware();
        let cookie = csrf.cookie_for(&csrf.generate_token()).to_header_value();
        assert!(cookie.starts_with("csrftoken="));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=7200"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_add_token_cookie_skips_errors() {
        let csrf = middleware();
        let token = csrf.generate_token();

        let mut response = HttpResponse::unauthorized();
        csrf.add_token_cookie(&mut response, &token);
        assert!(!response.headers.contains("Set-Cookie"));

        let mut response = HttpResponse::new(303);
        csrf.add_token_cookie(&mut response, &token);
        assert!(response.headers.contains("Set-Cookie"));
    }

    #[test]
    fn test_token_for_reuses_valid_cookie() {
        let csrf = middleware();
        let (signed, raw) = signed_pair(&csrf);
        let req = HttpRequest::new("GET", "/").with_header("Cookie", format!("csrftoken={}", signed));
        assert_eq!(csrf.token_for(&req).encode(), raw);

        let req = HttpRequest::new("GET", "/").with_header("Cookie", "csrftoken=wrongvalue");
        assert_ne!(csrf.token_for(&req).encode(), raw);
    }

    #[test]
    fn test_validate_request() {
        let csrf = middleware();
        let (signed, raw) = signed_pair(&csrf);

        let req = HttpRequest::new("POST", "/form")
            .with_header("Cookie", format!("csrftoken={}", signed))
            .with_header("X-CSRF-TOKEN", raw);
        assert!(csrf.validate_request(&req).is_ok());

        let req = HttpRequest::new("POST", "/form").with_header("X-CSRF-TOKEN", "x");
        let err = csrf.validate_request(&req).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(csrf.verify_request(&req), VerificationResult::MissingCookie);
    }

    #[test]
    fn test_hidden_input() {
        let csrf = middleware();
        let context = CsrfContext {
            token: "a\"b<c>".to_string(),
            verified: false,
        };
        assert_eq!(
            csrf.hidden_input(&context),
            r#"<input type="hidden" name="csrf-token" value="a&quot;b&lt;c&gt;">"#
        );
    }

    fn app(csrf: CsrfMiddleware) -> Router {
        Router::new()
            .with_middleware(csrf)
            .get("/form", |req| async move {
                let context = req.extension::<CsrfContext>().cloned();
                Ok(HttpResponse::text(context.map(|c| c.token().to_string()).unwrap_or_default()))
            })
            .get("/login", |_req| async {
                let mut response = HttpResponse::ok();
                response.set_cookie(&SetCookie::new("session", "abc").http_only(true));
                Ok(response)
            })
            .post("/form", |req| async move {
                let verified = req.extension::<CsrfContext>().is_some_and(|c| c.verified());
                Ok(HttpResponse::text(verified.to_string()))
            })
    }

    #[tokio::test]
    async fn test_get_issues_cookie_and_context() {
        let csrf = middleware();
        let router = app(csrf.clone());

        let response = router.handle(HttpRequest::new("GET", "/form")).await;
        assert_eq!(response.status, 200);

        let cookie = response.cookie("csrftoken").unwrap();
        let raw = csrf.codec().verify(&cookie.value).unwrap();
        assert_eq!(response.body_string(), Some(raw.encode()));
    }

    #[tokio::test]
    async fn test_token_cookie_keeps_handler_cookies() {
        let csrf = middleware();
        let router = app(csrf.clone());

        let response = router.handle(HttpRequest::new("GET", "/login")).await;
        assert_eq!(response.status, 200);

        let names: Vec<String> = response.cookies().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["session", "csrftoken"]);
        assert_eq!(response.cookie("session").map(|c| c.value).as_deref(), Some("abc"));
        let token_cookie = response.cookie("csrftoken").unwrap();
        assert!(csrf.codec().verify(&token_cookie.value).is_ok());
    }

    #[tokio::test]
    async fn test_lowercase_method_is_verified() {
        let router = app(middleware());
        let response = router.handle(HttpRequest::new("post", "/form")).await;
        assert_eq!(response.status, 400);
    }

    #[tokio::test]
    async fn test_post_round_trip() {
        let csrf = middleware();
        let router = app(csrf.clone());
        let (signed, raw) = signed_pair(&csrf);

        let req = HttpRequest::new("POST", "/form")
            .with_header("Cookie", format!("csrftoken={}", signed))
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(format!("csrf-token={}", raw).into_bytes());
        let response = router.handle(req).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body_string().as_deref(), Some("true"));
        assert!(!response.headers.contains("Set-Cookie"));
    }

    #[tokio::test]
    async fn test_post_rejection_body_is_generic() {
        let csrf = middleware();
        let router = app(csrf.clone());
        let (signed, _) = signed_pair(&csrf);

        let req = HttpRequest::new("POST", "/form")
            .with_header("Cookie", format!("csrftoken={}", signed))
            .with_header("X-CSRF-TOKEN", "wrong-value");
        let response = router.handle(req).await;
        assert_eq!(response.status, 400);
        assert!(response.body_string().unwrap().contains(REJECTION_MESSAGE));
        assert!(!response.body_string().unwrap().contains("mismatch"));
    }
}
