use crate::error::{CsrfError, Result};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
pub use palisade_core::SameSite;

/// Minimum secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Minimum raw token length in bytes
pub const MIN_TOKEN_SIZE: usize = 16;

/// CSRF protection configuration.
///
/// Built once at startup and shared read-only by every request.
#[derive(Clone)]
pub struct CsrfConfig {
    /// HMAC key for cookie signatures (at least 32 bytes)
    pub secret: Vec<u8>,

    /// Raw token length in bytes
    pub token_size: usize,

    /// Cookie carrying the signed token
    pub cookie_name: String,

    pub cookie_path: String,

    pub cookie_domain: Option<String>,

    /// Cookie lifetime in seconds
    pub cookie_max_age: i64,

    pub cookie_secure: bool,

    pub cookie_http_only: bool,

    pub cookie_same_site: SameSite,

    /// Form field carrying the raw token
    pub field_name: String,

    /// Default header carrying the raw token
    pub header_name: String,

    /// Form field that names the header carrying the token
    pub header_field_name: String,

    /// Per-route header names as `(path prefix, header name)`
    pub route_headers: Vec<(String, String)>,

    /// Methods that issue tokens instead of verifying them
    pub safe_methods: Vec<String>,

    /// Path prefixes that bypass protection entirely
    pub exclude_paths: Vec<String>,

    /// Path prefixes that issue tokens on safe requests; `None` means all
    pub create_token_paths: Option<Vec<String>>,
}

impl std::fmt::Debug for CsrfConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfConfig")
            .field("secret", &"[redacted]")
            .field("token_size", &self.token_size)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_path", &self.cookie_path)
            .field("cookie_domain", &self.cookie_domain)
            .field("cookie_max_age", &self.cookie_max_age)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_http_only", &self.cookie_http_only)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("field_name", &self.field_name)
            .field("header_name", &self.header_name)
            .field("header_field_name", &self.header_field_name)
            .field("route_headers", &self.route_headers)
            .field("safe_methods", &self.safe_methods)
            .field("exclude_paths", &self.exclude_paths)
            .field("create_token_paths", &self.create_token_paths)
            .finish()
    }
}

impl CsrfConfig {
    /// Create a configuration with default settings around `secret`
    pub fn new(secret: Vec<u8>) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(CsrfError::InvalidSecret(format!(
                "secret key must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                secret.len()
            )));
        }

        Ok(Self::with_defaults(secret))
    }

    fn with_defaults(secret: Vec<u8>) -> Self {
        Self {
            secret,
            token_size: 32,
            cookie_name: "csrftoken".to_string(),
            cookie_path: "/".to_string(),
            cookie_domain: None,
            cookie_max_age: 2 * 60 * 60,
            cookie_secure: false,
            cookie_http_only: true,
            cookie_same_site: SameSite::Strict,
            field_name: "csrf-token".to_string(),
            header_name: "X-CSRF-TOKEN".to_string(),
            header_field_name: "csrf-header".to_string(),
            route_headers: Vec::new(),
            safe_methods: vec![
                "GET".to_string(),
                "HEAD".to_string(),
                "OPTIONS".to_string(),
            ],
            exclude_paths: Vec::new(),
            create_token_paths: None,
        }
    }

    /// Generate a random 32-byte secret
    pub fn generate_secret() -> Vec<u8> {
        use rand::RngCore;
        let mut secret = vec![0u8; MIN_SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut secret);
        secret
    }

    /// Load configuration from `PALISADE_CSRF_*` environment variables.
    ///
    /// A secret is generated when `PALISADE_CSRF_SECRET` is unset, which
    /// invalidates outstanding cookies on every restart.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup, using the same
    /// keys as [`CsrfConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = match lookup("PALISADE_CSRF_SECRET") {
            Some(encoded) => decode_secret(&encoded)?,
            None => Self::generate_secret(),
        };

        let mut config = Self::new(secret)?;

        if let Some(name) = lookup("PALISADE_CSRF_COOKIE_NAME") {
            config.cookie_name = name;
        }
        if let Some(name) = lookup("PALISADE_CSRF_FIELD_NAME") {
            config.field_name = name;
        }
        if let Some(name) = lookup("PALISADE_CSRF_HEADER_NAME") {
            config.header_name = name;
        }
        if let Some(size) = lookup("PALISADE_CSRF_TOKEN_SIZE") {
            config.token_size = size.trim().parse().map_err(|_| {
                CsrfError::InvalidConfig(format!("PALISADE_CSRF_TOKEN_SIZE is not a number: {}", size))
            })?;
        }
        if let Some(age) = lookup("PALISADE_CSRF_COOKIE_MAX_AGE") {
            config.cookie_max_age = age.trim().parse().map_err(|_| {
                CsrfError::InvalidConfig(format!("PALISADE_CSRF_COOKIE_MAX_AGE is not a number: {}", age))
            })?;
        }
        if let Some(secure) = lookup("PALISADE_CSRF_COOKIE_SECURE") {
            config.cookie_secure = match secure.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => {
                    return Err(CsrfError::InvalidConfig(format!(
                        "PALISADE_CSRF_COOKIE_SECURE must be true, false, 1 or 0: {}",
                        secure
                    )));
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Check every field for values that would break the protocol.
    pub fn validate(&self) -> Result<()> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(CsrfError::InvalidSecret(format!(
                "secret key must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if self.token_size < MIN_TOKEN_SIZE {
            return Err(CsrfError::InvalidConfig(format!(
                "token size must be at least {} bytes",
                MIN_TOKEN_SIZE
            )));
        }
        if self.cookie_max_age <= 0 {
            return Err(CsrfError::InvalidConfig(
                "cookie max age must be positive".to_string(),
            ));
        }

        check_token_name("cookie name", &self.cookie_name)?;
        check_token_name("field name", &self.field_name)?;
        check_token_name("header field name", &self.header_field_name)?;
        check_token_name("header name", &self.header_name)?;
        for (_, header) in &self.route_headers {
            check_token_name("route header name", header)?;
        }

        Ok(())
    }

    pub fn with_token_size(mut self, bytes: usize) -> Self {
        self.token_size = bytes;
        self
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    pub fn with_cookie_max_age(mut self, seconds: i64) -> Self {
        self.cookie_max_age = seconds;
        self
    }

    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    pub fn with_cookie_http_only(mut self, http_only: bool) -> Self {
        self.cookie_http_only = http_only;
        self
    }

    pub fn with_cookie_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie_same_site = same_site;
        self
    }

    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    pub fn with_header_field_name(mut self, name: impl Into<String>) -> Self {
        self.header_field_name = name.into();
        self
    }

    /// Accept the token from `header` for requests under `path_prefix`
    pub fn with_route_header(
        mut self,
        path_prefix: impl Into<String>,
        header: impl Into<String>,
    ) -> Self {
        self.route_headers.push((path_prefix.into(), header.into()));
        self
    }

    pub fn with_safe_methods(mut self, methods: Vec<String>) -> Self {
        self.safe_methods = methods;
        self
    }

    pub fn with_exclude_paths(mut self, paths: Vec<String>) -> Self {
        self.exclude_paths = paths;
        self
    }

    pub fn with_create_token_paths(mut self, paths: Vec<String>) -> Self {
        self.create_token_paths = Some(paths);
        self
    }
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self::with_defaults(Self::generate_secret())
    }
}

fn decode_secret(encoded: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(encoded.trim().trim_end_matches('='))
        .map_err(|e| CsrfError::InvalidSecret(format!("PALISADE_CSRF_SECRET is not base64url: {}", e)))
}

/// Cookie, field and header names must be non-empty HTTP tokens
fn check_token_name(what: &str, name: &str) -> Result<()> {
    const SEPARATORS: &str = "()<>@,;:\\\"/[]?={} \t";
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_graphic() && !SEPARATORS.contains(c));
    if valid {
        Ok(())
    } else {
        Err(CsrfError::InvalidConfig(format!("invalid {}: {:?}", what, name)))
    }
}
