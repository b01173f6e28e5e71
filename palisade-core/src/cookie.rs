//! Cookie header parsing and `Set-Cookie` rendering.

/// Cookie `SameSite` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(SameSite::Strict),
            "lax" => Some(SameSite::Lax),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }
}

/// Parse a `Cookie` request header into `(name, value)` pairs, in order.
///
/// Malformed pairs without `=` are skipped. Surrounding double quotes on a
/// value are removed.
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// A `Set-Cookie` response header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    /// Lifetime in seconds; `Some(0)` deletes the cookie
    pub max_age: Option<i64>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl SetCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            max_age: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Whether this header instructs the client to drop the cookie
    pub fn is_removal(&self) -> bool {
        matches!(self.max_age, Some(age) if age <= 0)
    }

    /// Render the header value
    pub fn to_header_value(&self) -> String {
        let mut cookie = format!("{}={}", self.name, self.value);

        if let Some(ref path) = self.path {
            cookie.push_str(&format!("; Path={}", path));
        }
        if let Some(ref domain) = self.domain {
            cookie.push_str(&format!("; Domain={}", domain));
        }
        if let Some(max_age) = self.max_age {
            cookie.push_str(&format!("; Max-Age={}", max_age));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if let Some(same_site) = self.same_site {
            cookie.push_str(&format!("; SameSite={}", same_site.as_str()));
        }

        cookie
    }

    /// Parse a `Set-Cookie` header value. Unknown attributes are ignored.
    pub fn parse(header: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = SetCookie::new(name, value.trim());
        for attr in parts {
            let (key, val) = match attr.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim())),
                None => (attr.trim(), None),
            };
            match (key.to_ascii_lowercase().as_str(), val) {
                ("path", Some(v)) => cookie.path = Some(v.to_string()),
                ("domain", Some(v)) => cookie.domain = Some(v.to_string()),
                ("max-age", Some(v)) => cookie.max_age = v.parse().ok(),
                ("samesite", Some(v)) => cookie.same_site = SameSite::parse(v),
                ("secure", None) => cookie.secure = true,
                ("httponly", None) => cookie.http_only = true,
                _ => {}
            }
        }
        Some(cookie)
    }
}

impl std::fmt::Display for SetCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_header_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookie_header() {
        let cookies = parse_cookie_header("a=1; csrftoken=abc-_; empty=; \"q\"=x; junk");
        assert_eq!(cookies[0], ("a".to_string(), "1".to_string()));
        assert_eq!(cookies[1], ("csrftoken".to_string(), "abc-_".to_string()));
        assert_eq!(cookies[2], ("empty".to_string(), String::new()));
        assert_eq!(cookies.len(), 4);
    }

    #[test]
    fn test_parse_cookie_header_strips_quotes() {
        let cookies = parse_cookie_header("token=\"value\"");
        assert_eq!(cookies[0].1, "value");
    }

    #[test]
    fn test_set_cookie_rendering() {
        let header = SetCookie::new("csrftoken", "v")
            .path("/")
            .max_age(7200)
            .http_only(true)
            .same_site(SameSite::Lax)
            .to_header_value();
        assert_eq!(
            header,
            "csrftoken=v; Path=/; Max-Age=7200; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn test_set_cookie_parse() {
        let cookie =
            SetCookie::parse("csrftoken=v; Path=/; Domain=localhost; Max-Age=0; Secure; HttpOnly; SameSite=Strict")
                .unwrap();
        assert_eq!(cookie.name, "csrftoken");
        assert_eq!(cookie.value, "v");
        assert_eq!(cookie.domain.as_deref(), Some("localhost"));
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.same_site, Some(SameSite::Strict));
        assert!(cookie.is_removal());
    }

    #[test]
    fn test_set_cookie_parse_rejects_nameless() {
        assert!(SetCookie::parse("=value").is_none());
        assert!(SetCookie::parse("novalue").is_none());
    }
}
