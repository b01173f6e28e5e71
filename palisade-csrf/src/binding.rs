use crate::config::CsrfConfig;
use palisade_core::HttpRequest;
use std::collections::HashMap;
use std::sync::Arc;

/// Knows where a request carries its cookie and its submitted token.
///
/// Binding only extracts values; acceptance is decided by the verifier.
#[derive(Debug, Clone)]
pub struct RequestBinding {
    config: Arc<CsrfConfig>,
}

impl RequestBinding {
    pub fn new(config: Arc<CsrfConfig>) -> Self {
        Self { config }
    }

    /// Signed token from the request cookie; an empty value counts as absent
    pub fn cookie_value(&self, request: &HttpRequest) -> Option<String> {
        request
            .cookie(&self.config.cookie_name)
            .filter(|value| !value.is_empty())
    }

    /// Header expected to carry the token for `path`.
    ///
    /// The longest matching route prefix wins over the default header.
    pub fn header_name_for(&self, path: &str) -> &str {
        let path = path.split('?').next().unwrap_or_default();
        self.config
            .route_headers
            .iter()
            .filter(|(prefix, _)| path_matches_prefix(path, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, header)| header.as_str())
            .unwrap_or(&self.config.header_name)
    }

    fn accepts_header(&self, path: &str, name: &str) -> bool {
        name.eq_ignore_ascii_case(&self.config.header_name)
            || name.eq_ignore_ascii_case(self.header_name_for(path))
    }

    /// Submitted token, looked up in order: a header advertised by the
    /// companion form field, the route's token header, then the token
    /// field of a form or JSON body.
    pub fn submission(&self, request: &HttpRequest) -> Option<String> {
        let form = self.form_fields(request);

        if let Some(advertised) = form
            .as_ref()
            .and_then(|fields| fields.get(&self.config.header_field_name))
        {
            if !self.accepts_header(&request.path, advertised) {
                return None;
            }
            return non_empty(request.header(advertised));
        }

        if let Some(value) = non_empty(request.header(self.header_name_for(&request.path))) {
            return Some(value);
        }

        match form {
            Some(fields) => non_empty(fields.get(&self.config.field_name).map(String::as_str)),
            None => self.json_field(request),
        }
    }

    fn form_fields(&self, request: &HttpRequest) -> Option<HashMap<String, String>> {
        if request.is_url_encoded_form() || request.is_multipart_form() {
            request.form().ok()
        } else {
            None
        }
    }

    fn json_field(&self, request: &HttpRequest) -> Option<String> {
        if !request.is_json() {
            return None;
        }
        let body: serde_json::Value = request.json().ok()?;
        non_empty(body.get(&self.config.field_name)?.as_str())
    }
}

/// Whether `path` lies under `prefix`, matching whole path segments only:
/// `/api` covers `/api` and `/api/users` but not `/apiary`.
pub(crate) fn path_matches_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding() -> RequestBinding {
        let config = CsrfConfig::default().with_route_header("/api", "X-API-CSRF");
        RequestBinding::new(Arc::new(config))
    }

    fn form_post(path: &str, body: &str) -> HttpRequest {
        HttpRequest::new("POST", path)
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(body.as_bytes().to_vec())
    }

    #[test]
    fn test_path_matches_prefix_on_segments() {
        assert!(path_matches_prefix("/api", "/api"));
        assert!(path_matches_prefix("/api/users", "/api"));
        assert!(path_matches_prefix("/api/users", "/api/"));
        assert!(path_matches_prefix("/anything", "/"));
        assert!(!path_matches_prefix("/apiary", "/api"));
        assert!(!path_matches_prefix("/ap", "/api"));
    }

    #[test]
    fn test_cookie_value() {
        let binding = binding();
        let req = HttpRequest::new("POST", "/").with_header("Cookie", "csrftoken=abc; other=1");
        assert_eq!(binding.cookie_value(&req).as_deref(), Some("abc"));

        let req = HttpRequest::new("POST", "/").with_header("Cookie", "csrftoken=");
        assert_eq!(binding.cookie_value(&req), None);
    }

    #[test]
    fn test_header_name_for_route() {
        let binding = binding();
        assert_eq!(binding.header_name_for("/service/hello"), "X-CSRF-TOKEN");
        assert_eq!(binding.header_name_for("/api/items?x=1"), "X-API-CSRF");
        assert_eq!(binding.header_name_for("/api"), "X-API-CSRF");
        assert_eq!(binding.header_name_for("/apiary/items"), "X-CSRF-TOKEN");
    }

    #[test]
    fn test_form_field_submission() {
        let req = form_post("/", "name=alice&csrf-token=raw123");
        assert_eq!(binding().submission(&req).as_deref(), Some("raw123"));
    }

    #[test]
    fn test_header_submission_beats_form_field() {
        let req = form_post("/", "csrf-token=from-form").with_header("x-csrf-token", "from-header");
        assert_eq!(binding().submission(&req).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_advertised_header() {
        let req = form_post("/", "csrf-header=X-CSRF-TOKEN&csrf-token=from-form")
            .with_header("X-CSRF-TOKEN", "from-header");
        assert_eq!(binding().submission(&req).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_advertised_header_must_be_accepted() {
        let req = form_post("/", "csrf-header=X-Forwarded-For&csrf-token=from-form")
            .with_header("X-Forwarded-For", "1.2.3.4");
        assert_eq!(binding().submission(&req), None);
    }

    #[test]
    fn test_advertised_header_absent() {
        let req = form_post("/", "csrf-header=X-CSRF-TOKEN&csrf-token=from-form");
        assert_eq!(binding().submission(&req), None);
    }

    #[test]
    fn test_route_header_override() {
        let req = HttpRequest::new("POST", "/api/items").with_header("X-API-CSRF", "api-token");
        assert_eq!(binding().submission(&req).as_deref(), Some("api-token"));
    }

    #[test]
    fn test_json_body_field() {
        let req = HttpRequest::new("POST", "/")
            .with_header("Content-Type", "application/json")
            .with_body(br#"{"csrf-token":"json-token"}"#.to_vec());
        assert_eq!(binding().submission(&req).as_deref(), Some("json-token"));

        let req = HttpRequest::new("POST", "/")
            .with_header("Content-Type", "application/json")
            .with_body(br#"{"csrf-token":42}"#.to_vec());
        assert_eq!(binding().submission(&req), None);
    }

    #[test]
    fn test_multipart_field() {
        let body = "--XyZ\r\n\
                    Content-Disposition: form-data; name=\"csrf-token\"\r\n\
                    \r\n\
                    multi-token\r\n\
                    --XyZ--\r\n";
        let req = HttpRequest::new("POST", "/")
            .with_header("Content-Type", "multipart/form-data; boundary=XyZ")
            .with_body(body.as_bytes().to_vec());
        assert_eq!(binding().submission(&req).as_deref(), Some("multi-token"));
    }

    #[test]
    fn test_nothing_submitted() {
        let req = HttpRequest::new("POST", "/").with_body(b"csrf-token=raw".to_vec());
        assert_eq!(binding().submission(&req), None);
    }
}
