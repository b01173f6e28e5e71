// Test HTTP Client

use palisade_core::{Error, HttpMethod, HttpRequest, HttpResponse, Router, SetCookie, encode_form};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Test HTTP client that behaves like a browser tab: it remembers cookies
/// set by the application and sends them back on every request.
pub struct TestClient {
    router: Arc<Router>,
    cookies: Mutex<Vec<(String, String)>>,
    default_headers: HashMap<String, String>,
}

impl TestClient {
    /// Create a new test client
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            cookies: Mutex::new(Vec::new()),
            default_headers: HashMap::new(),
        }
    }

    /// Send `value` in header `name` on every request
    pub fn with_default_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers.insert(name.to_string(), value.to_string());
        self
    }

    fn jar(&self) -> MutexGuard<'_, Vec<(String, String)>> {
        self.cookies.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current value of a cookie in the jar
    pub fn get_cookie(&self, name: &str) -> Option<String> {
        self.jar()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    /// Set or replace a cookie in the jar
    pub fn add_cookie(&self, name: &str, value: &str) {
        let mut jar = self.jar();
        match jar.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => jar.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_cookie(&self, name: &str) {
        self.jar().retain(|(key, _)| key != name);
    }

    pub fn clear_cookies(&self) {
        self.jar().clear();
    }

    /// `Cookie` header value for the current jar
    pub fn cookie_header(&self) -> Option<String> {
        let jar = self.jar();
        if jar.is_empty() {
            return None;
        }
        Some(
            jar.iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    fn store_cookies(&self, response: &HttpResponse) {
        for cookie in response.cookies() {
            if cookie.is_removal() {
                self.remove_cookie(&cookie.name);
            } else {
                self.add_cookie(&cookie.name, &cookie.value);
            }
        }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::GET, path)).await
    }

    /// Make a POST request with a raw body
    pub async fn post(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::POST, path).body(body))
            .await
    }

    /// POST an URL-encoded form
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::POST, path).form(fields))
            .await
    }

    /// POST a JSON body
    pub async fn post_json<T: serde::Serialize>(&self, path: &str, data: &T) -> TestResponse {
        match TestRequestBuilder::new(HttpMethod::POST, path).json(data) {
            Ok(builder) => self.send(builder).await,
            Err(error) => TestResponse::Error(error),
        }
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::DELETE, path))
            .await
    }

    /// Build and send a request, adding default headers and the jar's cookies
    pub async fn send(&self, builder: TestRequestBuilder) -> TestResponse {
        self.request(builder.build()).await
    }

    /// Send a prepared request
    pub async fn request(&self, mut req: HttpRequest) -> TestResponse {
        for (name, value) in &self.default_headers {
            if req.header(name).is_none() {
                req.headers.insert(name.clone(), value.clone());
            }
        }
        if req.header("Cookie").is_none()
            && let Some(cookies) = self.cookie_header()
        {
            req.headers.insert("Cookie".to_string(), cookies);
        }

        match self.router.route(req).await {
            Ok(response) => {
                self.store_cookies(&response);
                TestResponse::Success(response)
            }
            Err(error) => TestResponse::Error(error),
        }
    }
}

/// Builder for test requests
pub struct TestRequestBuilder {
    method: HttpMethod,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    query_params: Vec<(String, String)>,
}

impl TestRequestBuilder {
    /// Create a new request builder
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
            query_params: Vec::new(),
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(HttpMethod::GET, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(HttpMethod::POST, path)
    }

    /// Add a header
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Set the body
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Set an URL-encoded form body
    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = encode_form(fields).unwrap_or_default();
        self.headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        self
    }

    /// Set a multipart body
    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.headers
            .insert("Content-Type".to_string(), body.content_type());
        self.body = body.into_bytes();
        self
    }

    /// Set JSON body
    pub fn json<T: serde::Serialize>(mut self, data: &T) -> Result<Self, Error> {
        self.body = serde_json::to_vec(data).map_err(|e| Error::Serialization(e.to_string()))?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    /// Add a query parameter
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Build the request
    pub fn build(self) -> HttpRequest {
        let pairs: Vec<(&str, &str)> = self
            .query_params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let path = match encode_form(&pairs) {
            Ok(query) if !query.is_empty() => {
                format!("{}?{}", self.path, String::from_utf8_lossy(&query))
            }
            _ => self.path,
        };

        let mut req = HttpRequest::new(self.method.as_str(), path).with_body(self.body);
        req.headers = self.headers;
        req
    }
}

/// `multipart/form-data` body with text fields and files
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: format!("----PalisadeBoundary{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Add a text field
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    /// Add a file part
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

/// Response from a test request
#[derive(Debug)]
pub enum TestResponse {
    Success(HttpResponse),
    Error(Error),
}

impl TestResponse {
    /// Assert the response is successful
    pub fn assert_success(&self) -> &HttpResponse {
        match self {
            TestResponse::Success(response) => response,
            TestResponse::Error(error) => {
                panic!("Expected success response, got error: {:?}", error)
            }
        }
    }

    /// Assert the response is an error
    pub fn assert_error(&self) -> &Error {
        match self {
            TestResponse::Error(error) => error,
            TestResponse::Success(_) => {
                panic!("Expected error response, got success")
            }
        }
    }

    /// Status code as a client would see it; errors use their mapped status
    pub fn status(&self) -> u16 {
        match self {
            TestResponse::Success(response) => response.status,
            TestResponse::Error(error) => error.status_code(),
        }
    }

    /// Response body as a string; errors render like `Error::into_response`
    pub fn body_string(&self) -> Option<String> {
        match self {
            TestResponse::Success(response) => response.body_string(),
            TestResponse::Error(error) => Some(error.response_body()),
        }
    }

    /// Get the response body as JSON
    pub fn body_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, String> {
        match self {
            TestResponse::Success(response) => serde_json::from_slice(&response.body)
                .map_err(|e| format!("Serialization error: {}", e)),
            TestResponse::Error(error) => Err(format!("{:?}", error)),
        }
    }

    /// Get a header value (the first one for repeated headers)
    pub fn header(&self, key: &str) -> Option<&String> {
        match self {
            TestResponse::Success(response) => response.headers.get(key),
            TestResponse::Error(_) => None,
        }
    }

    /// Every cookie set by this response
    pub fn set_cookies(&self) -> Vec<SetCookie> {
        match self {
            TestResponse::Success(response) => response.cookies(),
            TestResponse::Error(_) => Vec::new(),
        }
    }

    /// Cookie set by this response under `name`
    pub fn set_cookie(&self, name: &str) -> Option<SetCookie> {
        match self {
            TestResponse::Success(response) => response.cookie(name),
            TestResponse::Error(_) => None,
        }
    }
}
