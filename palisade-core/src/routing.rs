// Routing system for HTTP requests

use crate::middleware::{HandlerFn, Middleware, MiddlewareChain, handler};
use crate::{Error, HttpMethod, HttpRequest, HttpResponse};
use palisade_log::debug;
use std::collections::HashMap;
use std::future::Future;

/// Route definition with handler
#[derive(Clone)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub handler: HandlerFn,
}

/// Router for managing routes and dispatching requests through middleware
#[derive(Clone, Default)]
pub struct Router {
    pub routes: Vec<Route>,
    middleware: MiddlewareChain,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Register an async closure for a method and path pattern
    pub fn on<F, Fut>(mut self, method: HttpMethod, path: &str, f: F) -> Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.add_route(Route {
            method,
            path: path.to_string(),
            handler: handler(f),
        });
        self
    }

    pub fn get<F, Fut>(self, path: &str, f: F) -> Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.on(HttpMethod::GET, path, f)
    }

    pub fn post<F, Fut>(self, path: &str, f: F) -> Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.on(HttpMethod::POST, path, f)
    }

    /// Append a middleware; earlier middleware wraps later ones
    pub fn with_middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.use_middleware(middleware);
        self
    }

    /// Match the request and run it through the middleware chain
    pub async fn route(&self, mut request: HttpRequest) -> Result<HttpResponse, Error> {
        let (path, query_string) = match request.path.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (request.path.clone(), None),
        };

        if let Some(query) = query_string {
            request.query_params = parse_query_string(&query);
        }

        // Methods are case-insensitive; middleware sees the canonical form
        let method = request.http_method();
        if let Some(method) = method {
            request.method = method.as_str().to_string();
        }

        for route in &self.routes {
            if Some(route.method) != method {
                continue;
            }

            if let Some(params) = match_path(&route.path, &path) {
                request.path_params = params;
                return self.middleware.apply(request, route.handler.clone()).await;
            }
        }

        debug!("No route for {} {}", request.method, path);
        Err(Error::RouteNotFound(format!("{} {}", request.method, path)))
    }

    /// Like [`Router::route`], with errors rendered as responses
    pub async fn handle(&self, request: HttpRequest) -> HttpResponse {
        match self.route(request).await {
            Ok(response) => response,
            Err(error) => error.into_response(),
        }
    }
}

/// Match a route pattern (`/users/:id`) against a request path
fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(name) = pattern_part.strip_prefix(':') {
            params.insert(name.to_string(), path_part.to_string());
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}

fn parse_query_string(query: &str) -> HashMap<String, String> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .map(|pairs| pairs.into_iter().collect())
        .unwrap_or_default()
}
