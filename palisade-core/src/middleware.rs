// Middleware system for request/response processing

use crate::{Error, HttpRequest, HttpResponse};
use async_trait::async_trait;
use palisade_log::trace;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by handlers and by the rest of a middleware chain
pub type ResponseFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// The remainder of the chain, consumed when a middleware forwards the request
pub type Next = Box<dyn FnOnce(HttpRequest) -> ResponseFuture + Send>;

/// Route handler
pub type HandlerFn = Arc<dyn Fn(HttpRequest) -> ResponseFuture + Send + Sync>;

/// Wrap an async closure as a [`HandlerFn`]
pub fn handler<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

/// A stage that sees every request before the handler.
///
/// Returning without calling `next` short-circuits the chain.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error>;
}

/// Ordered list of middleware; the first added runs outermost
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Arc::new(middleware));
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Run the request through every middleware, then the handler
    pub async fn apply(&self, req: HttpRequest, handler: HandlerFn) -> Result<HttpResponse, Error> {
        trace!(
            "Executing {} middleware for {} {}",
            self.middlewares.len(),
            req.method,
            req.path
        );
        Self::execute_from(Arc::new(self.middlewares.clone()), 0, req, handler).await
    }

    fn execute_from(
        middlewares: Arc<Vec<Arc<dyn Middleware>>>,
        index: usize,
        req: HttpRequest,
        handler: HandlerFn,
    ) -> ResponseFuture {
        let Some(middleware) = middlewares.get(index).cloned() else {
            return handler(req);
        };

        Box::pin(async move {
            let next: Next = Box::new(move |req| {
                Self::execute_from(middlewares, index + 1, req, handler)
            });
            middleware.handle(req, next).await
        })
    }
}
