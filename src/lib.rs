// Palisade - double-submit cookie CSRF protection
//
// This library bundles the HTTP core, the CSRF middleware and the logging
// facade behind one dependency.

// Re-export core functionality
pub use palisade_core::*;

// Re-export the protection and logging crates
pub use palisade_csrf as csrf;
pub use palisade_log as log;

pub use palisade_csrf::{
    CsrfConfig, CsrfContext, CsrfError, CsrfMiddleware, RawToken, SignedToken, TokenCodec,
    TokenSigner, VerificationEngine, VerificationResult,
};

#[cfg(feature = "testing")]
pub use palisade_testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        CsrfConfig,
        CsrfContext,
        CsrfMiddleware,
        Error,
        HttpMethod,
        HttpRequest,
        HttpResponse,
        Middleware,
        Next,
        Router,
        SameSite,
        SetCookie,
        VerificationResult,
    };

    pub use async_trait::async_trait;
}
