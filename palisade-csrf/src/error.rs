use thiserror::Error;

/// Message returned to clients for every rejected request
pub const REJECTION_MESSAGE: &str = "CSRF token verification failed";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsrfError {
    #[error("CSRF cookie is missing")]
    MissingCookie,

    #[error("CSRF token was not submitted")]
    MissingSubmission,

    #[error("CSRF cookie signature is invalid")]
    SignatureInvalid,

    #[error("Submitted CSRF token does not match the cookie")]
    ValueMismatch,

    #[error("Invalid CSRF secret: {0}")]
    InvalidSecret(String),

    #[error("Invalid CSRF configuration: {0}")]
    InvalidConfig(String),
}

impl CsrfError {
    /// Whether this is a per-request verification failure rather than a
    /// configuration problem.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CsrfError::MissingCookie
                | CsrfError::MissingSubmission
                | CsrfError::SignatureInvalid
                | CsrfError::ValueMismatch
        )
    }
}

impl From<CsrfError> for palisade_core::Error {
    fn from(err: CsrfError) -> Self {
        if err.is_rejection() {
            // All rejection reasons look the same from outside
            palisade_core::Error::BadRequest(REJECTION_MESSAGE.to_string())
        } else {
            palisade_core::Error::Internal(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CsrfError>;
