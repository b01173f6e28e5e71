// Error types for request processing

use crate::{HttpResponse, HttpStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported Media Type: {0}")]
    UnsupportedMediaType(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn http_status(&self) -> HttpStatus {
        match self {
            Error::RouteNotFound(_) | Error::NotFound(_) => HttpStatus::NotFound,
            Error::MethodNotAllowed(_) => HttpStatus::MethodNotAllowed,
            Error::Validation(_) | Error::Deserialization(_) | Error::BadRequest(_) => {
                HttpStatus::BadRequest
            }
            Error::Unauthorized(_) => HttpStatus::Unauthorized,
            Error::Forbidden(_) => HttpStatus::Forbidden,
            Error::PayloadTooLarge(_) => HttpStatus::PayloadTooLarge,
            Error::UnsupportedMediaType(_) => HttpStatus::UnsupportedMediaType,
            Error::Serialization(_) | Error::Internal(_) | Error::Io(_) => {
                HttpStatus::InternalServerError
            }
        }
    }

    pub fn status_code(&self) -> u16 {
        self.http_status().code()
    }

    pub fn is_client_error(&self) -> bool {
        self.http_status().is_client_error()
    }

    /// Render the error as a plain-text response.
    ///
    /// Server errors only expose the reason phrase; client errors carry
    /// their message, so callers must not put sensitive detail into them.
    pub fn into_response(self) -> HttpResponse {
        HttpResponse::text(self.response_body()).with_status(self.status_code())
    }

    /// Body text [`Error::into_response`] renders
    pub fn response_body(&self) -> String {
        let status = self.http_status();
        if status.is_server_error() {
            status.reason().to_string()
        } else {
            self.to_string()
        }
    }
}
