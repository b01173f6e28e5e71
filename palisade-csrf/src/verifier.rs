use crate::codec::TokenCodec;
use crate::error::{CsrfError, Result};
use crate::token::RawToken;
use subtle::ConstantTimeEq;

/// Outcome of checking one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationResult {
    Accepted,
    MissingCookie,
    MissingSubmission,
    SignatureInvalid,
    ValueMismatch,
}

impl VerificationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, VerificationResult::Accepted)
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            VerificationResult::Accepted => Ok(()),
            VerificationResult::MissingCookie => Err(CsrfError::MissingCookie),
            VerificationResult::MissingSubmission => Err(CsrfError::MissingSubmission),
            VerificationResult::SignatureInvalid => Err(CsrfError::SignatureInvalid),
            VerificationResult::ValueMismatch => Err(CsrfError::ValueMismatch),
        }
    }

    /// Short label for logs
    pub fn reason(&self) -> &'static str {
        match self {
            VerificationResult::Accepted => "accepted",
            VerificationResult::MissingCookie => "missing cookie",
            VerificationResult::MissingSubmission => "missing submission",
            VerificationResult::SignatureInvalid => "invalid signature",
            VerificationResult::ValueMismatch => "value mismatch",
        }
    }
}

impl From<&CsrfError> for VerificationResult {
    fn from(err: &CsrfError) -> Self {
        match err {
            CsrfError::MissingCookie => VerificationResult::MissingCookie,
            CsrfError::MissingSubmission => VerificationResult::MissingSubmission,
            CsrfError::ValueMismatch => VerificationResult::ValueMismatch,
            _ => VerificationResult::SignatureInvalid,
        }
    }
}

/// Compares a cookie against a submitted token.
///
/// Checks run cookie, signature, submission, comparison; the first failure
/// decides the outcome.
#[derive(Debug, Clone)]
pub struct VerificationEngine {
    codec: TokenCodec,
}

impl VerificationEngine {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Verify and return the raw token the cookie carries
    pub fn check(&self, cookie: Option<&str>, submission: Option<&str>) -> Result<RawToken> {
        let cookie = cookie.ok_or(CsrfError::MissingCookie)?;
        let raw = self.codec.verify(cookie)?;
        let submission = submission.ok_or(CsrfError::MissingSubmission)?;

        let expected = raw.encode();
        if bool::from(expected.as_bytes().ct_eq(submission.as_bytes())) {
            Ok(raw)
        } else {
            Err(CsrfError::ValueMismatch)
        }
    }

    pub fn verify(&self, cookie: Option<&str>, submission: Option<&str>) -> VerificationResult {
        match self.check(cookie, submission) {
            Ok(_) => VerificationResult::Accepted,
            Err(err) => VerificationResult::from(&err),
        }
    }
}
