use crate::config::CsrfConfig;
use crate::error::{CsrfError, Result};
use crate::token::{RawToken, SignedToken};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// Produces and checks the MAC appended to a raw token.
///
/// Implement this to plug in key rotation; [`HmacSigner`] covers the
/// single-secret case.
pub trait TokenSigner: Send + Sync {
    /// Length of every MAC returned by [`TokenSigner::sign`]
    fn mac_len(&self) -> usize;

    fn sign(&self, raw: &[u8]) -> Vec<u8>;

    /// Constant-time check of `mac` against `raw`
    fn verify(&self, raw: &[u8], mac: &[u8]) -> bool;
}

/// HMAC-SHA256 keyed with the process-wide secret
#[derive(Clone)]
pub struct HmacSigner {
    mac: HmacSha256,
}

impl HmacSigner {
    pub fn new(secret: &[u8]) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| CsrfError::InvalidSecret(e.to_string()))?;
        Ok(Self { mac })
    }
}

impl TokenSigner for HmacSigner {
    fn mac_len(&self) -> usize {
        32
    }

    fn sign(&self, raw: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(raw);
        mac.finalize().into_bytes().to_vec()
    }

    fn verify(&self, raw: &[u8], tag: &[u8]) -> bool {
        let mut mac = self.mac.clone();
        mac.update(raw);
        mac.verify_slice(tag).is_ok()
    }
}

/// Issues signed tokens and recovers the raw token from a cookie value.
#[derive(Clone)]
pub struct TokenCodec {
    signer: Arc<dyn TokenSigner>,
    token_size: usize,
}

impl TokenCodec {
    /// HMAC-SHA256 codec over the configured secret
    pub fn new(config: &CsrfConfig) -> Result<Self> {
        config.validate()?;
        let signer = HmacSigner::new(&config.secret)?;
        Ok(Self::with_signer(Arc::new(signer), config.token_size))
    }

    pub fn with_signer(signer: Arc<dyn TokenSigner>, token_size: usize) -> Self {
        Self { signer, token_size }
    }

    pub fn token_size(&self) -> usize {
        self.token_size
    }

    pub fn generate_raw(&self) -> RawToken {
        RawToken::generate(self.token_size)
    }

    /// Sign an existing raw token
    pub fn sign(&self, raw: &RawToken) -> SignedToken {
        let mut bytes = Vec::with_capacity(raw.len() + self.signer.mac_len());
        bytes.extend_from_slice(raw.as_bytes());
        bytes.extend_from_slice(&self.signer.sign(raw.as_bytes()));
        SignedToken::new(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Fresh signed token
    pub fn issue(&self) -> SignedToken {
        self.sign(&self.generate_raw())
    }

    /// Decode a cookie value and check its MAC.
    ///
    /// Every failure is `SignatureInvalid`: bad encoding, wrong length or a
    /// MAC that does not match.
    pub fn verify(&self, signed: &str) -> Result<RawToken> {
        let bytes = URL_SAFE_NO_PAD
            .decode(signed)
            .map_err(|_| CsrfError::SignatureInvalid)?;

        if bytes.len() != self.token_size + self.signer.mac_len() {
            return Err(CsrfError::SignatureInvalid);
        }

        let (raw, mac) = bytes.split_at(self.token_size);
        if !self.signer.verify(raw, mac) {
            return Err(CsrfError::SignatureInvalid);
        }

        Ok(RawToken::from_bytes(raw.to_vec()))
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("token_size", &self.token_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&CsrfConfig::new(b"test_secret_key_32_bytes_long!!!".to_vec()).unwrap())
            .unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let codec = codec();
        let raw = codec.generate_raw();
        let signed = codec.sign(&raw);
        assert_eq!(codec.verify(signed.as_str()).unwrap(), raw);
    }

    #[test]
    fn test_signed_length() {
        let signed = codec().issue();
        // 64 bytes of base64url without padding
        assert_eq!(signed.as_str().len(), 86);
    }

    #[test]
    fn test_issue_never_repeats() {
        let codec = codec();
        assert_ne!(codec.issue(), codec.issue());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let codec = codec();
        assert_eq!(codec.verify("wrongvalue"), Err(CsrfError::SignatureInvalid));
        assert_eq!(codec.verify("not base64!"), Err(CsrfError::SignatureInvalid));
        assert_eq!(codec.verify(""), Err(CsrfError::SignatureInvalid));
    }

    #[test]
    fn test_verify_rejects_raw_token() {
        let codec = codec();
        let raw = codec.generate_raw();
        assert_eq!(codec.verify(&raw.encode()), Err(CsrfError::SignatureInvalid));
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let signed = codec().issue();
        let other =
            TokenCodec::new(&CsrfConfig::new(b"another_secret_key_32_bytes_long".to_vec()).unwrap())
                .unwrap();
        assert_eq!(other.verify(signed.as_str()), Err(CsrfError::SignatureInvalid));
    }

    #[test]
    fn test_custom_signer() {
        struct XorSigner;

        impl TokenSigner for XorSigner {
            fn mac_len(&self) -> usize {
                1
            }

            fn sign(&self, raw: &[u8]) -> Vec<u8> {
                vec![raw.iter().fold(0u8, |acc, b| acc ^ b)]
            }

            fn verify(&self, raw: &[u8], mac: &[u8]) -> bool {
                self.sign(raw) == mac
            }
        }

        let codec = TokenCodec::with_signer(Arc::new(XorSigner), 16);
        let signed = codec.issue();
        assert_eq!(codec.verify(signed.as_str()).map(|raw| raw.len()), Ok(16));
    }
}
