use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

/// Random token bytes; the value a form or header submits.
#[derive(Clone, PartialEq, Eq)]
pub struct RawToken(Vec<u8>);

impl RawToken {
    /// Generate `size` bytes from the thread-local CSPRNG
    pub fn generate(size: usize) -> Self {
        let mut bytes = vec![0u8; size];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Transport form: base64url without padding
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.0)
    }
}

impl std::fmt::Debug for RawToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawToken([{} bytes])", self.0.len())
    }
}

/// Cookie value: `base64url(raw || mac)`
#[derive(Clone, PartialEq, Eq)]
pub struct SignedToken(String);

impl SignedToken {
    pub(crate) fn new(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SignedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SignedToken([redacted])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_length() {
        let token = RawToken::generate(32);
        assert_eq!(token.len(), 32);
        assert_eq!(token.encode().len(), 43);
    }

    #[test]
    fn test_generate_is_random() {
        assert_ne!(RawToken::generate(32), RawToken::generate(32));
    }

    #[test]
    fn test_encode_is_url_safe() {
        let encoded = RawToken::from_bytes(vec![0xfb, 0xff, 0xfe, 0x3e]).encode();
        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_debug_hides_value() {
        let token = RawToken::from_bytes(vec![0xab; 16]);
        assert_eq!(format!("{:?}", token), "RawToken([16 bytes])");
    }
}
