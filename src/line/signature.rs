//! Webhook signature verification
//!
//! The `X-Line-Signature` header carries base64(HMAC-SHA256(channel secret, body)).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Missing signature header")]
    Missing,
    #[error("Signature is not valid base64")]
    Malformed,
    #[error("Signature mismatch")]
    Mismatch,
    #[error("Channel secret cannot key HMAC-SHA256")]
    InvalidKey,
}

/// Verifies webhook bodies against the channel secret
#[derive(Clone)]
pub struct SignatureVerifier {
    mac: HmacSha256,
}

impl SignatureVerifier {
    pub fn new(channel_secret: &str) -> Result<Self, SignatureError> {
        let mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
            .map_err(|_| SignatureError::InvalidKey)?;
        Ok(Self { mac })
    }

    /// Signature the platform would send for `body`
    #[allow(dead_code)] // Used by tests
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(body);
        STANDARD.encode(mac.finalize().into_bytes())
    }

    /// Constant-time check of `signature` against `body`
    pub fn verify(&self, body: &[u8], signature: Option<&str>) -> Result<(), SignatureError> {
        let signature = signature.ok_or(SignatureError::Missing)?;
        let expected = STANDARD
            .decode(signature.trim())
            .map_err(|_| SignatureError::Malformed)?;

        let mut mac = self.mac.clone();
        mac.update(body);
        mac.verify_slice(&expected)
            .map_err(|_| SignatureError::Mismatch)
    }
}
