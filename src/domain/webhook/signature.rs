//! Payment webhook signature verification.
//!
//! The provider signs `"{t}.{raw_body}"` with HMAC-SHA256 and sends
//! `t=<unix>,v1=<hex>` in the signature header.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::Timestamp;

use super::errors::{SignatureFailure, WebhookError};

/// Maximum distance between the signed timestamp and now, in either direction.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Parsed components of the signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// The `t` value exactly as sent; this is what the provider signed.
    pub signed_timestamp: String,
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    /// Parses `t=<timestamp>,v1=<signature>`. Unknown keys are ignored.
    pub fn parse(header: &str) -> Result<Self, SignatureFailure> {
        let mut timestamp: Option<(i64, &str)> = None;
        let mut v1_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or(SignatureFailure::MalformedHeader)?;

            match key {
                "t" => {
                    let parsed: i64 = value
                        .parse()
                        .map_err(|_| SignatureFailure::MalformedHeader)?;
                    timestamp = Some((parsed, value));
                }
                "v1" => {
                    v1_signature =
                        Some(hex::decode(value).map_err(|_| SignatureFailure::MalformedHeader)?);
                }
                _ => {}
            }
        }

        match (timestamp, v1_signature) {
            (Some((timestamp, raw)), Some(v1_signature)) => Ok(Self {
                timestamp,
                signed_timestamp: raw.to_string(),
                v1_signature,
            }),
            _ => Err(SignatureFailure::MalformedHeader),
        }
    }
}

/// Result of a verification that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Verified,
    /// No secret configured; the body was accepted unchecked.
    Skipped,
}

/// Verifies webhook signatures against the shared secret.
pub struct WebhookVerifier {
    secret: Option<Secret<String>>,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: Option<Secret<String>>) -> Self {
        Self {
            secret,
            tolerance_secs: SIGNATURE_TOLERANCE_SECS,
        }
    }

    /// A verifier that accepts every request. Development only.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    pub fn verify(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<Verification, WebhookError> {
        self.verify_at(payload, signature_header, Timestamp::now())
    }

    /// Verifies against an explicit clock.
    ///
    /// Order of checks: header present, header parses, timestamp within
    /// tolerance, constant-time digest comparison.
    pub fn verify_at(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
        now: Timestamp,
    ) -> Result<Verification, WebhookError> {
        let Some(secret) = &self.secret else {
            return Ok(Verification::Skipped);
        };

        let header = signature_header
            .filter(|h| !h.trim().is_empty())
            .ok_or(WebhookError::SignatureInvalid(SignatureFailure::MissingHeader))?;
        let header = SignatureHeader::parse(header).map_err(WebhookError::SignatureInvalid)?;

        if now.as_unix_secs().abs_diff(header.timestamp) > self.tolerance_secs.unsigned_abs() {
            return Err(WebhookError::SignatureInvalid(
                SignatureFailure::TimestampOutOfRange,
            ));
        }

        let expected = sign(
            secret.expose_secret().as_bytes(),
            &header.signed_timestamp,
            payload,
        );
        if !constant_time_compare(&expected, &header.v1_signature) {
            return Err(WebhookError::SignatureInvalid(SignatureFailure::Mismatch));
        }

        Ok(Verification::Verified)
    }
}

fn sign(secret: &[u8], signed_timestamp: &str, payload: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).expect("HMAC accepts any key");
    mac.update(signed_timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Length check first, then a full-length comparison that does not short-circuit.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Builds a valid signature header value for a payload.
///
/// Used by tests and local tooling that replays provider events.
pub fn signature_header_for(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let t = timestamp.to_string();
    let digest = sign(secret.as_bytes(), &t, payload);
    format!("t={},v1={}", t, hex::encode(digest))
}
