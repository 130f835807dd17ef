//! Webhook signature verification for voice-platform deliveries.
//!
//! The platform signs the raw request body with HMAC-SHA256 under the shared
//! webhook secret and sends the hex digest in `x-elevenlabs-signature`.
//! Verification happens before the body is parsed.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-elevenlabs-signature";

/// Signature value accepted without a digest in `webhook-test-mode` builds.
#[cfg(feature = "webhook-test-mode")]
const TEST_MODE_SIGNATURE: &str = "test_mode";

#[derive(Error, Debug, PartialEq)]
pub enum SignatureError {
    #[error("webhook secret is not configured")]
    SecretNotConfigured,
    #[error("signature header missing")]
    MissingHeader,
    #[error("signature is not valid hex")]
    MalformedHeader,
    #[error("signature does not match body")]
    Mismatch,
}

#[cfg(feature = "webhook-test-mode")]
fn is_test_mode(signature: &str) -> bool {
    signature == TEST_MODE_SIGNATURE
}

#[cfg(not(feature = "webhook-test-mode"))]
fn is_test_mode(_signature: &str) -> bool {
    false
}

/// Hex HMAC-SHA256 of `body` under `secret`, as the platform sends it.
#[cfg(test)]
pub(crate) fn sign_body(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Check `signature` against the body. The secret is checked first: an
/// unconfigured server rejects every delivery.
pub fn verify_signature(
    secret: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
) -> Result<(), SignatureError> {
    let secret = secret.ok_or(SignatureError::SecretNotConfigured)?;
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SignatureError::MissingHeader)?;

    if is_test_mode(signature) {
        tracing::warn!("Accepted webhook with test-mode signature");
        return Ok(());
    }

    let provided = hex::decode(signature).map_err(|_| SignatureError::MalformedHeader)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::SecretNotConfigured)?;
    mac.update(body);
    let expected = mac.finalize().into_bytes();

    if expected.as_slice().ct_eq(&provided).unwrap_u8() == 0 {
        return Err(SignatureError::Mismatch);
    }
    Ok(())
}

/// Buffer the body, verify its signature and pass it on unchanged.
pub async fn require_signature(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let ctx = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or_else(|| ApiError::Internal("API context missing from request".into()))?;

    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, ctx.core.settings.max_upload_bytes)
        .await
        .map_err(|e| ApiError::BadRequest(format!("Could not read request body: {e}")))?;

    let signature = parts
        .headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    verify_signature(ctx.core.settings.webhook_secret.as_deref(), signature, &bytes)?;

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"patientId":"p-1","transcript":"I took my pills."}"#;

    #[test]
    fn valid_signature_is_accepted() {
        let signature = sign_body(SECRET, BODY);
        assert_eq!(signature.len(), 64);
        assert_eq!(verify_signature(Some(SECRET), Some(&signature), BODY), Ok(()));
    }

    #[test]
    fn uppercase_hex_is_accepted() {
        let signature = sign_body(SECRET, BODY).to_uppercase();
        assert_eq!(verify_signature(Some(SECRET), Some(&signature), BODY), Ok(()));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let signature = sign_body(SECRET, BODY);
        assert_eq!(
            verify_signature(Some(SECRET), Some(&signature), b"{\"patientId\":\"p-2\"}"),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signature = sign_body("other-secret", BODY);
        assert_eq!(
            verify_signature(Some(SECRET), Some(&signature), BODY),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn missing_or_garbled_header_is_rejected() {
        assert_eq!(
            verify_signature(Some(SECRET), None, BODY),
            Err(SignatureError::MissingHeader)
        );
        assert_eq!(
            verify_signature(Some(SECRET), Some("  "), BODY),
            Err(SignatureError::MissingHeader)
        );
        assert_eq!(
            verify_signature(Some(SECRET), Some("not-hex!"), BODY),
            Err(SignatureError::MalformedHeader)
        );
        assert_eq!(
            verify_signature(Some(SECRET), Some("abcd"), BODY),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn unconfigured_secret_rejects_everything() {
        let signature = sign_body(SECRET, BODY);
        assert_eq!(
            verify_signature(None, Some(&signature), BODY),
            Err(SignatureError::SecretNotConfigured)
        );
    }

    #[cfg(not(feature = "webhook-test-mode"))]
    #[test]
    fn test_mode_literal_is_rejected_by_default() {
        assert_eq!(
            verify_signature(Some(SECRET), Some("test_mode"), BODY),
            Err(SignatureError::MalformedHeader)
        );
    }

    #[cfg(feature = "webhook-test-mode")]
    #[test]
    fn test_mode_literal_is_accepted_with_feature() {
        assert_eq!(verify_signature(Some(SECRET), Some("test_mode"), BODY), Ok(()));
    }
}
