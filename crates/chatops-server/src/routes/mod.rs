pub mod commands;
pub mod events;
pub mod health;

use axum::http::HeaderMap;
use bytes::Bytes;
use chatops_core::verify::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use chatops_core::{BodyFormat, SignedRequest, Verifier};

use crate::error::AppError;

/// Run the configured verification over the raw body before anything parses
/// it. A header that is present but not visible ASCII counts as missing.
pub(crate) fn verify_request(
    verifier: &Verifier,
    headers: &HeaderMap,
    body: &Bytes,
    format: BodyFormat,
) -> Result<(), AppError> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let request = SignedRequest {
        timestamp: header(TIMESTAMP_HEADER),
        signature: header(SIGNATURE_HEADER),
        body: &body[..],
        format,
    };
    verifier.verify(&request)?;
    Ok(())
}
