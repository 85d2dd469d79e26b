//! Authenticity checks for inbound Slack requests.
//!
//! Two mechanisms are supported. The signing secret is preferred: Slack sends
//! `X-Slack-Signature: v0=<hex>` where the hex is
//! `HMAC-SHA256(secret, "v0:" + timestamp + ":" + body)`. The legacy
//! verification token is a shared string echoed back in the payload's
//! `token` field.
//!
//! The verifier only borrows the body, so the same bytes can be parsed again
//! by the handler afterwards.

use crate::error::{RelayError, Result};
use crate::form::parse_form;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_VERSION: &str = "v0";

/// Requests older (or newer) than this are treated as replays.
pub const MAX_TIMESTAMP_SKEW_SECS: i64 = 5 * 60;

/// Where the legacy `token` field lives in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Form,
    Json,
}

/// The pieces of an inbound request the verifier looks at.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequest<'a> {
    pub timestamp: Option<&'a str>,
    pub signature: Option<&'a str>,
    pub body: &'a [u8],
    pub format: BodyFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMode {
    Disabled,
    SigningSecret,
    LegacyToken,
}

#[derive(Clone)]
pub struct Verifier {
    signing_secret: Option<String>,
    legacy_token: Option<String>,
    skip: bool,
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("mode", &self.mode())
            .finish()
    }
}

impl Verifier {
    pub fn new(signing_secret: Option<String>, legacy_token: Option<String>, skip: bool) -> Self {
        Self {
            signing_secret,
            legacy_token,
            skip,
        }
    }

    pub fn mode(&self) -> VerificationMode {
        if self.skip {
            VerificationMode::Disabled
        } else if self.signing_secret.is_some() {
            VerificationMode::SigningSecret
        } else {
            VerificationMode::LegacyToken
        }
    }

    pub fn verify(&self, req: &SignedRequest<'_>) -> Result<()> {
        self.verify_at(req, unix_now())
    }

    /// Same as [`verify`](Self::verify) with an explicit clock, in Unix seconds.
    pub fn verify_at(&self, req: &SignedRequest<'_>, now: i64) -> Result<()> {
        if self.skip {
            return Ok(());
        }
        if let Some(secret) = &self.signing_secret {
            return verify_signature(secret, req, now);
        }
        if let Some(expected) = &self.legacy_token {
            return verify_token(expected, req);
        }
        // RelayConfig refuses to build without one of the two secrets.
        Err(RelayError::verification("no verification secret configured"))
    }
}

fn verify_signature(secret: &str, req: &SignedRequest<'_>, now: i64) -> Result<()> {
    let timestamp = req
        .timestamp
        .ok_or_else(|| RelayError::malformed("missing X-Slack-Request-Timestamp header"))?;
    let signature = req
        .signature
        .ok_or_else(|| RelayError::malformed("missing X-Slack-Signature header"))?;

    let sent_at: i64 = timestamp.trim().parse().map_err(|_| {
        RelayError::malformed(format!("invalid request timestamp '{timestamp}'"))
    })?;
    if now.abs_diff(sent_at) > MAX_TIMESTAMP_SKEW_SECS.unsigned_abs() {
        return Err(RelayError::malformed("request timestamp is too old"));
    }

    let provided = signature
        .strip_prefix(SIGNATURE_VERSION)
        .and_then(|s| s.strip_prefix('='))
        .ok_or_else(|| RelayError::verification("unsupported signature version"))?;
    let provided = hex::decode(provided)
        .map_err(|_| RelayError::verification("signature is not valid hex"))?;

    let mac = signature_mac(secret, timestamp, req.body)?;
    // verify_slice compares in constant time
    mac.verify_slice(&provided)
        .map_err(|_| RelayError::verification("signature mismatch"))
}

fn verify_token(expected: &str, req: &SignedRequest<'_>) -> Result<()> {
    let provided = match req.format {
        BodyFormat::Form => parse_form(req.body)?.value("token").to_string(),
        BodyFormat::Json => {
            let value: serde_json::Value = serde_json::from_slice(req.body)
                .map_err(|e| RelayError::malformed(format!("invalid JSON body: {e}")))?;
            value
                .get("token")
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string()
        }
    };
    if provided != expected {
        return Err(RelayError::verification("verification token mismatch"));
    }
    Ok(())
}

fn signature_mac(secret: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| RelayError::verification(format!("invalid signing secret: {e}")))?;
    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

/// Compute the `X-Slack-Signature` value Slack would send for this body.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> Result<String> {
    let mac = signature_mac(secret, timestamp, body)?;
    Ok(format!(
        "{SIGNATURE_VERSION}={}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;
    const BODY: &[u8] = b"command=%2Fdevops-action&text=myrepo+build.yml";

    fn signed<'a>(ts: &'a str, sig: &'a str, body: &'a [u8]) -> SignedRequest<'a> {
        SignedRequest {
            timestamp: Some(ts),
            signature: Some(sig),
            body,
            format: BodyFormat::Form,
        }
    }

    fn secret_verifier() -> Verifier {
        Verifier::new(Some("test-secret".into()), None, false)
    }

    #[test]
    fn known_signature_vector() {
        // Example request from Slack's "verifying requests" guide.
        let body = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
        let sig = sign("8f742231b10e8888abcd99yyyzzz85a5", "1531420618", body).unwrap();
        assert_eq!(
            sig,
            "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503"
        );
    }

    #[test]
    fn genuine_request_is_accepted() {
        let ts = NOW.to_string();
        let sig = sign("test-secret", &ts, BODY).unwrap();
        assert!(secret_verifier().verify_at(&signed(&ts, &sig, BODY), NOW).is_ok());
    }

    #[test]
    fn tampered_body_is_unauthorized() {
        let ts = NOW.to_string();
        let sig = sign("test-secret", &ts, BODY).unwrap();
        let tampered = b"command=%2Fdevops-action&text=otherrepo+deploy.yml";
        let err = secret_verifier()
            .verify_at(&signed(&ts, &sig, tampered), NOW)
            .unwrap_err();
        assert!(matches!(err, RelayError::Verification(_)));
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let ts = NOW.to_string();
        let sig = sign("other-secret", &ts, BODY).unwrap();
        let err = secret_verifier()
            .verify_at(&signed(&ts, &sig, BODY), NOW)
            .unwrap_err();
        assert!(matches!(err, RelayError::Verification(_)));
    }

    #[test]
    fn garbage_signature_is_unauthorized() {
        let ts = NOW.to_string();
        for sig in ["v1=abcd", "v0=not-hex", "abcdef"] {
            let err = secret_verifier()
                .verify_at(&signed(&ts, sig, BODY), NOW)
                .unwrap_err();
            assert!(matches!(err, RelayError::Verification(_)), "{sig}");
        }
    }

    #[test]
    fn missing_headers_are_malformed() {
        let req = SignedRequest {
            timestamp: None,
            signature: Some("v0=00"),
            body: BODY,
            format: BodyFormat::Form,
        };
        assert!(matches!(
            secret_verifier().verify_at(&req, NOW),
            Err(RelayError::MalformedRequest(_))
        ));

        let ts = NOW.to_string();
        let req = SignedRequest {
            timestamp: Some(&ts),
            signature: None,
            body: BODY,
            format: BodyFormat::Form,
        };
        assert!(matches!(
            secret_verifier().verify_at(&req, NOW),
            Err(RelayError::MalformedRequest(_))
        ));
    }

    #[test]
    fn non_numeric_timestamp_is_malformed() {
        let sig = sign("test-secret", "yesterday", BODY).unwrap();
        assert!(matches!(
            secret_verifier().verify_at(&signed("yesterday", &sig, BODY), NOW),
            Err(RelayError::MalformedRequest(_))
        ));
    }

    #[test]
    fn stale_timestamp_is_rejected_even_with_valid_signature() {
        let old = (NOW - MAX_TIMESTAMP_SKEW_SECS - 1).to_string();
        let sig = sign("test-secret", &old, BODY).unwrap();
        assert!(matches!(
            secret_verifier().verify_at(&signed(&old, &sig, BODY), NOW),
            Err(RelayError::MalformedRequest(_))
        ));
    }

    #[test]
    fn extreme_timestamps_are_rejected_without_overflow() {
        for ts in [i64::MIN.to_string(), i64::MAX.to_string()] {
            let sig = sign("test-secret", &ts, BODY).unwrap();
            assert!(matches!(
                secret_verifier().verify_at(&signed(&ts, &sig, BODY), NOW),
                Err(RelayError::MalformedRequest(_))
            ));
        }
    }

    #[test]
    fn legacy_form_token_must_match_exactly() {
        let verifier = Verifier::new(None, Some("legacy-token".into()), false);
        let ok = SignedRequest {
            timestamp: None,
            signature: None,
            body: b"token=legacy-token&command=%2Fdevops-action",
            format: BodyFormat::Form,
        };
        assert!(verifier.verify_at(&ok, NOW).is_ok());

        let bad = SignedRequest {
            body: b"token=Legacy-Token&command=%2Fdevops-action",
            ..ok
        };
        assert!(matches!(
            verifier.verify_at(&bad, NOW),
            Err(RelayError::Verification(_))
        ));

        let absent = SignedRequest {
            body: b"command=%2Fdevops-action",
            ..ok
        };
        assert!(matches!(
            verifier.verify_at(&absent, NOW),
            Err(RelayError::Verification(_))
        ));
    }

    #[test]
    fn legacy_json_token_is_read_from_payload() {
        let verifier = Verifier::new(None, Some("legacy-token".into()), false);
        let req = SignedRequest {
            timestamp: None,
            signature: None,
            body: br#"{"token":"legacy-token","type":"url_verification","challenge":"c"}"#,
            format: BodyFormat::Json,
        };
        assert!(verifier.verify_at(&req, NOW).is_ok());

        let broken = SignedRequest {
            body: b"{not json",
            ..req
        };
        assert!(matches!(
            verifier.verify_at(&broken, NOW),
            Err(RelayError::MalformedRequest(_))
        ));
    }

    #[test]
    fn signing_secret_takes_precedence_over_token() {
        let verifier = Verifier::new(Some("test-secret".into()), Some("legacy".into()), false);
        assert_eq!(verifier.mode(), VerificationMode::SigningSecret);
        let req = SignedRequest {
            timestamp: None,
            signature: None,
            body: b"token=legacy",
            format: BodyFormat::Form,
        };
        assert!(verifier.verify_at(&req, NOW).is_err());
    }

    #[test]
    fn skip_accepts_anything() {
        let verifier = Verifier::new(Some("test-secret".into()), None, true);
        assert_eq!(verifier.mode(), VerificationMode::Disabled);
        let req = SignedRequest {
            timestamp: None,
            signature: None,
            body: b"whatever",
            format: BodyFormat::Json,
        };
        assert!(verifier.verify_at(&req, NOW).is_ok());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let rendered = format!("{:?}", secret_verifier());
        assert!(!rendered.contains("test-secret"));
    }
}
