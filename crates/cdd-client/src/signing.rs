//! HMAC request signatures.
//!
//! When a [`SigningKey`] is configured every request carries:
//!
//! | Header | Value |
//! |--------|-------|
//! | `X-Signature` | hex HMAC-SHA256 of the signed message |
//! | `X-Timestamp` | RFC 3339 UTC time with milliseconds |
//! | `X-Nonce` | random per-request string |
//! | `X-Signature-KeyId` | the key id, when one is configured |
//!
//! The signed message is `METHOD|url|timestamp|nonce|body`, where `url` is
//! the full request URL and `body` the exact bytes sent (empty for no body).

use chrono::{SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Request;
use sha2::Sha256;
use uuid::Uuid;

use crate::config::{ConfigError, SigningKey};

pub const SIGNATURE_HEADER: &str = "X-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Timestamp";
pub const NONCE_HEADER: &str = "X-Nonce";
pub const KEY_ID_HEADER: &str = "X-Signature-KeyId";

/// Header values for one signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    pub signature: String,
    pub timestamp: String,
    pub nonce: String,
    pub key_id: Option<String>,
}

/// Sign `method url body` at `timestamp` with `nonce`.
pub fn sign(
    key: &SigningKey,
    method: &str,
    url: &str,
    body: &[u8],
    timestamp: &str,
    nonce: &str,
) -> Result<SignatureHeaders, ConfigError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key.secret())
        .map_err(|e| ConfigError::Signing(e.to_string()))?;
    for part in [method.as_bytes(), url.as_bytes(), timestamp.as_bytes(), nonce.as_bytes()] {
        mac.update(part);
        mac.update(b"|");
    }
    mac.update(body);
    Ok(SignatureHeaders {
        signature: hex::encode(mac.finalize().into_bytes()),
        timestamp: timestamp.to_string(),
        nonce: nonce.to_string(),
        key_id: key.key_id().map(str::to_string),
    })
}

/// Add signature headers to `request` with a fresh timestamp and nonce.
pub(crate) fn sign_request(key: &SigningKey, request: &mut Request) -> Result<(), ConfigError> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let nonce = Uuid::new_v4().simple().to_string();
    let body = request.body().and_then(|b| b.as_bytes()).unwrap_or_default();
    let headers = sign(
        key,
        request.method().as_str(),
        request.url().as_str(),
        body,
        &timestamp,
        &nonce,
    )?;

    insert(request, SIGNATURE_HEADER, headers.signature)?;
    insert(request, TIMESTAMP_HEADER, headers.timestamp)?;
    insert(request, NONCE_HEADER, headers.nonce)?;
    if let Some(id) = headers.key_id {
        insert(request, KEY_ID_HEADER, id)?;
    }
    Ok(())
}

fn insert(request: &mut Request, name: &str, value: String) -> Result<(), ConfigError> {
    let header = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| ConfigError::Signing(format!("{name}: {e}")))?;
    let value = HeaderValue::try_from(value)
        .map_err(|e| ConfigError::Signing(format!("{name}: {e}")))?;
    request.headers_mut().insert(header, value);
    Ok(())
}
