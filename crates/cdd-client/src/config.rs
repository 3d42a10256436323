//! REST client configuration.
//!
//! One backend base URL, a request timeout and an optional request signing
//! key. Defaults point at a local development server; override via
//! environment variables or explicit construction.

use url::Url;
use zeroize::Zeroizing;

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the CDD backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL; endpoint paths (`/api/...`) are appended to it.
    pub base_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Sign every request when set.
    pub signing: Option<SigningKey>,
}

/// Shared secret for request signatures, with an optional key id the
/// backend uses to pick the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    secret: Zeroizing<String>,
    key_id: Option<String>,
}

impl SigningKey {
    pub fn new(secret: impl Into<String>, key_id: Option<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            key_id,
        }
    }

    pub(crate) fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("secret", &"[REDACTED]")
            .field("key_id", &self.key_id)
            .finish()
    }
}

impl ApiConfig {
    /// Configuration for `base_url` with the default timeout.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            signing: None,
        }
    }

    /// Sign requests with `key`.
    pub fn with_signing(mut self, key: Option<SigningKey>) -> Self {
        self.signing = key;
        self
    }

    /// Parse `raw` as the base URL.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        parse_url("base URL", raw).map(Self::new)
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CDD_API_URL` (default: `http://127.0.0.1:8000`)
    /// - `CDD_TIMEOUT_SECS` (default: 30)
    /// - `CDD_SIGNING_SECRET` (unset or empty: requests are not signed)
    /// - `CDD_SIGNING_KEY_ID` (optional, sent as `X-Signature-KeyId`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = match std::env::var("CDD_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            base_url: env_url("CDD_API_URL", DEFAULT_API_URL)?,
            timeout_secs,
            signing: signing_from_env("CDD_SIGNING_SECRET", "CDD_SIGNING_KEY_ID")?,
        })
    }

    /// Join an endpoint path onto the base URL, tolerating a base with or
    /// without a trailing slash.
    pub fn endpoint_url(&self, path: &str) -> String {
        join(&self.base_url, path)
    }
}

pub(crate) fn join(base: &Url, path: &str) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), path)
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    parse_url(var, &raw)
}

fn signing_from_env(secret_var: &str, key_id_var: &str) -> Result<Option<SigningKey>, ConfigError> {
    let secret = match std::env::var(secret_var) {
        Ok(s) if !s.is_empty() => s,
        _ => return Ok(None),
    };
    let key_id = std::env::var(key_id_var).ok().filter(|k| !k.is_empty());
    if let Some(id) = &key_id {
        if !id.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(ConfigError::InvalidSigningKeyId(id.clone()));
        }
    }
    Ok(Some(SigningKey::new(secret, key_id)))
}

fn parse_url(what: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(what.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("CDD_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),
    #[error("CDD_SIGNING_KEY_ID must be printable ASCII without spaces, got {0:?}")]
    InvalidSigningKeyId(String),
    #[error("cannot sign request: {0}")]
    Signing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_backend() {
        let cfg = ApiConfig::parse(DEFAULT_API_URL).unwrap();
        assert_eq!(cfg.base_url.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(cfg.timeout_secs, 30);
        assert!(cfg.signing.is_none());
    }

    #[test]
    fn signing_key_read_from_env() {
        std::env::set_var("CDD_TEST_SIGN_SECRET", "s3cret");
        std::env::set_var("CDD_TEST_SIGN_KEY_ID", "web-1");
        let key = signing_from_env("CDD_TEST_SIGN_SECRET", "CDD_TEST_SIGN_KEY_ID");
        std::env::remove_var("CDD_TEST_SIGN_SECRET");
        std::env::remove_var("CDD_TEST_SIGN_KEY_ID");
        let key = key.unwrap().unwrap();
        assert_eq!(key.secret(), b"s3cret");
        assert_eq!(key.key_id(), Some("web-1"));
        assert!(!format!("{key:?}").contains("s3cret"));
    }

    #[test]
    fn empty_signing_secret_disables_signing() {
        std::env::set_var("CDD_TEST_SIGN_EMPTY", "");
        let key = signing_from_env("CDD_TEST_SIGN_EMPTY", "CDD_TEST_SIGN_EMPTY_ID");
        std::env::remove_var("CDD_TEST_SIGN_EMPTY");
        assert_eq!(key.unwrap(), None);
    }

    #[test]
    fn key_id_with_spaces_is_rejected() {
        std::env::set_var("CDD_TEST_SIGN_SECRET2", "s3cret");
        std::env::set_var("CDD_TEST_SIGN_KEY_ID2", "web 1");
        let key = signing_from_env("CDD_TEST_SIGN_SECRET2", "CDD_TEST_SIGN_KEY_ID2");
        std::env::remove_var("CDD_TEST_SIGN_SECRET2");
        std::env::remove_var("CDD_TEST_SIGN_KEY_ID2");
        assert!(matches!(key, Err(ConfigError::InvalidSigningKeyId(id)) if id == "web 1"));
    }

    #[test]
    fn endpoint_url_handles_trailing_slash() {
        let cfg = ApiConfig::parse("http://example.com/").unwrap();
        assert_eq!(
            cfg.endpoint_url("/api/clients/"),
            "http://example.com/api/clients/"
        );
        let prefixed = ApiConfig::parse("http://example.com/backend").unwrap();
        assert_eq!(
            prefixed.endpoint_url("/api/clients/"),
            "http://example.com/backend/api/clients/"
        );
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("CDD_NONEXISTENT_VAR_12345", "https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn env_url_rejects_invalid_url() {
        std::env::set_var("CDD_TEST_BAD_URL", "not a url");
        let result = env_url("CDD_TEST_BAD_URL", "https://example.com");
        std::env::remove_var("CDD_TEST_BAD_URL");
        assert!(matches!(result, Err(ConfigError::InvalidUrl(var, _)) if var == "CDD_TEST_BAD_URL"));
    }
}
