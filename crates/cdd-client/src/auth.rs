//! Session credentials.
//!
//! [`SessionContext`] is passed into the client explicitly: the bearer
//! tokens, the selected company and the selected distribution channel. Whether the user is a superuser is read
//! from the access token's claims on every request, so a refreshed token
//! takes effect immediately.
//!
//! Tokens are held in [`Zeroizing`] buffers and redacted from `Debug`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use cdd_core::{ChannelId, CompanyId};

/// Header naming the company a non-superuser is acting for.
pub const COMPANY_HEADER: &str = "X-Company-ID";

/// Bearer tokens plus company and channel selection for one user.
#[derive(Clone, Default)]
pub struct SessionContext {
    access: Option<Zeroizing<String>>,
    refresh: Option<Zeroizing<String>>,
    company: Option<CompanyId>,
    /// Kept with the session only; no request header carries it.
    channel: Option<ChannelId>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |t: &Option<Zeroizing<String>>| t.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("SessionContext")
            .field("access", &redact(&self.access))
            .field("refresh", &redact(&self.refresh))
            .field("company", &self.company)
            .field("channel", &self.channel)
            .finish()
    }
}

impl SessionContext {
    /// A session with no credentials.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session holding an access/refresh pair.
    pub fn with_tokens(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: Some(Zeroizing::new(access.into())),
            refresh: Some(Zeroizing::new(refresh.into())),
            company: None,
            channel: None,
        }
    }

    /// Select the company requests are made for.
    pub fn with_company(mut self, company: Option<CompanyId>) -> Self {
        self.company = company;
        self
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access.as_deref().map(String::as_str)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh.as_deref().map(String::as_str)
    }

    pub fn company(&self) -> Option<CompanyId> {
        self.company
    }

    pub fn set_company(&mut self, company: Option<CompanyId>) {
        self.company = company;
    }

    /// Select the distribution channel the user works through.
    pub fn with_channel(mut self, channel: Option<ChannelId>) -> Self {
        self.channel = channel;
        self
    }

    pub fn channel(&self) -> Option<ChannelId> {
        self.channel
    }

    pub fn set_channel(&mut self, channel: Option<ChannelId>) {
        self.channel = channel;
    }

    /// Whether the user still has to pick a channel. Superusers never do.
    pub fn needs_channel(&self) -> bool {
        self.channel.is_none() && !self.is_superuser()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access.is_some()
    }

    /// Claims carried by the access token, if it decodes.
    pub fn claims(&self) -> Option<TokenClaims> {
        self.access_token().and_then(TokenClaims::decode)
    }

    pub fn is_superuser(&self) -> bool {
        self.claims().is_some_and(|c| c.is_superuser)
    }

    /// Value of [`COMPANY_HEADER`]: the selected company, omitted for
    /// superusers.
    pub fn company_header(&self) -> Option<CompanyId> {
        if self.is_superuser() {
            None
        } else {
            self.company
        }
    }

    pub(crate) fn set_tokens(&mut self, tokens: TokenPair) {
        self.access = Some(Zeroizing::new(tokens.access));
        self.refresh = Some(Zeroizing::new(tokens.refresh));
    }

    /// Replace the access token; rotate the refresh token if one was issued.
    pub(crate) fn set_access(&mut self, refreshed: RefreshedToken) {
        self.access = Some(Zeroizing::new(refreshed.access));
        if let Some(refresh) = refreshed.refresh {
            self.refresh = Some(Zeroizing::new(refresh));
        }
    }

    /// Drop both tokens. The company and channel selections are kept.
    pub fn clear_tokens(&mut self) {
        self.access = None;
        self.refresh = None;
    }
}

/// The subset of access-token claims the client looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "isSuperuser")]
    pub is_superuser: bool,
    /// Expiry as a Unix timestamp.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Decode the payload segment of a JWT. The signature is not checked;
    /// the backend does that.
    pub fn decode(token: &str) -> Option<Self> {
        let payload = token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// Login credentials.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// -- Wire types for /api/token/ ---------------------------------------------

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct RefreshedToken {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}
