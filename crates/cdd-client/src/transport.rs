//! Request execution shared by every endpoint group.
//!
//! Attaches the bearer token and company header from the current
//! [`SessionContext`], signs the request when a [`SigningKey`] is
//! configured, and on a `401` refreshes the access token once and resends.
//! There is no other retry: transport failures and every other status are
//! returned to the caller as they are.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use crate::auth::{RefreshRequest, RefreshedToken, SessionContext, COMPANY_HEADER};
use crate::config::SigningKey;
use crate::error::ApiError;
use crate::signing;

/// Path of the token refresh endpoint.
pub(crate) const REFRESH_PATH: &str = "/api/token/refresh/";

#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<RwLock<SessionContext>>,
    signing: Option<SigningKey>,
}

impl Transport {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: Url,
        session: Arc<RwLock<SessionContext>>,
        signing: Option<SigningKey>,
    ) -> Self {
        Self {
            http,
            base_url,
            session,
            signing,
        }
    }

    pub(crate) fn session(&self) -> &Arc<RwLock<SessionContext>> {
        &self.session
    }

    pub(crate) fn url(&self, path: &str) -> String {
        crate::config::join(&self.base_url, path)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        path: &str,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let resp = self.send(endpoint, |http| http.get(&url)).await?;
        decode(endpoint, resp).await
    }

    pub(crate) async fn post<B, T>(&self, endpoint: &str, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let resp = self.send(endpoint, |http| http.post(&url).json(body)).await?;
        decode(endpoint, resp).await
    }

    /// `POST` with no body.
    pub(crate) async fn post_empty<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        path: &str,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let resp = self.send(endpoint, |http| http.post(&url)).await?;
        decode(endpoint, resp).await
    }

    pub(crate) async fn patch<B, T>(&self, endpoint: &str, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let resp = self.send(endpoint, |http| http.patch(&url).json(body)).await?;
        decode(endpoint, resp).await
    }

    /// Send an authenticated request built by `build`, refreshing and
    /// resending once on `401`.
    pub(crate) async fn send<F>(&self, endpoint: &str, build: F) -> Result<Response, ApiError>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let resp = self.dispatch(endpoint, &build).await?;
        let resp = if resp.status() == StatusCode::UNAUTHORIZED && self.refresh_access().await {
            tracing::debug!(endpoint, "access token refreshed, resending");
            self.dispatch(endpoint, &build).await?
        } else {
            resp
        };
        check(endpoint, resp).await
    }

    /// Send a request without session headers. It is still signed.
    pub(crate) async fn send_anonymous(
        &self,
        endpoint: &str,
        req: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let resp = self.execute(endpoint, req).await?;
        check(endpoint, resp).await
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    async fn dispatch<F>(&self, endpoint: &str, build: &F) -> Result<Response, ApiError>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let req = self.authorize(build(&self.http)).await;
        self.execute(endpoint, req).await
    }

    /// Build `req`, sign it if configured, and send it.
    async fn execute(&self, endpoint: &str, req: RequestBuilder) -> Result<Response, ApiError> {
        let http_err = |e| ApiError::Http {
            endpoint: endpoint.into(),
            source: e,
        };
        let mut request = req.build().map_err(http_err)?;
        if let Some(key) = &self.signing {
            signing::sign_request(key, &mut request)?;
        }
        let resp = self.http.execute(request).await.map_err(http_err)?;
        tracing::debug!(endpoint, status = resp.status().as_u16(), "response");
        Ok(resp)
    }

    async fn authorize(&self, mut req: RequestBuilder) -> RequestBuilder {
        let session = self.session.read().await;
        if let Some(token) = session.access_token() {
            req = req.bearer_auth(token);
        }
        if let Some(company) = session.company_header() {
            req = req.header(COMPANY_HEADER, company.to_string());
        }
        req
    }

    /// Exchange the refresh token for a new access token. Returns whether
    /// the session now holds a fresh token. Any failure clears the tokens.
    async fn refresh_access(&self) -> bool {
        let refresh = {
            let session = self.session.read().await;
            match session.refresh_token() {
                Some(token) => zeroize::Zeroizing::new(token.to_string()),
                None => return false,
            }
        };

        let endpoint = "POST /api/token/refresh/";
        let req = self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest {
                refresh: refresh.as_str(),
            });
        let refreshed = match self.send_anonymous(endpoint, req).await {
            Ok(resp) => decode::<RefreshedToken>(endpoint, resp).await,
            Err(e) => Err(e),
        };

        let mut session = self.session.write().await;
        match refreshed {
            Ok(token) => {
                session.set_access(token);
                true
            }
            Err(e) => {
                tracing::warn!("token refresh failed, clearing session: {e}");
                session.clear_tokens();
                false
            }
        }
    }
}

async fn check(endpoint: &str, resp: Response) -> Result<Response, ApiError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Api {
        endpoint: endpoint.into(),
        status,
        body,
    })
}

pub(crate) async fn decode<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T, ApiError> {
    resp.json().await.map_err(|e| ApiError::Deserialization {
        endpoint: endpoint.into(),
        source: e,
    })
}
