//! # cdd-client — Typed Rust client for the CDD backend
//!
//! Provides typed access to the REST resources of the CDD portal backend:
//! - **Clients** via `/api/clients/`
//! - **Catalog** via `/api/questions/` and `/api/categories/`
//! - **Assessments** via `/api/assessments/` and `/api/answers/`
//! - **Distribution channels** via `/api/distribution-channels/`
//! - **Tokens** via `/api/token/` and `/api/token/refresh/`
//!
//! Plus the **workflow** layer: saving and submitting a local draft,
//! listing the approval queue, and approving or rejecting a submission.
//!
//! ## Session
//!
//! The client holds an explicit [`SessionContext`] (tokens, selected
//! company and selected channel). Every request carries
//! `Authorization: Bearer <access>`, and a non-superuser with a selected
//! company also sends `X-Company-ID`. A `401` triggers one token refresh
//! and one resend; nothing else is retried.
//!
//! With a [`SigningKey`] configured, every request also carries an HMAC
//! signature (see [`signing`]).

pub mod assessments;
pub mod auth;
pub mod catalog;
pub mod channels;
pub mod clients;
pub mod config;
pub mod error;
pub mod signing;
pub(crate) mod transport;
pub mod types;
pub mod workflow;

pub use auth::{Credentials, SessionContext, TokenClaims};
pub use channels::ChannelRecord;
pub use config::{ApiConfig, SigningKey};
pub use error::ApiError;
pub use workflow::{
    ApprovalItem, AssessmentRow, AssessmentTabs, AssessmentView, Decision, SaveIntent, SaveOutcome,
};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use cdd_core::{ChannelId, CompanyId};

use crate::auth::{LoginRequest, TokenPair};
use crate::transport::Transport;

/// Path of the token obtain endpoint.
const LOGIN_PATH: &str = "/api/token/";

/// Top-level backend client. Holds one sub-client per resource group; all
/// of them share the HTTP connection pool and the session.
#[derive(Debug, Clone)]
pub struct CddClient {
    transport: Transport,
    clients: clients::ClientsApi,
    catalog: catalog::CatalogApi,
    assessments: assessments::AssessmentsApi,
    channels: channels::ChannelsApi,
}

impl CddClient {
    /// Create a client from configuration and an initial session.
    pub fn new(config: ApiConfig, session: SessionContext) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        let transport = Transport::new(
            http,
            config.base_url,
            Arc::new(RwLock::new(session)),
            config.signing,
        );

        Ok(Self {
            clients: clients::ClientsApi::new(transport.clone()),
            catalog: catalog::CatalogApi::new(transport.clone()),
            assessments: assessments::AssessmentsApi::new(transport.clone()),
            channels: channels::ChannelsApi::new(transport.clone()),
            transport,
        })
    }

    /// Access the client-record endpoints.
    pub fn clients(&self) -> &clients::ClientsApi {
        &self.clients
    }

    /// Access the question and category endpoints.
    pub fn catalog(&self) -> &catalog::CatalogApi {
        &self.catalog
    }

    /// Access the assessment and answer endpoints.
    pub fn assessments(&self) -> &assessments::AssessmentsApi {
        &self.assessments
    }

    /// Access the distribution channel endpoints.
    pub fn channels(&self) -> &channels::ChannelsApi {
        &self.channels
    }

    /// Snapshot of the current session, including any refreshed token.
    pub async fn session(&self) -> SessionContext {
        self.transport.session().read().await.clone()
    }

    /// Choose the company subsequent requests act for.
    pub async fn select_company(&self, company: Option<CompanyId>) {
        self.transport.session().write().await.set_company(company);
    }

    /// Choose the distribution channel the user works through.
    pub async fn select_channel(&self, channel: Option<ChannelId>) {
        self.transport.session().write().await.set_channel(channel);
    }

    /// Obtain a token pair for `credentials` and store it in the session.
    ///
    /// Calls `POST /api/token/` without the current session's headers.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let endpoint = "POST /api/token/";
        let req = self
            .transport
            .http()
            .post(self.transport.url(LOGIN_PATH))
            .json(&LoginRequest {
                email: &credentials.email,
                password: credentials.password.as_str(),
            });
        let resp = self.transport.send_anonymous(endpoint, req).await?;
        let tokens: TokenPair = transport::decode(endpoint, resp).await?;
        self.transport.session().write().await.set_tokens(tokens);
        tracing::info!(email = %credentials.email, "logged in");
        Ok(())
    }

    /// Drop the session tokens.
    pub async fn logout(&self) {
        self.transport.session().write().await.clear_tokens();
    }
}
