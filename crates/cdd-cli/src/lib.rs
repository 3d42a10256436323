//! # cdd-cli — Command-line front end for CDD risk assessment
//!
//! Provides the `cdd` binary.
//!
//! ## Subcommands
//!
//! - `cdd login` / `cdd logout`: obtain or drop backend tokens.
//! - `cdd company`: select the company requests act for.
//! - `cdd channel`: select or list the distribution channel.
//! - `cdd clients`: list client records.
//! - `cdd catalog`: print the questionnaire.
//! - `cdd assess`: edit, save, submit, list and push assessments.
//! - `cdd score`: score a draft offline against a catalog file.
//! - `cdd approvals`: list, approve and reject submissions.
//!
//! ## State Directory
//!
//! ```text
//! <state-dir>/
//!   session.json            tokens, company and channel (mode 0600)
//!   drafts/<key>.json       one file per draft cache entry
//! ```
//!
//! The state directory is `--state-dir`, else `CDD_STATE_DIR`, else `.cdd`
//! in the current directory.

pub mod account;
pub mod approvals;
pub mod assess;
pub mod catalog;
pub mod session;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use cdd_assessment::{DraftCache, FileStore};
use cdd_client::{ApiConfig, CddClient};
use cdd_core::Catalog;

/// Default state directory, relative to the working directory.
pub const DEFAULT_STATE_DIR: &str = ".cdd";

/// Resolved global options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub state_dir: PathBuf,
    pub api: ApiConfig,
}

impl CliContext {
    /// Resolve the global options against the environment.
    pub fn resolve(api_url: Option<&str>, state_dir: Option<PathBuf>) -> Result<Self> {
        let mut api = ApiConfig::from_env().context("invalid backend configuration")?;
        if let Some(raw) = api_url {
            api.base_url = ApiConfig::parse(raw)
                .context("invalid --api-url")?
                .base_url;
        }
        let state_dir = state_dir
            .or_else(|| std::env::var_os("CDD_STATE_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));
        Ok(Self { state_dir, api })
    }

    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join(session::SESSION_FILE)
    }

    pub fn drafts_dir(&self) -> PathBuf {
        self.state_dir.join("drafts")
    }

    /// Draft cache backed by the state directory.
    pub fn drafts(&self) -> DraftCache<FileStore> {
        DraftCache::new(FileStore::new(self.drafts_dir()))
    }

    /// Backend client for the stored session.
    pub fn client(&self) -> Result<CddClient> {
        let stored = session::load(&self.session_file())?;
        CddClient::new(self.api.clone(), stored.into_context())
            .context("failed to build backend client")
    }

    /// Write the client's current session back to disk, so refreshed or
    /// cleared tokens survive the process.
    pub async fn save_session(&self, client: &CddClient) -> Result<()> {
        let current = client.session().await;
        session::save(&self.session_file(), &session::StoredSession::from_context(&current))
    }
}

/// Load a catalog from a YAML or JSON file (`.json` selects JSON).
pub fn load_catalog_file(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog: {}", path.display()))?;
    let parsed: Catalog = if path.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON catalog: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML catalog: {}", path.display()))?
    };
    Ok(Catalog::new(parsed.categories, parsed.questions))
}

/// Catalog from `path` when given, else from the backend.
pub async fn resolve_catalog(path: Option<&Path>, client: Option<&CddClient>) -> Result<Catalog> {
    match (path, client) {
        (Some(path), _) => load_catalog_file(path),
        (None, Some(client)) => client.catalog().load().await.map_err(api_error),
        (None, None) => anyhow::bail!("no catalog file given and no backend client available"),
    }
}

/// Render a backend error with its user-facing message first.
pub fn api_error(e: cdd_client::ApiError) -> anyhow::Error {
    anyhow::anyhow!("{}\n  caused by: {e}", e.user_message())
}
