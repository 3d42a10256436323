//! # Session File
//!
//! `session.json` in the state directory holds the bearer tokens, the
//! selected company and the selected distribution channel between
//! invocations. A missing file is an anonymous session.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write as _};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cdd_client::SessionContext;
use cdd_core::{ChannelId, CompanyId};

/// File name inside the state directory.
pub const SESSION_FILE: &str = "session.json";

/// On-disk form of a [`SessionContext`].
#[derive(Default, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelId>,
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("access", &self.access.as_ref().map(|_| "[REDACTED]"))
            .field("refresh", &self.refresh.as_ref().map(|_| "[REDACTED]"))
            .field("company", &self.company)
            .field("channel", &self.channel)
            .finish()
    }
}

impl StoredSession {
    pub fn from_context(session: &SessionContext) -> Self {
        Self {
            access: session.access_token().map(str::to_string),
            refresh: session.refresh_token().map(str::to_string),
            company: session.company(),
            channel: session.channel(),
        }
    }

    pub fn into_context(self) -> SessionContext {
        let base = match (self.access, self.refresh) {
            (Some(access), Some(refresh)) => SessionContext::with_tokens(access, refresh),
            _ => SessionContext::anonymous(),
        };
        base.with_company(self.company).with_channel(self.channel)
    }
}

/// Read the session file. Absent means anonymous.
pub fn load(path: &Path) -> Result<StoredSession> {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content)
            .with_context(|| format!("corrupt session file: {}", path.display())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoredSession::default()),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Write the session file, creating the state directory if needed.
///
/// On unix a new file is created owner-only, and an existing file is
/// narrowed to owner-only before the tokens are written.
pub fn save(path: &Path, session: &StoredSession) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(session)?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    private_mode(&mut options);
    let mut file = options
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    restrict_permissions(&file, path)?;
    file.write_all(json.as_bytes())
        .and_then(|()| file.sync_all())
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(unix)]
fn private_mode(options: &mut OpenOptions) {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o600);
}

#[cfg(not(unix))]
fn private_mode(_options: &mut OpenOptions) {}

// `mode` only applies when the file is created.
#[cfg(unix)]
fn restrict_permissions(file: &std::fs::File, path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &std::fs::File, _path: &Path) -> Result<()> {
    Ok(())
}
