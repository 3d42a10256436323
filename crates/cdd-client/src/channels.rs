//! Distribution channels (`/api/distribution-channels/`).
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/api/distribution-channels/` | Channels the session may work through |

use serde::{Deserialize, Serialize};

use cdd_core::ChannelId;

use crate::error::ApiError;
use crate::transport::Transport;

/// A distribution channel the user is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: ChannelId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub channel_type: Option<String>,
    #[serde(default)]
    pub channel_type_display: Option<String>,
}

impl ChannelRecord {
    /// Human-readable channel type, preferring the backend's display label.
    pub fn type_label(&self) -> &str {
        self.channel_type_display
            .as_deref()
            .or(self.channel_type.as_deref())
            .unwrap_or_default()
    }
}

/// Distribution channel endpoints.
#[derive(Debug, Clone)]
pub struct ChannelsApi {
    transport: Transport,
}

impl ChannelsApi {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Calls `GET /api/distribution-channels/`.
    pub async fn list(&self) -> Result<Vec<ChannelRecord>, ApiError> {
        self.transport
            .get("GET /api/distribution-channels/", "/api/distribution-channels/")
            .await
    }
}
