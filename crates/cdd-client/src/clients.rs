//! Client records (`/api/clients/`).
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/api/clients/` | List clients visible to the session |
//! | GET | `/api/clients/{id}/` | Get one client |

use cdd_core::{ClientId, ClientRecord};

use crate::error::ApiError;
use crate::transport::Transport;

/// Client record endpoints.
#[derive(Debug, Clone)]
pub struct ClientsApi {
    transport: Transport,
}

impl ClientsApi {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Calls `GET /api/clients/`.
    pub async fn list(&self) -> Result<Vec<ClientRecord>, ApiError> {
        self.transport.get("GET /api/clients/", "/api/clients/").await
    }

    /// Calls `GET /api/clients/{id}/`.
    pub async fn get(&self, id: ClientId) -> Result<ClientRecord, ApiError> {
        let endpoint = format!("GET /api/clients/{id}/");
        self.transport
            .get(&endpoint, &format!("/api/clients/{id}/"))
            .await
    }
}
