//! # Client Records
//!
//! The customer under due diligence, as returned by `/api/clients/`.
//! The backend uses camelCase field names for client records.

use serde::{Deserialize, Serialize};

use crate::identity::{ClientId, CompanyId};

/// Fallback display name when neither a personal nor a corporate name is set.
pub const UNNAMED_CLIENT: &str = "Unnamed Client";

/// Whether the client is a natural person or a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    #[default]
    Individual,
    Corporate,
}

/// Sales channel through which the client was onboarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DistributionChannel {
    #[default]
    HeadOffice,
    Broker,
    Agent,
}

/// A client record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub id: ClientId,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub client_type: ClientType,
    #[serde(default)]
    pub distribution_channel: DistributionChannel,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub corporate_name: String,
    #[serde(default)]
    pub national_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub company: Option<CompanyId>,
}

impl ClientRecord {
    /// Personal name, else corporate name, else [`UNNAMED_CLIENT`].
    pub fn display_name(&self) -> &str {
        if !self.full_name.is_empty() {
            &self.full_name
        } else if !self.corporate_name.is_empty() {
            &self.corporate_name
        } else {
            UNNAMED_CLIENT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(full: &str, corporate: &str) -> ClientRecord {
        serde_json::from_value(serde_json::json!({
            "id": 5,
            "fullName": full,
            "corporateName": corporate,
        }))
        .unwrap()
    }

    #[test]
    fn display_name_prefers_full_name() {
        assert_eq!(record("Jane Doe", "Acme Ltd").display_name(), "Jane Doe");
    }

    #[test]
    fn display_name_falls_back_to_corporate_name() {
        assert_eq!(record("", "Acme Ltd").display_name(), "Acme Ltd");
    }

    #[test]
    fn display_name_unnamed() {
        assert_eq!(record("", "").display_name(), UNNAMED_CLIENT);
    }

    #[test]
    fn deserializes_backend_payload() {
        let c: ClientRecord = serde_json::from_value(serde_json::json!({
            "id": 3,
            "reference": "CORP-1100002",
            "clientType": "corporate",
            "distributionChannel": "Broker",
            "corporateName": "Acme Ltd",
            "brn": "C1234",
            "company": 2
        }))
        .unwrap();
        assert_eq!(c.client_type, ClientType::Corporate);
        assert_eq!(c.distribution_channel, DistributionChannel::Broker);
        assert_eq!(c.company, Some(CompanyId(2)));
    }
}
