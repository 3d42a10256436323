//! REST client error types.

use cdd_assessment::DraftError;
use cdd_state::LifecycleError;

/// Errors from backend calls and the workflows built on them.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The backend returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
    /// A status change the assessment lifecycle does not allow.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    /// The draft could not be edited.
    #[error(transparent)]
    Draft(#[from] DraftError),
}

impl ApiError {
    /// HTTP status of a backend rejection, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The notification text shown to a user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Lifecycle(LifecycleError::NotDecided { .. }) => {
                "Only approved or rejected assessments can be pushed."
            }
            Self::Lifecycle(_) => "This assessment can no longer be changed.",
            Self::Draft(_) => "Invalid assessment data.",
            _ => match self.status() {
                Some(401) => "Please log in again.",
                Some(400) => "Invalid assessment data.",
                Some(404) => "Not found.",
                _ => "Server unavailable or network error.",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdd_state::AssessmentStatus;

    fn api(status: u16) -> ApiError {
        ApiError::Api {
            endpoint: "POST /api/assessments/".into(),
            status,
            body: String::new(),
        }
    }

    #[test]
    fn user_messages_follow_status() {
        assert_eq!(api(401).user_message(), "Please log in again.");
        assert_eq!(api(400).user_message(), "Invalid assessment data.");
        assert_eq!(api(404).user_message(), "Not found.");
        assert_eq!(api(500).user_message(), "Server unavailable or network error.");
        assert_eq!(api(403).user_message(), "Server unavailable or network error.");
    }

    #[test]
    fn lifecycle_errors_are_not_server_errors() {
        let err = ApiError::from(LifecycleError::TerminalState {
            state: AssessmentStatus::Approved,
        });
        assert_eq!(err.status(), None);
        assert_eq!(err.user_message(), "This assessment can no longer be changed.");
    }

    #[test]
    fn undecided_push_has_its_own_message() {
        let err = ApiError::from(LifecycleError::NotDecided {
            state: AssessmentStatus::Pending,
        });
        assert_eq!(
            err.user_message(),
            "Only approved or rejected assessments can be pushed."
        );
    }

    #[test]
    fn display_names_the_endpoint() {
        let msg = api(400).to_string();
        assert!(msg.contains("POST /api/assessments/"));
        assert!(msg.contains("400"));
    }
}
