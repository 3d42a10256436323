//! # Identifier Newtypes
//!
//! Every durable record lives server-side and is addressed by the integer
//! primary key the backend assigns. These wrappers keep the namespaces apart:
//! you cannot pass a `QuestionId` where a `ClientId` is expected.
//!
//! All identifiers serialize transparently as bare integers, so they can be
//! used directly as JSON map keys (`{"12": {...}}`) and in request bodies.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CddError;

macro_rules! server_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Access the raw server key.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = CddError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| CddError::InvalidIdentifier {
                        kind: $label,
                        value: s.to_string(),
                    })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

server_id!(
    /// Identifier of a client (the customer under due diligence).
    ClientId,
    "client"
);
server_id!(
    /// Identifier of a questionnaire question.
    QuestionId,
    "question"
);
server_id!(
    /// Identifier of a single answer option of a question.
    OptionId,
    "option"
);
server_id!(
    /// Identifier of a question category.
    CategoryId,
    "category"
);
server_id!(
    /// Identifier of a server-side assessment record.
    AssessmentId,
    "assessment"
);
server_id!(
    /// Identifier of the company a non-superuser session is scoped to.
    CompanyId,
    "company"
);
server_id!(
    /// Identifier of a distribution channel a user works through.
    ChannelId,
    "distribution channel"
);
