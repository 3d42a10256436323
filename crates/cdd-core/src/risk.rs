//! # Risk Level Classification
//!
//! Maps a total questionnaire score to a three-tier risk level.
//!
//! ```text
//!   score <  40          → low
//!   40 <= score < 70     → medium
//!   score >= 70          → high
//! ```
//!
//! The thresholds are fixed for every deployment today. [`RiskThresholds`]
//! exists so that a per-deployment table can be introduced later without
//! touching call sites; everything in the workspace uses
//! [`RiskThresholds::default()`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CddError;

/// Risk tier of a client, derived from the assessment total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Classify a score against the standard thresholds.
    pub fn from_score(score: i64) -> Self {
        RiskThresholds::default().classify(score)
    }

    /// Lowercase wire name (`low`, `medium`, `high`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = CddError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(CddError::UnknownVariant {
                kind: "risk level",
                value: s.to_string(),
            }),
        }
    }
}

/// Inclusive lower bounds of the medium and high tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Scores at or above this value are at least `Medium`.
    pub medium: i64,
    /// Scores at or above this value are `High`.
    pub high: i64,
}

impl RiskThresholds {
    /// The thresholds every deployment currently uses.
    pub const STANDARD: Self = Self {
        medium: 40,
        high: 70,
    };

    /// Classify a total score. High is checked first.
    pub fn classify(&self, score: i64) -> RiskLevel {
        if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}
