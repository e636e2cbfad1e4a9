//! Burnout risk classification.
//!
//! [`classify`] is a pure tier function over a [`DayAnalysis`]. The
//! [`explain`] submodule layers an optional natural-language reason on top
//! of it without ever changing the level.

pub mod cooldown;
pub mod enrichment;
pub mod explain;
pub mod fallback;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::DayAnalysis;

pub use cooldown::FailureCooldown;
pub use enrichment::{EnrichmentGate, PendingReason, RequestToken};
pub use explain::{ChatCompletionsSource, ExplainRequest, ExplainerSettings, ExplainingClassifier, ReasonSource};
pub use fallback::FallbackBank;

/// Total committed minutes at or above which the day is high risk (7h).
pub const HIGH_TOTAL_MINUTES: i64 = 7 * 60;
/// Continuous stretch at or above which the day is high risk.
pub const HIGH_CONTINUOUS_MINUTES: i64 = 180;
/// Total committed minutes at or above which the day is medium risk (5h).
pub const MEDIUM_TOTAL_MINUTES: i64 = 5 * 60;
/// Continuous stretch at or above which the day is medium risk.
pub const MEDIUM_CONTINUOUS_MINUTES: i64 = 120;

pub const NO_ACTIVITIES_REASON: &str = "No scheduled activities today";

/// Three-tier burnout risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A risk level together with a human-readable justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnoutRisk {
    pub level: RiskLevel,
    pub reason: String,
}

/// Tier a day's load. Thresholds are inclusive.
pub fn risk_level(analysis: &DayAnalysis) -> RiskLevel {
    if analysis.is_empty() {
        RiskLevel::Low
    } else if analysis.total_minutes >= HIGH_TOTAL_MINUTES
        || analysis.max_continuous_minutes >= HIGH_CONTINUOUS_MINUTES
    {
        RiskLevel::High
    } else if analysis.total_minutes >= MEDIUM_TOTAL_MINUTES
        || analysis.max_continuous_minutes >= MEDIUM_CONTINUOUS_MINUTES
        || analysis.has_late_block
    {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Classify a day's load with a templated reason.
pub fn classify(analysis: &DayAnalysis) -> BurnoutRisk {
    if analysis.is_empty() {
        return BurnoutRisk {
            level: RiskLevel::Low,
            reason: NO_ACTIVITIES_REASON.to_string(),
        };
    }

    let level = risk_level(analysis);
    BurnoutRisk {
        level,
        reason: templated_reason(analysis, level),
    }
}

fn templated_reason(analysis: &DayAnalysis, level: RiskLevel) -> String {
    let lead = match level {
        RiskLevel::High => "Heavy day",
        RiskLevel::Medium => "Moderate day",
        RiskLevel::Low => "Manageable day",
    };
    let mut reason = format!(
        "{lead}: {:.1} hours scheduled, longest continuous stretch {} min",
        analysis.total_hours(),
        analysis.max_continuous_minutes
    );
    if analysis.has_late_block {
        reason.push_str(", with activity running past 22:00");
    }
    reason
}
