//! Pre-authored reasons used when the explanation service is unavailable.

use std::sync::Mutex;

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;

use super::RiskLevel;

const LOW_REASONS: &[&str] = &[
    "Your schedule today leaves plenty of room to breathe.",
    "A balanced day with enough space between commitments.",
    "Light load today, a good chance to recharge.",
    "Nothing too demanding on the calendar today, keep it steady.",
];

const MEDIUM_REASONS: &[&str] = &[
    "A fairly busy day, so make sure to take short breaks.",
    "Your load is building up; a pause between blocks will help.",
    "Moderately packed schedule, watch your energy in the afternoon.",
    "Some long stretches today, plan a few moments to reset.",
];

const HIGH_REASONS: &[&str] = &[
    "Today is packed with long stretches of work, so protect your breaks.",
    "Heavy schedule ahead; recovery time matters more than usual today.",
    "Long continuous blocks put you at risk of burning out, slow down where you can.",
    "A demanding day, so step away from the desk whenever you get the chance.",
];

/// Reason bank keyed by level, with a seedable generator for variety.
pub struct FallbackBank {
    rng: Mutex<Mcg128Xsl64>,
}

impl FallbackBank {
    /// Bank seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(Mcg128Xsl64::from_entropy()),
        }
    }

    /// Bank with a fixed seed, for reproducible picks.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(Mcg128Xsl64::seed_from_u64(seed)),
        }
    }

    /// All reasons available for a level.
    pub fn reasons(level: RiskLevel) -> &'static [&'static str] {
        match level {
            RiskLevel::Low => LOW_REASONS,
            RiskLevel::Medium => MEDIUM_REASONS,
            RiskLevel::High => HIGH_REASONS,
        }
    }

    /// Pick one reason for `level`.
    pub fn pick(&self, level: RiskLevel) -> &'static str {
        let reasons = Self::reasons(level);
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        reasons.choose(&mut *rng).copied().unwrap_or(reasons[0])
    }
}

impl Default for FallbackBank {
    fn default() -> Self {
        Self::new()
    }
}
