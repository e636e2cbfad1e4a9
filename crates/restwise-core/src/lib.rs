//! # Restwise Core Library
//!
//! Schedule load analysis for a personal timetable: how heavy a day is, how
//! likely it is to wear the user out, and where short recovery breaks fit.
//! The `restwise` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Interval model**: activity blocks, dated or weekly, resolved to one
//!   civil day at a time
//! - **Analysis**: total load, longest continuous streak, late-night flag
//! - **Burnout**: tiered risk level with an optional service-written reason
//!   behind a timeout, fallback bank and failure cooldown
//! - **Breaks**: mid-block and gap break suggestions for a day
//! - **Conflicts**: overlap reporting for proposed blocks and breaks
//! - **Storage**: TOML configuration and a JSON timetable file for the CLI
//!
//! Everything except the explanation decorator is pure and synchronous.

pub mod analysis;
pub mod breaks;
pub mod burnout;
pub mod conflict;
pub mod error;
pub mod interval;
pub mod storage;

pub use analysis::{analyze_day, analyze_for_date, DayAnalysis};
pub use breaks::{plan_breaks_for_date, BreakPlanner, SuggestedBreak};
pub use burnout::{
    classify, BurnoutRisk, ChatCompletionsSource, EnrichmentGate, ExplainerSettings,
    ExplainingClassifier, FailureCooldown, FallbackBank, ReasonSource, RiskLevel,
};
pub use conflict::{find_conflicts, has_conflict, ProposedInterval, Scheduled};
pub use error::{ConfigError, CoreError, ExplainError, ValidationError};
pub use interval::{minutes_between, overlaps, resolve_for_date, ActivityBlock, ActivityKind, Occurrence, TimeOfDay};
pub use storage::{Config, Timetable};
