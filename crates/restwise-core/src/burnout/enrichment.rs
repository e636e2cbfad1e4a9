//! Latest-request-wins guard for background reason enrichment.
//!
//! Callers show the deterministic risk straight away and swap in the
//! enriched reason later. Every request takes a fresh [`RequestToken`];
//! issuing a new one aborts the previous task, and a finished task is only
//! accepted while its token is still the latest.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::task::{AbortHandle, JoinHandle};

use super::BurnoutRisk;

/// Monotonically increasing request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct EnrichmentGate {
    latest: AtomicU64,
    inflight: Mutex<Option<AbortHandle>>,
}

impl EnrichmentGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, invalidating and aborting the previous one.
    pub fn issue(&self) -> RequestToken {
        let token = RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        if let Some(previous) = self.lock_inflight().take() {
            previous.abort();
        }
        token
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Remember the task running for `token` so a newer request can abort it.
    pub fn track(&self, token: RequestToken, handle: AbortHandle) {
        if self.is_current(token) {
            *self.lock_inflight() = Some(handle);
        } else {
            handle.abort();
        }
    }

    fn lock_inflight(&self) -> std::sync::MutexGuard<'_, Option<AbortHandle>> {
        self.inflight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// An enriched risk that may or may not still be wanted when it arrives.
#[derive(Debug)]
pub struct PendingReason {
    token: RequestToken,
    handle: JoinHandle<BurnoutRisk>,
}

impl PendingReason {
    pub fn new(token: RequestToken, handle: JoinHandle<BurnoutRisk>) -> Self {
        Self { token, handle }
    }

    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// Wait for the task; `None` if it was superseded or aborted.
    pub async fn resolve(self, gate: &EnrichmentGate) -> Option<BurnoutRisk> {
        match self.handle.await {
            Ok(risk) if gate.is_current(self.token) => Some(risk),
            Ok(_) => {
                tracing::debug!(token = self.token.0, "discarding stale enrichment");
                None
            }
            Err(err) => {
                tracing::debug!(token = self.token.0, error = %err, "enrichment task ended early");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::DayAnalysis;
    use crate::burnout::explain::{ExplainRequest, ExplainerSettings, ExplainingClassifier, ReasonSource};
    use crate::burnout::RiskLevel;
    use crate::error::ExplainError;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct DelayedReply(Duration);

    #[async_trait]
    impl ReasonSource for DelayedReply {
        async fn explain(&self, _request: &ExplainRequest) -> Result<String, ExplainError> {
            tokio::time::sleep(self.0).await;
            Ok("Take it easy between your afternoon blocks.".to_string())
        }
    }

    fn day() -> DayAnalysis {
        DayAnalysis {
            total_minutes: 320,
            max_continuous_minutes: 90,
            has_late_block: false,
        }
    }

    #[test]
    fn test_tokens_increase() {
        let gate = EnrichmentGate::new();
        let a = gate.issue();
        let b = gate.issue();
        assert!(b > a);
        assert!(!gate.is_current(a));
        assert!(gate.is_current(b));
    }

    #[test]
    #[should_panic]
    fn test_spawn_enrichment_needs_runtime() {
        let gate = EnrichmentGate::new();
        let classifier = Arc::new(ExplainingClassifier::new(
            DelayedReply(Duration::from_millis(5)),
            ExplainerSettings::default(),
        ));
        let _ = classifier.spawn_enrichment(&gate, day());
    }

    #[tokio::test]
    async fn test_current_request_resolves() {
        let gate = EnrichmentGate::new();
        let classifier = Arc::new(ExplainingClassifier::new(
            DelayedReply(Duration::from_millis(5)),
            ExplainerSettings::default(),
        ));
        let (immediate, pending) = classifier.spawn_enrichment(&gate, day());
        assert_eq!(immediate.level, RiskLevel::Medium);
        assert!(immediate.reason.starts_with("Moderate day"));

        let enriched = pending.resolve(&gate).await.unwrap();
        assert_eq!(enriched.level, RiskLevel::Medium);
        assert_eq!(enriched.reason, "Take it easy between your afternoon blocks.");
    }

    #[tokio::test]
    async fn test_newer_request_discards_older() {
        let gate = EnrichmentGate::new();
        let slow = Arc::new(ExplainingClassifier::new(
            DelayedReply(Duration::from_millis(200)),
            ExplainerSettings::default(),
        ));
        let fast = Arc::new(ExplainingClassifier::new(
            DelayedReply(Duration::from_millis(5)),
            ExplainerSettings::default(),
        ));

        let (_, first) = slow.spawn_enrichment(&gate, day());
        let (_, second) = fast.spawn_enrichment(&gate, day());

        assert!(first.resolve(&gate).await.is_none());
        assert!(second.resolve(&gate).await.is_some());
    }

    #[tokio::test]
    async fn test_token_bumped_after_completion_is_stale() {
        let gate = EnrichmentGate::new();
        let classifier = Arc::new(ExplainingClassifier::new(
            DelayedReply(Duration::from_millis(1)),
            ExplainerSettings::default(),
        ));
        let (_, pending) = classifier.spawn_enrichment(&gate, day());
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _newer = gate.issue();
        assert!(pending.resolve(&gate).await.is_none());
    }
}
