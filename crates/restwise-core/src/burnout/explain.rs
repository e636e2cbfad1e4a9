//! Natural-language reasons from an external text service.
//!
//! [`ExplainingClassifier`] decorates the pure classifier: the level is
//! always computed locally first, and only the reason text is upgraded when
//! the service answers in time with something usable. Every failure is
//! absorbed here, mapped to a pre-authored reason, and opens the
//! [`FailureCooldown`] so a flaky service is not hammered.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use indoc::indoc;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;

use super::cooldown::FailureCooldown;
use super::enrichment::{EnrichmentGate, PendingReason};
use super::fallback::FallbackBank;
use super::{classify, BurnoutRisk, RiskLevel};
use crate::analysis::DayAnalysis;
use crate::error::ExplainError;
use crate::storage::ExplainerConfig;

/// Fixed instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = indoc! {"
    You are a supportive wellbeing assistant inside a student timetable app.
    You receive today's schedule load as JSON: total_hours, max_continuous_minutes,
    has_late_block and the computed burnout risk level.
    Reply with exactly one short sentence (under 25 words) explaining the risk level
    in plain, friendly language. No lists, no quotes, no medical advice.
"};

/// Payload describing the day to the text service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainRequest {
    /// Rounded to one decimal.
    pub total_hours: f64,
    pub max_continuous_minutes: i64,
    pub has_late_block: bool,
    pub level: RiskLevel,
}

impl ExplainRequest {
    pub fn new(analysis: &DayAnalysis, level: RiskLevel) -> Self {
        Self {
            total_hours: (analysis.total_hours() * 10.0).round() / 10.0,
            max_continuous_minutes: analysis.max_continuous_minutes,
            has_late_block: analysis.has_late_block,
            level,
        }
    }
}

/// Anything that can turn a day summary into a one-sentence reason.
#[async_trait]
pub trait ReasonSource: Send + Sync {
    async fn explain(&self, request: &ExplainRequest) -> Result<String, ExplainError>;
}

/// OpenAI-compatible chat-completions endpoint.
pub struct ChatCompletionsSource {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionsSource {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ExplainError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
        })
    }

    /// Build from configuration, reading the API key from the configured
    /// environment variable.
    pub fn from_config(config: &ExplainerConfig) -> Result<Self, ExplainError> {
        if !config.enabled {
            return Err(ExplainError::Disabled);
        }
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ExplainError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            Some(api_key),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl ReasonSource for ChatCompletionsSource {
    async fn explain(&self, request: &ExplainRequest) -> Result<String, ExplainError> {
        let user_content =
            serde_json::to_string(request).map_err(|e| ExplainError::Malformed(e.to_string()))?;
        let body = json!({
            "model": &self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": user_content },
            ],
            "max_tokens": 80,
            "temperature": 0.7,
        });

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ExplainError::Status {
                status: status.as_u16(),
            });
        }

        let value: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ExplainError::Malformed(e.to_string()))?;
        value["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ExplainError::Malformed("missing choices[0].message.content".into()))
    }
}

/// Limits applied to every explanation attempt.
#[derive(Debug, Clone)]
pub struct ExplainerSettings {
    pub timeout: Duration,
    pub cooldown: Duration,
    pub min_reply_chars: usize,
    pub max_reply_chars: usize,
}

impl Default for ExplainerSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(8),
            cooldown: super::cooldown::DEFAULT_COOLDOWN,
            min_reply_chars: 12,
            max_reply_chars: 220,
        }
    }
}

impl From<&ExplainerConfig> for ExplainerSettings {
    fn from(config: &ExplainerConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            cooldown: Duration::from_secs(config.cooldown_secs),
            min_reply_chars: config.min_reply_chars,
            max_reply_chars: config.max_reply_chars,
        }
    }
}

/// Classifier that upgrades the reason text through a [`ReasonSource`].
pub struct ExplainingClassifier<S> {
    source: S,
    settings: ExplainerSettings,
    cooldown: Arc<FailureCooldown>,
    fallback: FallbackBank,
}

impl<S: ReasonSource> ExplainingClassifier<S> {
    pub fn new(source: S, settings: ExplainerSettings) -> Self {
        let cooldown = Arc::new(FailureCooldown::new(settings.cooldown));
        Self {
            source,
            settings,
            cooldown,
            fallback: FallbackBank::new(),
        }
    }

    /// Share a cooldown with other classifiers using the same service.
    pub fn with_cooldown(mut self, cooldown: Arc<FailureCooldown>) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackBank) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn cooldown(&self) -> &Arc<FailureCooldown> {
        &self.cooldown
    }

    /// Classify, then try to replace the reason with a service-written one.
    ///
    /// Always returns a reason; on failure it comes from the fallback bank.
    pub async fn evaluate(&self, analysis: &DayAnalysis) -> BurnoutRisk {
        let base = classify(analysis);
        if analysis.is_empty() {
            return base;
        }

        match self.explain(analysis, base.level).await {
            Ok(reason) => BurnoutRisk {
                level: base.level,
                reason,
            },
            Err(err) => {
                tracing::warn!(error = %err, level = %base.level, "using fallback burnout reason");
                BurnoutRisk {
                    level: base.level,
                    reason: self.fallback.pick(base.level).to_string(),
                }
            }
        }
    }

    /// One guarded attempt against the service.
    ///
    /// Returns [`ExplainError::CoolingDown`] without calling out while the
    /// cooldown is open; any other error opens it.
    pub async fn explain(
        &self,
        analysis: &DayAnalysis,
        level: RiskLevel,
    ) -> Result<String, ExplainError> {
        if !self.cooldown.can_attempt() {
            return Err(ExplainError::CoolingDown);
        }

        let request = ExplainRequest::new(analysis, level);
        let attempt = tokio::time::timeout(self.settings.timeout, self.source.explain(&request)).await;
        let result = match attempt {
            Ok(reply) => reply.and_then(|text| self.accept_reply(&text)),
            Err(_) => Err(ExplainError::Timeout {
                timeout_ms: self.settings.timeout.as_millis() as u64,
            }),
        };

        if result.is_err() {
            self.cooldown.record_failure();
            tracing::info!(
                cooldown_secs = self.cooldown.window().as_secs(),
                "explanation service failed, cooling down"
            );
        }
        result
    }

    fn accept_reply(&self, text: &str) -> Result<String, ExplainError> {
        let cleaned = text
            .trim()
            .trim_matches(|c| c == '"' || c == '\u{201c}' || c == '\u{201d}')
            .trim();
        if cleaned.is_empty() {
            return Err(ExplainError::Malformed("empty reply".into()));
        }
        let len = cleaned.chars().count();
        if len < self.settings.min_reply_chars || len > self.settings.max_reply_chars {
            return Err(ExplainError::OutOfBounds { len });
        }
        Ok(cleaned.to_string())
    }
}

impl<S: ReasonSource + 'static> ExplainingClassifier<S> {
    /// Return the deterministic risk now and enrich it in the background.
    ///
    /// The pending reason only resolves if no newer request was issued on
    /// `gate` in the meantime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime, since the enrichment runs
    /// on a task spawned with [`tokio::spawn`].
    pub fn spawn_enrichment(
        self: Arc<Self>,
        gate: &EnrichmentGate,
        analysis: DayAnalysis,
    ) -> (BurnoutRisk, PendingReason) {
        let immediate = classify(&analysis);
        let token = gate.issue();
        let handle = tokio::spawn(async move { self.evaluate(&analysis).await });
        gate.track(token, handle.abort_handle());
        (immediate, PendingReason::new(token, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedReply(&'static str);

    #[async_trait]
    impl ReasonSource for FixedReply {
        async fn explain(&self, _request: &ExplainRequest) -> Result<String, ExplainError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct FailingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReasonSource for FailingSource {
        async fn explain(&self, _request: &ExplainRequest) -> Result<String, ExplainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ExplainError::Status { status: 503 })
        }
    }

    struct SlowSource;

    #[async_trait]
    impl ReasonSource for SlowSource {
        async fn explain(&self, _request: &ExplainRequest) -> Result<String, ExplainError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("Far too late to matter anymore.".to_string())
        }
    }

    fn busy_day() -> DayAnalysis {
        DayAnalysis {
            total_minutes: 450,
            max_continuous_minutes: 200,
            has_late_block: false,
        }
    }

    fn fast_settings() -> ExplainerSettings {
        ExplainerSettings {
            timeout: Duration::from_millis(50),
            ..ExplainerSettings::default()
        }
    }

    #[test]
    fn test_request_rounds_hours() {
        let analysis = DayAnalysis {
            total_minutes: 293,
            max_continuous_minutes: 95,
            has_late_block: true,
        };
        let req = ExplainRequest::new(&analysis, RiskLevel::Medium);
        assert_eq!(req.total_hours, 4.9);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["level"], "medium");
        assert_eq!(json["max_continuous_minutes"], 95);
    }

    #[tokio::test]
    async fn test_service_reply_replaces_reason_but_not_level() {
        let classifier = ExplainingClassifier::new(
            FixedReply("  \"A long day, so pace yourself between classes.\" "),
            fast_settings(),
        );
        let risk = classifier.evaluate(&busy_day()).await;
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(risk.reason, "A long day, so pace yourself between classes.");
        assert!(classifier.cooldown().can_attempt());
    }

    #[tokio::test]
    async fn test_failure_falls_back_and_opens_cooldown() {
        let classifier = ExplainingClassifier::new(FailingSource::default(), fast_settings())
            .with_fallback(FallbackBank::seeded(1));
        let risk = classifier.evaluate(&busy_day()).await;
        assert_eq!(risk.level, RiskLevel::High);
        assert!(FallbackBank::reasons(RiskLevel::High).contains(&risk.reason.as_str()));
        assert!(!classifier.cooldown().can_attempt());

        // Second call inside the window never reaches the service.
        let again = classifier.evaluate(&busy_day()).await;
        assert_eq!(again.level, RiskLevel::High);
        assert_eq!(classifier.source.calls.load(Ordering::SeqCst), 1);

        classifier.cooldown().reset();
        let _ = classifier.evaluate(&busy_day()).await;
        assert_eq!(classifier.source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure() {
        let classifier = ExplainingClassifier::new(SlowSource, fast_settings());
        let err = classifier
            .explain(&busy_day(), RiskLevel::High)
            .await
            .unwrap_err();
        assert!(matches!(err, ExplainError::Timeout { timeout_ms: 50 }));
        assert!(!classifier.cooldown().can_attempt());
    }

    #[tokio::test]
    async fn test_out_of_bounds_reply_rejected() {
        let short = ExplainingClassifier::new(FixedReply("Rest."), fast_settings());
        assert!(matches!(
            short.explain(&busy_day(), RiskLevel::High).await,
            Err(ExplainError::OutOfBounds { len: 5 })
        ));

        let long_text: &'static str = Box::leak("word ".repeat(100).into_boxed_str());
        let long = ExplainingClassifier::new(FixedReply(long_text), fast_settings());
        assert!(matches!(
            long.explain(&busy_day(), RiskLevel::High).await,
            Err(ExplainError::OutOfBounds { .. })
        ));

        let empty = ExplainingClassifier::new(FixedReply("  \"\" "), fast_settings());
        assert!(matches!(
            empty.explain(&busy_day(), RiskLevel::High).await,
            Err(ExplainError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_day_skips_service() {
        let classifier = ExplainingClassifier::new(FailingSource::default(), fast_settings());
        let risk = classifier.evaluate(&DayAnalysis::default()).await;
        assert_eq!(risk.reason, super::super::NO_ACTIVITIES_REASON);
        assert_eq!(classifier.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shared_cooldown_between_classifiers() {
        let shared = Arc::new(FailureCooldown::new(Duration::from_secs(60)));
        let failing = ExplainingClassifier::new(FailingSource::default(), fast_settings())
            .with_cooldown(shared.clone());
        let healthy = ExplainingClassifier::new(
            FixedReply("Plenty of time to rest today."),
            fast_settings(),
        )
        .with_cooldown(shared);

        let _ = failing.evaluate(&busy_day()).await;
        assert!(matches!(
            healthy.explain(&busy_day(), RiskLevel::High).await,
            Err(ExplainError::CoolingDown)
        ));
    }

    #[tokio::test]
    async fn test_chat_completions_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"Back-to-back classes make today heavy."}}]}"#,
            )
            .create_async()
            .await;

        let source = ChatCompletionsSource::new(
            format!("{}/v1/chat/completions", server.url()),
            "test-model",
            Some("test-key".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        let request = ExplainRequest::new(&busy_day(), RiskLevel::High);
        let reply = source.explain(&request).await.unwrap();
        assert_eq!(reply, "Back-to-back classes make today heavy.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_completions_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .create_async()
            .await;

        let source = ChatCompletionsSource::new(
            format!("{}/v1/chat/completions", server.url()),
            "test-model",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        let err = source
            .explain(&ExplainRequest::new(&busy_day(), RiskLevel::High))
            .await
            .unwrap_err();
        assert!(matches!(err, ExplainError::Status { status: 500 }));
    }

    #[tokio::test]
    async fn test_chat_completions_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"unexpected": true}"#)
            .create_async()
            .await;

        let source = ChatCompletionsSource::new(
            format!("{}/v1/chat/completions", server.url()),
            "test-model",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        let err = source
            .explain(&ExplainRequest::new(&busy_day(), RiskLevel::Low))
            .await
            .unwrap_err();
        assert!(matches!(err, ExplainError::Malformed(_)));
    }

    #[test]
    fn test_from_config_requires_enabled_and_key() {
        let mut config = ExplainerConfig::default();
        assert!(matches!(
            ChatCompletionsSource::from_config(&config),
            Err(ExplainError::Disabled)
        ));

        config.enabled = true;
        config.api_key_env = "RESTWISE_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        assert!(matches!(
            ChatCompletionsSource::from_config(&config),
            Err(ExplainError::MissingApiKey(_))
        ));
    }
}
