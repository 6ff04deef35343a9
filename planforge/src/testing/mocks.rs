//! Deterministic test doubles for the provider and event seams.

use crate::core::{GenerationMetrics, VersionContent};
use crate::events::EventSink;
use crate::providers::{GenerationOutput, GenerationProvider, GenerationRequest, ProviderError};
use crate::testing::fixtures;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;

/// A deterministic [`GenerationProvider`].
///
/// Output is derived from the request, so tests can assert on it. Stages
/// can be marked failing to simulate provider outages; failure marks are
/// clearable so retry paths can be exercised.
#[derive(Debug, Default)]
pub struct MockProvider {
    calls: Mutex<Vec<GenerationRequest>>,
    fail_stages: Mutex<HashSet<String>>,
    fail_calls: Mutex<HashSet<usize>>,
}

impl MockProvider {
    /// Creates a provider that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider that fails for one stage.
    #[must_use]
    pub fn failing_for(stage_id: &str) -> Self {
        let provider = Self::new();
        provider.fail_stage(stage_id);
        provider
    }

    /// Marks a stage as failing.
    pub fn fail_stage(&self, stage_id: &str) {
        self.fail_stages.lock().insert(stage_id.to_string());
    }

    /// Clears a failure mark so the stage succeeds again.
    pub fn clear_failure(&self, stage_id: &str) {
        self.fail_stages.lock().remove(stage_id);
    }

    /// Marks the n-th generate call (1-based) as failing, regardless of
    /// stage. Models a transient outage mid-generation.
    pub fn fail_call(&self, call_number: usize) {
        self.fail_calls.lock().insert(call_number);
    }

    /// Total number of generate calls, including failed ones.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.calls.lock().clone()
    }

    /// Requests received for one stage.
    #[must_use]
    pub fn requests_for(&self, stage_id: &str) -> Vec<GenerationRequest> {
        self.calls
            .lock()
            .iter()
            .filter(|r| r.stage_id == stage_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutput, ProviderError> {
        let call_number = {
            let mut calls = self.calls.lock();
            calls.push(request.clone());
            calls.len()
        };

        if self.fail_stages.lock().contains(&request.stage_id)
            || self.fail_calls.lock().contains(&call_number)
        {
            return Err(ProviderError::new(
                request.provider,
                &request.stage_id,
                "simulated provider outage",
            ));
        }

        let mut content: VersionContent =
            fixtures::sample_content(&format!("{} draft {call_number}", request.stage_id));
        if let Some(context) = &request.feedback_context {
            content.summary = format!("Revised for: {context}");
        }

        Ok(GenerationOutput {
            content,
            quality_score: 70.0 + request.instructions.len() as f64,
            metrics: GenerationMetrics {
                input_tokens: 1200,
                output_tokens: 800,
                latency_ms: 42.0,
                cost: 0.02 * request.weight_multiplier,
            },
        })
    }
}

/// An [`EventSink`] that records every event for assertions.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<(String, Option<serde_json::Value>)>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every collected event, in emit order.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Option<serde_json::Value>)> {
        self.events.read().clone()
    }

    /// Event types only, in emit order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events.read().iter().map(|(t, _)| t.clone()).collect()
    }

    /// Events whose type starts with a prefix.
    #[must_use]
    pub fn events_of_type(&self, prefix: &str) -> Vec<(String, Option<serde_json::Value>)> {
        self.events
            .read()
            .iter()
            .filter(|(t, _)| t.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Whether nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }
}
