//! The generation provider seam.
//!
//! The sequencer and version manager never talk to a concrete model
//! backend; they hand a [`GenerationRequest`] to whatever implements
//! [`GenerationProvider`] and consume the structured output. Backends for
//! real model APIs, local models, or test doubles all plug in here.

use crate::core::{GenerationMetrics, VersionContent};
use crate::registry::ProviderTag;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// A provider-level failure, attributed to the backend and stage it
/// occurred in.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("provider {provider} failed in stage '{stage_id}': {message}")]
pub struct ProviderError {
    /// Backend that failed.
    pub provider: ProviderTag,
    /// Stage being generated when the failure occurred.
    pub stage_id: String,
    /// Backend failure message.
    pub message: String,
}

impl ProviderError {
    /// Creates a provider error.
    #[must_use]
    pub fn new(
        provider: ProviderTag,
        stage_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            stage_id: stage_id.into(),
            message: message.into(),
        }
    }
}

/// Everything a backend needs to produce one content version.
///
/// Built from the stage registry entry plus the applied requirement
/// analysis; regeneration additionally carries feedback context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Stage the content is for.
    pub stage_id: String,
    /// Backend this request is routed to.
    pub provider: ProviderTag,
    /// Stage-specific instructions derived from the selected requirements.
    pub instructions: Vec<String>,
    /// Focus areas the analysis surfaced.
    pub focus_areas: Vec<String>,
    /// Audience emphasis, when a target audience was selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_emphasis: Option<String>,
    /// Depth multiplier for this stage, derived from requirement weights.
    pub weight_multiplier: f64,
    /// User feedback to address; present only for regeneration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_context: Option<String>,
}

/// What a backend returns for one version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutput {
    /// The structured content.
    pub content: VersionContent,
    /// Backend quality self-assessment, 0 to 100.
    pub quality_score: f64,
    /// Token, latency and cost accounting.
    pub metrics: GenerationMetrics,
}

/// A content generation backend.
#[async_trait]
pub trait GenerationProvider: Send + Sync + Debug {
    /// Produces one content version for the request.
    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationOutput, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::new(ProviderTag::Zhipu, "market_research", "timeout");
        assert_eq!(
            err.to_string(),
            "provider zhipu failed in stage 'market_research': timeout"
        );
    }

    #[test]
    fn test_generation_request_serializes_without_empty_options() {
        let request = GenerationRequest {
            stage_id: "concept_analysis".to_string(),
            provider: ProviderTag::DeepSeek,
            instructions: vec!["focus on differentiation".to_string()],
            focus_areas: Vec::new(),
            audience_emphasis: None,
            weight_multiplier: 1.2,
            feedback_context: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("audience_emphasis").is_none());
        assert!(json.get("feedback_context").is_none());
    }
}
