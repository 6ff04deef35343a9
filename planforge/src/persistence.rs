//! Draft persistence seam.
//!
//! A run can be snapshotted at any time and restored later. The store is a
//! trait so a real backend (a database, a file) can replace the bundled
//! in-memory implementation without touching the pipeline.

use crate::core::PipelineRun;
use crate::utils::{now_utc, Timestamp};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Draft store failure.
#[derive(Debug, Error)]
pub enum DraftError {
    /// No draft under the requested id.
    #[error("no draft found with id '{0}'")]
    NotFound(String),

    /// The draft payload could not be encoded or decoded.
    #[error("draft serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A persisted snapshot of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftState {
    /// Identifier the draft was saved under.
    pub draft_id: String,
    /// When the snapshot was taken.
    pub saved_at: Timestamp,
    /// The full run state.
    pub run: PipelineRun,
}

impl DraftState {
    /// Snapshots a run under the given id.
    #[must_use]
    pub fn capture(draft_id: impl Into<String>, run: PipelineRun) -> Self {
        Self {
            draft_id: draft_id.into(),
            saved_at: now_utc(),
            run,
        }
    }
}

/// Stores and retrieves run drafts.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Persists a draft, replacing any draft under the same id.
    async fn save_draft(&self, draft: DraftState) -> Result<(), DraftError>;

    /// Loads a draft by id.
    async fn load_draft(&self, draft_id: &str) -> Result<DraftState, DraftError>;
}

/// Keeps drafts in process memory, serialized to JSON.
///
/// Round-tripping through JSON keeps this store honest about what a real
/// backend would see.
#[derive(Debug, Default)]
pub struct InMemoryDraftStore {
    drafts: DashMap<String, String>,
}

impl InMemoryDraftStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored drafts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn save_draft(&self, draft: DraftState) -> Result<(), DraftError> {
        let payload = serde_json::to_string(&draft)?;
        self.drafts.insert(draft.draft_id.clone(), payload);
        Ok(())
    }

    async fn load_draft(&self, draft_id: &str) -> Result<DraftState, DraftError> {
        let payload = self
            .drafts
            .get(draft_id)
            .ok_or_else(|| DraftError::NotFound(draft_id.to_string()))?;
        Ok(serde_json::from_str(payload.value())?)
    }
}
