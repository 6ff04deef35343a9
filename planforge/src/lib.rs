//! # Planforge
//!
//! A staged generation pipeline that turns a raw business idea into a
//! complete, reviewable plan.
//!
//! Planforge structures the work as:
//!
//! - **Stage registry**: eight fixed stages, each with sub-steps and a
//!   provider assignment
//! - **Requirements analysis**: a questionnaire whose answers steer depth,
//!   emphasis and instructions per stage
//! - **Execution sequencing**: strictly ordered stage execution with pause,
//!   resume, stop and per-stage retry
//! - **Version management**: capped candidate versions per stage, feedback
//!   and feedback-driven regeneration
//! - **Assembly**: the selected version of every stage composed into a
//!   final artifact, exportable behind a trait
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use planforge::prelude::*;
//! use std::sync::Arc;
//!
//! let analyzer = RequirementAnalyzer::standard();
//! let analysis = analyzer.analyze(&idea, &selection).await?;
//!
//! let sequencer = Sequencer::new(idea, Arc::new(my_provider));
//! sequencer.apply_analysis(analysis)?;
//! sequencer.start()?;
//! sequencer.run().await?;
//!
//! let plan = sequencer.assemble()?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_precision_loss
)]

pub mod assembly;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod persistence;
pub mod providers;
pub mod registry;
pub mod requirements;
pub mod sequencer;
pub mod testing;
pub mod utils;
pub mod versions;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::assembly::{
        Assembler, ExportError, ExportFormat, ExportOutput, Exporter,
    };
    pub use crate::config::PipelineConfig;
    pub use crate::core::{
        ContentVersion, FinalArtifact, IdeaBrief, PipelineRun, PipelineStage,
        RunPhase, StageStatus, SubStepStatus, VersionContent, VersionFeedback,
        VersionStatus,
    };
    pub use crate::errors::{PlanforgeError, Result};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::persistence::{DraftState, DraftStore, InMemoryDraftStore};
    pub use crate::providers::{
        GenerationOutput, GenerationProvider, GenerationRequest, ProviderError,
    };
    pub use crate::registry::{ProviderTag, StageCatalog, StageSpec};
    pub use crate::requirements::{
        RequirementAnalysis, RequirementAnalyzer, RequirementCatalog,
        RequirementSelection,
    };
    pub use crate::sequencer::{RunOutcome, Sequencer};
    pub use crate::versions::{VersionComparison, VersionManager};
}
