//! Core data model: statuses, stage state, content versions, the run
//! aggregate, and the assembled artifact.

pub mod artifact;
pub mod run;
pub mod stage;
pub mod status;
pub mod version;

pub use artifact::{ArtifactMetadata, ArtifactSection, FinalArtifact};
pub use run::{IdeaBrief, PipelineRun, RunError};
pub use stage::{PipelineStage, SubStep};
pub use status::{RunPhase, StageStatus, SubStepStatus, VersionStatus};
pub use version::{
    ConciseRendering, ContentVersion, ExpandableRendering, ExpandableSection, GenerationMetrics,
    VersionContent, VersionFeedback,
};
