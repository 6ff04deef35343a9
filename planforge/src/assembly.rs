//! Final assembly and the export boundary.
//!
//! Assembly is pure: it reads a completed run and composes the selected
//! version of every stage into a [`FinalArtifact`]. Rendering to a document
//! format happens behind the [`Exporter`] trait.

use crate::core::{ArtifactSection, FinalArtifact, PipelineRun, StageStatus};
use crate::errors::PlanforgeError;
use crate::registry::ProviderTag;
use crate::utils::now_utc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Document formats the export seam understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Portable Document Format.
    Pdf,
    /// Word document.
    Docx,
    /// Standalone HTML.
    Html,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
            Self::Html => write!(f, "html"),
        }
    }
}

/// Export backend failure.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No export backend was configured.
    #[error("no exporter is configured")]
    NotConfigured,

    /// The backend does not render this format.
    #[error("exporter does not support {0}")]
    Unsupported(ExportFormat),

    /// The backend failed while rendering.
    #[error("export failed: {0}")]
    Backend(String),
}

/// What an export produced.
#[derive(Debug, Clone)]
pub enum ExportOutput {
    /// The rendered document, in memory.
    Bytes(Vec<u8>),
    /// A handle (a path, a URL) to where the backend wrote the document.
    Handle(String),
}

/// Renders an assembled artifact into a document format.
#[async_trait]
pub trait Exporter: Send + Sync {
    /// Renders the artifact.
    async fn render(
        &self,
        artifact: &FinalArtifact,
        format: ExportFormat,
    ) -> Result<ExportOutput, ExportError>;
}

/// Composes the final artifact from a completed run.
#[derive(Default)]
pub struct Assembler {
    exporter: Option<Arc<dyn Exporter>>,
}

impl Assembler {
    /// Creates an assembler with no export backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an export backend.
    #[must_use]
    pub fn with_exporter(mut self, exporter: Arc<dyn Exporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Assembles the artifact from the run's selected versions.
    ///
    /// Fails with [`PlanforgeError::IncompletePipeline`] naming every stage
    /// that is not `Completed` or has no selected version. On success the
    /// artifact carries one section per stage, in registry order.
    pub fn assemble(&self, run: &PipelineRun) -> Result<FinalArtifact, PlanforgeError> {
        let missing: Vec<String> = run
            .stages
            .iter()
            .filter(|stage| {
                stage.status != StageStatus::Completed
                    || run.selected_version(&stage.id).is_none()
            })
            .map(|stage| stage.id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(PlanforgeError::IncompletePipeline { missing });
        }

        let mut sections = Vec::with_capacity(run.stages.len());
        let mut providers: Vec<ProviderTag> = Vec::new();
        for stage in &run.stages {
            // Checked above.
            if let Some(version) = run.selected_version(&stage.id) {
                if !providers.contains(&version.provider) {
                    providers.push(version.provider);
                }
                sections.push(ArtifactSection {
                    stage_id: stage.id.clone(),
                    stage_name: stage.name.clone(),
                    content: version.content.clone(),
                });
            }
        }

        let elapsed_ms = run
            .started_at
            .map(|started| (now_utc() - started).num_milliseconds().max(0) as f64)
            .unwrap_or(0.0);

        Ok(FinalArtifact::new(
            run.idea.title.clone(),
            sections,
            run.total_generation_cost(),
            elapsed_ms,
            providers,
        ))
    }

    /// Renders an artifact through the configured exporter.
    ///
    /// Backend errors surface unchanged.
    pub async fn export(
        &self,
        artifact: &FinalArtifact,
        format: ExportFormat,
    ) -> Result<ExportOutput, PlanforgeError> {
        let exporter = self.exporter.as_ref().ok_or(ExportError::NotConfigured)?;
        Ok(exporter.render(artifact, format).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{IdeaBrief, PipelineRun};
    use crate::registry::StageCatalog;
    use crate::testing::fixtures;

    fn completed_run() -> PipelineRun {
        let mut run = PipelineRun::new(
            IdeaBrief::new("Vertical farm", "Urban vertical farming kits"),
            &StageCatalog::standard(),
        );
        run.started_at = Some(now_utc());
        let stage_ids: Vec<String> = run.stages.iter().map(|s| s.id.clone()).collect();
        for stage_id in stage_ids {
            let version = fixtures::sample_version(&stage_id, 1);
            let version_id = version.id;
            let stage = run.stage_mut(&stage_id).unwrap();
            stage.status = StageStatus::Completed;
            stage.progress = 100.0;
            stage.versions.push(version);
            run.select_version(&stage_id, version_id).unwrap();
        }
        run
    }

    #[test]
    fn test_assemble_names_incomplete_stages() {
        let mut run = completed_run();
        run.stage_mut("legal_compliance").unwrap().status = StageStatus::Pending;
        run.selected_versions.remove("investor_pitch");

        let err = Assembler::new().assemble(&run).unwrap_err();
        match err {
            PlanforgeError::IncompletePipeline { missing } => {
                assert_eq!(missing, vec!["legal_compliance", "investor_pitch"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_assemble_produces_one_section_per_stage() {
        let run = completed_run();
        let artifact = Assembler::new().assemble(&run).unwrap();

        assert_eq!(artifact.sections.len(), 8);
        assert_eq!(artifact.sections[0].stage_id, "concept_analysis");
        assert_eq!(artifact.sections[7].stage_id, "investor_pitch");
        assert_eq!(artifact.title, "Vertical farm");
        assert!(artifact.metadata.total_cost > 0.0);
        assert!(!artifact.metadata.providers.is_empty());
    }

    #[test]
    fn test_assemble_uses_the_selected_version() {
        let mut run = completed_run();
        let mut alternate = fixtures::sample_version("concept_analysis", 2);
        alternate.content.title = "Alternate concept".to_string();
        let alternate_id = alternate.id;
        run.stage_mut("concept_analysis")
            .unwrap()
            .versions
            .push(alternate);
        run.select_version("concept_analysis", alternate_id).unwrap();

        let artifact = Assembler::new().assemble(&run).unwrap();
        assert_eq!(
            artifact.section("concept_analysis").unwrap().content.title,
            "Alternate concept"
        );
    }

    #[test]
    fn test_total_cost_covers_unselected_versions() {
        let mut run = completed_run();
        let base = Assembler::new().assemble(&run).unwrap().metadata.total_cost;

        run.stage_mut("concept_analysis")
            .unwrap()
            .versions
            .push(fixtures::sample_version("concept_analysis", 2));
        let with_extra = Assembler::new().assemble(&run).unwrap().metadata.total_cost;
        assert!(with_extra > base);
    }

    #[tokio::test]
    async fn test_export_without_backend_fails() {
        let run = completed_run();
        let assembler = Assembler::new();
        let artifact = assembler.assemble(&run).unwrap();

        let err = assembler
            .export(&artifact, ExportFormat::Pdf)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlanforgeError::Export(ExportError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_export_delegates_to_backend() {
        #[derive(Debug)]
        struct HtmlOnly;

        #[async_trait]
        impl Exporter for HtmlOnly {
            async fn render(
                &self,
                artifact: &FinalArtifact,
                format: ExportFormat,
            ) -> Result<ExportOutput, ExportError> {
                if format != ExportFormat::Html {
                    return Err(ExportError::Unsupported(format));
                }
                Ok(ExportOutput::Bytes(
                    format!("<h1>{}</h1>", artifact.title).into_bytes(),
                ))
            }
        }

        let run = completed_run();
        let assembler = Assembler::new().with_exporter(Arc::new(HtmlOnly));
        let artifact = assembler.assemble(&run).unwrap();

        let output = assembler
            .export(&artifact, ExportFormat::Html)
            .await
            .unwrap();
        match output {
            ExportOutput::Bytes(bytes) => {
                assert!(String::from_utf8(bytes).unwrap().contains("Vertical farm"));
            }
            ExportOutput::Handle(_) => panic!("expected bytes"),
        }

        let err = assembler
            .export(&artifact, ExportFormat::Docx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlanforgeError::Export(ExportError::Unsupported(ExportFormat::Docx))
        ));
    }
}
