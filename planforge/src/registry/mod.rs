//! Stage registry: the static, ordered catalogue of generation stages.

mod catalog;

pub use catalog::{StageCatalog, StageSpec};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The generation provider assigned to a stage.
///
/// Tags are opaque to the orchestrator; they are routed unchanged to the
/// provider collaborator and recorded on every version generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderTag {
    /// DeepSeek — business analysis and narrative copy.
    DeepSeek,
    /// Zhipu GLM — research and compliance analysis.
    Zhipu,
    /// Qwen — technical architecture and planning.
    Qwen,
}

impl fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeepSeek => write!(f, "deep_seek"),
            Self::Zhipu => write!(f, "zhipu"),
            Self::Qwen => write!(f, "qwen"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_tag_serde() {
        let json = serde_json::to_string(&ProviderTag::DeepSeek).unwrap();
        assert_eq!(json, "\"deep_seek\"");
    }
}
