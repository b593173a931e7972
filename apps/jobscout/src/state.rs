use std::sync::Arc;

use crate::collector::PostingSource;
use crate::config::Config;
use crate::report::NarrativeAnalyzer;
use crate::resume::SkillExtractor;

/// Collaborators and settings for one analysis run, assembled by `main`.
#[derive(Clone)]
pub struct RunContext {
    pub config: Config,
    /// Pluggable skill extraction. Default: patterns, plus entities when the LLM is enabled.
    pub skill_extractor: Arc<dyn SkillExtractor>,
    pub posting_source: Arc<dyn PostingSource>,
    /// `None` when narrative analysis is disabled.
    pub narrative: Option<Arc<dyn NarrativeAnalyzer>>,
}
