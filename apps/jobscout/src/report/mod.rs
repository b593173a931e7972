// Report building: top matches, demand statistics, gap analysis and the
// optional narrative analysis, persisted as one JSON document per run.

pub mod builder;
pub mod narrative;
pub mod prompts;
pub mod summary;
pub mod writer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use builder::{build_report, ReportInput};
pub use narrative::{run_narrative, LlmNarrativeAnalyzer, NarrativeAnalysis, NarrativeAnalyzer};
pub use summary::render_summary;
pub use writer::{load_report, write_report};

/// Reference skills checked for demand gaps.
pub const REFERENCE_SKILLS: &[&str] = &[
    "docker",
    "kubernetes",
    "aws",
    "azure",
    "gcp",
    "ci/cd",
    "jenkins",
    "react",
    "vue",
    "angular",
    "node.js",
    "typescript",
    "graphql",
    "machine learning",
    "python",
    "java",
    "golang",
    "rust",
];

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub top_matches: usize,
    /// How many ranked matches are handed to the narrative analyzer.
    pub narrative_matches: usize,
    /// Leading resume characters handed to the narrative analyzer.
    pub resume_excerpt_chars: usize,
    /// Minimum average occurrences per posting for a gap to be reported.
    pub gap_demand_threshold: f64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_matches: 10,
            narrative_matches: 5,
            resume_excerpt_chars: 1000,
            gap_demand_threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Matched,
    NoMatches,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopMatch {
    pub title: String,
    pub company: String,
    pub location: String,
    /// Final score formatted to two decimals.
    pub match_score: String,
    #[serde(default)]
    pub textual_similarity: f64,
    #[serde(default)]
    pub skill_overlap_fraction: f64,
    pub matched_skills: Vec<String>,
    pub link: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillFrequency {
    pub skill: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub demand_level: f64,
}

/// The run's durable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: DateTime<Utc>,
    pub total_postings: usize,
    pub matching_postings: usize,
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub skills: Vec<String>,
    pub top_matches: Vec<TopMatch>,
    pub skill_frequency_table: Vec<SkillFrequency>,
    pub skill_gap_list: Vec<SkillGap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative_analysis: Option<NarrativeAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_error: Option<String>,
    /// Partial collection failures that still produced postings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collection_warnings: Vec<String>,
}
