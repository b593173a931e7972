use serde::{Deserialize, Serialize};

/// One job listing as produced by a posting source. `link` is its identity.
///
/// Field order matches the CSV snapshot header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub title: String,
    pub link: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub source: String,
}

impl Posting {
    /// Text used for vectorization and skill matching: title, description, company.
    pub fn combined_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.company)
    }
}

/// A posting together with its match scores for the current run.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPosting {
    #[serde(flatten)]
    pub posting: Posting,
    pub textual_similarity: f64,
    pub skill_overlap_fraction: f64,
    pub final_score: f64,
    pub matched_skills: Vec<String>,
}
