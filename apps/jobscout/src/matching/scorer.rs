use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matching::tfidf::{cosine_similarity, TfidfVectorizer, DEFAULT_MAX_FEATURES};
use crate::models::{Posting, ScoredPosting, SkillSet};

/// Weights of the final score: `similarity * textual + overlap * skill_overlap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub similarity: f64,
    pub overlap: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            similarity: 0.6,
            overlap: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSettings {
    pub weights: ScoringWeights,
    /// A posting matches only when its final score is strictly above this.
    pub threshold: f64,
    pub max_features: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            threshold: 0.3,
            max_features: DEFAULT_MAX_FEATURES,
        }
    }
}

/// Scores every posting against the skill set. Output is in input order.
pub fn score_postings(
    skills: &SkillSet,
    postings: &[Posting],
    settings: &MatchSettings,
) -> Vec<ScoredPosting> {
    if postings.is_empty() {
        return Vec::new();
    }

    let texts: Vec<String> = postings.iter().map(Posting::combined_text).collect();
    let mut corpus = texts.clone();
    corpus.push(skills.as_document());

    let matrix = TfidfVectorizer::new(settings.max_features, (1, 2)).fit_transform(&corpus);
    let Some((skill_row, posting_rows)) = matrix.rows.split_last() else {
        return Vec::new();
    };
    debug!(
        "Vectorized {} postings over {} terms",
        postings.len(),
        matrix.vocabulary.len()
    );

    postings
        .iter()
        .zip(texts.iter())
        .zip(posting_rows.iter())
        .map(|((posting, text), row)| {
            let textual_similarity = cosine_similarity(row, skill_row);
            let matched_skills = matched_skills(skills, text);
            let skill_overlap_fraction = overlap_fraction(matched_skills.len(), skills.len());
            let final_score = settings.weights.similarity * textual_similarity
                + settings.weights.overlap * skill_overlap_fraction;

            ScoredPosting {
                posting: posting.clone(),
                textual_similarity,
                skill_overlap_fraction,
                final_score,
                matched_skills,
            }
        })
        .collect()
}

/// Skills that occur as a case-insensitive substring of `text`, in skill-set order.
pub fn matched_skills(skills: &SkillSet, text: &str) -> Vec<String> {
    let haystack = text.to_lowercase();
    skills
        .iter()
        .filter(|skill| haystack.contains(*skill))
        .map(String::from)
        .collect()
}

fn overlap_fraction(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    matched as f64 / total as f64
}

/// Sorts by final score, highest first. Ties keep their input order.
pub fn rank(mut scored: Vec<ScoredPosting>) -> Vec<ScoredPosting> {
    scored.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
    });
    scored
}

/// Keeps postings whose final score is strictly greater than `threshold`.
pub fn filter_matches(ranked: Vec<ScoredPosting>, threshold: f64) -> Vec<ScoredPosting> {
    ranked
        .into_iter()
        .filter(|p| p.final_score > threshold)
        .collect()
}
