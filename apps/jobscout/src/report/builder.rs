use chrono::{DateTime, Utc};

use crate::models::{Posting, ScoredPosting, SkillSet};
use crate::report::narrative::NarrativeAnalysis;
use crate::report::{
    Report, ReportSettings, ReportStatus, SkillFrequency, SkillGap, TopMatch, REFERENCE_SKILLS,
};

const NO_MATCHES_NOTICE: &str = "No matching jobs found.";

/// Everything the report is derived from.
pub struct ReportInput<'a> {
    pub postings: &'a [Posting],
    pub skills: &'a SkillSet,
    /// Ranked and threshold-filtered matches.
    pub matches: &'a [ScoredPosting],
    pub narrative: Option<NarrativeAnalysis>,
    pub collection_error: Option<String>,
    pub collection_warnings: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

pub fn build_report(input: ReportInput<'_>, settings: &ReportSettings) -> Report {
    let status = if input.matches.is_empty() {
        ReportStatus::NoMatches
    } else {
        ReportStatus::Matched
    };

    Report {
        timestamp: input.timestamp,
        total_postings: input.postings.len(),
        matching_postings: input.matches.len(),
        status,
        notice: (status == ReportStatus::NoMatches).then(|| NO_MATCHES_NOTICE.to_string()),
        skills: input.skills.to_vec(),
        top_matches: input
            .matches
            .iter()
            .take(settings.top_matches)
            .map(to_top_match)
            .collect(),
        skill_frequency_table: skill_frequency_table(input.skills, input.postings),
        skill_gap_list: skill_gap_list(
            input.skills,
            input.postings,
            settings.gap_demand_threshold,
        ),
        narrative_analysis: input.narrative,
        collection_error: input.collection_error,
        collection_warnings: input.collection_warnings,
    }
}

fn to_top_match(scored: &ScoredPosting) -> TopMatch {
    let posting = &scored.posting;
    TopMatch {
        title: posting.title.clone(),
        company: posting.company.clone(),
        location: posting.location.clone(),
        match_score: format!("{:.2}", scored.final_score),
        textual_similarity: scored.textual_similarity,
        skill_overlap_fraction: scored.skill_overlap_fraction,
        matched_skills: scored.matched_skills.clone(),
        link: posting.link.clone(),
        source: posting.source.clone(),
    }
}

/// Occurrence count of each skill across all postings' combined text,
/// most frequent first. Ties keep skill-set order.
pub fn skill_frequency_table(skills: &SkillSet, postings: &[Posting]) -> Vec<SkillFrequency> {
    let corpus = postings
        .iter()
        .map(Posting::combined_text)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut table: Vec<SkillFrequency> = skills
        .iter()
        .map(|skill| SkillFrequency {
            skill: skill.to_string(),
            count: corpus.matches(skill).count(),
        })
        .collect();
    table.sort_by(|a, b| b.count.cmp(&a.count));
    table
}

/// Reference skills missing from the resume whose average occurrences per
/// posting description exceed `threshold`, highest demand first.
pub fn skill_gap_list(skills: &SkillSet, postings: &[Posting], threshold: f64) -> Vec<SkillGap> {
    if postings.is_empty() {
        return Vec::new();
    }

    let descriptions = postings
        .iter()
        .map(|p| p.description.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let total = postings.len() as f64;

    let mut gaps: Vec<SkillGap> = REFERENCE_SKILLS
        .iter()
        .filter(|skill| !skills.contains(skill))
        .map(|skill| SkillGap {
            skill: skill.to_string(),
            demand_level: descriptions.matches(*skill).count() as f64 / total,
        })
        .filter(|gap| gap.demand_level > threshold)
        .collect();
    gaps.sort_by(|a, b| {
        b.demand_level
            .partial_cmp(&a.demand_level)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    gaps
}
