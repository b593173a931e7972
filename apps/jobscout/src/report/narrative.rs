//! Narrative analysis — an external model ranks and explains the top matches.
//!
//! The analysis is optional: a non-fatal failure is turned into a
//! `NarrativeAnalysis::Failed` payload that is written into the report.

use async_trait::async_trait;
use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::{ScoredPosting, SkillSet};
use crate::report::prompts::{NARRATIVE_PROMPT_TEMPLATE, NARRATIVE_SYSTEM};

/// Description characters sent per posting.
const DESCRIPTION_CHARS: usize = 1500;
const FAILURE_MESSAGE: &str = "Failed to complete narrative analysis";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallAssessment {
    #[serde(deserialize_with = "lenient_score")]
    pub fit_score: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAssessment {
    pub job_title: String,
    pub company: String,
    #[serde(deserialize_with = "lenient_score")]
    pub fit_score: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub growth_opportunities: Vec<String>,
    #[serde(default)]
    pub cultural_fit: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CareerInsights {
    #[serde(default)]
    pub skill_gaps: Vec<String>,
    #[serde(default)]
    pub growth_areas: Vec<String>,
    #[serde(default)]
    pub industry_trends: Vec<String>,
}

/// Structured analysis returned by the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeReport {
    pub overall_assessment: OverallAssessment,
    #[serde(default)]
    pub job_analysis: Vec<JobAssessment>,
    #[serde(default)]
    pub career_insights: CareerInsights,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreRepr {
    Number(f64),
    Text(String),
}

/// Accepts `85`, `85.5`, `"85"` and `"85%"`.
fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match ScoreRepr::deserialize(deserializer)? {
        ScoreRepr::Number(score) => Ok(score),
        ScoreRepr::Text(text) => {
            let trimmed = text.trim().trim_end_matches('%').trim_end();
            trimmed
                .parse()
                .map_err(|_| de::Error::custom(format!("fit_score is not a number: {text:?}")))
        }
    }
}

/// What lands in the report's `narrative_analysis` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NarrativeAnalysis {
    Failed { error: String, details: String },
    Completed(NarrativeReport),
}

impl NarrativeAnalysis {
    pub fn failed(err: &AppError) -> Self {
        NarrativeAnalysis::Failed {
            error: FAILURE_MESSAGE.to_string(),
            details: err.to_string(),
        }
    }
}

/// Condensed posting handed to the analyzer.
#[derive(Debug, Clone, Serialize)]
pub struct JobBrief {
    pub title: String,
    pub company: String,
    pub location: String,
    pub link: String,
    pub match_score: f64,
    pub matched_skills: Vec<String>,
    pub description: String,
}

impl From<&ScoredPosting> for JobBrief {
    fn from(scored: &ScoredPosting) -> Self {
        let posting = &scored.posting;
        JobBrief {
            title: posting.title.clone(),
            company: posting.company.clone(),
            location: posting.location.clone(),
            link: posting.link.clone(),
            match_score: scored.final_score,
            matched_skills: scored.matched_skills.clone(),
            description: posting.description.chars().take(DESCRIPTION_CHARS).collect(),
        }
    }
}

pub struct NarrativeRequest<'a> {
    /// Leading slice of the resume text.
    pub resume_excerpt: &'a str,
    pub skills: &'a SkillSet,
    pub top_jobs: Vec<JobBrief>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait and LLM implementation
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait NarrativeAnalyzer: Send + Sync {
    async fn analyze(&self, request: &NarrativeRequest<'_>) -> Result<NarrativeReport, AppError>;
}

pub struct LlmNarrativeAnalyzer(pub LlmClient);

#[async_trait]
impl NarrativeAnalyzer for LlmNarrativeAnalyzer {
    async fn analyze(&self, request: &NarrativeRequest<'_>) -> Result<NarrativeReport, AppError> {
        let prompt = build_prompt(request)?;
        self.0
            .call_json::<NarrativeReport>(&prompt, NARRATIVE_SYSTEM)
            .await
            .map_err(|e| AppError::Analysis(e.to_string()))
    }
}

fn build_prompt(request: &NarrativeRequest<'_>) -> Result<String, AppError> {
    let jobs = serde_json::to_string_pretty(&request.top_jobs)
        .map_err(|e| AppError::Analysis(format!("cannot serialize top jobs: {e}")))?;
    let skills = request.skills.iter().collect::<Vec<_>>().join(", ");
    // Placeholders are filled once each, in template order; inserted text is
    // never searched again.
    let mut prompt = String::with_capacity(NARRATIVE_PROMPT_TEMPLATE.len() + jobs.len());
    let mut rest = NARRATIVE_PROMPT_TEMPLATE;
    for (placeholder, value) in [
        ("{resume_excerpt}", request.resume_excerpt),
        ("{skills}", skills.as_str()),
        ("{jobs}", jobs.as_str()),
    ] {
        let (head, tail) = rest.split_once(placeholder).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("prompt template lacks {placeholder}"))
        })?;
        prompt.push_str(head);
        prompt.push_str(value);
        rest = tail;
    }
    prompt.push_str(rest);
    Ok(prompt)
}

/// Runs the analyzer over the top matches, folding non-fatal failures into
/// the payload.
pub async fn run_narrative(
    analyzer: &dyn NarrativeAnalyzer,
    resume_text: &str,
    skills: &SkillSet,
    matches: &[ScoredPosting],
    excerpt_chars: usize,
    job_count: usize,
) -> Result<NarrativeAnalysis, AppError> {
    let excerpt_end = resume_text
        .char_indices()
        .nth(excerpt_chars)
        .map(|(i, _)| i)
        .unwrap_or(resume_text.len());

    let request = NarrativeRequest {
        resume_excerpt: &resume_text[..excerpt_end],
        skills,
        top_jobs: matches.iter().take(job_count).map(JobBrief::from).collect(),
    };

    info!(
        "Requesting narrative analysis for {} jobs",
        request.top_jobs.len()
    );
    match analyzer.analyze(&request).await {
        Ok(report) => {
            info!("Narrative analysis completed");
            Ok(NarrativeAnalysis::Completed(report))
        }
        Err(e) if !e.is_fatal() => {
            warn!("Narrative analysis failed, continuing without it: {}", e);
            Ok(NarrativeAnalysis::failed(&e))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::parse_json_payload;
    use crate::models::Posting;
    use std::sync::Mutex;

    const SAMPLE_ANALYSIS: &str = r#"{
        "overall_assessment": {"fit_score": 78, "summary": "Strong backend profile"},
        "job_analysis": [{
            "job_title": "Backend Engineer",
            "company": "A",
            "fit_score": 85,
            "strengths": ["python", "aws"],
            "challenges": [],
            "growth_opportunities": ["team lead"],
            "cultural_fit": "good",
            "recommendations": ["mention the migration project"]
        }],
        "career_insights": {"skill_gaps": ["kubernetes"], "growth_areas": [], "industry_trends": ["platform teams"]}
    }"#;

    struct FailingAnalyzer;

    #[async_trait]
    impl NarrativeAnalyzer for FailingAnalyzer {
        async fn analyze(&self, _request: &NarrativeRequest<'_>) -> Result<NarrativeReport, AppError> {
            Err(AppError::Analysis("response was not JSON".to_string()))
        }
    }

    struct BrokenAnalyzer;

    #[async_trait]
    impl NarrativeAnalyzer for BrokenAnalyzer {
        async fn analyze(&self, _request: &NarrativeRequest<'_>) -> Result<NarrativeReport, AppError> {
            Err(AppError::Config("missing API key".to_string()))
        }
    }

    /// Records the request it was given and replies with a fixed analysis.
    struct RecordingAnalyzer {
        seen: Mutex<Option<(String, usize)>>,
    }

    #[async_trait]
    impl NarrativeAnalyzer for RecordingAnalyzer {
        async fn analyze(&self, request: &NarrativeRequest<'_>) -> Result<NarrativeReport, AppError> {
            *self.seen.lock().unwrap() =
                Some((request.resume_excerpt.to_string(), request.top_jobs.len()));
            parse_json_payload(SAMPLE_ANALYSIS).map_err(|e| AppError::Analysis(e.to_string()))
        }
    }

    fn scored(link: &str) -> ScoredPosting {
        ScoredPosting {
            posting: Posting {
                title: "Backend Engineer".to_string(),
                link: link.to_string(),
                company: "A".to_string(),
                location: String::new(),
                description: "x".repeat(3000),
                source: "test".to_string(),
            },
            textual_similarity: 0.5,
            skill_overlap_fraction: 1.0,
            final_score: 0.7,
            matched_skills: vec!["python".to_string()],
        }
    }

    #[tokio::test]
    async fn test_failure_becomes_error_payload() {
        let skills = SkillSet::from_raw(["python"]);
        let result = run_narrative(&FailingAnalyzer, "resume", &skills, &[scored("u1")], 1000, 5)
            .await
            .unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["error"], FAILURE_MESSAGE);
        assert!(value["details"].as_str().unwrap().contains("not JSON"));
    }

    #[tokio::test]
    async fn test_fatal_analyzer_error_propagates() {
        let skills = SkillSet::from_raw(["python"]);
        let err = run_narrative(&BrokenAnalyzer, "resume", &skills, &[scored("u1")], 1000, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_request_is_bounded() {
        let analyzer = RecordingAnalyzer { seen: Mutex::new(None) };
        let skills = SkillSet::from_raw(["python"]);
        let matches: Vec<_> = (0..8).map(|i| scored(&format!("u{i}"))).collect();
        let resume = "é".repeat(1500);

        let result = run_narrative(&analyzer, &resume, &skills, &matches, 1000, 5)
            .await
            .unwrap();
        assert!(matches!(result, NarrativeAnalysis::Completed(_)));

        let (excerpt, jobs) = analyzer.seen.lock().unwrap().clone().unwrap();
        assert_eq!(excerpt.chars().count(), 1000);
        assert_eq!(jobs, 5);
    }

    #[test]
    fn test_brief_truncates_description() {
        let brief = JobBrief::from(&scored("u1"));
        assert_eq!(brief.description.len(), DESCRIPTION_CHARS);
    }

    #[test]
    fn test_untagged_payloads_round_trip() {
        let completed: NarrativeAnalysis = serde_json::from_str(SAMPLE_ANALYSIS).unwrap();
        match completed {
            NarrativeAnalysis::Completed(report) => {
                assert_eq!(report.overall_assessment.fit_score, 78.0);
                assert_eq!(report.job_analysis[0].strengths, vec!["python", "aws"]);
            }
            NarrativeAnalysis::Failed { .. } => panic!("expected completed analysis"),
        }

        let failed: NarrativeAnalysis =
            serde_json::from_str(r#"{"error": "x", "details": "y"}"#).unwrap();
        assert!(matches!(failed, NarrativeAnalysis::Failed { .. }));
    }

    #[test]
    fn test_fit_score_accepts_text_forms() {
        let payload = r#"{
            "overall_assessment": {"fit_score": "78%", "summary": "ok"},
            "job_analysis": [{"job_title": "Dev", "company": "A", "fit_score": " 85 "}]
        }"#;
        let report: NarrativeReport = parse_json_payload(payload).unwrap();
        assert_eq!(report.overall_assessment.fit_score, 78.0);
        assert_eq!(report.job_analysis[0].fit_score, 85.0);

        let analysis: NarrativeAnalysis = serde_json::from_str(payload).unwrap();
        assert!(matches!(analysis, NarrativeAnalysis::Completed(_)));

        let garbage = r#"{"overall_assessment": {"fit_score": "high", "summary": "ok"}}"#;
        assert!(parse_json_payload::<NarrativeReport>(garbage).is_err());
    }

    #[test]
    fn test_prompt_includes_skills_and_jobs() {
        let skills = SkillSet::from_raw(["python", "aws"]);
        let request = NarrativeRequest {
            resume_excerpt: "Senior engineer",
            skills: &skills,
            top_jobs: vec![JobBrief::from(&scored("u1"))],
        };
        let prompt = build_prompt(&request).unwrap();
        assert!(prompt.contains("Senior engineer"));
        assert!(prompt.contains("aws, python"));
        assert!(prompt.contains("\"link\": \"u1\""));
    }

    #[test]
    fn test_placeholders_in_resume_are_left_alone() {
        let skills = SkillSet::from_raw(["python"]);
        let request = NarrativeRequest {
            resume_excerpt: "Wrote templates like {jobs} and {skills}",
            skills: &skills,
            top_jobs: vec![JobBrief::from(&scored("u1"))],
        };
        let prompt = build_prompt(&request).unwrap();
        assert!(prompt.contains("Wrote templates like {jobs} and {skills}"));
        assert_eq!(prompt.matches("\"link\": \"u1\"").count(), 1);
    }
}
