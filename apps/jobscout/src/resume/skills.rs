//! Skill extraction — pluggable, trait-based extractors that turn resume text
//! into raw skill candidates.
//!
//! `PatternSkillExtractor` is the mandatory baseline (fixed regex list, never
//! fails). `EntitySkillExtractor` asks the LLM for named entities and keeps an
//! allow-list of labels. `CompositeSkillExtractor` unions them.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::models::SkillSet;
use crate::resume::prompts::ENTITY_PROMPT_TEMPLATE;

/// Entity labels accepted as skills.
pub const ENTITY_LABELS: &[&str] = &["PRODUCT", "ORG", "GPE"];

/// Hand-maintained technology patterns, matched against lowercased text.
/// Longer alternatives come first so `javascript` is not cut short by `java`.
const SKILL_PATTERNS: &[&str] = &[
    r"python|javascript|java|react|node\.js|sql|aws|docker|kubernetes|git|c\+\+|ruby|golang",
    r"machine learning|deep learning|artificial intelligence|data science|nlp|computer vision",
    r"agile|scrum|ci/cd|devops|test driven development|rest api|microservices",
    r"mongodb|postgresql|mysql|redis|elasticsearch|kafka|graphql",
];

/// Maximum resume characters sent for entity extraction.
const ENTITY_INPUT_CHARS: usize = 6000;

#[async_trait]
pub trait SkillExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw, un-normalized skill candidates found in `text`.
    async fn extract(&self, text: &str) -> Result<Vec<String>, AppError>;
}

/// Runs `extractor` and normalizes its output into the run's skill set.
pub async fn extract_skill_set(
    extractor: &dyn SkillExtractor,
    text: &str,
) -> Result<SkillSet, AppError> {
    let raw = extractor.extract(text).await?;
    let skills = SkillSet::from_raw(&raw);
    info!(
        "Extracted {} unique skills ({} raw candidates) via {}",
        skills.len(),
        raw.len(),
        extractor.name()
    );
    if skills.is_empty() {
        warn!("No skills found in the resume; scoring falls back to text similarity");
    }
    Ok(skills)
}

// ────────────────────────────────────────────────────────────────────────────
// PatternSkillExtractor
// ────────────────────────────────────────────────────────────────────────────

pub struct PatternSkillExtractor;

fn skill_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SKILL_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("skill pattern is a valid regex"))
            .collect()
    })
}

impl PatternSkillExtractor {
    pub fn find(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        skill_patterns()
            .iter()
            .flat_map(|re| re.find_iter(&lowered).map(|m| m.as_str().to_string()))
            .collect()
    }
}

#[async_trait]
impl SkillExtractor for PatternSkillExtractor {
    fn name(&self) -> &'static str {
        "patterns"
    }

    async fn extract(&self, text: &str) -> Result<Vec<String>, AppError> {
        Ok(Self::find(text))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// EntitySkillExtractor
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct EntityList {
    #[serde(default)]
    entities: Vec<NamedEntity>,
}

#[derive(Debug, Deserialize)]
struct NamedEntity {
    text: String,
    label: String,
}

/// Named-entity extraction backed by the LLM client.
pub struct EntitySkillExtractor(pub LlmClient);

#[async_trait]
impl SkillExtractor for EntitySkillExtractor {
    fn name(&self) -> &'static str {
        "entities"
    }

    async fn extract(&self, text: &str) -> Result<Vec<String>, AppError> {
        let excerpt: String = text.chars().take(ENTITY_INPUT_CHARS).collect();
        let prompt = ENTITY_PROMPT_TEMPLATE.replace("{resume_text}", &excerpt);
        let list: EntityList = self
            .0
            .call_json(&prompt, JSON_ONLY_SYSTEM)
            .await
            .map_err(|e| AppError::Extraction(format!("entity extraction failed: {e}")))?;
        Ok(filter_entities(list.entities))
    }
}

fn filter_entities(entities: Vec<NamedEntity>) -> Vec<String> {
    entities
        .into_iter()
        .filter(|e| ENTITY_LABELS.contains(&e.label.to_ascii_uppercase().as_str()))
        .map(|e| e.text)
        .filter(|t| t.trim().chars().count() > 2 && !t.trim_start().starts_with('\u{2022}'))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// CompositeSkillExtractor
// ────────────────────────────────────────────────────────────────────────────

/// Unions a mandatory primary extractor with optional enrichments.
/// Enrichment failures are logged and skipped; primary failures propagate.
pub struct CompositeSkillExtractor {
    primary: Box<dyn SkillExtractor>,
    enrichments: Vec<Box<dyn SkillExtractor>>,
}

impl CompositeSkillExtractor {
    pub fn new(primary: Box<dyn SkillExtractor>) -> Self {
        Self {
            primary,
            enrichments: Vec::new(),
        }
    }

    pub fn with(mut self, enrichment: Box<dyn SkillExtractor>) -> Self {
        self.enrichments.push(enrichment);
        self
    }
}

#[async_trait]
impl SkillExtractor for CompositeSkillExtractor {
    fn name(&self) -> &'static str {
        "composite"
    }

    async fn extract(&self, text: &str) -> Result<Vec<String>, AppError> {
        let mut skills = self.primary.extract(text).await?;
        for extractor in &self.enrichments {
            match extractor.extract(text).await {
                Ok(found) => skills.extend(found),
                Err(e) => warn!("Skipping {} skill extractor: {}", extractor.name(), e),
            }
        }
        Ok(skills)
    }
}
