use std::str::FromStr;
use std::time::Duration;

use crate::collector::CollectorSettings;
use crate::errors::AppError;
use crate::matching::MatchSettings;
use crate::report::ReportSettings;

const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

/// Run configuration loaded from environment variables (and `.env` if present).
/// CLI flags are applied on top by `cli`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Needed only for narrative analysis and entity-based skill extraction.
    pub anthropic_api_key: Option<String>,
    pub llm_timeout: Duration,
    pub matching: MatchSettings,
    pub report: ReportSettings,
    pub collector: CollectorSettings,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut matching = MatchSettings::default();
        matching.threshold = parse_or(&lookup, "JOBSCOUT_MATCH_THRESHOLD", matching.threshold)?;
        matching.weights.similarity = parse_or(
            &lookup,
            "JOBSCOUT_SIMILARITY_WEIGHT",
            matching.weights.similarity,
        )?;
        matching.weights.overlap =
            parse_or(&lookup, "JOBSCOUT_OVERLAP_WEIGHT", matching.weights.overlap)?;

        let mut report = ReportSettings::default();
        report.top_matches = parse_or(&lookup, "JOBSCOUT_TOP_MATCHES", report.top_matches)?;
        report.gap_demand_threshold = parse_or(
            &lookup,
            "JOBSCOUT_GAP_DEMAND_THRESHOLD",
            report.gap_demand_threshold,
        )?;

        let mut collector = CollectorSettings::default();
        collector.workers = parse_or(&lookup, "JOBSCOUT_WORKERS", collector.workers)?;
        collector.pages_per_keyword =
            parse_or(&lookup, "JOBSCOUT_PAGES", collector.pages_per_keyword)?;
        if let Some(raw) = lookup("JOBSCOUT_KEYWORDS") {
            collector.keywords = split_keywords(&raw);
        }

        let config = Config {
            anthropic_api_key: lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty()),
            llm_timeout: Duration::from_secs(parse_or(
                &lookup,
                "JOBSCOUT_LLM_TIMEOUT_SECS",
                DEFAULT_LLM_TIMEOUT_SECS,
            )?),
            matching,
            report,
            collector,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks ranges that parsing alone cannot enforce.
    pub fn validate(&self) -> Result<(), AppError> {
        let threshold = self.matching.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AppError::Config(format!(
                "match threshold must be within [0, 1], got {threshold}"
            )));
        }
        let weights = &self.matching.weights;
        if weights.similarity < 0.0 || weights.overlap < 0.0 {
            return Err(AppError::Config(
                "scoring weights must be non-negative".to_string(),
            ));
        }
        if weights.similarity + weights.overlap > 1.0 + f64::EPSILON {
            return Err(AppError::Config(format!(
                "scoring weights must sum to at most 1.0, got {}",
                weights.similarity + weights.overlap
            )));
        }
        if self.collector.keywords.is_empty() {
            return Err(AppError::Config(
                "at least one search keyword is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn require_api_key(&self) -> Result<&str, AppError> {
        self.anthropic_api_key.as_deref().ok_or_else(|| {
            AppError::Config(
                "ANTHROPIC_API_KEY is not set; pass --no-llm to skip LLM features".to_string(),
            )
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| {
            AppError::Config(format!("{key} has invalid value '{raw}': {e}"))
        }),
        None => Ok(default),
    }
}

/// Splits a comma-separated keyword list, dropping blanks.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}
