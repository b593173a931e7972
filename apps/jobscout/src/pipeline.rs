//! Analysis run — orchestrates the full pipeline.
//!
//! Flow: extract resume text → skill set → collect postings → score → rank →
//!       filter → narrative analysis → build report → persist.
//!
//! Whether a failure aborts the run is decided by `AppError::is_fatal`.
//! Non-fatal collection and narrative failures are recorded in the report.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use crate::collector::{write_snapshot, Collected, PostingSource};
use crate::errors::AppError;
use crate::matching::{filter_matches, rank, score_postings};
use crate::report::{build_report, run_narrative, write_report, Report, ReportInput};
use crate::resume::{extract_skill_set, extract_text};
use crate::state::RunContext;

#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub resume: PathBuf,
    pub output: PathBuf,
    /// Where freshly collected postings are saved, if anywhere.
    pub snapshot: Option<PathBuf>,
}

pub async fn run_analysis(ctx: &RunContext, request: &AnalyzeRequest) -> Result<Report, AppError> {
    let config = &ctx.config;

    // Step 1: Resume text and skills (fatal on failure)
    let resume_text = extract_text(&request.resume).await?;
    let skills = extract_skill_set(ctx.skill_extractor.as_ref(), &resume_text).await?;

    // Step 2: Postings
    let (Collected { postings, warnings }, collection_error) =
        collect_postings(ctx.posting_source.as_ref()).await?;
    if let (Some(path), false) = (&request.snapshot, postings.is_empty()) {
        if let Err(e) = write_snapshot(path, &postings) {
            warn!("Could not save posting snapshot: {}", e);
        }
    }

    // Step 3: Score, rank, filter
    let scored = score_postings(&skills, &postings, &config.matching);
    let matches = filter_matches(rank(scored), config.matching.threshold);
    info!(
        "Found {} matching jobs out of {} (threshold {})",
        matches.len(),
        postings.len(),
        config.matching.threshold
    );

    // Step 4: Narrative analysis (non-fatal, skipped without matches)
    let narrative = match &ctx.narrative {
        Some(analyzer) if !matches.is_empty() => Some(
            run_narrative(
                analyzer.as_ref(),
                &resume_text,
                &skills,
                &matches,
                config.report.resume_excerpt_chars,
                config.report.narrative_matches,
            )
            .await?,
        ),
        _ => None,
    };

    // Step 5: Build and persist (fatal on failure)
    let report = build_report(
        ReportInput {
            postings: &postings,
            skills: &skills,
            matches: &matches,
            narrative,
            collection_error,
            collection_warnings: warnings,
            timestamp: Utc::now(),
        },
        &config.report,
    );
    write_report(&request.output, &report).await?;

    Ok(report)
}

/// Collects postings, turning non-fatal failures and empty results into a
/// recorded error.
async fn collect_postings(
    source: &dyn PostingSource,
) -> Result<(Collected, Option<String>), AppError> {
    info!("Collecting postings from {}", source.name());
    match source.collect().await {
        Ok(collected) if collected.postings.is_empty() => {
            let err = AppError::Collection(format!("{} returned no postings", source.name()));
            warn!("{}", err);
            Ok((collected, Some(err.to_string())))
        }
        Ok(collected) => Ok((collected, None)),
        Err(e) if !e.is_fatal() => {
            warn!("Continuing with zero postings: {}", e);
            Ok((Collected::default(), Some(e.to_string())))
        }
        Err(e) => Err(e),
    }
}

/// Runs a source and saves its postings as a CSV snapshot.
pub async fn run_scrape(source: &dyn PostingSource, output: &Path) -> Result<usize, AppError> {
    let Collected { postings, warnings } = source.collect().await?;
    for warning in &warnings {
        warn!("{}", warning);
    }
    write_snapshot(output, &postings)?;
    Ok(postings.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::config::Config;
    use crate::models::Posting;
    use crate::report::narrative::{NarrativeReport, NarrativeRequest};
    use crate::report::{load_report, NarrativeAnalysis, NarrativeAnalyzer, ReportStatus};
    use crate::resume::PatternSkillExtractor;

    struct FixedSource(Vec<Posting>);

    #[async_trait]
    impl PostingSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn collect(&self) -> Result<Collected, AppError> {
            Ok(Collected::from(self.0.clone()))
        }
    }

    /// One search succeeds and one fails.
    struct HalfFailingSource(Vec<Posting>);

    #[async_trait]
    impl PostingSource for HalfFailingSource {
        fn name(&self) -> &str {
            "half-failing"
        }

        async fn collect(&self) -> Result<Collected, AppError> {
            Ok(Collected {
                postings: self.0.clone(),
                warnings: vec!["search 'bad' failed: HTTP 500".to_string()],
            })
        }
    }

    struct MisconfiguredSource;

    #[async_trait]
    impl PostingSource for MisconfiguredSource {
        fn name(&self) -> &str {
            "misconfigured"
        }

        async fn collect(&self) -> Result<Collected, AppError> {
            Err(AppError::Config("no search keywords".to_string()))
        }
    }

    struct OfflineSource;

    #[async_trait]
    impl PostingSource for OfflineSource {
        fn name(&self) -> &str {
            "offline"
        }

        async fn collect(&self) -> Result<Collected, AppError> {
            Err(AppError::Collection("network unreachable".to_string()))
        }
    }

    struct GarbageAnalyzer;

    #[async_trait]
    impl NarrativeAnalyzer for GarbageAnalyzer {
        async fn analyze(&self, _request: &NarrativeRequest<'_>) -> Result<NarrativeReport, AppError> {
            Err(AppError::Analysis("expected value at line 1 column 1".to_string()))
        }
    }

    fn posting(title: &str, description: &str, company: &str, link: &str) -> Posting {
        Posting {
            title: title.to_string(),
            link: link.to_string(),
            company: company.to_string(),
            location: String::new(),
            description: description.to_string(),
            source: "test".to_string(),
        }
    }

    fn context(
        source: Arc<dyn PostingSource>,
        narrative: Option<Arc<dyn NarrativeAnalyzer>>,
    ) -> RunContext {
        RunContext {
            config: Config::from_lookup(|_| None).unwrap(),
            skill_extractor: Arc::new(PatternSkillExtractor),
            posting_source: source,
            narrative,
        }
    }

    fn resume_file(dir: &Path) -> PathBuf {
        let path = dir.join("resume.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"Backend developer with Python and AWS experience.")
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_failed_narrative_keeps_scores_and_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let request = AnalyzeRequest {
            resume: resume_file(dir.path()),
            output: dir.path().join("report.json"),
            snapshot: Some(dir.path().join("jobs.csv")),
        };
        let ctx = context(
            Arc::new(FixedSource(vec![
                posting("Backend Engineer", "We use python and aws heavily", "A", "u1"),
                posting("Barista", "Coffee and customer service", "B", "u2"),
            ])),
            Some(Arc::new(GarbageAnalyzer)),
        );

        let report = run_analysis(&ctx, &request).await.unwrap();
        assert_eq!(report.total_postings, 2);
        assert_eq!(report.matching_postings, 1);
        assert_eq!(report.top_matches[0].link, "u1");
        assert!(matches!(
            report.narrative_analysis,
            Some(NarrativeAnalysis::Failed { .. })
        ));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&request.output).unwrap()).unwrap();
        assert!(raw["narrative_analysis"]["error"].is_string());
        assert!(request.snapshot.as_ref().unwrap().exists());
    }

    #[tokio::test]
    async fn test_collection_failure_still_writes_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let request = AnalyzeRequest {
            resume: resume_file(dir.path()),
            output: dir.path().join("report.json"),
            snapshot: None,
        };
        let ctx = context(Arc::new(OfflineSource), Some(Arc::new(GarbageAnalyzer)));

        let report = run_analysis(&ctx, &request).await.unwrap();
        assert_eq!(report.total_postings, 0);
        assert_eq!(report.matching_postings, 0);
        assert!(report.top_matches.is_empty());
        assert_eq!(report.status, ReportStatus::NoMatches);
        assert!(report.narrative_analysis.is_none());
        assert!(report
            .collection_error
            .as_deref()
            .unwrap()
            .contains("network unreachable"));

        let loaded = load_report(&request.output).await.unwrap();
        assert_eq!(loaded.total_postings, 0);
    }

    #[tokio::test]
    async fn test_partial_collection_failure_is_written_to_report() {
        let dir = tempfile::tempdir().unwrap();
        let request = AnalyzeRequest {
            resume: resume_file(dir.path()),
            output: dir.path().join("report.json"),
            snapshot: None,
        };
        let ctx = context(
            Arc::new(HalfFailingSource(vec![posting(
                "Backend Engineer",
                "We use python and aws heavily",
                "A",
                "u1",
            )])),
            None,
        );

        let report = run_analysis(&ctx, &request).await.unwrap();
        assert_eq!(report.total_postings, 1);
        assert!(report.collection_error.is_none());
        assert_eq!(report.collection_warnings, vec!["search 'bad' failed: HTTP 500"]);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&request.output).unwrap()).unwrap();
        assert_eq!(
            raw["collection_warnings"],
            serde_json::json!(["search 'bad' failed: HTTP 500"])
        );
    }

    #[tokio::test]
    async fn test_fatal_collection_error_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let request = AnalyzeRequest {
            resume: resume_file(dir.path()),
            output: dir.path().join("report.json"),
            snapshot: None,
        };
        let ctx = context(Arc::new(MisconfiguredSource), None);

        let err = run_analysis(&ctx, &request).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(!request.output.exists());
    }

    #[tokio::test]
    async fn test_missing_resume_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let request = AnalyzeRequest {
            resume: dir.path().join("missing.pdf"),
            output: dir.path().join("report.json"),
            snapshot: None,
        };
        let ctx = context(Arc::new(FixedSource(vec![])), None);

        let err = run_analysis(&ctx, &request).await.unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
        assert!(!request.output.exists());
    }

    #[tokio::test]
    async fn test_empty_source_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let request = AnalyzeRequest {
            resume: resume_file(dir.path()),
            output: dir.path().join("report.json"),
            snapshot: Some(dir.path().join("jobs.csv")),
        };
        let ctx = context(Arc::new(FixedSource(vec![])), None);

        let report = run_analysis(&ctx, &request).await.unwrap();
        assert!(report.collection_error.unwrap().contains("no postings"));
        assert!(!request.snapshot.as_ref().unwrap().exists());
    }

    #[tokio::test]
    async fn test_run_scrape_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("scraped_jobs.csv");
        let source = FixedSource(vec![posting("Dev", "rust", "A", "u1")]);

        assert_eq!(run_scrape(&source, &output).await.unwrap(), 1);
        assert!(output.exists());
    }
}
