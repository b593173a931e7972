use std::fmt::Write;

use crate::report::narrative::NarrativeAnalysis;
use crate::report::Report;

const CONSOLE_MATCHES: usize = 5;

/// Human-readable console summary of a report.
pub fn render_summary(report: &Report) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_summary(&mut out, report);
    out
}

fn write_summary(out: &mut String, report: &Report) -> std::fmt::Result {
    writeln!(out, "\n=== Job Analysis Summary ===")?;
    writeln!(out, "Total jobs analyzed: {}", report.total_postings)?;
    writeln!(out, "Matching jobs found: {}", report.matching_postings)?;

    if let Some(err) = &report.collection_error {
        writeln!(out, "\nWarning: posting collection failed: {err}")?;
    }
    for warning in &report.collection_warnings {
        writeln!(out, "\nWarning: {warning}")?;
    }
    if let Some(notice) = &report.notice {
        writeln!(out, "\nNote: {notice}")?;
    }

    if !report.top_matches.is_empty() {
        writeln!(out, "\nTop {} Job Matches:", CONSOLE_MATCHES)?;
        for job in report.top_matches.iter().take(CONSOLE_MATCHES) {
            writeln!(out, "\nTitle: {}", job.title)?;
            writeln!(out, "Company: {}", job.company)?;
            writeln!(out, "Match Score: {}", job.match_score)?;
            writeln!(out, "Link: {}", job.link)?;
        }
    }

    match &report.narrative_analysis {
        Some(NarrativeAnalysis::Completed(analysis)) => {
            writeln!(out, "\n=== LLM Analysis ===")?;
            writeln!(
                out,
                "\nOverall Fit Score: {}%",
                analysis.overall_assessment.fit_score
            )?;
            writeln!(out, "Summary: {}", analysis.overall_assessment.summary)?;

            if !analysis.career_insights.industry_trends.is_empty() {
                writeln!(out, "\nCareer Insights:")?;
                for trend in &analysis.career_insights.industry_trends {
                    writeln!(out, "- {trend}")?;
                }
            }

            writeln!(out, "\nDetailed Job Analysis:")?;
            for job in &analysis.job_analysis {
                writeln!(out, "\n{} at {}", job.job_title, job.company)?;
                writeln!(out, "Fit Score: {}%", job.fit_score)?;
                writeln!(out, "Strengths:")?;
                for strength in &job.strengths {
                    writeln!(out, "- {strength}")?;
                }
            }
        }
        Some(NarrativeAnalysis::Failed { error, details }) => {
            writeln!(out, "\nLLM analysis unavailable: {error} ({details})")?;
        }
        None => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::narrative::{CareerInsights, JobAssessment, NarrativeReport, OverallAssessment};
    use crate::report::{ReportStatus, TopMatch};
    use chrono::Utc;

    fn report() -> Report {
        Report {
            timestamp: Utc::now(),
            total_postings: 2,
            matching_postings: 1,
            status: ReportStatus::Matched,
            notice: None,
            skills: vec!["python".to_string()],
            top_matches: vec![TopMatch {
                title: "Backend Engineer".to_string(),
                company: "A".to_string(),
                location: String::new(),
                match_score: "0.72".to_string(),
                textual_similarity: 0.6,
                skill_overlap_fraction: 1.0,
                matched_skills: vec!["python".to_string()],
                link: "u1".to_string(),
                source: "test".to_string(),
            }],
            skill_frequency_table: vec![],
            skill_gap_list: vec![],
            narrative_analysis: None,
            collection_error: None,
            collection_warnings: vec![],
        }
    }

    #[test]
    fn test_summary_lists_totals_and_matches() {
        let text = render_summary(&report());
        assert!(text.contains("Total jobs analyzed: 2"));
        assert!(text.contains("Matching jobs found: 1"));
        assert!(text.contains("Match Score: 0.72"));
        assert!(text.contains("Link: u1"));
        assert!(!text.contains("LLM"));
    }

    #[test]
    fn test_summary_includes_narrative_strengths() {
        let mut report = report();
        report.narrative_analysis = Some(NarrativeAnalysis::Completed(NarrativeReport {
            overall_assessment: OverallAssessment {
                fit_score: 80.0,
                summary: "Good fit".to_string(),
            },
            job_analysis: vec![JobAssessment {
                job_title: "Backend Engineer".to_string(),
                company: "A".to_string(),
                fit_score: 85.0,
                strengths: vec!["python depth".to_string()],
                challenges: vec![],
                growth_opportunities: vec![],
                cultural_fit: String::new(),
                recommendations: vec![],
            }],
            career_insights: CareerInsights::default(),
        }));
        let text = render_summary(&report);
        assert!(text.contains("Overall Fit Score: 80%"));
        assert!(text.contains("- python depth"));
    }

    #[test]
    fn test_summary_lists_collection_warnings() {
        let mut report = report();
        report.collection_warnings = vec!["search 'bad' failed: HTTP 500".to_string()];
        assert!(render_summary(&report).contains("Warning: search 'bad' failed: HTTP 500"));
    }

    #[test]
    fn test_summary_reports_failed_narrative() {
        let mut report = report();
        report.narrative_analysis = Some(NarrativeAnalysis::Failed {
            error: "Failed".to_string(),
            details: "timeout".to_string(),
        });
        assert!(render_summary(&report).contains("LLM analysis unavailable: Failed (timeout)"));
    }
}
