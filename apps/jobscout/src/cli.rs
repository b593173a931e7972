use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{split_keywords, Config};
use crate::errors::AppError;

#[derive(Parser)]
#[command(name = "jobscout", version)]
#[command(about = "Match a resume against collected job postings and report the best fits")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score postings against a resume and write the JSON report
    Analyze {
        #[arg(short, long)]
        resume: PathBuf,

        #[arg(short, long, default_value = "job_analysis_report.json")]
        output: PathBuf,

        /// Minimum final score (exclusive) for a posting to count as a match
        #[arg(short, long)]
        threshold: Option<f64>,

        #[arg(long, value_enum, default_value_t = SourceKind::Linkedin)]
        source: SourceKind,

        /// CSV snapshot read by `--source csv` and written after a LinkedIn run
        #[arg(long, default_value = "scraped_jobs.csv")]
        postings: PathBuf,

        #[command(flatten)]
        search: SearchArgs,

        /// Skip the LLM narrative analysis
        #[arg(long)]
        no_llm: bool,

        /// Also extract skills as named entities through the LLM
        #[arg(long)]
        entities: bool,
    },
    /// Collect postings and save them as a CSV snapshot
    Scrape {
        #[arg(short, long, default_value = "scraped_jobs.csv")]
        output: PathBuf,

        #[command(flatten)]
        search: SearchArgs,
    },
    /// Print the skills extracted from a resume
    Skills {
        #[arg(short, long)]
        resume: PathBuf,

        #[arg(long)]
        entities: bool,
    },
    /// Print the console summary of a saved report
    Summary {
        #[arg(short, long, default_value = "job_analysis_report.json")]
        report: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    Linkedin,
    Csv,
}

#[derive(clap::Args, Debug, Default)]
pub struct SearchArgs {
    /// Comma-separated search keywords, one collector partition each
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Result pages fetched per keyword
    #[arg(long)]
    pub pages: Option<usize>,

    /// Concurrent keyword partitions (1-3)
    #[arg(long)]
    pub workers: Option<usize>,
}

impl SearchArgs {
    /// Applies the flags that were given on top of the environment config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(raw) = &self.keywords {
            config.collector.keywords = split_keywords(raw);
        }
        if let Some(pages) = self.pages {
            config.collector.pages_per_keyword = pages;
        }
        if let Some(workers) = self.workers {
            config.collector.workers = workers;
        }
    }
}

/// Applies overrides and re-checks the ranges they may have broken.
pub fn finalize(config: &mut Config, search: &SearchArgs, threshold: Option<f64>) -> Result<(), AppError> {
    search.apply(config);
    if let Some(threshold) = threshold {
        config.matching.threshold = threshold;
    }
    config.validate()
}
