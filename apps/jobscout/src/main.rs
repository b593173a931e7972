mod cli;
mod collector;
mod config;
mod errors;
mod llm_client;
mod matching;
mod models;
mod pipeline;
mod report;
mod resume;
mod state;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Command, SourceKind};
use crate::collector::{CsvPostingSource, LinkedInPostingSource, PostingSource};
use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::pipeline::{run_analysis, run_scrape, AnalyzeRequest};
use crate::report::{load_report, render_summary, LlmNarrativeAnalyzer, NarrativeAnalyzer};
use crate::resume::{
    extract_skill_set, extract_text, CompositeSkillExtractor, EntitySkillExtractor,
    PatternSkillExtractor, SkillExtractor,
};
use crate::state::RunContext;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration errors are reported before logging exists.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return e.exit_code();
        }
    };

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(log_filter(cli.verbose, &config.rust_log))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting jobscout v{}", env!("CARGO_PKG_VERSION"));

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

async fn run_command(command: Command, mut config: Config) -> Result<(), AppError> {
    match command {
        Command::Analyze {
            resume,
            output,
            threshold,
            source,
            postings,
            search,
            no_llm,
            entities,
        } => {
            cli::finalize(&mut config, &search, threshold)?;

            if !no_llm {
                config.require_api_key()?;
            }
            let llm = build_llm(&config, !no_llm || entities)?;
            let skill_extractor = skill_extractor(&config, llm.as_ref(), entities)?;
            let narrative: Option<Arc<dyn NarrativeAnalyzer>> = match (&llm, no_llm) {
                (Some(client), false) => Some(Arc::new(LlmNarrativeAnalyzer(client.clone()))),
                _ => {
                    info!("Narrative analysis disabled");
                    None
                }
            };

            let posting_source: Arc<dyn PostingSource> = match source {
                SourceKind::Linkedin => {
                    Arc::new(LinkedInPostingSource::new(config.collector.clone())?)
                }
                SourceKind::Csv => Arc::new(CsvPostingSource::new(postings.clone())),
            };
            // Fresh scrapes are saved for later `--source csv` runs.
            let snapshot = (source == SourceKind::Linkedin).then_some(postings);

            let ctx = RunContext {
                config,
                skill_extractor,
                posting_source,
                narrative,
            };
            let request = AnalyzeRequest {
                resume,
                output,
                snapshot,
            };
            let report = run_analysis(&ctx, &request).await?;
            println!("{}", render_summary(&report));
            println!("Full report written to {}", request.output.display());
        }

        Command::Scrape { output, search } => {
            cli::finalize(&mut config, &search, None)?;
            let source = LinkedInPostingSource::new(config.collector.clone())?;
            let count = run_scrape(&source, &output).await?;
            println!("Saved {} postings to {}", count, output.display());
        }

        Command::Skills { resume, entities } => {
            let llm = build_llm(&config, entities)?;
            let extractor = skill_extractor(&config, llm.as_ref(), entities)?;
            let text = extract_text(&resume).await?;
            let skills = extract_skill_set(extractor.as_ref(), &text).await?;
            println!("Extracted {} skills:", skills.len());
            for skill in skills.iter() {
                println!("- {skill}");
            }
        }

        Command::Summary { report } => {
            let report = load_report(&report).await?;
            println!("{}", render_summary(&report));
        }
    }

    Ok(())
}

/// `--verbose` takes precedence over `RUST_LOG`, which takes precedence over
/// the configured level.
fn log_filter(verbose: bool, level: &str) -> EnvFilter {
    let crate_filter = |level: &str| EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), level));
    if verbose {
        return crate_filter("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| crate_filter(level))
}

/// Builds the shared LLM client when `wanted` and an API key is configured.
fn build_llm(config: &Config, wanted: bool) -> Result<Option<LlmClient>, AppError> {
    let Some(api_key) = config.anthropic_api_key.clone().filter(|_| wanted) else {
        return Ok(None);
    };
    let client =
        LlmClient::new(api_key, config.llm_timeout).context("building the LLM HTTP client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    Ok(Some(client))
}

/// Pattern extraction, plus LLM entity extraction when requested.
fn skill_extractor(
    config: &Config,
    llm: Option<&LlmClient>,
    entities: bool,
) -> Result<Arc<dyn SkillExtractor>, AppError> {
    if !entities {
        return Ok(Arc::new(PatternSkillExtractor));
    }
    config.require_api_key()?;
    let client = llm
        .cloned()
        .ok_or_else(|| AppError::Config("entity extraction needs the LLM client".to_string()))?;
    Ok(Arc::new(
        CompositeSkillExtractor::new(Box::new(PatternSkillExtractor))
            .with(Box::new(EntitySkillExtractor(client))),
    ))
}
