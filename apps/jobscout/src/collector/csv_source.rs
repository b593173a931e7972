use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::collector::{merge_partitions, Collected, PostingSource};
use crate::errors::AppError;
use crate::models::Posting;

const DEFAULT_SOURCE: &str = "csv";

/// Reads postings from a CSV snapshot (`title,link,company,location,description,source`).
pub struct CsvPostingSource {
    path: PathBuf,
}

impl CsvPostingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PostingSource for CsvPostingSource {
    fn name(&self) -> &str {
        "csv"
    }

    async fn collect(&self) -> Result<Collected, AppError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            AppError::Collection(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let collected = parse_postings(&bytes)?;
        info!(
            "Loaded {} postings from {} ({} rows skipped)",
            collected.postings.len(),
            self.path.display(),
            collected.warnings.len()
        );
        Ok(collected)
    }
}

fn parse_postings(bytes: &[u8]) -> Result<Collected, AppError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut rows = Vec::new();
    let mut warnings = Vec::new();
    for (line, record) in reader.deserialize::<Posting>().enumerate() {
        match record {
            Ok(mut posting) => {
                if posting.source.is_empty() {
                    posting.source = DEFAULT_SOURCE.to_string();
                }
                rows.push(posting);
            }
            Err(e) if e.is_io_error() => {
                return Err(AppError::Collection(format!("CSV read failed: {e}")));
            }
            Err(e) => {
                let warning = format!("skipped malformed CSV row {}: {e}", line + 1);
                warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }
    Ok(Collected {
        postings: merge_partitions(vec![rows]),
        warnings,
    })
}

/// Writes postings to a CSV snapshot, replacing any existing file.
pub fn write_snapshot(path: &Path, postings: &[Posting]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::Persistence(format!("cannot create {}: {e}", path.display()))
    })?;
    for posting in postings {
        writer
            .serialize(posting)
            .map_err(|e| AppError::Persistence(format!("cannot write posting: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::Persistence(format!("cannot flush {}: {e}", path.display())))?;
    info!("Saved {} postings to {}", postings.len(), path.display());
    Ok(())
}
