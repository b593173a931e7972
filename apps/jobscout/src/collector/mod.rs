// Posting collection. The scorer only sees the deduplicated postings
// returned by a `PostingSource`; how they were gathered stays in here.

pub mod csv_source;
pub mod linkedin;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::Posting;

pub use csv_source::{write_snapshot, CsvPostingSource};
pub use linkedin::LinkedInPostingSource;

pub const MAX_WORKERS: usize = 3;

#[async_trait]
pub trait PostingSource: Send + Sync {
    fn name(&self) -> &str;

    /// A finite posting sequence with unique links, plus any partial
    /// failures the source recovered from.
    async fn collect(&self) -> Result<Collected, AppError>;
}

/// Output of one collection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collected {
    pub postings: Vec<Posting>,
    /// Non-fatal failures (a dead search partition, a skipped row).
    pub warnings: Vec<String>,
}

impl From<Vec<Posting>> for Collected {
    fn from(postings: Vec<Posting>) -> Self {
        Self {
            postings,
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub keywords: Vec<String>,
    pub pages_per_keyword: usize,
    /// Concurrent keyword partitions, clamped to 1..=MAX_WORKERS.
    pub workers: usize,
    pub request_delay_ms: u64,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            keywords: vec![
                "software engineer".to_string(),
                "software engineer intern".to_string(),
                "software developer".to_string(),
            ],
            pages_per_keyword: 1,
            workers: MAX_WORKERS,
            request_delay_ms: 1000,
        }
    }
}

impl CollectorSettings {
    pub fn effective_workers(&self) -> usize {
        self.workers.clamp(1, MAX_WORKERS)
    }
}

/// Concatenates per-partition results in order and drops repeated links.
/// The first occurrence of a link wins.
pub fn merge_partitions(partitions: Vec<Vec<Posting>>) -> Vec<Posting> {
    let mut seen = HashSet::new();
    partitions
        .into_iter()
        .flatten()
        .filter(|p| !p.link.is_empty() && seen.insert(p.link.clone()))
        .collect()
}
