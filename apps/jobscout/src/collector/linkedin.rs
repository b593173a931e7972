//! LinkedIn public job search, scraped through the guest listing endpoint.
//!
//! Each keyword is one partition. Partitions run on a bounded, ordered
//! buffered stream and each returns its own list; `merge_partitions` dedups
//! them once every partition has finished. A failed partition becomes a
//! warning unless every partition failed.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use crate::collector::{merge_partitions, Collected, CollectorSettings, PostingSource};
use crate::errors::AppError;
use crate::models::Posting;

const LINKEDIN_BASE_URL: &str = "https://www.linkedin.com";
const SEARCH_PATH: &str = "/jobs-guest/jobs/api/seeMoreJobPostings/search";
const CARDS_PER_PAGE: usize = 25;
const SOURCE_NAME: &str = "LinkedIn";
const MISSING_DESCRIPTION: &str = "Description not available";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Summary fields read from one search result card.
#[derive(Debug, Clone, PartialEq)]
struct JobCard {
    title: String,
    company: String,
    location: String,
    link: String,
}

pub struct LinkedInPostingSource {
    client: Client,
    base_url: String,
    settings: CollectorSettings,
}

impl LinkedInPostingSource {
    pub fn new(settings: CollectorSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Collection(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: LINKEDIN_BASE_URL.to_string(),
            settings,
        })
    }

    async fn scrape_keyword(&self, keyword: &str) -> Result<Vec<Posting>, AppError> {
        info!("Scraping LinkedIn for '{}'", keyword);
        let mut postings = Vec::new();

        for page in 0..self.settings.pages_per_keyword.max(1) {
            let start = (page * CARDS_PER_PAGE).to_string();
            let html = self
                .fetch(
                    &format!("{}{}", self.base_url, SEARCH_PATH),
                    &[("keywords", keyword), ("location", ""), ("start", &start)],
                )
                .await;

            let html = match html {
                Ok(html) => html,
                // Only the first page decides whether the partition failed.
                Err(e) if page == 0 => return Err(e),
                Err(e) => {
                    warn!("Stopping '{}' at page {}: {}", keyword, page, e);
                    break;
                }
            };

            let cards = parse_search_cards(&html);
            if cards.is_empty() {
                break;
            }

            for card in cards {
                self.pause().await;
                let description = match self.fetch(&card.link, &[]).await {
                    Ok(page_html) => parse_description(&page_html),
                    Err(e) => {
                        warn!("Could not load description for {}: {}", card.link, e);
                        None
                    }
                };
                postings.push(Posting {
                    title: card.title,
                    link: card.link,
                    company: card.company,
                    location: card.location,
                    description: description.unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
                    source: SOURCE_NAME.to_string(),
                });
            }
        }

        info!("Collected {} postings for '{}'", postings.len(), keyword);
        Ok(postings)
    }

    async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> Result<String, AppError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Collection(format!("request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Collection(format!(
                "{url} returned HTTP {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Collection(format!("cannot read body of {url}: {e}")))
    }

    async fn pause(&self) {
        if self.settings.request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.settings.request_delay_ms)).await;
        }
    }
}

#[async_trait]
impl PostingSource for LinkedInPostingSource {
    fn name(&self) -> &str {
        "linkedin"
    }

    async fn collect(&self) -> Result<Collected, AppError> {
        let workers = self.settings.effective_workers();
        info!(
            "Scraping {} keywords with {} workers",
            self.settings.keywords.len(),
            workers
        );

        let results: Vec<Result<Vec<Posting>, AppError>> =
            stream::iter(self.settings.keywords.clone())
                .map(|keyword| async move { self.scrape_keyword(&keyword).await })
                .buffered(workers)
                .collect()
                .await;

        let mut partitions = Vec::new();
        let mut failures = Vec::new();
        for (keyword, result) in self.settings.keywords.iter().zip(results) {
            match result {
                Ok(postings) => partitions.push(postings),
                Err(e) => {
                    warn!("Partition '{}' failed: {}", keyword, e);
                    failures.push(format!("search '{keyword}' failed: {e}"));
                }
            }
        }

        if partitions.is_empty() {
            return Err(AppError::Collection(format!(
                "every search partition failed: {}",
                failures.join("; ")
            )));
        }

        Ok(Collected {
            postings: merge_partitions(partitions),
            warnings: failures,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HTML parsing
// ────────────────────────────────────────────────────────────────────────────

fn parse_search_cards(html: &str) -> Vec<JobCard> {
    let document = Html::parse_fragment(html);
    let Ok(card_selector) = Selector::parse("div.base-card") else {
        return Vec::new();
    };

    document
        .select(&card_selector)
        .filter_map(|card| {
            let title = select_text(card, "h3.base-search-card__title")?;
            let link = select_attr(card, "a.base-card__full-link", "href")?;
            Some(JobCard {
                title,
                company: select_text(card, "h4.base-search-card__subtitle").unwrap_or_default(),
                location: select_text(card, "span.job-search-card__location")
                    .unwrap_or_default(),
                link: strip_tracking(&link),
            })
        })
        .collect()
}

fn parse_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("div.show-more-less-html__markup").ok()?;
    let element = document.select(&selector).next()?;
    let text = clean_text(&element.text().collect::<Vec<_>>().join(" "));
    (!text.is_empty()).then_some(text)
}

fn select_text(element: ElementRef<'_>, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let found = element.select(&selector).next()?;
    let text = clean_text(&found.text().collect::<Vec<_>>().join(" "));
    (!text.is_empty()).then_some(text)
}

fn select_attr(element: ElementRef<'_>, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    element
        .select(&selector)
        .next()?
        .value()
        .attr(attr)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drops the query string so the same job found via different searches dedups.
fn strip_tracking(link: &str) -> String {
    link.split('?').next().unwrap_or(link).to_string()
}
