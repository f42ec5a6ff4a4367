use crate::{
    browser::BrowserSession,
    detail::DetailSource,
    error::ScrapeError,
    listing::{attribute, parse_listing, Listing, Selectors},
    record::{assemble, ProblemRecord},
};
use anyhow::Result;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_URL: &str = "https://neetcode.io/practice/";

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
pub struct ProblemScraper {
    #[builder(setter(into), default = "DEFAULT_URL.to_string()")]
    url: String,
    #[builder(default = "2")]
    tab_index: usize,
    #[builder(default = "3")]
    batch_size: usize,
    #[builder(setter(into, strip_option), default)]
    detail_suffix: Option<String>,
    #[builder(default = "10_000")]
    timeout_ms: u64,
    #[builder(default = "true")]
    headless: bool,
    #[builder(default)]
    selectors: Selectors,
}

/// A detail fetch that failed for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub index: usize,
    pub title: String,
    pub link: Option<String>,
    pub reason: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub records: Vec<ProblemRecord>,
    pub failures: Vec<RowFailure>,
}

impl ProblemScraper {
    pub async fn scrape(&self) -> Result<ScrapeReport> {
        let base = Url::parse(&self.url)?;
        let session = BrowserSession::launch(self.headless).await?;

        let report = self.scrape_with(&session, &base).await;
        if let Err(e) = session.close().await {
            warn!("failed to close browser: {}", e);
        }
        report
    }

    async fn scrape_with(&self, session: &BrowserSession, base: &Url) -> Result<ScrapeReport> {
        info!(url = self.url.as_str(), tab = self.tab_index, "opening listing");
        let html = session
            .open_listing(&self.url, self.tab_index, &self.selectors, self.timeout_ms)
            .await?;
        let listing = parse_listing(&html, Some(base), &self.selectors)?;
        info!(
            tables = listing.tables.len(),
            rows = listing.rows.len(),
            "listing parsed"
        );

        let fetcher = session.detail_fetcher(
            &self.selectors.detail,
            self.detail_suffix.as_deref(),
            self.timeout_ms,
        );
        Ok(build_report(listing, &fetcher, self.batch_size).await?)
    }
}

/// Join rows with their categories and enrich the first `batch_size` linked
/// rows with detail markup.
///
/// A failed detail fetch leaves that record without markup and is recorded
/// in [`ScrapeReport::failures`]; it never aborts the remaining rows.
pub async fn build_report<S: DetailSource + ?Sized>(
    listing: Listing,
    source: &S,
    batch_size: usize,
) -> Result<ScrapeReport, ScrapeError> {
    let categories = attribute(&listing.tables)?;
    if categories.len() != listing.rows.len() {
        return Err(ScrapeError::InputMismatch {
            labels: categories.len(),
            counts: listing.rows.len(),
        });
    }

    let mut report = ScrapeReport::default();
    let mut attempted = 0;

    for (index, (fields, category)) in listing.rows.into_iter().zip(categories).enumerate() {
        let mut detail = None;

        if let Some(link) = fields.link.as_deref().filter(|_| attempted < batch_size) {
            attempted += 1;
            match source.fetch_detail(link).await {
                Ok(markup) => detail = Some(markup),
                Err(e) => {
                    warn!(index, link, "detail fetch failed: {}", e);
                    report.failures.push(RowFailure {
                        index,
                        title: fields.title.clone().unwrap_or_default(),
                        link: Some(link.to_string()),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.records.push(assemble(fields, category, detail));
    }

    Ok(report)
}
