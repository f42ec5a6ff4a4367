use crate::{
    detail::{detail_url, extract_detail, DetailSource},
    error::ScrapeError,
    listing::Selectors,
};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const MIN_POLL: Duration = Duration::from_millis(50);
const MAX_POLL: Duration = Duration::from_millis(500);

/// A running Chromium instance and the task driving its CDP handler.
pub struct BrowserSession {
    browser: Browser,
    handle: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(headless: bool) -> Result<Self, ScrapeError> {
        let mut builder = BrowserConfig::builder().no_sandbox();
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(ScrapeError::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler error: {}", e);
                }
            }
        });

        info!(headless, "browser launched");
        Ok(Self { browser, handle })
    }

    /// Open the listing, select a tab and expand every category section.
    ///
    /// Returns the page markup once all sections report as expanded.
    pub async fn open_listing(
        &self,
        url: &str,
        tab_index: usize,
        selectors: &Selectors,
        timeout_ms: u64,
    ) -> Result<String, ScrapeError> {
        let page = self.browser.new_page(url).await?;
        let ret = expand_listing(&page, tab_index, selectors, timeout_ms).await;
        close_page(page).await;
        ret
    }

    pub fn detail_fetcher<'a>(
        &'a self,
        selector: &'a str,
        suffix: Option<&'a str>,
        timeout_ms: u64,
    ) -> BrowserDetailFetcher<'a> {
        BrowserDetailFetcher {
            session: self,
            selector,
            suffix,
            timeout_ms,
        }
    }

    pub async fn close(mut self) -> Result<(), ScrapeError> {
        self.browser.close().await?;
        if let Err(e) = self.handle.await {
            warn!("browser handler task failed: {}", e);
        }
        Ok(())
    }
}

async fn expand_listing(
    page: &Page,
    tab_index: usize,
    selectors: &Selectors,
    timeout_ms: u64,
) -> Result<String, ScrapeError> {
    page.wait_for_navigation().await?;

    wait_for_count(page, &selectors.tab_link, tab_index + 1, timeout_ms).await?;
    let tabs = page.find_elements(selectors.tab_link.as_str()).await?;
    let tab = tabs.get(tab_index).ok_or_else(|| ScrapeError::NotFound {
        selector: format!("{}[{}]", selectors.tab_link, tab_index),
        timeout_ms,
    })?;
    tab.click().await?;
    debug!(tab_index, "tab selected");

    wait_for_count(page, &selectors.table, 1, timeout_ms).await?;
    let tables = page.find_elements(selectors.table.as_str()).await?.len();
    wait_for_count(page, &selectors.accordion, tables, timeout_ms).await?;

    for button in page.find_elements(selectors.accordion.as_str()).await? {
        let class = button.attribute("class").await?.unwrap_or_default();
        if !class.split_whitespace().any(|c| c == "active") {
            button.click().await?;
        }
    }

    let active = format!("{}.active", selectors.accordion);
    wait_for_count(page, &active, tables, timeout_ms).await?;
    info!(tables, "category sections expanded");

    Ok(page.content().await?)
}

/// Poll until `selector` matches at least `count` elements.
async fn wait_for_count(
    page: &Page,
    selector: &str,
    count: usize,
    timeout_ms: u64,
) -> Result<(), ScrapeError> {
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let mut delay = MIN_POLL;

    loop {
        let found = page
            .find_elements(selector)
            .await
            .map(|els| els.len())
            .unwrap_or(0);
        if found >= count {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(ScrapeError::NotFound {
                selector: selector.to_string(),
                timeout_ms,
            });
        }
        tokio::time::sleep(delay).await;
        delay = (delay * 2).min(MAX_POLL);
    }
}

async fn close_page(page: Page) {
    if let Err(e) = page.close().await {
        debug!("failed to close page: {}", e);
    }
}

/// Fetches detail pages one at a time in a fresh tab.
pub struct BrowserDetailFetcher<'a> {
    session: &'a BrowserSession,
    selector: &'a str,
    suffix: Option<&'a str>,
    timeout_ms: u64,
}

#[async_trait]
impl DetailSource for BrowserDetailFetcher<'_> {
    async fn fetch_detail(&self, link: &str) -> Result<String, ScrapeError> {
        let url = detail_url(link, self.suffix);
        debug!(url = url.as_str(), "opening detail page");

        let page = self.session.browser.new_page(url.as_str()).await?;
        let ret = async {
            wait_for_count(&page, self.selector, 1, self.timeout_ms).await?;
            let html = page.content().await?;
            extract_detail(&html, self.selector)?.ok_or_else(|| ScrapeError::NotFound {
                selector: self.selector.to_string(),
                timeout_ms: self.timeout_ms,
            })
        }
        .await;
        close_page(page).await;
        ret
    }
}
