//! Search and download entry points, and the page-by-page loop driving them

use regex::Regex;
use scraper::{Html, Selector};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::lexer::lex;
use super::pages::{page_signals, PageSignals, PageStats};
use super::provider::{Category, LinkMode, Pagination, Provider};
use super::scanner::ResultScanner;
use super::sink::ResultSink;
use super::url::build_url;
use super::{log_error, log_info, PageFetcher};
use crate::error::{Result, SearchError};

/// Totals for one finished search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub records: usize,
    pub pages_fetched: usize,
}

/// Search `provider` for `query` (already escaped) in `category`.
///
/// Records reach `sink` page by page, in site order. A failed fetch aborts
/// the whole search; records emitted before it stay emitted.
pub async fn search<F, S>(
    fetcher: &F,
    provider: &Provider,
    query: &str,
    category: &str,
    sink: &mut S,
) -> Result<SearchSummary>
where
    F: PageFetcher + ?Sized,
    S: ResultSink + ?Sized,
{
    let category: Category = category.parse()?;
    let segments = provider.segments(category)?;
    let mut controller = PaginationController::new(provider)?;

    for segment in segments {
        controller
            .run_category(fetcher, query, segment.as_deref(), sink)
            .await?;
    }

    log_info(
        &provider.name,
        &format!(
            "Search '{}' in {} done: {} results from {} pages",
            query, category, controller.summary.records, controller.summary.pages_fetched
        ),
    );
    Ok(controller.summary)
}

/// Fetch/scan loop for one search
struct PaginationController<'p> {
    provider: &'p Provider,
    scanner: ResultScanner,
    stats: PageStats,
    link_pattern: Option<Regex>,
    summary: SearchSummary,
}

impl<'p> PaginationController<'p> {
    fn new(provider: &'p Provider) -> Result<Self> {
        provider.validate()?;
        let link_pattern = match &provider.link_mode {
            LinkMode::Direct => None,
            LinkMode::DetailPage { pattern } => Some(
                Regex::new(pattern).map_err(|e| SearchError::InvalidProvider(e.to_string()))?,
            ),
        };

        Ok(Self {
            provider,
            scanner: ResultScanner::new(provider),
            stats: PageStats::default(),
            link_pattern,
            summary: SearchSummary::default(),
        })
    }

    async fn run_category<F, S>(
        &mut self,
        fetcher: &F,
        query: &str,
        segment: Option<&str>,
        sink: &mut S,
    ) -> Result<()>
    where
        F: PageFetcher + ?Sized,
        S: ResultSink + ?Sized,
    {
        let provider = self.provider;
        let source = provider.name.as_str();
        let mut page = 1u32;

        loop {
            let url = build_url(&provider.base_url, query, segment, page);
            log_info(source, &format!("Fetching: {}", url));

            let html = fetcher.fetch(&url).await.map_err(|e| {
                log_error(source, &format!("Failed to fetch {}: {}", url, e));
                SearchError::Transport {
                    url: url.clone(),
                    source: e,
                }
            })?;
            self.summary.pages_fetched += 1;

            self.stats.start_page();
            let events = lex(&html);
            let records = self.scanner.feed_events(&events, &mut self.stats);
            let signals = page_signals(&events);
            self.stats.observe(&signals);

            for mut record in records {
                if let Some(re) = &self.link_pattern {
                    record.link = resolve_link(fetcher, provider, re, &record.desc_link).await;
                }
                sink.emit(&record);
                self.summary.records += 1;
            }

            log_info(
                source,
                &format!("Page {}: {} results", page, self.stats.hit_count),
            );

            if !self.has_more(page, &signals) {
                break;
            }
            page += 1;
        }

        Ok(())
    }

    /// Whether the page just scanned calls for another one
    fn has_more(&self, page: u32, signals: &PageSignals) -> bool {
        let full = self.stats.hit_count >= self.provider.results_per_page;

        match self.provider.pagination {
            Pagination::PageCount { default_max_pages } => {
                let max_pages = if self.stats.observed_max_pages > -1 {
                    self.stats.observed_max_pages
                } else {
                    default_max_pages
                };
                full && i64::from(page) < max_pages
            }
            Pagination::NextLink { max_pages } => {
                full && signals.has_next && i64::from(page) < max_pages
            }
        }
    }
}

/// Fetch a result's detail page and pull its download link out of it
async fn resolve_link<F>(
    fetcher: &F,
    provider: &Provider,
    pattern: &Regex,
    desc_link: &str,
) -> Option<String>
where
    F: PageFetcher + ?Sized,
{
    if desc_link.is_empty() {
        return None;
    }

    let html = match fetcher.fetch(desc_link).await {
        Ok(h) => h,
        Err(e) => {
            log_error(
                &provider.name,
                &format!("Detail page {} failed: {}", desc_link, e),
            );
            return None;
        }
    };

    match download_href(&html, pattern) {
        Some(href) => Some(provider.absolute(&href)),
        None => {
            log_info(
                &provider.name,
                &format!("No download link on {}", desc_link),
            );
            None
        }
    }
}

/// Download href on a detail page: the provider pattern's first capture,
/// else the first `.torrent` or magnet anchor
fn download_href(html: &str, pattern: &Regex) -> Option<String> {
    if let Some(m) = pattern.captures(html).and_then(|c| c.get(1)) {
        return Some(m.as_str().replace("&amp;", "&"));
    }

    let document = Html::parse_document(html);
    let link_sel = Selector::parse(r#"a[href$=".torrent"], a[href^="magnet:"]"#).ok()?;
    document
        .select(&link_sel)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(String::from)
}

/// A torrent file saved to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub url: String,
}

impl fmt::Display for DownloadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path.display(), self.url)
    }
}

/// Download `url` into a new `.torrent` file under `dir`
pub async fn download<F>(fetcher: &F, url: &str, dir: &Path) -> Result<DownloadedFile>
where
    F: PageFetcher + ?Sized,
{
    let bytes = fetcher
        .fetch_bytes(url)
        .await
        .map_err(|source| SearchError::Transport {
            url: url.to_string(),
            source,
        })?;

    let mut file = tempfile::Builder::new()
        .prefix("zetorrents-")
        .suffix(".torrent")
        .tempfile_in(dir)?;
    file.write_all(&bytes)?;
    let (_, path) = file.keep().map_err(|e| e.error)?;

    Ok(DownloadedFile {
        path,
        url: url.to_string(),
    })
}
