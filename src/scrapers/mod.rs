//! ZeTorrents search provider: fetching, scanning and paginating result pages

pub mod lexer;
pub mod log;
pub mod pages;
pub mod provider;
pub mod scanner;
pub mod search;
pub mod sink;
pub mod url;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::FetchError;

pub use log::{get_log_path, init_log, log_error, log_info, read_recent_logs};
pub use pages::{PageSignals, PageStats};
pub use provider::{Category, LinkMode, Pagination, Provider};
pub use scanner::ResultScanner;
pub use search::{download, search, DownloadedFile, SearchSummary};
pub use sink::{PrettyPrinter, ResultSink};
pub use url::build_url;

/// One listing scraped from a result page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentRecord {
    pub name: String,
    /// Download URL. `None` when a detail page yielded no torrent link.
    pub link: Option<String>,
    pub desc_link: String,
    pub size: String,
    /// Seeders, or -1 when the cell text was not a number
    pub seeds: i64,
    /// Leechers, or -1 when the cell text was not a number
    pub leech: i64,
    pub engine_url: String,
}

impl TorrentRecord {
    pub fn link_str(&self) -> &str {
        self.link.as_deref().unwrap_or("")
    }
}

/// Source of raw page HTML
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Raw body, for torrent file downloads
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.fetch(url).await.map(String::into_bytes)
    }
}

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP client with standard headers
pub fn create_client(timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(Into::into)
}

/// `PageFetcher` backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        Ok(self.get(url).await?.text().await?)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }
}

/// Clean and trim text
pub fn clean_text(text: &str) -> String {
    text.trim().to_string()
}

/// Parse a count, mapping anything non-numeric to -1
pub fn parse_or_sentinel(text: &str) -> i64 {
    text.trim().parse::<i64>().unwrap_or(-1)
}

/// Rewrite French size units ("Go", "Mo", ...) to byte units.
///
/// Only the unit suffix changes; "1,5 Go" becomes "1,5 GB".
pub fn normalize_size(size: &str) -> String {
    let size = clean_text(size);
    let split = size
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphabetic())
        .last()
        .map(|(i, _)| i);

    let Some(idx) = split else {
        return size;
    };

    let (value, unit) = size.split_at(idx);
    let mut chars = unit.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(prefix), Some('o' | 'O'), None)
            if "kmgtp".contains(prefix.to_ascii_lowercase()) =>
        {
            format!("{}{}B", value, prefix.to_ascii_uppercase())
        }
        (Some('o' | 'O'), None, None) => format!("{}B", value),
        _ => size,
    }
}
