//! Provider identity, category table and per-site strategies

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SearchError};

pub const BASE_URL: &str = "https://zetorrents.com";
pub const RESULTS_PER_PAGE: usize = 100;
pub const MAX_PAGES_LOOKUP: i64 = 10;

/// Host-level search categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    All,
    Anime,
    Books,
    Games,
    Movies,
    Music,
    Pictures,
    Software,
    Tv,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::All,
        Category::Anime,
        Category::Books,
        Category::Games,
        Category::Movies,
        Category::Music,
        Category::Pictures,
        Category::Software,
        Category::Tv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Anime => "anime",
            Category::Books => "books",
            Category::Games => "games",
            Category::Movies => "movies",
            Category::Music => "music",
            Category::Pictures => "pictures",
            Category::Software => "software",
            Category::Tv => "tv",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| SearchError::UnknownCategory(s.to_string()))
    }
}

/// When to stop requesting further result pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pagination {
    /// Keep going while pages are full, up to the page count read from the
    /// navigation block, or `default_max_pages` before one is seen
    PageCount { default_max_pages: i64 },
    /// Keep going while pages are full and carry a `rel=next` link, for at
    /// most `max_pages` pages
    NextLink {
        #[serde(default = "default_max_pages")]
        max_pages: i64,
    },
}

fn default_max_pages() -> i64 {
    MAX_PAGES_LOOKUP
}

/// How a row's download link is obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkMode {
    /// The row's detail URL doubles as the download link
    Direct,
    /// Fetch the detail page and take the first capture of `pattern`
    DetailPage { pattern: String },
}

/// Static description of one result site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub base_url: String,
    /// Class marker on the element wrapping the results table
    pub table_marker: String,
    /// Path prefix of hrefs that point at a result's page
    pub result_path_prefix: String,
    pub results_per_page: usize,
    /// Category name -> path segments; a `null` segment means no filter
    pub categories: BTreeMap<String, Vec<Option<String>>>,
    pub pagination: Pagination,
    pub link_mode: LinkMode,
}

impl Provider {
    /// The zetorrents.com site
    pub fn zetorrents() -> Self {
        let categories = [
            ("all", None),
            ("anime", Some("animation")),
            ("books", Some("ebooks")),
            ("games", Some("jeux-pc")),
            ("movies", Some("films")),
            ("music", Some("musique")),
            ("tv", Some("series")),
        ]
        .into_iter()
        .map(|(name, segment)| (name.to_string(), vec![segment.map(String::from)]))
        .collect();

        Self {
            name: "ZeTorrents".to_string(),
            base_url: BASE_URL.to_string(),
            table_marker: "content-list-torrent".to_string(),
            result_path_prefix: "/torrents/".to_string(),
            results_per_page: RESULTS_PER_PAGE,
            categories,
            pagination: Pagination::PageCount {
                default_max_pages: MAX_PAGES_LOOKUP,
            },
            link_mode: LinkMode::Direct,
        }
    }

    /// Load a provider definition from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let provider: Provider =
            serde_json::from_str(json).map_err(|e| SearchError::InvalidProvider(e.to_string()))?;
        provider.validate()?;
        Ok(provider)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(SearchError::InvalidProvider("base_url is empty".into()));
        }
        if self.table_marker.is_empty() {
            return Err(SearchError::InvalidProvider("table_marker is empty".into()));
        }
        if self.results_per_page == 0 {
            return Err(SearchError::InvalidProvider(
                "results_per_page must be positive".into(),
            ));
        }
        let page_cap = match self.pagination {
            Pagination::PageCount { default_max_pages } => default_max_pages,
            Pagination::NextLink { max_pages } => max_pages,
        };
        if page_cap < 1 {
            return Err(SearchError::InvalidProvider(
                "page cap must be at least 1".into(),
            ));
        }
        if let LinkMode::DetailPage { pattern } = &self.link_mode {
            let re = Regex::new(pattern)
                .map_err(|e| SearchError::InvalidProvider(format!("link pattern: {}", e)))?;
            if re.captures_len() < 2 {
                return Err(SearchError::InvalidProvider(
                    "link pattern needs a capture group".into(),
                ));
            }
        }
        Ok(())
    }

    /// Path segments to search for `category`, in order
    pub fn segments(&self, category: Category) -> Result<&[Option<String>]> {
        self.categories
            .get(category.as_str())
            .map(Vec::as_slice)
            .ok_or_else(|| SearchError::UnsupportedCategory {
                provider: self.name.clone(),
                category: category.to_string(),
            })
    }

    /// Absolute URL for an href found on one of this site's pages
    pub fn absolute(&self, href: &str) -> String {
        let absolute = ["http://", "https://", "magnet:"];
        if absolute.iter().any(|scheme| href.starts_with(scheme)) {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            format!("{}/{}", self.base_url, href)
        }
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::zetorrents()
    }
}
