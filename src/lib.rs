//! zetorrents - ZeTorrents search provider for torrent search aggregators

pub mod config;
pub mod error;
pub mod scrapers;

pub use error::{FetchError, Result, SearchError};
pub use scrapers::{search, Provider, TorrentRecord};
