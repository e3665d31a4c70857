//! Streaming scanner turning result-table markup into records
//!
//! No DOM is built. The scanner walks the lexer's events with three named
//! states and a few depth counters:
//!
//! - `Outside` until an element carrying the provider's table marker opens
//! - `InTable` until a `tr` opens
//! - `InRow` where `td` advances the column and `span`/`a` nest
//!
//! Columns are fixed by the site template:
//! 0 = result link, 1 = name, 2 = size, 3 = seeds, 4 = leechers.
//! A row is flushed on `</tr>` or `</table>`. A row cut off by the end of
//! the document is dropped.

use std::collections::HashMap;

use super::lexer::{lex, HtmlEvent};
use super::pages::PageStats;
use super::provider::{LinkMode, Provider};
use super::{normalize_size, parse_or_sentinel, TorrentRecord};

const NB_OF_COLUMNS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    InTable,
    InRow,
}

/// Position inside the results table. -1 means "not inside one".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScanCursor {
    column: i32,
    span_depth: i32,
    anchor_depth: i32,
}

impl ScanCursor {
    const OUTSIDE: ScanCursor = ScanCursor {
        column: -1,
        span_depth: -1,
        anchor_depth: -1,
    };
}

/// Fields gathered for the row being scanned
#[derive(Debug, Default)]
struct RowBuilder {
    name: String,
    size: String,
    desc_link: Option<String>,
    link: Option<String>,
    seeds: Option<i64>,
    leech: Option<i64>,
}

impl RowBuilder {
    fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self.size.trim().is_empty()
            && self.desc_link.is_none()
            && self.link.is_none()
            && self.seeds.is_none()
            && self.leech.is_none()
    }

    fn build(self, engine_url: &str) -> TorrentRecord {
        TorrentRecord {
            name: self.name.split_whitespace().collect::<Vec<_>>().join(" "),
            link: self.link,
            desc_link: self.desc_link.unwrap_or_default(),
            size: normalize_size(&self.size),
            seeds: self.seeds.unwrap_or(-1),
            leech: self.leech.unwrap_or(-1),
            engine_url: engine_url.to_string(),
        }
    }
}

/// Incremental result-row extractor for one provider
#[derive(Debug)]
pub struct ResultScanner {
    engine_url: String,
    table_marker: String,
    result_path_prefix: String,
    direct_links: bool,
    state: State,
    cursor: ScanCursor,
    row: RowBuilder,
    completed: Vec<TorrentRecord>,
}

impl ResultScanner {
    pub fn new(provider: &Provider) -> Self {
        Self {
            engine_url: provider.base_url.clone(),
            table_marker: provider.table_marker.clone(),
            result_path_prefix: provider.result_path_prefix.clone(),
            direct_links: matches!(provider.link_mode, LinkMode::Direct),
            state: State::Outside,
            cursor: ScanCursor::OUTSIDE,
            row: RowBuilder::default(),
            completed: Vec::new(),
        }
    }

    /// Scan one page and return its rows in document order.
    ///
    /// `stats.hit_count` grows by one per returned row.
    pub fn feed(&mut self, html: &str, stats: &mut PageStats) -> Vec<TorrentRecord> {
        self.feed_events(&lex(html), stats)
    }

    /// Same as [`feed`](Self::feed) over an already lexed page
    pub fn feed_events(
        &mut self,
        events: &[HtmlEvent],
        stats: &mut PageStats,
    ) -> Vec<TorrentRecord> {
        self.reset();
        for event in events {
            self.handle(event, stats);
        }
        // an unterminated row never reaches the sink
        self.reset();
        self.take_records()
    }

    /// Process a single event
    pub fn handle(&mut self, event: &HtmlEvent, stats: &mut PageStats) {
        match event {
            HtmlEvent::Open { name, attrs } => self.open_tag(name, attrs, stats),
            HtmlEvent::Text(text) => self.text(text),
            HtmlEvent::Close(name) => self.close_tag(name, stats),
        }
    }

    /// Rows completed since the last call
    pub fn take_records(&mut self) -> Vec<TorrentRecord> {
        std::mem::take(&mut self.completed)
    }

    /// Back to `Outside`, dropping any partial row
    pub fn reset(&mut self) {
        self.state = State::Outside;
        self.cursor = ScanCursor::OUTSIDE;
        self.row = RowBuilder::default();
    }

    fn open_tag(&mut self, tag: &str, attrs: &HashMap<String, String>, stats: &mut PageStats) {
        match self.state {
            State::Outside => {
                let marked = attrs
                    .get("class")
                    .is_some_and(|class| class.contains(self.table_marker.as_str()));
                if marked {
                    self.state = State::InTable;
                }
            }
            State::InTable => {
                if tag == "tr" {
                    self.start_row();
                }
            }
            State::InRow => match tag {
                "tr" => {
                    // a new row implicitly ends the previous one
                    self.finish_row(stats);
                    self.start_row();
                }
                "td" => {
                    self.cursor.column += 1;
                    self.cursor.span_depth = -1;
                    self.cursor.anchor_depth = -1;
                }
                "span" if self.cursor.column > -1 => self.cursor.span_depth += 1,
                "a" if self.cursor.column > -1 => {
                    self.cursor.anchor_depth += 1;
                    if self.cursor.column == 0 {
                        self.result_link(attrs);
                    }
                }
                _ => {}
            },
        }
    }

    fn result_link(&mut self, attrs: &HashMap<String, String>) {
        if self.row.desc_link.is_some() {
            return;
        }
        let Some(href) = attrs.get("href") else {
            return;
        };
        if !href.starts_with(self.result_path_prefix.as_str()) {
            return;
        }

        let link = format!("{}{}", self.engine_url, href);
        if self.direct_links {
            self.row.link = Some(link.clone());
        }
        self.row.desc_link = Some(link);
    }

    fn text(&mut self, text: &str) {
        if self.state != State::InRow || self.cursor.column >= NB_OF_COLUMNS {
            return;
        }

        let ScanCursor {
            column,
            span_depth,
            anchor_depth,
        } = self.cursor;

        match column {
            1 if anchor_depth == 0 => self.row.name.push_str(text),
            // first non-blank run only, so trailing links do not append
            2 if anchor_depth <= 0 && self.row.size.trim().is_empty() => {
                self.row.size = text.to_string();
            }
            3 if span_depth == 0 && self.row.seeds.is_none() => {
                if !text.trim().is_empty() {
                    self.row.seeds = Some(parse_or_sentinel(text));
                }
            }
            4 if span_depth == 0 && self.row.leech.is_none() => {
                if !text.trim().is_empty() {
                    self.row.leech = Some(parse_or_sentinel(text));
                }
            }
            _ => {}
        }
    }

    fn close_tag(&mut self, tag: &str, stats: &mut PageStats) {
        match (self.state, tag) {
            (State::Outside, _) => {}
            (State::InRow, "table") => {
                self.finish_row(stats);
                self.reset();
            }
            (State::InTable, "table") => self.reset(),
            (State::InRow, "tr") => {
                self.finish_row(stats);
                self.state = State::InTable;
            }
            (State::InRow, "td") => {
                self.cursor.span_depth = -1;
                self.cursor.anchor_depth = -1;
            }
            (State::InRow, "span") if self.cursor.span_depth >= 0 => {
                self.cursor.span_depth -= 1;
            }
            (State::InRow, "a") if self.cursor.anchor_depth >= 0 => {
                self.cursor.anchor_depth -= 1;
            }
            _ => {}
        }
    }

    fn start_row(&mut self) {
        self.state = State::InRow;
        self.cursor = ScanCursor::OUTSIDE;
        self.row = RowBuilder::default();
    }

    fn finish_row(&mut self, stats: &mut PageStats) {
        self.cursor = ScanCursor::OUTSIDE;
        let row = std::mem::take(&mut self.row);
        if row.is_empty() {
            return;
        }
        self.completed.push(row.build(&self.engine_url));
        stats.hit_count += 1;
    }
}
