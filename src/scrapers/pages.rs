//! Pagination signals read from a result page's navigation block

use std::collections::HashMap;

use super::lexer::HtmlEvent;

/// What a page's navigation block says about further pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageSignals {
    /// A `rel=next` link is present
    pub has_next: bool,
    /// Highest page number linked, only read on the last page
    pub max_page: Option<i64>,
}

/// Counters shared between the scanner and the pagination loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageStats {
    /// Rows emitted from the current page
    pub hit_count: usize,
    /// Largest page number seen so far in this search, -1 if none
    pub observed_max_pages: i64,
}

impl Default for PageStats {
    fn default() -> Self {
        Self {
            hit_count: 0,
            observed_max_pages: -1,
        }
    }
}

impl PageStats {
    pub fn start_page(&mut self) {
        self.hit_count = 0;
    }

    pub fn observe(&mut self, signals: &PageSignals) {
        if let Some(n) = signals.max_page {
            if n > self.observed_max_pages {
                self.observed_max_pages = n;
            }
        }
    }
}

/// Class of the navigation block
const PAGES_CLASS: &str = "pages";
/// Class of the prev/next spans, whose anchors carry no page number
const NEXT_PREV_CLASS: &str = "nextPrev";

fn has_class(attrs: &HashMap<String, String>, class: &str) -> bool {
    attrs
        .get("class")
        .is_some_and(|c| c.split_whitespace().any(|c| c == class))
}

/// Scan the `.pages` navigation block of a lexed page.
///
/// Page numbers are only reported when no `rel=next` link is present.
pub fn page_signals(events: &[HtmlEvent]) -> PageSignals {
    // div nesting inside the block, 0 when outside
    let mut block_depth = 0usize;
    // 0 outside a number span, else span nesting
    let mut number_span = 0usize;
    let mut anchor_text: Option<String> = None;
    let mut has_next = false;
    let mut max_page: Option<i64> = None;

    for event in events {
        match event {
            HtmlEvent::Open { name, attrs } => match name.as_str() {
                "div" if block_depth > 0 => block_depth += 1,
                "div" if has_class(attrs, PAGES_CLASS) => block_depth = 1,
                _ if block_depth == 0 => {}
                "span" if number_span > 0 => number_span += 1,
                "span" if !has_class(attrs, NEXT_PREV_CLASS) => number_span = 1,
                "a" => {
                    if attrs.get("rel").is_some_and(|r| r.eq_ignore_ascii_case("next")) {
                        has_next = true;
                    }
                    if number_span > 0 {
                        anchor_text = Some(String::new());
                    }
                }
                _ => {}
            },
            HtmlEvent::Text(text) => {
                if let Some(buf) = anchor_text.as_mut() {
                    buf.push_str(text);
                }
            }
            HtmlEvent::Close(name) => match name.as_str() {
                _ if block_depth == 0 => {}
                "div" => {
                    block_depth -= 1;
                    if block_depth == 0 {
                        number_span = 0;
                        anchor_text = None;
                    }
                }
                "span" => number_span = number_span.saturating_sub(1),
                "a" => {
                    if let Some(n) = anchor_text.take().and_then(|t| t.trim().parse::<i64>().ok()) {
                        max_page = max_page.max(Some(n));
                    }
                }
                _ => {}
            },
        }
    }

    if has_next {
        max_page = None;
    }
    PageSignals { has_next, max_page }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::lexer::lex;

    fn signals(html: &str) -> PageSignals {
        page_signals(&lex(html))
    }

    const MIDDLE_PAGE: &str = r#"
        <div class="pages">
          <span class="nextPrev"><a href="/p/1">Prev</a></span>
          <span><a href="/p/1">1</a></span>
          <span><a href="/p/3">3</a></span>
          <span class="nextPrev"><a rel="next" href="/p/3">Suivant</a></span>
        </div>"#;

    const LAST_PAGE: &str = r##"
        <div class="pages">
          <span class="nextPrev"><a href="/p/3">Prev</a></span>
          <span><a href="/p/1">1</a></span>
          <span><a href="/p/2">2</a></span>
          <span><a href="/p/3">3</a></span>
          <span><a href="/p/4">4</a></span>
          <span><a href="#">...</a></span>
        </div>"##;

    #[test]
    fn next_link_hides_page_numbers() {
        let s = signals(MIDDLE_PAGE);
        assert!(s.has_next);
        assert_eq!(s.max_page, None);
    }

    #[test]
    fn last_page_reports_highest_number() {
        let s = signals(LAST_PAGE);
        assert!(!s.has_next);
        assert_eq!(s.max_page, Some(4));
    }

    #[test]
    fn missing_navigation_block() {
        assert_eq!(signals("<p>nothing</p>"), PageSignals::default());
    }

    #[test]
    fn numbers_outside_the_block_are_ignored() {
        let html = format!(
            r#"<div class="content"><span><a href="/t/99">99</a></span></div>{}
            <div class="footer"><span><a href="/p/50">50</a></span></div>"#,
            LAST_PAGE
        );
        assert_eq!(signals(&html).max_page, Some(4));
    }

    #[test]
    fn nested_divs_stay_inside_the_block() {
        let html = r#"<div class="pages"><div class="inner"><span><a>2</a></span></div>
            <span><a>7</a></span></div><span><a>80</a></span>"#;
        assert_eq!(signals(html).max_page, Some(7));
    }

    #[test]
    fn stats_keep_the_largest_count() {
        let mut stats = PageStats::default();
        stats.observe(&PageSignals::default());
        assert_eq!(stats.observed_max_pages, -1);
        stats.observe(&PageSignals { has_next: false, max_page: Some(5) });
        stats.observe(&PageSignals { has_next: false, max_page: Some(2) });
        assert_eq!(stats.observed_max_pages, 5);

        stats.hit_count = 7;
        stats.start_page();
        assert_eq!(stats.hit_count, 0);
        assert_eq!(stats.observed_max_pages, 5);
    }
}
