use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use zetorrents::scrapers::{search, PageFetcher, Provider, SearchSummary, TorrentRecord};
use zetorrents::{FetchError, SearchError};

const BASE: &str = "https://zetorrents.com";

/// Serves canned pages and records every requested URL
#[derive(Default)]
struct ScriptedFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or(FetchError::Status { status: 503 })
    }
}

fn result_row(id: usize, name: &str, size: &str, seeds: &str, leech: &str) -> String {
    format!(
        r#"
        <tr>
          <td><a href="/torrents/{id}-{slug}"><img src="/img/film.png"/></a></td>
          <td><a href="/torrents/{id}-{slug}">{name}</a></td>
          <td>{size}</td>
          <td><span class="seed_ok">{seeds}</span></td>
          <td><span class="down">{leech}</span></td>
        </tr>"#,
        slug = name.to_lowercase().replace(' ', "-")
    )
}

fn results_page(rows: &[String]) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head><title>Recherche</title><script>var x = "<tr>";</script></head>
<body>
  <div class="header"><a href="/torrents/top">Top</a></div>
  <div class="content-list-torrent">
    <table class="table table-hover">
      <thead><tr><th>Nom</th><th>Taille</th><th>Seed</th><th>Leech</th></tr></thead>
      <tbody>
      {}
      </tbody>
    </table>
  </div>
  <div class="pages">
    <span><a href="/torrents/find/:1">1</a></span>
    <span class="nextPrev"><a rel="next" href="/torrents/find/:2">Suivant</a></span>
  </div>
</body>
</html>"#,
        rows.concat()
    )
}

fn full_page(start: usize) -> String {
    let rows: Vec<String> = (start..start + 100)
        .map(|i| result_row(i, &format!("Release {}", i), "1 Go", "5", "1"))
        .collect();
    results_page(&rows)
}

#[tokio::test]
async fn movies_search_emits_rows_in_document_order() {
    let url = format!("{}/torrents/find/1/films/:1?title=ubuntu", BASE);
    let fetcher = ScriptedFetcher::default().page(
        &url,
        results_page(&[
            result_row(11, "Ubuntu 24.04 Desktop", "5,7 Go", "120", "8"),
            result_row(12, "Ubuntu Server", "2,6 Go", "N/A", "2"),
            result_row(13, "Ubuntu Touch", "700 Mo", "0", "0"),
        ]),
    );

    let mut sink: Vec<TorrentRecord> = Vec::new();
    let summary = search(&fetcher, &Provider::zetorrents(), "ubuntu", "movies", &mut sink)
        .await
        .unwrap();

    assert_eq!(summary, SearchSummary { records: 3, pages_fetched: 1 });
    assert_eq!(fetcher.requested(), vec![url]);

    let names: Vec<&str> = sink.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Ubuntu 24.04 Desktop", "Ubuntu Server", "Ubuntu Touch"]);

    assert_eq!(
        sink[0],
        TorrentRecord {
            name: "Ubuntu 24.04 Desktop".into(),
            link: Some(format!("{}/torrents/11-ubuntu-24.04-desktop", BASE)),
            desc_link: format!("{}/torrents/11-ubuntu-24.04-desktop", BASE),
            size: "5,7 GB".into(),
            seeds: 120,
            leech: 8,
            engine_url: BASE.into(),
        }
    );
    assert_eq!(sink[1].seeds, -1);
    assert_eq!(sink[1].leech, 2);
    assert_eq!(sink[2].size, "700 MB");
}

#[tokio::test]
async fn unknown_category_fails_before_fetching() {
    let fetcher = ScriptedFetcher::default();
    let mut sink: Vec<TorrentRecord> = Vec::new();

    let err = search(&fetcher, &Provider::zetorrents(), "ubuntu", "cartoons", &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::UnknownCategory(_)));
    assert!(fetcher.requested().is_empty());
}

#[tokio::test]
async fn unsupported_category_fails_before_fetching() {
    let fetcher = ScriptedFetcher::default();
    let mut sink: Vec<TorrentRecord> = Vec::new();

    let err = search(&fetcher, &Provider::zetorrents(), "ubuntu", "software", &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::UnsupportedCategory { .. }));
    assert!(fetcher.requested().is_empty());
}

#[tokio::test]
async fn full_pages_continue_until_a_short_one() {
    let fetcher = ScriptedFetcher::default()
        .page(&format!("{}/torrents/find/:1?title=linux", BASE), full_page(0))
        .page(&format!("{}/torrents/find/:2?title=linux", BASE), full_page(100))
        .page(
            &format!("{}/torrents/find/:3?title=linux", BASE),
            results_page(&[result_row(999, "Last", "1 Go", "1", "1")]),
        );

    let mut sink: Vec<TorrentRecord> = Vec::new();
    let summary = search(&fetcher, &Provider::zetorrents(), "linux", "all", &mut sink)
        .await
        .unwrap();

    assert_eq!(summary, SearchSummary { records: 201, pages_fetched: 3 });
    assert_eq!(sink[0].name, "Release 0");
    assert_eq!(sink[199].name, "Release 199");
    assert_eq!(sink[200].name, "Last");
}

#[tokio::test]
async fn transport_failure_aborts_but_keeps_emitted_records() {
    let fetcher = ScriptedFetcher::default()
        .page(&format!("{}/torrents/find/:1?title=linux", BASE), full_page(0));

    let mut sink: Vec<TorrentRecord> = Vec::new();
    let err = search(&fetcher, &Provider::zetorrents(), "linux", "all", &mut sink)
        .await
        .unwrap_err();

    match err {
        SearchError::Transport { url, .. } => {
            assert_eq!(url, format!("{}/torrents/find/:2?title=linux", BASE))
        }
        other => panic!("expected transport error, got {:?}", other),
    }
    assert_eq!(sink.len(), 100);
}

#[tokio::test]
async fn every_mapped_segment_is_searched_in_order() {
    let mut provider = Provider::zetorrents();
    provider.categories.insert(
        "movies".to_string(),
        vec![Some("films".to_string()), Some("films-hd".to_string())],
    );

    let fetcher = ScriptedFetcher::default()
        .page(
            &format!("{}/torrents/find/1/films/:1?title=dune", BASE),
            results_page(&[result_row(1, "Dune", "2 Go", "3", "1")]),
        )
        .page(
            &format!("{}/torrents/find/1/films-hd/:1?title=dune", BASE),
            results_page(&[result_row(2, "Dune 2160p", "40 Go", "9", "4")]),
        );

    let mut sink: Vec<TorrentRecord> = Vec::new();
    search(&fetcher, &provider, "dune", "movies", &mut sink)
        .await
        .unwrap();

    let names: Vec<&str> = sink.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Dune", "Dune 2160p"]);
    assert_eq!(fetcher.requested().len(), 2);
}

#[tokio::test]
async fn failing_segment_skips_the_rest() {
    let mut provider = Provider::zetorrents();
    provider.categories.insert(
        "movies".to_string(),
        vec![Some("films".to_string()), Some("films-hd".to_string())],
    );
    let fetcher = ScriptedFetcher::default().page(
        &format!("{}/torrents/find/1/films-hd/:1?title=dune", BASE),
        results_page(&[result_row(2, "Dune 2160p", "40 Go", "9", "4")]),
    );

    let mut sink: Vec<TorrentRecord> = Vec::new();
    let result = search(&fetcher, &provider, "dune", "movies", &mut sink).await;

    assert!(result.is_err());
    assert!(sink.is_empty());
    assert_eq!(fetcher.requested().len(), 1);
}

#[tokio::test]
async fn repeated_searches_are_identical() {
    let url = format!("{}/torrents/find/:1?title=arch", BASE);
    let html = results_page(&[
        result_row(1, "Arch", "800 Mo", "10", "1"),
        result_row(2, "Arch Mini", "300 Mo", "?", "1"),
    ]);

    let mut first: Vec<TorrentRecord> = Vec::new();
    let mut second: Vec<TorrentRecord> = Vec::new();
    let fetcher = ScriptedFetcher::default().page(&url, html);
    search(&fetcher, &Provider::zetorrents(), "arch", "all", &mut first)
        .await
        .unwrap();
    search(&fetcher, &Provider::zetorrents(), "arch", "all", &mut second)
        .await
        .unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}
