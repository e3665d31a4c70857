//! Run a live query against the configured provider and summarize it

use zetorrents::config::{load_dotenv, Settings};
use zetorrents::scrapers::{self, Category, TorrentRecord};

fn print_results(category: &str, results: &Result<Vec<TorrentRecord>, zetorrents::SearchError>) {
    println!("\n============================================================");
    println!("  {}", category);
    println!("============================================================");

    match results {
        Ok(items) if !items.is_empty() => {
            println!("  ✓ Found {} results:", items.len());
            for (i, r) in items.iter().take(5).enumerate() {
                println!(
                    "    {}. {} | {} | {} seeds",
                    i + 1,
                    truncate(&r.name, 45),
                    r.size,
                    r.seeds
                );
            }
            if items.len() > 5 {
                println!("    ... and {} more", items.len() - 5);
            }
        }
        Ok(_) => println!("  ⚠ No results found (empty list)"),
        Err(e) => println!("  ✗ FAILED - {}", e),
    }
}

#[tokio::main]
async fn main() {
    load_dotenv();
    let settings = Settings::from_env();

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "matrix".to_string())
        .replace(' ', "+");
    println!("\n🔍 Testing provider with query: \"{}\"", query);

    let provider = match settings.provider() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Invalid provider configuration: {}", e);
            return;
        }
    };

    let client = match scrapers::create_client(settings.timeout) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {}", e);
            return;
        }
    };
    let fetcher = scrapers::HttpFetcher::new(client);

    let mut ok = 0;
    let mut tried = 0;
    for category in Category::ALL {
        if provider.segments(*category).is_err() {
            continue;
        }
        tried += 1;

        let mut records: Vec<TorrentRecord> = Vec::new();
        let outcome =
            scrapers::search(&fetcher, &provider, &query, category.as_str(), &mut records).await;
        let outcome = outcome.map(|_| records);
        if outcome.as_ref().is_ok_and(|r| !r.is_empty()) {
            ok += 1;
        }
        print_results(category.as_str(), &outcome);
    }

    println!("\n============================================================");
    println!("  SUMMARY");
    println!("============================================================");
    println!("  {} of {} categories returned results", ok, tried);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max - 3).collect::<String>())
    }
}
