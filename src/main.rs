//! zetorrents - search ZeTorrents and download torrent files from the command line

use anyhow::{bail, Context, Result};
use std::time::Duration;

use zetorrents::config::{load_dotenv, Settings};
use zetorrents::scrapers::{self, create_client, HttpFetcher, PrettyPrinter};

const USAGE: &str = "usage:
  zetorrents search <query> [category]
  zetorrents download <url>
  zetorrents logs [lines]";

/// Escape a free-text query the way search hosts do: percent-encoding with
/// spaces as `+`
fn escape_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}

fn fetcher(timeout: Duration) -> Result<HttpFetcher> {
    let client = create_client(timeout).context("Failed to create HTTP client")?;
    Ok(HttpFetcher::new(client))
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    scrapers::init_log();

    let settings = Settings::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("search") => {
            let Some(query) = args.get(1) else {
                bail!("missing query\n{}", USAGE);
            };
            let category = args.get(2).map_or("all", String::as_str);

            let provider = settings.provider()?;
            let fetcher = fetcher(settings.timeout)?;
            let mut printer = PrettyPrinter::stdout();

            scrapers::search(&fetcher, &provider, &escape_query(query), category, &mut printer)
                .await
                .with_context(|| format!("{} search failed", provider.name))?;
        }
        Some("download") => {
            let Some(url) = args.get(1) else {
                bail!("missing url\n{}", USAGE);
            };
            let fetcher = fetcher(settings.timeout)?;
            let file = scrapers::download(&fetcher, url, &settings.download_dir).await?;
            println!("{}", file);
        }
        Some("logs") => {
            let n = args.get(1).and_then(|n| n.parse().ok()).unwrap_or(20);
            for line in scrapers::read_recent_logs(n) {
                println!("{}", line);
            }
        }
        _ => bail!("{}", USAGE),
    }

    Ok(())
}
