//! Destinations for emitted records

use std::io::Write;

use super::{log_error, TorrentRecord};

/// Receives records in the order they appear on the site
pub trait ResultSink {
    fn emit(&mut self, record: &TorrentRecord);
}

impl ResultSink for Vec<TorrentRecord> {
    fn emit(&mut self, record: &TorrentRecord) {
        self.push(record.clone());
    }
}

/// Writes `link|name|size|seeds|leech|engine_url|desc_link` lines
pub struct PrettyPrinter<W: Write> {
    out: W,
}

impl<W: Write> PrettyPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl PrettyPrinter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

/// Format one record as a printer line, without the newline
pub fn format_record(record: &TorrentRecord) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}",
        record.link_str(),
        record.name.replace('|', "-"),
        record.size,
        record.seeds,
        record.leech,
        record.engine_url,
        record.desc_link
    )
}

impl<W: Write> ResultSink for PrettyPrinter<W> {
    fn emit(&mut self, record: &TorrentRecord) {
        if let Err(e) = writeln!(self.out, "{}", format_record(record)) {
            log_error("printer", &format!("Failed to write result: {}", e));
        }
    }
}
