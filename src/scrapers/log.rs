//! Search log file

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Initialize `<config_dir>/zetorrents/scraper.log`, truncating it
pub fn init_log() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?.join("zetorrents");
    std::fs::create_dir_all(&config_dir).ok()?;
    init_log_at(&config_dir.join("scraper.log"))
}

/// Initialize logging to an explicit file
pub fn init_log_at(log_path: &Path) -> Option<PathBuf> {
    let mut file = File::create(log_path).ok()?;
    let _ = writeln!(
        file,
        "=== Search Log Started {} ===",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(log_path.to_path_buf());
    }

    Some(log_path.to_path_buf())
}

fn format_line(level: &str, source: &str, message: &str) -> String {
    format!(
        "[{}] [{}] {}: {}",
        Local::now().format("%H:%M:%S"),
        source,
        level,
        message
    )
}

fn append(line: &str) {
    if let Ok(guard) = LOG_FILE.lock() {
        if let Some(ref path) = *guard {
            if let Ok(mut file) = OpenOptions::new().append(true).open(path) {
                let _ = writeln!(file, "{}", line);
            }
        }
    }
}

/// Log an error, also echoed to stderr
pub fn log_error(source: &str, message: &str) {
    let line = format_line("ERROR", source, message);
    eprintln!("{}", line);
    append(&line);
}

/// Log an info message
pub fn log_info(source: &str, message: &str) {
    append(&format_line("INFO", source, message));
}

/// Get the log file path
pub fn get_log_path() -> Option<PathBuf> {
    LOG_FILE.lock().ok().and_then(|g| g.clone())
}

/// Read the last `n` log lines
pub fn read_recent_logs(n: usize) -> Vec<String> {
    let path = match get_log_path() {
        Some(p) => p,
        None => return vec!["Log not initialized".to_string()],
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let lines: Vec<&str> = content.lines().collect();
            let start = lines.len().saturating_sub(n);
            lines[start..].iter().map(|l| l.to_string()).collect()
        }
        Err(_) => vec!["Could not read log file".to_string()],
    }
}
