//! Download summary and size formatting.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Outcome of a finished download.
#[derive(Clone, Debug)]
pub struct DownloadReport {
    /// Directory the files were placed in.
    pub path: PathBuf,
    /// Number of files under the requested subpath after the download.
    pub file_count: usize,
    /// Total bytes of those files.
    pub total_bytes: u64,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub elapsed: Duration,
}

impl fmt::Display for DownloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Download complete.")?;
        writeln!(f, "Saved to:   {}", self.path.display())?;
        writeln!(f, "Files:      {}", self.file_count)?;
        writeln!(f, "Total size: {}", format_size(self.total_bytes))?;
        writeln!(f, "Started:    {}", self.started_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Finished:   {}", self.finished_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Elapsed:    {:.2} s", self.elapsed.as_secs_f64())
    }
}

/// Human-readable size with two decimals, base 1024.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in SIZE_UNITS {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} PB")
}
