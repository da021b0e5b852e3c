//! Statistics tracking for a crawl

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::config::PATH_DISPLAY_WIDTH;
use super::error::ScanFailure;

/// Live counters for one crawl
///
/// Scan workers bump these from blocking threads while the scheduler runs,
/// so callers holding the `Arc` can watch a crawl in progress.
#[derive(Debug, Default)]
pub struct CrawlStats {
    pub dirs_scanned: AtomicU64,
    pub entries_seen: AtomicU64,
    pub repos_found: AtomicU64,
    pub scan_failures: AtomicU64,
    pub duplicates_skipped: AtomicU64,
    pub batches_delivered: AtomicU64,
}

/// Point-in-time copy of [`CrawlStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub dirs_scanned: u64,
    pub entries_seen: u64,
    pub repos_found: u64,
    pub scan_failures: u64,
    pub duplicates_skipped: u64,
    pub batches_delivered: u64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_scan(&self, entries: usize) {
        self.dirs_scanned.fetch_add(1, Ordering::Relaxed);
        self.entries_seen.fetch_add(entries as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.scan_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_repo(&self) {
        self.repos_found.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_batch(&self) {
        self.batches_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            dirs_scanned: self.dirs_scanned.load(Ordering::Relaxed),
            entries_seen: self.entries_seen.load(Ordering::Relaxed),
            repos_found: self.repos_found.load(Ordering::Relaxed),
            scan_failures: self.scan_failures.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            batches_delivered: self.batches_delivered.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// One-line summary of the crawl
    pub fn generate_summary(&self, duration: Duration, cancelled: bool) -> String {
        let duration_secs = duration.as_secs_f64();
        let headline = if cancelled { "⏹️  Stopped" } else { "✅ Completed" };
        let repo_word = if self.repos_found == 1 {
            "repository"
        } else {
            "repositories"
        };

        let mut summary = format!(
            "{headline} in {duration_secs:.1}s • {} {repo_word} • {} directories scanned",
            self.repos_found, self.dirs_scanned
        );
        if self.scan_failures > 0 {
            summary.push_str(&format!(" • {} unreadable", self.scan_failures));
        }

        summary
    }
}

/// Lists directories that could not be read, tree style
pub fn generate_failure_details(failures: &[ScanFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(failures.len() + 1);
    lines.push(format!("🟡 UNREADABLE DIRECTORIES ({})", failures.len()));
    for (i, failure) in failures.iter().enumerate() {
        let tree_char = if i == failures.len() - 1 {
            "└─"
        } else {
            "├─"
        };
        let path = failure.path.to_string_lossy();
        let short_path = crate::utils::shorten_path(&path, PATH_DISPLAY_WIDTH);
        lines.push(format!(
            "   {} {:width$} # {}",
            tree_char,
            short_path,
            failure.kind,
            width = PATH_DISPLAY_WIDTH
        ));
    }

    lines.join("\n")
}
