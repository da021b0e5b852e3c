//! Configuration constants and settings

use std::time::Duration;

// Concurrency Configuration
//
// Directory listing is I/O-bound: most of a scan is spent waiting on the
// filesystem, so more scans than cores can be in flight. Network mounts and
// spinning disks degrade past a point, hence the cap.

/// Upper bound for the default number of concurrent directory scans
pub const SCAN_CONCURRENT_CAP: usize = 16;

/// Environment variable consulted when no explicit job count is given
pub const CONCURRENCY_ENV_VAR: &str = "FIND_REPOS_CONCURRENCY";

/// Determines the number of concurrent directory scans
///
/// Priority order:
/// 1. --sequential flag → 1
/// 2. --jobs N flag → N
/// 3. FIND_REPOS_CONCURRENCY env var → N
/// 4. Smart default → min(CPU_CORES * 2, 16)
pub fn get_scan_concurrency(jobs: Option<usize>, sequential: bool) -> usize {
    if sequential {
        return 1;
    }

    if let Some(n) = jobs {
        return n.max(1); // Ensure at least 1
    }

    if let Ok(env_concurrency) = std::env::var(CONCURRENCY_ENV_VAR) {
        match env_concurrency.trim().parse::<usize>() {
            Ok(n) if n > 0 => return n,
            _ => tracing::warn!(
                "Ignoring {CONCURRENCY_ENV_VAR}={env_concurrency:?}: expected a positive integer"
            ),
        }
    }

    default_scan_concurrency()
}

/// CPU cores * 2, capped at [`SCAN_CONCURRENT_CAP`]
pub fn default_scan_concurrency() -> usize {
    (num_cpus::get() * 2).clamp(1, SCAN_CONCURRENT_CAP)
}

// Throttle configuration
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::ZERO;
pub const MAX_THROTTLE_INTERVAL_MS: u64 = 60_000;

// Repository discovery configuration
pub const GIT_DIR_NAME: &str = ".git";
pub const ESTIMATED_REPO_COUNT: usize = 64; // Pre-allocation hint for collections
pub const FRONTIER_INITIAL_CAPACITY: usize = 1024;

// UI Constants
pub const SCANNING_MESSAGE: &str = "🔍 Scanning for git repositories...";
pub const NO_REPOS_MESSAGE: &str = "No git repositories found.";
pub const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {prefix:.bold} {wide_msg}";
pub const SPINNER_TICK_MS: u64 = 120;

// Display formatting constants
pub const PATH_DISPLAY_WIDTH: usize = 48;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_wins_over_jobs() {
        assert_eq!(get_scan_concurrency(Some(8), true), 1);
    }

    #[test]
    fn test_explicit_jobs_are_clamped_to_one() {
        assert_eq!(get_scan_concurrency(Some(0), false), 1);
        assert_eq!(get_scan_concurrency(Some(5), false), 5);
    }

    #[test]
    fn test_default_concurrency_within_cap() {
        let n = default_scan_concurrency();
        assert!(n >= 1);
        assert!(n <= SCAN_CONCURRENT_CAP);
    }
}
