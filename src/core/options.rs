//! Crawl options and their validation

use std::time::Duration;

use super::config::{default_scan_concurrency, DEFAULT_THROTTLE_INTERVAL, MAX_THROTTLE_INTERVAL_MS};
use super::error::ValidationError;

/// Tunables for a single crawl
///
/// `max_depth` counts directory levels below the starting path: `Some(0)`
/// scans only the starting directory, `Some(1)` also its children, and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Minimum spacing between progress deliveries; zero delivers every hit
    /// as soon as it is found
    pub throttle_interval: Duration,
    /// Deepest directory level that is scanned, `None` for unbounded
    pub max_depth: Option<usize>,
    /// Number of directory listings allowed in flight at once
    pub concurrency: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            throttle_interval: DEFAULT_THROTTLE_INTERVAL,
            max_depth: None,
            concurrency: default_scan_concurrency(),
        }
    }
}

impl CrawlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_throttle_interval(mut self, interval: Duration) -> Self {
        self.throttle_interval = interval;
        self
    }

    pub fn with_throttle_ms(self, ms: u64) -> Self {
        self.with_throttle_interval(Duration::from_millis(ms))
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Checks the bounds the engine relies on
    pub fn validate(&self) -> Result<(), ValidationError> {
        let actual_ms = self.throttle_interval.as_millis();
        if actual_ms > u128::from(MAX_THROTTLE_INTERVAL_MS) {
            return Err(ValidationError::ThrottleOutOfRange {
                actual_ms,
                max_ms: MAX_THROTTLE_INTERVAL_MS,
            });
        }

        if self.concurrency == 0 {
            return Err(ValidationError::ZeroConcurrency);
        }

        Ok(())
    }

    /// Whether a directory at `depth` may be scanned
    pub(crate) fn allows_depth(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|max| depth <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = CrawlOptions::default();
        assert_eq!(options.throttle_interval, Duration::ZERO);
        assert_eq!(options.max_depth, None);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_throttle_upper_bound_is_inclusive() {
        assert!(CrawlOptions::new().with_throttle_ms(60_000).validate().is_ok());
        assert_eq!(
            CrawlOptions::new().with_throttle_ms(60_001).validate(),
            Err(ValidationError::ThrottleOutOfRange {
                actual_ms: 60_001,
                max_ms: 60_000
            })
        );
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let options = CrawlOptions::new().with_concurrency(0);
        assert_eq!(options.validate(), Err(ValidationError::ZeroConcurrency));
    }

    #[test]
    fn test_depth_bound() {
        let unbounded = CrawlOptions::new();
        assert!(unbounded.allows_depth(10_000));

        let bounded = CrawlOptions::new().with_max_depth(Some(1));
        assert!(bounded.allows_depth(0));
        assert!(bounded.allows_depth(1));
        assert!(!bounded.allows_depth(2));

        let root_only = CrawlOptions::new().with_max_depth(Some(0));
        assert!(root_only.allows_depth(0));
        assert!(!root_only.allows_depth(1));
    }
}
