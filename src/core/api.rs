//! Public API for the core module.
//!
//! This module provides the stable public API for repository discovery:
//! - Crawl entry points and the configurable crawler
//! - Progress handler seam and the stop signal
//! - Options, errors and crawl statistics
//! - Pluggable directory scanner and identity policies
//!
//! Internal implementation details are not exposed through this API.

// Discovery
pub use super::discovery::{
    collect_git_repos, find_git_repos, find_git_repos_with, CrawlReport, Crawler,
};

// Progress reporting and cancellation
pub use super::handler::{handler_fn, ChannelHandler, Control, FnHandler, ProgressHandler};

// Options and errors
pub use super::error::{CrawlError, ScanFailure, ValidationError};
pub use super::options::CrawlOptions;

// Statistics
pub use super::stats::{generate_failure_details, CrawlStats, StatsSnapshot};

// Extension seams
pub use super::identity::{
    CanonicalPath, CycleGuard, DefaultIdentity, DirIdentity, IdentityPolicy, LexicalPath,
};
#[cfg(unix)]
pub use super::identity::DeviceInode;
pub use super::scanner::{ChildEntry, DirListing, DirectoryScanner, EntryKind, FsScanner};
pub use super::throttle::ThrottleBuffer;

// Configuration
pub use super::config::{get_scan_concurrency, MAX_THROTTLE_INTERVAL_MS, SCAN_CONCURRENT_CAP};

// User-facing messages
pub use super::config::{NO_REPOS_MESSAGE, SCANNING_MESSAGE};

// Terminal utilities (re-exported from utils)
pub use crate::utils::{set_terminal_title, set_terminal_title_and_flush};

// Internal helpers for command modules
pub(crate) use super::progress::{create_discovery_spinner, update_spinner};
