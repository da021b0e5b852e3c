//! Error types for repository discovery
//!
//! Only two things can fail a crawl: a bad request (options or root) and a
//! progress handler that returns an error. Directories that cannot be listed
//! below the root are recorded as [`ScanFailure`]s and the walk carries on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error returned by a crawl
#[derive(Error, Debug)]
pub enum CrawlError {
    /// Options rejected before the walk started
    #[error("invalid crawl options: {0}")]
    InvalidOptions(#[from] ValidationError),

    /// The starting path does not exist or cannot be stat'ed
    #[error("starting path '{}' is not accessible: {source}", path.display())]
    RootNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The starting path exists but is not a directory
    #[error("starting path '{}' is not a directory", path.display())]
    RootNotDirectory { path: PathBuf },

    /// The starting directory exists but could not be listed
    #[error("starting directory '{}' could not be read: {source}", path.display())]
    UnreadableRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The progress handler failed; the crawl was aborted
    #[error("progress handler failed")]
    Handler(#[source] anyhow::Error),

    /// A blocking scan task panicked or was cancelled by the runtime
    #[error("scan worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Malformed crawl options
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("throttle interval must be between 0 and {max_ms} ms, got {actual_ms} ms")]
    ThrottleOutOfRange { actual_ms: u128, max_ms: u64 },

    #[error("scan concurrency must be at least 1")]
    ZeroConcurrency,
}

/// A directory below the root that could not be listed
///
/// Recorded and reported alongside the result; the directory is treated as
/// empty and not a repository.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ScanFailure {
    pub path: PathBuf,
    #[serde(serialize_with = "serialize_error_kind")]
    pub kind: io::ErrorKind,
    pub message: String,
}

impl ScanFailure {
    pub fn new(path: PathBuf, error: &io::Error) -> Self {
        Self {
            path,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

fn serialize_error_kind<S: serde::Serializer>(
    kind: &io::ErrorKind,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(kind)
}
