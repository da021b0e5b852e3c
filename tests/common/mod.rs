//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;

pub use self::fixtures::{generate_tree, git_paths, TreeBuilder};

use repo_finder::core::{find_git_repos, handler_fn, Control, CrawlError, CrawlOptions, CrawlReport};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Runs a crawl and records every delivered batch alongside the report
pub async fn crawl_with_batches(
    root: &Path,
    options: CrawlOptions,
) -> Result<(CrawlReport, Vec<Vec<PathBuf>>), CrawlError> {
    let mut batches = Vec::new();
    let handler = handler_fn(|batch| {
        batches.push(batch.to_vec());
        Ok(Control::Continue)
    });
    let report = find_git_repos(root, handler, options).await?;
    Ok((report, batches))
}

/// Sorted, deduplicated view of a path list for set comparisons
pub fn path_set(paths: &[PathBuf]) -> BTreeSet<PathBuf> {
    paths.iter().cloned().collect()
}

use std::sync::OnceLock;
use std::sync::{Mutex, MutexGuard};

static TEST_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Acquires a global lock for tests that modify process-wide state (like CWD)
pub fn lock_test() -> MutexGuard<'static, ()> {
    TEST_MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
