//! Repository discovery entry points

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::error::{CrawlError, ScanFailure};
use super::handler::{handler_fn, Control, ProgressHandler};
use super::identity::{identify_root_or_fallback, DefaultIdentity, IdentityPolicy};
use super::options::CrawlOptions;
use super::scanner::{DirectoryScanner, FsScanner};
use super::scheduler::TraversalScheduler;
use super::stats::{CrawlStats, StatsSnapshot};

/// Everything a finished crawl produced
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Every `.git` directory found, in discovery order
    pub repositories: Vec<PathBuf>,
    /// Directories below the root that could not be listed
    pub scan_failures: Vec<ScanFailure>,
    /// The progress handler asked to stop; `repositories` may be partial
    pub cancelled: bool,
    pub stats: StatsSnapshot,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Configured repository crawl
///
/// The directory scanner and the identity policy are pluggable; the
/// defaults read the real filesystem and identify directories by
/// device + inode (resolved path on non-unix platforms).
pub struct Crawler<S: ?Sized = FsScanner, P: ?Sized = DefaultIdentity> {
    options: CrawlOptions,
    scanner: Arc<S>,
    identity: Arc<P>,
    stats: Arc<CrawlStats>,
}

impl Crawler {
    pub fn new(options: CrawlOptions) -> Self {
        Self {
            options,
            scanner: Arc::new(FsScanner),
            identity: Arc::new(DefaultIdentity::default()),
            stats: Arc::new(CrawlStats::new()),
        }
    }
}

impl<S, P> Crawler<S, P>
where
    S: DirectoryScanner + ?Sized,
    P: IdentityPolicy + ?Sized,
{
    pub fn with_scanner<S2: DirectoryScanner + ?Sized>(self, scanner: Arc<S2>) -> Crawler<S2, P> {
        Crawler {
            options: self.options,
            scanner,
            identity: self.identity,
            stats: self.stats,
        }
    }

    pub fn with_identity_policy<P2: IdentityPolicy + ?Sized>(self, identity: Arc<P2>) -> Crawler<S, P2> {
        Crawler {
            options: self.options,
            scanner: self.scanner,
            identity,
            stats: self.stats,
        }
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Live counters; clone the `Arc` to watch the crawl from elsewhere
    pub fn stats(&self) -> Arc<CrawlStats> {
        Arc::clone(&self.stats)
    }

    /// Crawls `root`, reporting hits through `handler`
    ///
    /// Resolves with the full set of repositories found (partial if the
    /// handler asked to stop). Fails only on invalid options, an unusable
    /// root, or a handler error.
    pub async fn run<H: ProgressHandler>(
        self,
        root: impl AsRef<Path>,
        handler: H,
    ) -> Result<CrawlReport, CrawlError> {
        let start_time = Instant::now();
        self.options.validate()?;

        let root = resolve_root(root.as_ref()).await?;
        let root_identity = {
            let identity = Arc::clone(&self.identity);
            let root = root.clone();
            tokio::task::spawn_blocking(move || identify_root_or_fallback(&*identity, &root)).await?
        };

        tracing::info!(
            "Crawling {} (throttle {:?}, max depth {:?}, {} concurrent scans)",
            root.display(),
            self.options.throttle_interval,
            self.options.max_depth,
            self.options.concurrency
        );

        let scheduler = TraversalScheduler::new(
            self.options,
            self.scanner,
            self.identity,
            Arc::clone(&self.stats),
            handler,
        );
        let output = scheduler.run(root, root_identity).await?;

        let report = CrawlReport {
            repositories: output.repositories,
            scan_failures: output.scan_failures,
            cancelled: output.cancelled,
            stats: self.stats.snapshot(),
            elapsed: start_time.elapsed(),
        };
        tracing::info!(
            "Crawl finished: {} repositories, {} directories scanned, {} unreadable in {:?}{}",
            report.repositories.len(),
            report.stats.dirs_scanned,
            report.scan_failures.len(),
            report.elapsed,
            if report.cancelled { " (stopped early)" } else { "" }
        );

        Ok(report)
    }
}

/// Makes the starting path absolute and checks that it is a directory
///
/// Symlinks are followed for the root itself only; everything below it is
/// walked through real directories.
async fn resolve_root(root: &Path) -> Result<PathBuf, CrawlError> {
    let absolute = std::path::absolute(root).map_err(|source| CrawlError::RootNotFound {
        path: root.to_path_buf(),
        source,
    })?;

    let metadata = tokio::fs::metadata(&absolute)
        .await
        .map_err(|source| CrawlError::RootNotFound {
            path: absolute.clone(),
            source,
        })?;

    if !metadata.is_dir() {
        return Err(CrawlError::RootNotDirectory { path: absolute });
    }

    Ok(absolute)
}

/// Finds every git repository beneath `root`
///
/// `handler` sees the hits in throttled batches while the crawl runs; the
/// returned report holds all of them.
pub async fn find_git_repos<H: ProgressHandler>(
    root: impl AsRef<Path>,
    handler: H,
    options: CrawlOptions,
) -> Result<CrawlReport, CrawlError> {
    Crawler::new(options).run(root, handler).await
}

/// Like [`find_git_repos`] with a custom directory scanner and identity policy
pub async fn find_git_repos_with<H, S, P>(
    root: impl AsRef<Path>,
    handler: H,
    options: CrawlOptions,
    scanner: Arc<S>,
    identity: Arc<P>,
) -> Result<CrawlReport, CrawlError>
where
    H: ProgressHandler,
    S: DirectoryScanner + ?Sized,
    P: IdentityPolicy + ?Sized,
{
    Crawler::new(options)
        .with_scanner(scanner)
        .with_identity_policy(identity)
        .run(root, handler)
        .await
}

/// Finds every git repository beneath `root` without progress reporting
pub async fn collect_git_repos(
    root: impl AsRef<Path>,
    options: CrawlOptions,
) -> Result<Vec<PathBuf>, CrawlError> {
    let report = find_git_repos(root, handler_fn(|_| Ok(Control::Continue)), options).await?;
    Ok(report.repositories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_finds_repositories_with_absolute_paths() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("repo1/.git")).unwrap();
        fs::create_dir_all(root.join("nested/repo2/.git")).unwrap();

        let mut repos = collect_git_repos(root, CrawlOptions::new()).await.unwrap();
        repos.sort();

        assert_eq!(
            repos,
            vec![root.join("nested/repo2/.git"), root.join("repo1/.git")]
        );
        assert!(repos.iter().all(|p| p.is_absolute()));
    }

    #[tokio::test]
    async fn test_missing_root_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let err = collect_git_repos(temp_dir.path().join("missing"), CrawlOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::RootNotFound { .. }));
    }

    #[tokio::test]
    async fn test_file_root_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let err = collect_git_repos(&file, CrawlOptions::new()).await.unwrap_err();
        assert!(matches!(err, CrawlError::RootNotDirectory { .. }));
    }

    #[tokio::test]
    async fn test_invalid_options_rejected_before_walking() {
        let temp_dir = TempDir::new().unwrap();
        let options = CrawlOptions::new().with_throttle_ms(60_001);

        let err = collect_git_repos(temp_dir.path(), options).await.unwrap_err();
        assert!(matches!(err, CrawlError::InvalidOptions(_)));
    }

    #[tokio::test]
    async fn test_stats_visible_through_crawler() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("a/.git")).unwrap();
        fs::create_dir_all(temp_dir.path().join("b")).unwrap();

        let crawler = Crawler::new(CrawlOptions::new());
        let stats = crawler.stats();
        let report = crawler
            .run(temp_dir.path(), handler_fn(|_| Ok(Control::Continue)))
            .await
            .unwrap();

        // root, a, b
        assert_eq!(stats.snapshot().dirs_scanned, 3);
        assert_eq!(report.stats.repos_found, 1);
        assert_eq!(report.stats.batches_delivered, 1);
    }

    #[tokio::test]
    async fn test_root_identity_comes_from_identify_root() {
        use crate::core::identity::DirIdentity;
        use std::io;

        // "mirror" is the same directory object as the root, as with a
        // bind mount of the root inside itself
        struct MirroredRoot {
            mirror: PathBuf,
        }
        impl IdentityPolicy for MirroredRoot {
            fn identify(&self, path: &Path) -> io::Result<DirIdentity> {
                Ok(DirIdentity::Path(path.to_path_buf()))
            }
            fn identify_root(&self, _path: &Path) -> io::Result<DirIdentity> {
                self.identify(&self.mirror)
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let root = std::path::absolute(temp_dir.path()).unwrap();
        fs::create_dir_all(root.join("mirror/repo/.git")).unwrap();
        fs::create_dir_all(root.join("other/.git")).unwrap();

        let report = Crawler::new(CrawlOptions::new())
            .with_identity_policy(Arc::new(MirroredRoot {
                mirror: root.join("mirror"),
            }))
            .run(&root, handler_fn(|_| Ok(Control::Continue)))
            .await
            .unwrap();

        assert_eq!(report.repositories, vec![root.join("other/.git")]);
        assert_eq!(report.stats.duplicates_skipped, 1);
    }

    #[tokio::test]
    async fn test_report_serializes_to_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("a/.git")).unwrap();

        let report = find_git_repos(
            temp_dir.path(),
            handler_fn(|_| Ok(Control::Continue)),
            CrawlOptions::new(),
        )
        .await
        .unwrap();

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["repositories"].as_array().unwrap().len(), 1);
        assert_eq!(json["cancelled"], false);
        assert!(json["elapsed_ms"].is_u64());
    }
}
