//! Traversal scheduler: the single owner of the frontier and visited set
//!
//! One async task drives the whole crawl. Directory listings run on the
//! blocking pool, at most `concurrency` at a time; their outcomes come back
//! to this task, which is the only place the frontier, the cycle guard, the
//! throttle buffer and the result are touched. Progress deliveries are
//! awaited inline, so they can never overlap.

use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::aggregator::ResultAggregator;
use super::config::{FRONTIER_INITIAL_CAPACITY, GIT_DIR_NAME};
use super::error::{CrawlError, ScanFailure};
use super::handler::{CancellationGate, ProgressHandler};
use super::identity::{identify_or_fallback, CycleGuard, DirIdentity, IdentityPolicy};
use super::options::CrawlOptions;
use super::scanner::DirectoryScanner;
use super::stats::CrawlStats;
use super::throttle::ThrottleBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchedulerState {
    Idle,
    Running,
    /// Frontier exhausted, waiting for nothing but the final flush
    Draining,
    /// Stop requested; in-flight scans finish, nothing new is dequeued
    Cancelling,
    Done,
}

/// A directory waiting to be scanned
#[derive(Debug)]
struct FrontierEntry {
    path: PathBuf,
    depth: usize,
    identity: DirIdentity,
}

/// What a blocking scan hands back to the scheduler
struct ScanOutcome {
    path: PathBuf,
    depth: usize,
    result: io::Result<ScannedDir>,
}

struct ScannedDir {
    is_repository: bool,
    /// Real subdirectories to enqueue, with identities already resolved.
    /// Empty for repositories and at the depth limit.
    children: Vec<(PathBuf, DirIdentity)>,
}

/// Raw material of a crawl report
pub(crate) struct SchedulerOutput {
    pub repositories: Vec<PathBuf>,
    pub scan_failures: Vec<ScanFailure>,
    pub cancelled: bool,
}

pub(crate) struct TraversalScheduler<S: ?Sized, P: ?Sized, H> {
    options: CrawlOptions,
    scanner: Arc<S>,
    identity: Arc<P>,
    stats: Arc<CrawlStats>,
    gate: CancellationGate<H>,
    frontier: VecDeque<FrontierEntry>,
    guard: CycleGuard,
    buffer: ThrottleBuffer,
    aggregator: ResultAggregator,
    scan_failures: Vec<ScanFailure>,
    state: SchedulerState,
}

impl<S, P, H> TraversalScheduler<S, P, H>
where
    S: DirectoryScanner + ?Sized,
    P: IdentityPolicy + ?Sized,
    H: ProgressHandler,
{
    pub fn new(
        options: CrawlOptions,
        scanner: Arc<S>,
        identity: Arc<P>,
        stats: Arc<CrawlStats>,
        handler: H,
    ) -> Self {
        let buffer = ThrottleBuffer::new(options.throttle_interval);
        Self {
            options,
            scanner,
            identity,
            stats,
            gate: CancellationGate::new(handler),
            frontier: VecDeque::with_capacity(FRONTIER_INITIAL_CAPACITY),
            guard: CycleGuard::with_capacity(FRONTIER_INITIAL_CAPACITY),
            buffer,
            aggregator: ResultAggregator::new(),
            scan_failures: Vec::new(),
            state: SchedulerState::Idle,
        }
    }

    /// Walks everything reachable from `root` (depth 0)
    ///
    /// `root` must already be known to be a directory. Only a failure to
    /// list the root itself or a handler error ends the crawl with `Err`.
    pub async fn run(
        mut self,
        root: PathBuf,
        root_identity: DirIdentity,
    ) -> Result<SchedulerOutput, CrawlError> {
        self.frontier.push_back(FrontierEntry {
            path: root,
            depth: 0,
            identity: root_identity,
        });
        self.transition(SchedulerState::Running);

        // Detached on early return: a handler error does not wait for
        // scans that are still running
        let mut in_flight: FuturesUnordered<JoinHandle<ScanOutcome>> = FuturesUnordered::new();

        loop {
            if self.gate.stop_requested() {
                if self.state == SchedulerState::Running {
                    self.transition(SchedulerState::Cancelling);
                    self.frontier.clear();
                }
            } else {
                self.fill(&mut in_flight);
            }

            // fill() only leaves `in_flight` empty once the frontier is too
            if in_flight.is_empty() {
                break;
            }

            let deadline = self.buffer.deadline();
            let window_closed = async move {
                match deadline {
                    Some(deadline) => sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;

                () = window_closed => {
                    if let Some(batch) = self.buffer.take_due(Instant::now()) {
                        self.deliver(batch).await?;
                    }
                }
                Some(joined) = in_flight.next() => {
                    self.handle_outcome(joined?).await?;
                }
            }
        }

        if self.state == SchedulerState::Running {
            self.transition(SchedulerState::Draining);
        }
        if let Some(batch) = self.buffer.flush() {
            self.deliver(batch).await?;
        }
        self.transition(SchedulerState::Done);
        tracing::debug!(
            "{} hits in {} deliveries, {} directories visited",
            self.aggregator.len(),
            self.gate.deliveries(),
            self.guard.visited_count()
        );

        Ok(SchedulerOutput {
            repositories: self.aggregator.into_hits(),
            scan_failures: self.scan_failures,
            cancelled: self.gate.stop_requested(),
        })
    }

    /// Dequeues frontier entries until the concurrency limit is reached
    fn fill(&mut self, in_flight: &mut FuturesUnordered<JoinHandle<ScanOutcome>>) {
        while in_flight.len() < self.options.concurrency {
            let Some(entry) = self.frontier.pop_front() else {
                break;
            };

            if !self.guard.should_visit(&entry.identity) {
                tracing::debug!("Already visited, skipping {}", entry.path.display());
                self.stats.record_duplicate();
                continue;
            }
            self.guard.mark_visited(entry.identity);

            in_flight.push(self.dispatch(entry.path, entry.depth));
        }
    }

    fn dispatch(&self, path: PathBuf, depth: usize) -> JoinHandle<ScanOutcome> {
        let scanner = Arc::clone(&self.scanner);
        let identity = Arc::clone(&self.identity);
        let stats = Arc::clone(&self.stats);
        let descend = self.options.allows_depth(depth + 1);

        tracing::trace!("Scanning {} (depth {depth})", path.display());
        tokio::task::spawn_blocking(move || {
            let result = scan_directory(&*scanner, &*identity, &stats, &path, descend);
            ScanOutcome {
                path,
                depth,
                result,
            }
        })
    }

    async fn handle_outcome(&mut self, outcome: ScanOutcome) -> Result<(), CrawlError> {
        let ScanOutcome {
            path,
            depth,
            result,
        } = outcome;

        let scanned = match result {
            Ok(scanned) => scanned,
            Err(source) if depth == 0 => {
                return Err(CrawlError::UnreadableRoot { path, source });
            }
            Err(e) => {
                tracing::debug!("Could not read {}: {e}", path.display());
                self.stats.record_failure();
                self.scan_failures.push(ScanFailure::new(path, &e));
                return Ok(());
            }
        };

        if scanned.is_repository {
            // Never descend into a repository: nested repositories and
            // submodules below it are not reported
            let hit = path.join(GIT_DIR_NAME);
            tracing::debug!("Found repository {}", hit.display());
            self.stats.record_repo();
            self.aggregator.record(hit.clone());
            if let Some(batch) = self.buffer.add([hit], Instant::now()) {
                self.deliver(batch).await?;
            }
            return Ok(());
        }

        // A stop may have arrived while this scan was running
        if self.gate.stop_requested() {
            return Ok(());
        }

        self.frontier
            .extend(scanned.children.into_iter().map(|(path, identity)| FrontierEntry {
                path,
                depth: depth + 1,
                identity,
            }));
        Ok(())
    }

    async fn deliver(&mut self, batch: Vec<PathBuf>) -> Result<(), CrawlError> {
        self.stats.record_batch();
        self.gate.deliver(&batch).await.map_err(|e| {
            tracing::debug!("Progress handler failed, aborting crawl: {e:#}");
            CrawlError::Handler(e)
        })
    }

    fn transition(&mut self, next: SchedulerState) {
        tracing::trace!("Scheduler {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Lists one directory on a blocking thread
fn scan_directory<S, P>(
    scanner: &S,
    identity: &P,
    stats: &CrawlStats,
    path: &Path,
    descend: bool,
) -> io::Result<ScannedDir>
where
    S: DirectoryScanner + ?Sized,
    P: IdentityPolicy + ?Sized,
{
    let listing = scanner.scan(path)?;
    stats.record_scan(listing.children.len());

    let children = if listing.is_repository || !descend {
        Vec::new()
    } else {
        listing
            .real_dirs()
            .map(|name| {
                let child = path.join(name);
                let id = identify_or_fallback(identity, &child);
                (child, id)
            })
            .collect()
    };

    Ok(ScannedDir {
        is_repository: listing.is_repository,
        children,
    })
}
