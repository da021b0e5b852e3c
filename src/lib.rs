//! # repo-finder
//!
//! `repo-finder` locates every git repository beneath a directory. It powers
//! the `find-repos` CLI tool.
//!
//! ## Core Features
//!
//! - **Concurrent Crawling**: Directory listings run on the blocking pool with a bounded number in flight.
//! - **Streaming Progress**: Hits reach a progress handler as they are found, optionally coalesced into throttled batches.
//! - **Cycle Safety**: Symlinks are never followed and each directory identity is scanned at most once.
//! - **Cancellation**: The handler can stop the crawl and still receive the partial result.
//!
//! ## Example
//!
//! ```rust,no_run
//! use repo_finder::core::{find_git_repos, handler_fn, Control, CrawlOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let options = CrawlOptions::new().with_throttle_ms(250);
//!     let handler = handler_fn(|batch| {
//!         for path in batch {
//!             println!("{}", path.display());
//!         }
//!         Ok(Control::Continue)
//!     });
//!
//!     let report = find_git_repos(".", handler, options).await?;
//!     println!("{} repositories", report.repositories.len());
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod core;
pub mod utils;
