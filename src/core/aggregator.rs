//! Accumulates every repository hit into the final crawl result

use std::path::PathBuf;

use super::config::ESTIMATED_REPO_COUNT;

/// Discovery-ordered record of every hit, independent of progress pacing
#[derive(Debug)]
pub(crate) struct ResultAggregator {
    hits: Vec<PathBuf>,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self {
            hits: Vec::with_capacity(ESTIMATED_REPO_COUNT),
        }
    }
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, hit: PathBuf) {
        // Uniqueness comes from the walk itself: each directory is scanned
        // at most once and repository subtrees are never entered
        self.hits.push(hit);
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn into_hits(self) -> Vec<PathBuf> {
        self.hits
    }
}
