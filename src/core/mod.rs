// Internal modules - not part of public API
pub(crate) mod aggregator;
pub(crate) mod config;
pub(crate) mod discovery;
pub(crate) mod error;
pub(crate) mod handler;
pub(crate) mod identity;
pub(crate) mod options;
pub(crate) mod progress;
pub(crate) mod scanner;
pub(crate) mod scheduler;
pub(crate) mod stats;
pub(crate) mod throttle;

// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
