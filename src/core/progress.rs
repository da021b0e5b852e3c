//! Terminal spinner for interactive crawls

use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use super::config::{PATH_DISPLAY_WIDTH, SPINNER_TEMPLATE, SPINNER_TICK_MS};
use super::stats::StatsSnapshot;

/// Creates the discovery spinner, drawn on stderr
///
/// When `visible` is false the spinner is hidden so the same code path
/// works for piped output.
pub(crate) fn create_discovery_spinner(visible: bool) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    if visible {
        spinner.set_draw_target(ProgressDrawTarget::stderr());
        spinner.set_style(create_spinner_style()?);
        spinner.set_prefix("scanning");
        spinner.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    } else {
        spinner.set_draw_target(ProgressDrawTarget::hidden());
    }
    Ok(spinner)
}

/// Creates the spinner style configuration
pub(crate) fn create_spinner_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_spinner().template(SPINNER_TEMPLATE)?)
}

/// Refreshes the spinner message from live counters
pub(crate) fn update_spinner(spinner: &ProgressBar, stats: &StatsSnapshot, last_hit: Option<&str>) {
    let mut message = format!(
        "{} repos • {} dirs",
        stats.repos_found, stats.dirs_scanned
    );
    if let Some(path) = last_hit {
        message.push_str(" • ");
        message.push_str(&crate::utils::shorten_path(path, PATH_DISPLAY_WIDTH));
    }
    spinner.set_message(message);
}
