//! Repository discovery command implementation
//!
//! Streams every repository found beneath the starting directory to stdout
//! as it is discovered, then prints a summary to stderr.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use crate::core::{
    create_discovery_spinner, generate_failure_details, get_scan_concurrency, handler_fn,
    set_terminal_title, set_terminal_title_and_flush, update_spinner, Control, CrawlOptions,
    CrawlReport, Crawler, ScanFailure, StatsSnapshot, NO_REPOS_MESSAGE, SCANNING_MESSAGE,
};
use crate::utils::{display_path, PathSeparator};

/// Arguments for the find command, already parsed and range-checked
#[derive(Debug, Clone)]
pub struct FindArgs {
    pub root: PathBuf,
    pub throttle_ms: u64,
    pub max_depth: Option<usize>,
    pub jobs: Option<usize>,
    pub sequential: bool,
    /// Request a stop once this many repositories have been delivered
    pub stop_after: Option<usize>,
    pub json: bool,
    pub separator: PathSeparator,
    pub verbose: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    root: String,
    repositories: Vec<String>,
    scan_failures: &'a [ScanFailure],
    cancelled: bool,
    stats: StatsSnapshot,
    elapsed_ms: u128,
}

/// Handles the find command
pub async fn handle_find_command(args: FindArgs) -> Result<()> {
    set_terminal_title("🔍 find-repos");

    let concurrency = get_scan_concurrency(args.jobs, args.sequential);
    let options = CrawlOptions::new()
        .with_throttle_ms(args.throttle_ms)
        .with_max_depth(args.max_depth)
        .with_concurrency(concurrency);

    let crawler = Crawler::new(options);
    let stats = crawler.stats();

    let show_spinner = !args.json && !args.quiet && io::stderr().is_terminal();
    let spinner = create_discovery_spinner(show_spinner)?;
    spinner.set_message(SCANNING_MESSAGE);

    let mut delivered = 0usize;
    let handler = handler_fn(|batch| {
        delivered += batch.len();

        if !args.json {
            let mut stdout = io::stdout().lock();
            for path in batch {
                let line = display_path(path, args.separator);
                let written = spinner.suspend(|| writeln!(stdout, "{line}"));
                match written {
                    Ok(()) => {}
                    // Reader went away (e.g. piped into `head`): stop quietly
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => return Ok(Control::Stop),
                    Err(e) => return Err(e).context("failed to write repository path"),
                }
            }
        }

        let last_hit = batch.last().map(|p| display_path(p, args.separator));
        update_spinner(&spinner, &stats.snapshot(), last_hit.as_deref());

        Ok(match args.stop_after {
            Some(limit) if delivered >= limit => Control::Stop,
            _ => Control::Continue,
        })
    });

    let result = crawler.run(&args.root, handler).await;
    spinner.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            set_terminal_title_and_flush("❌ find-repos");
            return Err(e).with_context(|| format!("search under {} failed", args.root.display()));
        }
    };

    if args.json {
        print_json(&args, &report)?;
    } else if !args.quiet {
        print_summary(&args, &report);
    }

    set_terminal_title_and_flush("✅ find-repos");
    Ok(())
}

fn print_json(args: &FindArgs, report: &CrawlReport) -> Result<()> {
    let output = JsonOutput {
        root: display_path(&args.root, args.separator),
        repositories: report
            .repositories
            .iter()
            .map(|p| display_path(p, args.separator))
            .collect(),
        scan_failures: &report.scan_failures,
        cancelled: report.cancelled,
        stats: report.stats,
        elapsed_ms: report.elapsed.as_millis(),
    };

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &output)?;
    writeln!(stdout)?;
    Ok(())
}

fn print_summary(args: &FindArgs, report: &CrawlReport) {
    if report.repositories.is_empty() {
        eprintln!("{NO_REPOS_MESSAGE}");
    }

    eprintln!();
    eprintln!(
        "{}",
        report.stats.generate_summary(report.elapsed, report.cancelled)
    );

    if args.verbose && !report.scan_failures.is_empty() {
        eprintln!();
        eprintln!("{}", generate_failure_details(&report.scan_failures));
    }
}
