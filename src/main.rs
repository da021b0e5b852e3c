//! find-repos: Lists every git repository beneath a directory
//! Repositories are printed as they are discovered; a summary follows on stderr.

use anyhow::{anyhow, Result};
use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};
use std::path::PathBuf;

use repo_finder::commands::find::{handle_find_command, FindArgs};
use repo_finder::core::MAX_THROTTLE_INTERVAL_MS;
use repo_finder::utils::PathSeparator;

fn build_cli() -> ClapCommand {
    ClapCommand::new("find-repos")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Find git repositories beneath a directory")
        .arg(
            Arg::new("path")
                .help("Directory to search (defaults to the current directory)")
                .value_parser(value_parser!(PathBuf))
                .default_value("."),
        )
        .arg(
            Arg::new("throttle-ms")
                .long("throttle-ms")
                .value_name("MS")
                .help("Coalesce progress output into windows of this many milliseconds")
                .value_parser(value_parser!(u64).range(0..=MAX_THROTTLE_INTERVAL_MS))
                .default_value("0"),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .value_name("N")
                .help("Do not descend more than N levels below the starting directory")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .value_name("N")
                .help("Number of directories scanned concurrently")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("sequential")
                .long("sequential")
                .help("Scan one directory at a time")
                .conflicts_with("jobs")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stop-after")
                .long("stop-after")
                .value_name("N")
                .help("Stop searching once N repositories have been reported")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print a JSON report instead of one path per line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("separator")
                .long("separator")
                .value_name("STYLE")
                .help("Path separator style for output")
                .value_parser(["native", "slash", "backslash"])
                .default_value("native"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v, -vv, -vvv)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print repository paths")
                .conflicts_with("verbose")
                .action(ArgAction::SetTrue),
        )
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("repo_finder=info,warn"),
        2 => tracing_subscriber::EnvFilter::new("repo_finder=debug,info"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let verbose = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");
    setup_logging(verbose, quiet);

    let separator = matches
        .get_one::<String>("separator")
        .map(String::as_str)
        .unwrap_or("native");
    let separator =
        PathSeparator::parse(separator).ok_or_else(|| anyhow!("unknown separator style: {separator}"))?;

    let args = FindArgs {
        root: matches
            .get_one::<PathBuf>("path")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(".")),
        throttle_ms: matches.get_one::<u64>("throttle-ms").copied().unwrap_or(0),
        max_depth: matches.get_one::<usize>("max-depth").copied(),
        jobs: matches.get_one::<usize>("jobs").copied(),
        sequential: matches.get_flag("sequential"),
        stop_after: matches.get_one::<usize>("stop-after").copied(),
        json: matches.get_flag("json"),
        separator,
        verbose: verbose > 0,
        quiet,
    };

    handle_find_command(args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_throttle_out_of_range_is_rejected() {
        let result = build_cli().try_get_matches_from(["find-repos", "--throttle-ms", "60001"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let matches = build_cli().get_matches_from(["find-repos"]);
        assert_eq!(matches.get_one::<PathBuf>("path"), Some(&PathBuf::from(".")));
        assert_eq!(matches.get_one::<u64>("throttle-ms"), Some(&0));
        assert_eq!(matches.get_one::<usize>("max-depth"), None);
        assert_eq!(matches.get_count("verbose"), 0);
    }

    #[test]
    fn test_sequential_conflicts_with_jobs() {
        let result = build_cli().try_get_matches_from(["find-repos", "--sequential", "-j", "4"]);
        assert!(result.is_err());
    }
}
