//! # constcheck
//!
//! A CLI tool that checks Python files for repeat use of strings.
//!
//! ## Overview
//!
//! constcheck is built on top of constchecklib. It reports every string
//! literal that appears at least `--count` times and is at least `--length`
//! characters long, per file and summed per directory, so repeated values
//! can be moved into named constants.
//!
//! ## Usage
//!
//! ```bash
//! # Check the current directory
//! constcheck
//!
//! # Check some packages with stricter thresholds
//! constcheck src tests --count 5 --length 8
//!
//! # Ignore values everywhere, or only in one file (escape commas with \)
//! constcheck -i "utf-8,a\,b" --ignore-from "pkg/cli.py=--help,--version"
//!
//! # Check a string instead of files
//! constcheck --string "x = 'abc'; y = 'abc'; z = 'abc'"
//!
//! # Only show paths with findings, as JSON
//! constcheck --filter --json
//! ```
//!
//! Defaults can be configured under `[tool.constcheck]` in the nearest
//! `pyproject.toml`. The exit status is 0 when nothing was found, 1 when
//! repeated strings were found and 2 on errors.
//!
//! Set `CONSTCHECK_LOG` (e.g. `CONSTCHECK_LOG=debug`) for diagnostics on
//! stderr.

mod render;
mod settings;

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use constchecklib::{check_paths_in, check_string, ProjectConfig};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use render::{render_json, render_occurrences, render_paths, DisplayConfig};
use settings::Settings;

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitStatus {
    /// No repeated strings found.
    Success,
    /// Repeated strings found.
    Failure,
    /// The check could not run (bad arguments, unreadable files, etc.).
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("constcheck")
        .version(env!("CARGO_PKG_VERSION"))
        .about(
            "Check Python files for repeat use of strings. Escape commas with \\. \
             Defaults can be configured in your pyproject.toml file.",
        )
        .arg(
            Arg::new("path")
                .num_args(0..)
                .help("Path(s) to check files for (default: .)"),
        )
        .arg(
            Arg::new("count")
                .short('c')
                .long("count")
                .value_name("INT")
                .value_parser(value_parser!(i64))
                .allow_negative_numbers(true)
                .help("Minimum number of repeat strings (default: 3)"),
        )
        .arg(
            Arg::new("length")
                .short('l')
                .long("length")
                .value_name("INT")
                .value_parser(value_parser!(i64))
                .allow_negative_numbers(true)
                .help("Minimum length of repeat strings (default: 3)"),
        )
        .arg(
            Arg::new("string")
                .short('s')
                .long("string")
                .value_name("STR")
                .allow_hyphen_values(true)
                .help("Parse a string instead of a file"),
        )
        .arg(
            Arg::new("ignore-strings")
                .short('i')
                .long("ignore-strings")
                .value_name("LIST")
                .help("Comma separated list of strings to exclude"),
        )
        .arg(
            Arg::new("ignore-files")
                .short('I')
                .long("ignore-files")
                .value_name("LIST")
                .help("Comma separated list of files to exclude"),
        )
        .arg(
            Arg::new("ignore-from")
                .long("ignore-from")
                .value_name("FILE=LIST")
                .num_args(1..)
                .action(ArgAction::Append)
                .help("Comma separated list of strings to exclude from file"),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .value_name("GLOB")
                .action(ArgAction::Append)
                .help("Exclude files matching glob pattern"),
        )
        .arg(
            Arg::new("include")
                .long("include")
                .value_name("GLOB")
                .action(ArgAction::Append)
                .help("Include only files matching glob pattern"),
        )
        .arg(
            Arg::new("filter")
                .short('f')
                .long("filter")
                .action(ArgAction::SetTrue)
                .help("Only show paths with repeated strings"),
        )
        .arg(
            Arg::new("no-color")
                .short('n')
                .long("no-color")
                .visible_alias("no-ansi")
                .action(ArgAction::SetTrue)
                .help("Disable color output"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print results as JSON"),
        )
}

/// Log to stderr, filtered by `CONSTCHECK_LOG` (default: warn)
fn init_tracing() {
    let filter = EnvFilter::try_from_env("CONSTCHECK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(matches: &ArgMatches) -> anyhow::Result<ExitStatus> {
    let cwd = env::current_dir().context("failed to read the working directory")?;
    let project = ProjectConfig::discover(&cwd)?;
    let settings = Settings::resolve(matches, project)?;
    debug!(?settings, "resolved settings");
    let options = settings.check_options()?;
    let display = DisplayConfig::new(!settings.no_color && console::colors_enabled());

    let found = match &settings.string {
        Some(source) => {
            let occurrences = check_string(source, &options)?;
            if settings.json {
                println!("{}", render_json(&occurrences)?);
            } else {
                print!("{}", render_occurrences(&occurrences, &display));
            }
            occurrences.has_findings()
        }
        None => {
            let result = check_paths_in(&settings.paths, &cwd, &options)?;
            if settings.json {
                println!("{}", render_json(&result)?);
            } else {
                print!("{}", render_paths(&result, &display));
            }
            result.has_findings()
        }
    };

    Ok(if found {
        ExitStatus::Failure
    } else {
        ExitStatus::Success
    })
}

fn main() -> ExitCode {
    init_tracing();

    let matches = build_command().get_matches();

    match run(&matches) {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitStatus::Error.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::from(ExitStatus::Success), ExitCode::from(0));
        assert_eq!(ExitCode::from(ExitStatus::Failure), ExitCode::from(1));
        assert_eq!(ExitCode::from(ExitStatus::Error), ExitCode::from(2));
    }

    #[test]
    fn test_command_is_valid() {
        build_command().debug_assert();
    }
}
