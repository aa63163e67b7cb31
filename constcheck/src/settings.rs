//! Resolved run settings: command line over `pyproject.toml` over defaults.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::ArgMatches;
use constchecklib::config::{split_comma, StringList};
use constchecklib::{CheckOptions, FilterConfig, ProjectConfig, Thresholds};

const DEFAULT_COUNT: i64 = 3;
const DEFAULT_LENGTH: i64 = 3;

/// Everything a run needs, with every source of configuration applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub paths: Vec<PathBuf>,
    pub count: i64,
    pub length: i64,
    pub string: Option<String>,
    pub ignore_strings: Vec<String>,
    pub ignore_files: Vec<String>,
    pub ignore_from: HashMap<String, Vec<String>>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub filter: bool,
    pub no_color: bool,
    pub json: bool,
}

impl Settings {
    /// Merge parsed arguments over project configuration.
    pub fn resolve(matches: &ArgMatches, project: ProjectConfig) -> Result<Self> {
        let paths = match matches.get_many::<String>("path") {
            Some(values) => values.map(PathBuf::from).collect(),
            None => project
                .path
                .map(|p| p.into_vec().into_iter().map(PathBuf::from).collect())
                .unwrap_or_else(|| vec![PathBuf::from(".")]),
        };

        let ignore_from = match matches.get_many::<String>("ignore-from") {
            Some(values) => parse_ignore_from(values.map(String::as_str))?,
            None => project
                .ignore_from
                .map(|table| {
                    table
                        .into_iter()
                        .map(|(file, values)| (file, values.into_vec()))
                        .collect()
                })
                .unwrap_or_default(),
        };

        Ok(Self {
            paths,
            count: matches
                .get_one::<i64>("count")
                .copied()
                .or(project.count)
                .unwrap_or(DEFAULT_COUNT),
            length: matches
                .get_one::<i64>("length")
                .copied()
                .or(project.length)
                .unwrap_or(DEFAULT_LENGTH),
            string: matches.get_one::<String>("string").cloned().or(project.string),
            ignore_strings: list_arg(matches, "ignore-strings", project.ignore_strings),
            ignore_files: list_arg(matches, "ignore-files", project.ignore_files),
            ignore_from,
            include: many(matches, "include"),
            exclude: many(matches, "exclude"),
            filter: matches.get_flag("filter") || project.filter.unwrap_or(false),
            no_color: matches.get_flag("no-color") || project.no_color.unwrap_or(false),
            json: matches.get_flag("json"),
        })
    }

    /// Library options for this run.
    pub fn check_options(&self) -> Result<CheckOptions> {
        let thresholds = Thresholds::new(self.count, self.length)?;

        let filter = FilterConfig::new()
            .ignore_many(self.ignore_files.iter().cloned())
            .include_many(&self.include)?
            .exclude_many(&self.exclude)?;

        let mut options = CheckOptions::new()
            .thresholds(thresholds)
            .ignore_strings(self.ignore_strings.iter().cloned())
            .filter(filter)
            .filter_empty(self.filter);

        for (file, values) in &self.ignore_from {
            options = options.ignore_from(file, values.iter().cloned());
        }

        Ok(options)
    }
}

/// A comma separated list from the command line, else from the project.
fn list_arg(matches: &ArgMatches, id: &str, project: Option<StringList>) -> Vec<String> {
    match matches.get_one::<String>(id) {
        Some(value) => split_comma(value),
        None => project.map(StringList::into_vec).unwrap_or_default(),
    }
}

fn many(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

/// Parse `FILE=LIST` pairs.
fn parse_ignore_from<'a>(
    values: impl Iterator<Item = &'a str>,
) -> Result<HashMap<String, Vec<String>>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();

    for value in values {
        let (file, list) = value
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid --ignore-from value '{value}': expected FILE=LIST"))?;
        map.entry(file.to_string())
            .or_default()
            .extend(split_comma(list));
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_command;

    fn matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["constcheck"];
        argv.extend(args);
        build_command().try_get_matches_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&matches(&[]), ProjectConfig::default()).unwrap();

        assert_eq!(settings.paths, vec![PathBuf::from(".")]);
        assert_eq!(settings.count, 3);
        assert_eq!(settings.length, 3);
        assert!(settings.string.is_none());
        assert!(!settings.filter);
        assert!(!settings.no_color);
    }

    #[test]
    fn test_command_line_over_project() {
        let project = ProjectConfig {
            count: Some(5),
            length: Some(6),
            filter: Some(true),
            ignore_strings: Some(StringList::Many(vec!["project".to_string()])),
            ..ProjectConfig::default()
        };

        let settings =
            Settings::resolve(&matches(&["-c", "2", "-i", "a,b\\,c", "pkg"]), project).unwrap();

        assert_eq!(settings.count, 2);
        assert_eq!(settings.length, 6);
        assert!(settings.filter);
        assert_eq!(settings.ignore_strings, vec!["a", "b,c"]);
        assert_eq!(settings.paths, vec![PathBuf::from("pkg")]);
    }

    #[test]
    fn test_project_paths_used_without_arguments() {
        let project = ProjectConfig {
            path: Some(StringList::Many(vec!["src".to_string(), "tests".to_string()])),
            ..ProjectConfig::default()
        };

        let settings = Settings::resolve(&matches(&[]), project).unwrap();

        assert_eq!(
            settings.paths,
            vec![PathBuf::from("src"), PathBuf::from("tests")]
        );
    }

    #[test]
    fn test_ignore_from_pairs() {
        let settings = Settings::resolve(
            &matches(&["--ignore-from", "a.py=x,y", "b.py=z"]),
            ProjectConfig::default(),
        )
        .unwrap();

        assert_eq!(settings.ignore_from["a.py"], vec!["x", "y"]);
        assert_eq!(settings.ignore_from["b.py"], vec!["z"]);
    }

    #[test]
    fn test_ignore_from_without_equals_is_an_error() {
        let result = Settings::resolve(
            &matches(&["--ignore-from", "a.py"]),
            ProjectConfig::default(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let settings = Settings::resolve(&matches(&["-c", "0"]), ProjectConfig::default()).unwrap();

        assert!(settings.check_options().is_err());
    }

    #[test]
    fn test_negative_length_parses_then_fails_validation() {
        let settings = Settings::resolve(&matches(&["-l", "-1"]), ProjectConfig::default()).unwrap();

        assert_eq!(settings.length, -1);
        assert!(settings.check_options().is_err());
    }
}
