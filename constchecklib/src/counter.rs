//! High-level checking API.
//!
//! This module provides the main entry points for finding repeated string
//! literals in Python source, either held in memory or spread over files
//! and directories.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::aggregate;
use crate::error::ConstcheckError;
use crate::filter::discover_files_in_dirs;
use crate::options::CheckOptions;
use crate::stats::{filter_repeats, OccurrenceMap, PathOccurrenceMap};
use crate::visitor::{parse_file, parse_string};
use crate::Result;

/// Result of checking files and directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Number of source files read
    pub files_checked: usize,
    /// Findings per file and per ancestor directory
    pub paths: PathOccurrenceMap,
}

impl CheckResult {
    /// True iff any path has at least one finding.
    pub fn has_findings(&self) -> bool {
        self.paths.has_findings()
    }
}

/// Check Python source held in memory.
///
/// Only the global ignore list applies; per-file ignores and file filters
/// are meaningless without a path.
///
/// # Example
///
/// ```rust
/// use constchecklib::{check_string, CheckOptions};
///
/// let source = "A = 'abc'\nB = 'abc'\nC = 'abc'\n";
/// let found = check_string(source, &CheckOptions::new()).unwrap();
/// assert_eq!(found.get("abc"), Some(3));
/// ```
pub fn check_string(source: &str, options: &CheckOptions) -> Result<OccurrenceMap> {
    options.thresholds.validate()?;
    let literals = parse_string(source)?;
    Ok(filter_repeats(
        literals,
        options.thresholds,
        &options.ignore_strings,
    ))
}

/// Check files and directories relative to the current working directory.
///
/// This is the main entry point for checking a project. It:
/// 1. Discovers the `.py` files under every path
/// 2. Reconstructs and filters the literals of each file in parallel
/// 3. Rolls the per-file results up into every ancestor directory
///
/// Any file that cannot be read or tokenized aborts the whole check.
///
/// # Example
///
/// ```rust,ignore
/// use constchecklib::{check_paths, CheckOptions, FilterConfig};
///
/// let result = check_paths(&["src"], &CheckOptions::new())?;
/// if result.has_findings() {
///     println!("{} paths have repeated strings", result.paths.len());
/// }
///
/// // Skip test modules
/// let filter = FilterConfig::new().ignore("tests");
/// let result = check_paths(&["."], &CheckOptions::new().filter(filter))?;
/// ```
pub fn check_paths<P: AsRef<Path>>(paths: &[P], options: &CheckOptions) -> Result<CheckResult> {
    let cwd = env::current_dir()?;
    check_paths_in(paths, &cwd, options)
}

/// Like [`check_paths`], with relative paths resolved against `cwd` and
/// report keys made relative to it.
pub fn check_paths_in<P: AsRef<Path>>(
    paths: &[P],
    cwd: &Path,
    options: &CheckOptions,
) -> Result<CheckResult> {
    options.thresholds.validate()?;
    let cwd = fs::canonicalize(cwd)?;

    let roots = paths
        .iter()
        .map(|path| resolve(path.as_ref(), &cwd))
        .collect::<Result<Vec<_>>>()?;
    let files = discover_files_in_dirs(&roots, &options.file_filter)?;
    let ignore_from = options.resolve_ignore_from(&cwd);

    let per_file: Vec<Result<(PathBuf, OccurrenceMap)>> = files
        .par_iter()
        .map(|path| {
            let literals = parse_file(path)?;
            let ignored = options.ignored_in(path, &ignore_from);
            let occurrences = filter_repeats(literals, options.thresholds, &ignored);
            debug!(
                path = %path.display(),
                repeated = occurrences.len(),
                "checked file"
            );
            Ok((path.clone(), occurrences))
        })
        .collect();

    // first failure in path order wins
    let per_file = per_file.into_iter().collect::<Result<Vec<_>>>()?;
    let files_checked = per_file.len();

    let mut report = aggregate(per_file, &cwd);
    if options.filter_empty {
        report.retain_non_empty();
    }

    info!(
        files = files_checked,
        paths = report.len(),
        findings = report.has_findings(),
        "check complete"
    );

    Ok(CheckResult {
        files_checked,
        paths: report,
    })
}

fn resolve(path: &Path, cwd: &Path) -> Result<PathBuf> {
    let joined = cwd.join(path);
    if !joined.exists() {
        return Err(ConstcheckError::PathNotFound(path.to_path_buf()));
    }
    Ok(fs::canonicalize(joined)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterConfig;
    use crate::stats::Thresholds;
    use tempfile::tempdir;

    fn create_python_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    const THREE_XYZ: &str = "A = 'xyz'\nB = 'xyz'\nC = 'xyz'\n";

    #[test]
    fn test_check_string() {
        let found = check_string(THREE_XYZ, &CheckOptions::new()).unwrap();
        assert_eq!(found.get("xyz"), Some(3));

        let options = CheckOptions::new().thresholds(Thresholds::new(4, 3).unwrap());
        assert!(check_string(THREE_XYZ, &options).unwrap().is_empty());
    }

    #[test]
    fn test_check_string_ignores_values() {
        let options = CheckOptions::new().ignore_strings(["xyz"]);
        assert!(check_string(THREE_XYZ, &options).unwrap().is_empty());
    }

    #[test]
    fn test_check_string_plus_concatenation() {
        let source = "CONST = \"foo\" + \"foo\" + \"foo\"\n".repeat(3);
        let found = check_string(&source, &CheckOptions::new()).unwrap();

        assert_eq!(found.get("foofoofoo"), Some(3));
        assert_eq!(found.get("foo"), None);
    }

    #[test]
    fn test_check_string_malformed() {
        let err = check_string("x = (\n", &CheckOptions::new()).unwrap_err();
        assert!(matches!(err, ConstcheckError::MalformedSource { .. }));
    }

    #[test]
    fn test_check_paths_rolls_up() {
        let temp = tempdir().unwrap();
        create_python_file(&temp.path().join("pkg/a.py"), THREE_XYZ);
        create_python_file(&temp.path().join("pkg/b.py"), THREE_XYZ);

        let result = check_paths_in(&["."], temp.path(), &CheckOptions::new()).unwrap();

        assert_eq!(result.files_checked, 2);
        assert!(result.has_findings());
        assert_eq!(result.paths.get("pkg/a.py").unwrap().get("xyz"), Some(3));
        assert_eq!(result.paths.get("pkg/b.py").unwrap().get("xyz"), Some(3));
        assert_eq!(result.paths.get("pkg").unwrap().get("xyz"), Some(6));
        assert_eq!(result.paths.get(".").unwrap().get("xyz"), Some(6));
    }

    #[test]
    fn test_check_paths_ignore_strings_reach_every_level() {
        let temp = tempdir().unwrap();
        create_python_file(&temp.path().join("pkg/a.py"), THREE_XYZ);

        let options = CheckOptions::new().ignore_strings(["xyz"]);
        let result = check_paths_in(&["pkg"], temp.path(), &options).unwrap();

        assert!(!result.has_findings());
        assert!(result.paths.get("pkg/a.py").unwrap().is_empty());
        assert!(result.paths.get("pkg").unwrap().is_empty());
        assert!(result.paths.get(".").unwrap().is_empty());
    }

    #[test]
    fn test_check_paths_ignore_from_one_file() {
        let temp = tempdir().unwrap();
        create_python_file(&temp.path().join("pkg/a.py"), THREE_XYZ);
        create_python_file(&temp.path().join("pkg/b.py"), THREE_XYZ);

        let options = CheckOptions::new().ignore_from("pkg/a.py", ["xyz"]);
        let result = check_paths_in(&["."], temp.path(), &options).unwrap();

        assert!(result.paths.get("pkg/a.py").unwrap().is_empty());
        assert_eq!(result.paths.get("pkg/b.py").unwrap().get("xyz"), Some(3));
        assert_eq!(result.paths.get("pkg").unwrap().get("xyz"), Some(3));
    }

    #[test]
    fn test_check_string_rejects_zero_count() {
        let options = CheckOptions::new().thresholds(Thresholds {
            count: 0,
            length: 0,
        });

        let err = check_string("A = 'x'\n", &options).unwrap_err();
        assert!(matches!(err, ConstcheckError::InvalidThreshold { name: "count", .. }));
    }

    #[test]
    fn test_check_paths_rejects_zero_count() {
        let temp = tempdir().unwrap();
        create_python_file(&temp.path().join("a.py"), "A = 'xyz'\n");
        let options = CheckOptions::new().thresholds(Thresholds {
            count: 0,
            length: 0,
        });

        let err = check_paths_in(&["."], temp.path(), &options).unwrap_err();
        assert!(matches!(err, ConstcheckError::InvalidThreshold { name: "count", .. }));
    }

    #[test]
    fn test_check_paths_ignore_from_unnormalized_key() {
        let temp = tempdir().unwrap();
        create_python_file(&temp.path().join("pkg/a.py"), THREE_XYZ);

        let options = CheckOptions::new().ignore_from("pkg/../pkg/a.py", ["xyz"]);
        let result = check_paths_in(&["."], temp.path(), &options).unwrap();

        assert!(result.paths.get("pkg/a.py").unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_check_paths_fails_on_dangling_symlink() {
        let temp = tempdir().unwrap();
        create_python_file(&temp.path().join("a.py"), THREE_XYZ);
        std::os::unix::fs::symlink(temp.path().join("gone.py"), temp.path().join("b.py")).unwrap();

        let result = check_paths_in(&["."], temp.path(), &CheckOptions::new());
        assert!(matches!(result, Err(ConstcheckError::FileRead { .. })));
    }

    #[test]
    fn test_check_paths_filter_empty() {
        let temp = tempdir().unwrap();
        create_python_file(&temp.path().join("pkg/a.py"), THREE_XYZ);
        create_python_file(&temp.path().join("other/b.py"), "X = 'once'\n");

        let options = CheckOptions::new().filter_empty(true);
        let result = check_paths_in(&["."], temp.path(), &options).unwrap();

        assert_eq!(result.files_checked, 2);
        assert!(result.paths.contains("pkg/a.py"));
        assert!(!result.paths.contains("other/b.py"));
        assert!(!result.paths.contains("other"));
    }

    #[test]
    fn test_check_paths_respects_file_filter() {
        let temp = tempdir().unwrap();
        create_python_file(&temp.path().join("pkg/a.py"), THREE_XYZ);
        create_python_file(&temp.path().join("tests/test_a.py"), THREE_XYZ);

        let options = CheckOptions::new().filter(FilterConfig::new().ignore("tests"));
        let result = check_paths_in(&["."], temp.path(), &options).unwrap();

        assert_eq!(result.files_checked, 1);
        assert!(!result.paths.contains("tests"));
        assert_eq!(result.paths.get(".").unwrap().get("xyz"), Some(3));
    }

    #[test]
    fn test_check_paths_no_files() {
        let temp = tempdir().unwrap();

        let result = check_paths_in(&["."], temp.path(), &CheckOptions::new()).unwrap();

        assert_eq!(result.files_checked, 0);
        assert!(result.paths.is_empty());
        assert!(!result.has_findings());
    }

    #[test]
    fn test_check_paths_missing_path() {
        let temp = tempdir().unwrap();

        let err = check_paths_in(&["missing"], temp.path(), &CheckOptions::new()).unwrap_err();
        assert!(matches!(err, ConstcheckError::PathNotFound(_)));
    }

    #[test]
    fn test_check_paths_aborts_on_bad_file() {
        let temp = tempdir().unwrap();
        create_python_file(&temp.path().join("a.py"), THREE_XYZ);
        create_python_file(&temp.path().join("b.py"), "x = '''never closed\n");

        let err = check_paths_in(&["."], temp.path(), &CheckOptions::new()).unwrap_err();
        assert!(matches!(err, ConstcheckError::MalformedSource { .. }));
    }

    #[test]
    fn test_check_paths_matches_sequential_results() {
        let temp = tempdir().unwrap();
        for i in 0..20 {
            create_python_file(&temp.path().join(format!("pkg/m{i}.py")), THREE_XYZ);
        }

        let result = check_paths_in(&["pkg"], temp.path(), &CheckOptions::new()).unwrap();

        assert_eq!(result.files_checked, 20);
        assert_eq!(result.paths.get("pkg").unwrap().get("xyz"), Some(60));
    }
}
