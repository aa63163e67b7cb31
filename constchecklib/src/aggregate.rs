//! Roll per-file results up into every ancestor directory.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::stats::{OccurrenceMap, PathOccurrenceMap};

/// Build the per-path report from per-file occurrence maps.
///
/// `files` holds absolute file paths with their filtered maps. Each file is
/// recorded as is; every directory between a file and the common root gets
/// the sum of the files below it. When the common root lies inside `cwd`,
/// totals reach all the way up to `cwd`, reported as `.`.
///
/// Files and directories with nothing to report keep an empty map.
///
/// # Example
///
/// ```rust
/// use constchecklib::{aggregate, LogicalLiteral, OccurrenceMap};
/// use std::path::{Path, PathBuf};
///
/// let found: OccurrenceMap = [(LogicalLiteral::from("xyz"), 3)].into_iter().collect();
/// let files = vec![
///     (PathBuf::from("/work/pkg/a.py"), found.clone()),
///     (PathBuf::from("/work/pkg/b.py"), found),
/// ];
///
/// let report = aggregate(files, Path::new("/work"));
/// assert_eq!(report.get("pkg").unwrap().get("xyz"), Some(6));
/// assert_eq!(report.get(".").unwrap().get("xyz"), Some(6));
/// assert_eq!(report.get("pkg/a.py").unwrap().get("xyz"), Some(3));
/// ```
pub fn aggregate(files: Vec<(PathBuf, OccurrenceMap)>, cwd: &Path) -> PathOccurrenceMap {
    let mut report = PathOccurrenceMap::new();

    let Some(root) = common_root(files.iter().map(|(path, _)| path.as_path()), cwd) else {
        return report;
    };

    let mut dirs: BTreeMap<PathBuf, OccurrenceMap> = BTreeMap::new();

    for (path, occurrences) in &files {
        for dir in path.ancestors().skip(1) {
            if !dir.starts_with(&root) {
                break;
            }
            dirs.entry(dir.to_path_buf()).or_default();
        }

        if let Some(parent) = path.parent().and_then(|p| dirs.get_mut(p)) {
            *parent += occurrences;
        }
    }

    // deepest first, so a directory is complete before it is folded upward
    let mut order: Vec<PathBuf> = dirs.keys().cloned().collect();
    order.sort_by_key(|dir| Reverse(dir.components().count()));

    for dir in order {
        if dir == root {
            continue;
        }
        let Some(parent) = dir.parent().map(Path::to_path_buf) else {
            continue;
        };
        let total = dirs.get(&dir).cloned().unwrap_or_default();
        if let Some(parent_total) = dirs.get_mut(&parent) {
            *parent_total += &total;
        }
    }

    for (path, occurrences) in files {
        report.insert(display_key(&path, cwd), occurrences);
    }
    for (dir, occurrences) in dirs {
        report.insert(display_key(&dir, cwd), occurrences);
    }

    report
}

/// Deepest directory containing every path, clamped to `cwd` when inside it.
fn common_root<'a>(mut paths: impl Iterator<Item = &'a Path>, cwd: &Path) -> Option<PathBuf> {
    let first = paths.next()?;
    let mut common = first.to_path_buf();
    let mut single_file = true;

    for path in paths {
        if path == first {
            continue;
        }
        single_file = false;
        while !path.starts_with(&common) {
            if !common.pop() {
                break;
            }
        }
    }

    if common.starts_with(cwd) {
        return Some(cwd.to_path_buf());
    }

    // a lone file (or identical paths) leaves the file itself as common
    if single_file {
        if let Some(parent) = common.parent() {
            return Some(parent.to_path_buf());
        }
    }

    Some(common)
}

/// Path relative to `cwd` when below it (`.` for `cwd` itself).
fn display_key(path: &Path, cwd: &Path) -> PathBuf {
    match path.strip_prefix(cwd) {
        Ok(relative) if relative.as_os_str().is_empty() => PathBuf::from("."),
        Ok(relative) => relative.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::LogicalLiteral;

    fn occurrences(entries: &[(&str, u64)]) -> OccurrenceMap {
        entries
            .iter()
            .map(|(value, count)| (LogicalLiteral::from(*value), *count))
            .collect()
    }

    fn cwd() -> PathBuf {
        PathBuf::from("/work")
    }

    #[test]
    fn sibling_files_roll_up() {
        let files = vec![
            (PathBuf::from("/work/pkg/a.py"), occurrences(&[("xyz", 3)])),
            (PathBuf::from("/work/pkg/b.py"), occurrences(&[("xyz", 3)])),
        ];

        let report = aggregate(files, &cwd());

        assert_eq!(report.get("pkg/a.py").unwrap().get("xyz"), Some(3));
        assert_eq!(report.get("pkg/b.py").unwrap().get("xyz"), Some(3));
        assert_eq!(report.get("pkg").unwrap().get("xyz"), Some(6));
        assert_eq!(report.get(".").unwrap().get("xyz"), Some(6));
        assert_eq!(report.len(), 4);
    }

    #[test]
    fn nested_directories_sum_each_level() {
        let files = vec![
            (PathBuf::from("/work/a/b/c/x.py"), occurrences(&[("one", 3)])),
            (PathBuf::from("/work/a/y.py"), occurrences(&[("one", 4), ("two", 5)])),
            (PathBuf::from("/work/d/z.py"), occurrences(&[("two", 3)])),
        ];

        let report = aggregate(files, &cwd());

        assert_eq!(report.get("a/b/c").unwrap().get("one"), Some(3));
        assert_eq!(report.get("a/b").unwrap().get("one"), Some(3));
        assert_eq!(report.get("a").unwrap().get("one"), Some(7));
        assert_eq!(report.get("a").unwrap().get("two"), Some(5));
        assert_eq!(report.get("d").unwrap().get("two"), Some(3));
        assert_eq!(report.get(".").unwrap().get("one"), Some(7));
        assert_eq!(report.get(".").unwrap().get("two"), Some(8));
    }

    #[test]
    fn empty_maps_are_kept() {
        let files = vec![
            (PathBuf::from("/work/pkg/a.py"), OccurrenceMap::new()),
            (PathBuf::from("/work/pkg/b.py"), occurrences(&[("abc", 3)])),
        ];

        let report = aggregate(files, &cwd());

        assert!(report.get("pkg/a.py").unwrap().is_empty());
        assert_eq!(report.get("pkg").unwrap().get("abc"), Some(3));
    }

    #[test]
    fn no_files_no_report() {
        assert!(aggregate(Vec::new(), &cwd()).is_empty());
    }

    #[test]
    fn single_file_under_cwd_reaches_dot() {
        let files = vec![(PathBuf::from("/work/a.py"), occurrences(&[("abc", 3)]))];

        let report = aggregate(files, &cwd());

        assert_eq!(report.get("a.py").unwrap().get("abc"), Some(3));
        assert_eq!(report.get(".").unwrap().get("abc"), Some(3));
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn outside_cwd_stops_at_common_root_with_absolute_keys() {
        let files = vec![
            (PathBuf::from("/elsewhere/pkg/a.py"), occurrences(&[("abc", 3)])),
            (PathBuf::from("/elsewhere/pkg/sub/b.py"), occurrences(&[("abc", 3)])),
        ];

        let report = aggregate(files, &cwd());

        assert_eq!(report.get("/elsewhere/pkg").unwrap().get("abc"), Some(6));
        assert_eq!(report.get("/elsewhere/pkg/sub").unwrap().get("abc"), Some(3));
        assert!(!report.contains("/elsewhere"));
        assert!(!report.contains("."));
    }

    #[test]
    fn single_file_outside_cwd_uses_parent() {
        let files = vec![(PathBuf::from("/elsewhere/a.py"), occurrences(&[("abc", 3)]))];

        let report = aggregate(files, &cwd());

        assert!(report.contains("/elsewhere/a.py"));
        assert!(report.contains("/elsewhere"));
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn keys_sort_with_dot_first() {
        let files = vec![
            (PathBuf::from("/work/b.py"), occurrences(&[("abc", 3)])),
            (PathBuf::from("/work/a/x.py"), occurrences(&[("abc", 3)])),
        ];

        let report = aggregate(files, &cwd());
        let keys: Vec<&PathBuf> = report.iter().map(|(path, _)| path).collect();

        assert_eq!(
            keys,
            vec![
                &PathBuf::from("."),
                &PathBuf::from("a"),
                &PathBuf::from("a/x.py"),
                &PathBuf::from("b.py"),
            ]
        );
    }
}
