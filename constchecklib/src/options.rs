//! Input options for repeated-string checks.
//!
//! This module contains the configuration types that control which files
//! are read and which literals are reported.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConstcheckError;
use crate::filter::FilterConfig;
use crate::stats::Thresholds;
use crate::Result;

impl Thresholds {
    /// Validate raw thresholds, as they arrive from a command line or a
    /// config file.
    ///
    /// `count` must be at least 1 and `length` must not be negative.
    pub fn new(count: i64, length: i64) -> Result<Self> {
        if count < 1 {
            return Err(ConstcheckError::InvalidThreshold {
                name: "count",
                value: count,
                reason: "must be at least 1",
            });
        }
        if length < 0 {
            return Err(ConstcheckError::InvalidThreshold {
                name: "length",
                value: length,
                reason: "must not be negative",
            });
        }

        Ok(Self {
            count: count as usize,
            length: length as usize,
        })
    }

    /// Check thresholds built directly from their fields.
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(ConstcheckError::InvalidThreshold {
                name: "count",
                value: 0,
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Options for checking files or strings.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Minimum count and length a literal needs to be reported
    pub thresholds: Thresholds,
    /// Literal values never reported anywhere
    pub ignore_strings: HashSet<String>,
    /// Literal values ignored only in one file
    pub ignore_from: HashMap<PathBuf, HashSet<String>>,
    /// File filter configuration
    pub file_filter: FilterConfig,
    /// Drop paths without findings from the result
    pub filter_empty: bool,
}

impl CheckOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set thresholds.
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Ignore these literal values everywhere.
    pub fn ignore_strings<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_strings.extend(values.into_iter().map(Into::into));
        self
    }

    /// Ignore these literal values in one file only.
    ///
    /// Relative paths are resolved against the working directory when the
    /// check runs.
    pub fn ignore_from<I, S>(mut self, path: impl Into<PathBuf>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_from
            .entry(path.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Set file filter.
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.file_filter = filter;
        self
    }

    /// Drop paths without findings from the result.
    pub fn filter_empty(mut self, filter_empty: bool) -> Self {
        self.filter_empty = filter_empty;
        self
    }

    /// Per-file ignores keyed by resolved path.
    ///
    /// Keys are joined onto `cwd` and canonicalized, so `pkg/../pkg/a.py`
    /// or a path through a symlink names the same file as the walk does.
    /// A key that cannot be canonicalized (e.g. a file that does not exist)
    /// is kept as joined.
    pub(crate) fn resolve_ignore_from(&self, cwd: &Path) -> HashMap<PathBuf, HashSet<String>> {
        let mut resolved: HashMap<PathBuf, HashSet<String>> = HashMap::new();

        for (file, values) in &self.ignore_from {
            let joined = cwd.join(file);
            let key = fs::canonicalize(&joined).unwrap_or(joined);
            resolved
                .entry(key)
                .or_default()
                .extend(values.iter().cloned());
        }

        resolved
    }

    /// Everything ignored in `path`: the global values plus the file's own
    /// from `resolved` (see [`CheckOptions::resolve_ignore_from`]).
    pub(crate) fn ignored_in(
        &self,
        path: &Path,
        resolved: &HashMap<PathBuf, HashSet<String>>,
    ) -> HashSet<String> {
        let mut ignored = self.ignore_strings.clone();
        if let Some(values) = resolved.get(path) {
            ignored.extend(values.iter().cloned());
        }
        ignored
    }
}
