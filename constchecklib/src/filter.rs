//! File filtering and discovery with glob pattern support.
//!
//! This module finds the Python source files to check under one or more
//! roots, honoring ignored names and include/exclude glob patterns.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::ConstcheckError;
use crate::Result;

/// Configuration for file filtering.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Directory names, file names or file stems to skip
    pub ignore_names: HashSet<String>,
    /// Glob patterns to include (if empty, include all .py files)
    pub include: Vec<Pattern>,
    /// Glob patterns to exclude
    pub exclude: Vec<Pattern>,
}

impl FilterConfig {
    /// Create a new empty filter config (includes all .py files).
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip any file whose path below the scanned root, name, or stem
    /// equals `name`.
    pub fn ignore(mut self, name: impl Into<String>) -> Self {
        self.ignore_names.insert(name.into());
        self
    }

    /// Add multiple ignored names.
    pub fn ignore_many<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add an include pattern.
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.include.push(compile(pattern)?);
        Ok(self)
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude.push(compile(pattern)?);
        Ok(self)
    }

    /// Add multiple include patterns.
    pub fn include_many<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self = self.include(pattern.as_ref())?;
        }
        Ok(self)
    }

    /// Add multiple exclude patterns.
    pub fn exclude_many<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self = self.exclude(pattern.as_ref())?;
        }
        Ok(self)
    }

    /// Check if a path matches the filter criteria.
    ///
    /// A path matches if:
    /// 1. It's a .py file
    /// 2. Neither its name nor its stem is an ignored name
    /// 3. It doesn't match any exclude pattern
    /// 4. It matches at least one include pattern (or include is empty)
    pub fn matches(&self, path: &Path) -> bool {
        if path.extension().is_none_or(|ext| ext != "py") {
            return false;
        }

        let name = path.file_name().and_then(OsStr::to_str);
        let stem = path.file_stem().and_then(OsStr::to_str);
        if [name, stem].into_iter().flatten().any(|n| self.is_ignored(n)) {
            return false;
        }

        let path_str = path.to_string_lossy();

        if self.exclude.iter().any(|p| p.matches(&path_str)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|p| p.matches(&path_str))
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignore_names.contains(name)
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| ConstcheckError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Check if a directory should be skipped during traversal.
fn should_skip_dir(name: &str) -> bool {
    name.starts_with('.') || name == "__pycache__"
}

/// Discover Python source files under a directory.
///
/// Walks the directory tree and returns all .py files that match the
/// filter, sorted. A path naming a single file is checked against the
/// filter directly.
pub fn discover_files(root: impl AsRef<Path>, filter: &FilterConfig) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();

    if !root.exists() {
        return Err(ConstcheckError::PathNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();

    if root.is_file() {
        if filter.matches(root) {
            files.push(root.to_path_buf());
        }
        return Ok(files);
    }

    let walker = WalkDir::new(root).follow_links(true).into_iter();

    for entry in walker.filter_entry(|e| {
        // Always walk the root itself
        if e.depth() == 0 {
            return true;
        }
        if e.file_type().is_dir() {
            // ignored names only apply below the root
            let name = e.file_name().to_str().unwrap_or("");
            return !should_skip_dir(name) && !filter.is_ignored(name);
        }
        true
    }) {
        // dangling links, loops and unreadable directories abort the walk
        let entry = entry.map_err(|e| ConstcheckError::FileRead {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e.into(),
        })?;

        let path = entry.path();

        if path.is_file() && filter.matches(path) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    debug!(root = %root.display(), files = files.len(), "discovered files");

    Ok(files)
}

/// Discover Python source files under several roots.
pub fn discover_files_in_dirs<P: AsRef<Path>>(
    dirs: &[P],
    filter: &FilterConfig,
) -> Result<Vec<PathBuf>> {
    let mut all_files = Vec::new();

    for dir in dirs {
        let files = discover_files(dir, filter)?;
        all_files.extend(files);
    }

    // Remove duplicates and sort
    all_files.sort();
    all_files.dedup();

    Ok(all_files)
}
