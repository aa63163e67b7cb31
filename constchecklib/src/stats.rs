//! Core data structures for repeated-string statistics

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::{Add, AddAssign};
use std::path::{Path, PathBuf};

/// A string value after quotes are stripped and concatenations are merged.
///
/// Two literals are equal when their dequoted text is equal; no other
/// normalization (case, whitespace, escapes) is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalLiteral(String);

impl LogicalLiteral {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append the text of a concatenated literal.
    pub fn push_str(&mut self, text: &str) {
        self.0.push_str(text);
    }
}

impl std::fmt::Display for LogicalLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LogicalLiteral {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Minimum repeat count and length a literal needs to be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum number of occurrences (at least 1)
    pub count: usize,
    /// Minimum length in characters
    pub length: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            count: 3,
            length: 3,
        }
    }
}

/// Number of times each literal occurs in one unit (file, directory, string).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccurrenceMap {
    counts: BTreeMap<LogicalLiteral, u64>,
}

impl OccurrenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, literal: &str) -> Option<u64> {
        self.counts.get(&LogicalLiteral::from(literal)).copied()
    }

    pub fn insert(&mut self, literal: LogicalLiteral, count: u64) {
        self.counts.insert(literal, count);
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// True iff at least one literal qualified.
    pub fn has_findings(&self) -> bool {
        !self.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LogicalLiteral, u64)> {
        self.counts.iter().map(|(k, v)| (k, *v))
    }

    /// Entries ordered by count, then by value.
    pub fn sorted_by_count(&self) -> Vec<(&LogicalLiteral, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl Add for OccurrenceMap {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += &other;
        self
    }
}

impl AddAssign<&OccurrenceMap> for OccurrenceMap {
    fn add_assign(&mut self, other: &OccurrenceMap) {
        for (literal, count) in other.iter() {
            *self.counts.entry(literal.clone()).or_insert(0) += count;
        }
    }
}

impl FromIterator<(LogicalLiteral, u64)> for OccurrenceMap {
    fn from_iter<I: IntoIterator<Item = (LogicalLiteral, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// Occurrence maps keyed by file path and every ancestor directory.
///
/// Keys are relative to the working directory when below it (the working
/// directory itself is `.`), absolute otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathOccurrenceMap {
    paths: BTreeMap<PathBuf, OccurrenceMap>,
}

impl PathOccurrenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&OccurrenceMap> {
        self.paths.get(path.as_ref())
    }

    pub fn insert(&mut self, path: PathBuf, occurrences: OccurrenceMap) {
        self.paths.insert(path, occurrences);
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.paths.contains_key(path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Paths in sorted order with their maps.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &OccurrenceMap)> {
        self.paths.iter()
    }

    /// True iff any path has at least one finding.
    pub fn has_findings(&self) -> bool {
        self.paths.values().any(OccurrenceMap::has_findings)
    }

    /// Drop paths without findings.
    pub fn retain_non_empty(&mut self) {
        self.paths.retain(|_, occurrences| occurrences.has_findings());
    }
}

/// Count literals and keep the ones that pass the thresholds.
///
/// Literals in `ignored` are removed before counting, so they can never
/// contribute to any aggregate built from the result.
///
/// # Example
///
/// ```rust
/// use constchecklib::{filter_repeats, LogicalLiteral, Thresholds};
/// use std::collections::HashSet;
///
/// let literals = vec![LogicalLiteral::from("abc"); 3];
/// let map = filter_repeats(literals, Thresholds::default(), &HashSet::new());
/// assert_eq!(map.get("abc"), Some(3));
/// ```
pub fn filter_repeats(
    literals: Vec<LogicalLiteral>,
    thresholds: Thresholds,
    ignored: &HashSet<String>,
) -> OccurrenceMap {
    let mut counts: HashMap<LogicalLiteral, u64> = HashMap::new();

    for literal in literals {
        if ignored.contains(literal.as_str()) {
            continue;
        }
        *counts.entry(literal).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter(|(literal, count)| {
            *count >= thresholds.count as u64 && literal.len() >= thresholds.length
        })
        .collect()
}
