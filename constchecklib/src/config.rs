//! Project defaults from `[tool.constcheck]` in `pyproject.toml`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConstcheckError;
use crate::Result;

/// Find the nearest `pyproject.toml`, starting at `start` and walking up.
pub fn find_pyproject_toml(start: impl AsRef<Path>) -> Option<PathBuf> {
    start
        .as_ref()
        .ancestors()
        .map(|dir| dir.join("pyproject.toml"))
        .find(|candidate| candidate.is_file())
}

/// Split a comma separated list; `\,` is a literal comma.
///
/// ```rust
/// use constchecklib::config::split_comma;
///
/// assert_eq!(split_comma("a,b\\,c"), vec!["a", "b,c"]);
/// ```
pub fn split_comma(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);

    items
}

/// A list that may also be written as one comma separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    One(String),
    Many(Vec<String>),
}

impl StringList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StringList::One(value) => split_comma(&value),
            StringList::Many(values) => values,
        }
    }
}

/// Settings read from `[tool.constcheck]`.
///
/// Every field is optional; anything left unset falls back to the command
/// line or the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub path: Option<StringList>,
    pub count: Option<i64>,
    pub length: Option<i64>,
    pub string: Option<String>,
    #[serde(alias = "ignore-strings")]
    pub ignore_strings: Option<StringList>,
    #[serde(alias = "ignore-files")]
    pub ignore_files: Option<StringList>,
    #[serde(alias = "ignore-from")]
    pub ignore_from: Option<HashMap<String, StringList>>,
    pub filter: Option<bool>,
    #[serde(alias = "no-color", alias = "no_ansi", alias = "no-ansi")]
    pub no_color: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct PyProject {
    #[serde(default)]
    tool: Tool,
}

#[derive(Debug, Default, Deserialize)]
struct Tool {
    #[serde(default)]
    constcheck: ProjectConfig,
}

impl ProjectConfig {
    /// Load `[tool.constcheck]` from a `pyproject.toml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConstcheckError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config = Self::from_toml(&content).map_err(|message| ConstcheckError::Config {
            path: path.to_path_buf(),
            message,
        })?;

        debug!(path = %path.display(), "loaded project config");
        Ok(config)
    }

    /// Load the nearest project config above `start`, if there is one.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self> {
        match find_pyproject_toml(start) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn from_toml(content: &str) -> std::result::Result<Self, String> {
        toml::from_str::<PyProject>(content)
            .map(|pyproject| pyproject.tool.constcheck)
            .map_err(|e| e.to_string())
    }
}
