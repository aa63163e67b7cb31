//! # constchecklib
//!
//! A library that finds string literals repeated across Python source
//! files, the ones worth pulling out into named constants.
//!
//! ## Overview
//!
//! Python source is tokenized, and the string tokens are folded back into
//! the values the program actually spells out. Adjacent literals inside
//! parentheses and literals joined with `+` become one value, while
//! docstrings and f-strings are left out. Each file's values are counted,
//! and the ones that repeat often enough and are long enough are reported
//! for the file and, summed, for every directory above it.
//!
//! - **Tokenizer**: a Python lexer producing the token stream shape of
//!   CPython's `tokenize` module
//! - **Reconstruction**: folding string tokens into logical literals
//! - **Filtering**: count and length thresholds, plus global and per-file
//!   ignore lists
//! - **Aggregation**: per-file results rolled up into ancestor directories
//! - **Discovery**: `.py` file discovery with ignored names and glob filters
//! - **Configuration**: defaults from `[tool.constcheck]` in `pyproject.toml`
//!
//! ## Example
//!
//! ```rust
//! use constchecklib::{check_paths_in, check_string, CheckOptions, Thresholds};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! // Check a string
//! let source = "A = 'abc'\nB = 'abc'\nC = 'abc'\n";
//! let found = check_string(source, &CheckOptions::new()).unwrap();
//! assert_eq!(found.get("abc"), Some(3));
//!
//! // Check a project
//! let dir = tempdir().unwrap();
//! fs::create_dir(dir.path().join("pkg")).unwrap();
//! fs::write(dir.path().join("pkg/a.py"), source).unwrap();
//! fs::write(dir.path().join("pkg/b.py"), source).unwrap();
//!
//! let result = check_paths_in(&["pkg"], dir.path(), &CheckOptions::new()).unwrap();
//! assert_eq!(result.paths.get("pkg").unwrap().get("abc"), Some(6));
//!
//! // Raise the bar
//! let options = CheckOptions::new().thresholds(Thresholds::new(4, 3).unwrap());
//! let result = check_paths_in(&["pkg"], dir.path(), &options).unwrap();
//! assert!(!result.has_findings());
//! ```

pub mod aggregate;
pub mod config;
pub mod counter;
pub mod error;
pub mod filter;
pub mod options;
pub mod stats;
pub mod token;
pub mod tokenizer;
pub mod visitor;

pub use aggregate::aggregate;
pub use config::{find_pyproject_toml, ProjectConfig};
pub use counter::{check_paths, check_paths_in, check_string, CheckResult};
pub use error::{ConstcheckError, LexError};
pub use filter::{discover_files, discover_files_in_dirs, FilterConfig};
pub use options::CheckOptions;
pub use stats::{filter_repeats, LogicalLiteral, OccurrenceMap, PathOccurrenceMap, Thresholds};
pub use token::{ExactOp, Token, TokenKind, TokenText};
pub use tokenizer::tokenize;
pub use visitor::{parse_file, parse_string, Visitor};

/// Result type for constchecklib operations
pub type Result<T> = std::result::Result<T, ConstcheckError>;
