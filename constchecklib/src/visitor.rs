//! Literal reconstruction from a Python token stream.
//!
//! This module walks the tokens of one source unit and rebuilds the
//! logical string values the program spells out. Python joins adjacent
//! string literals at compile time and `+` joins them at runtime, so
//!
//! ```python
//! MESSAGE = (
//!     "first half "
//!     "second half"
//! )
//! ```
//!
//! is one value, not two. The visitor mirrors that with a little state:
//!
//! - a bare `(` (not a call) opens a region where adjacent strings merge;
//! - a closing `)` or any square bracket or brace forces the next string
//!   to start a new value;
//! - a comma between strings always separates them;
//! - a `+` before a string joins it to the previous value.
//!
//! Docstrings and f-strings never produce values.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ConstcheckError;
use crate::stats::LogicalLiteral;
use crate::token::{Token, TokenKind, TokenText};
use crate::tokenizer::tokenize;
use crate::Result;

/// Walks a token stream and collects logical string literals.
#[derive(Debug, Default)]
pub struct Visitor {
    contents: Vec<LogicalLiteral>,
    in_parens: bool,
    force_split: bool,
    /// Set by a merge; the next f-string in a merge position discards the
    /// merged value instead of extending it.
    pending_pop: bool,
    prev_text: String,
    prev_kind: TokenKind,
}

impl Visitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visit every token and return the literals in source order.
    pub fn visit_tokens(mut self, tokens: &[Token]) -> Vec<LogicalLiteral> {
        for token in tokens {
            self.visit_token(token);
        }
        self.contents
    }

    fn visit_token(&mut self, token: &Token) {
        // `print(` is a call; a bare `(` may hold a multi-line string
        if token.is_left_paren() && !self.prev_kind.is_name() {
            self.in_parens = true;
        }

        if token.is_right_paren() {
            self.in_parens = false;
            self.force_split = true;
        }

        if token.is_left_bracket()
            || token.is_right_bracket()
            || token.is_left_brace()
            || token.is_right_brace()
        {
            self.force_split = true;
        }

        let text = TokenText::new(token.text.trim());
        let prev_text = TokenText::new(&self.prev_text);

        if token.is_string() && !text.is_docstring(prev_text, self.prev_kind) {
            self.visit_string(text);
        }

        self.prev_text = text.as_str().to_string();
        self.prev_kind = token.kind;
    }

    fn visit_string(&mut self, text: TokenText<'_>) {
        let prev_text = TokenText::new(&self.prev_text);
        let joined = self.in_parens || prev_text.is_plus();
        let separated = self.force_split || prev_text.is_comma();

        if !self.contents.is_empty() && joined && !separated {
            if text.is_fstring_prefixed() {
                if self.pending_pop {
                    self.contents.pop();
                    self.pending_pop = false;
                } else {
                    self.pending_pop = true;
                }
            } else if let Some(last) = self.contents.last_mut() {
                last.push_str(text.dequote());
                self.pending_pop = true;
            }
        } else if !text.is_fstring_prefixed() {
            self.contents.push(LogicalLiteral::new(text.dequote()));
            self.force_split = false;
        }
    }
}

/// Reconstruct the string literals of a Python source file.
///
/// A file that cannot be read or is not valid UTF-8 is a
/// [`ConstcheckError::FileRead`]; a file that cannot be tokenized is a
/// [`ConstcheckError::MalformedSource`].
///
/// # Example
///
/// ```rust,ignore
/// use constchecklib::visitor::parse_file;
///
/// let literals = parse_file("package/module.py")?;
/// println!("{} string literals", literals.len());
/// ```
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<LogicalLiteral>> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|e| ConstcheckError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let literals = visit_source(&source, &path.display().to_string())?;
    debug!(path = %path.display(), literals = literals.len(), "parsed file");
    Ok(literals)
}

/// Reconstruct the string literals of Python source held in memory.
///
/// # Example
///
/// ```rust
/// use constchecklib::visitor::parse_string;
///
/// let literals = parse_string("X = ('a' 'b', 'c')\n").unwrap();
/// let values: Vec<&str> = literals.iter().map(|l| l.as_str()).collect();
/// assert_eq!(values, vec!["ab", "c"]);
/// ```
pub fn parse_string(source: &str) -> Result<Vec<LogicalLiteral>> {
    visit_source(source, "<string>")
}

fn visit_source(source: &str, origin: &str) -> Result<Vec<LogicalLiteral>> {
    let tokens = tokenize(source).map_err(|e| ConstcheckError::MalformedSource {
        origin: origin.to_string(),
        source: e,
    })?;

    Ok(Visitor::new().visit_tokens(&tokens))
}
