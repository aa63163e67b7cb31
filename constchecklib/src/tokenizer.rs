//! Python tokenizer.
//!
//! Produces the same token stream shape as CPython's pure-Python `tokenize`
//! module (before 3.12): f-strings are single `STRING` tokens, blank lines
//! and newlines inside brackets are `NL`, logical line ends are `NEWLINE`,
//! and indentation changes are reported as `INDENT`/`DEDENT`. The literal
//! reconstructor looks at the previous token for every string, so these
//! "invisible" tokens matter as much as the visible ones.
//!
//! Source is processed one physical line at a time. A string that spans
//! lines (triple-quoted, or continued with a backslash) is carried over as
//! pending state until its closing quote is found.

use crate::error::LexError;
use crate::token::{ExactOp, Token, TokenKind};

const TAB_SIZE: usize = 8;

const OPERATORS_3: [&str; 5] = ["**=", "//=", ">>=", "<<=", "..."];
const OPERATORS_2: [&str; 19] = [
    "!=", "%=", "&=", "**", "*=", "+=", "-=", "->", "//", "/=", ":=", "<<", "<=", "==", ">=",
    ">>", "@=", "^=", "|=",
];
const OPERATORS_1: &str = "%&()*+,-./:;<=>@[]^{|}~";

const STRING_PREFIXES: [&str; 8] = ["r", "u", "f", "b", "br", "rb", "fr", "rf"];

/// A string literal whose closing quote has not been seen yet.
struct PendingString {
    text: String,
    quote: char,
    triple: bool,
    start_line: usize,
}

/// Result of scanning for the end of a string body.
enum Scan {
    /// The closing quote ends at this (exclusive) index
    Closed(usize),
    /// Reached the end of the line while still inside the string
    Open,
    /// A bare newline inside a single-quoted string
    Unterminated,
}

struct Tokenizer {
    tokens: Vec<Token>,
    line_no: usize,
    paren_depth: usize,
    continued: bool,
    indents: Vec<usize>,
    pending: Option<PendingString>,
}

impl Tokenizer {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            line_no: 0,
            paren_depth: 0,
            continued: false,
            indents: vec![0],
            pending: None,
        }
    }

    fn run(mut self, source: &str) -> Result<Vec<Token>, LexError> {
        // universal newlines, the way Python reads text files
        let source = source.replace("\r\n", "\n").replace('\r', "\n");
        let mut last_line = "";

        for line in source.split_inclusive('\n') {
            self.line_no += 1;
            last_line = line;
            let chars: Vec<char> = line.chars().collect();
            if !self.visit_line(&chars)? {
                break;
            }
        }

        self.finish(last_line)
    }

    /// Tokenize one physical line. Returns `false` when tokenization should
    /// stop (a trailing whitespace-only line without a newline).
    fn visit_line(&mut self, chars: &[char]) -> Result<bool, LexError> {
        let mut pos = 0;

        if let Some(mut pending) = self.pending.take() {
            match scan_string(chars, 0, pending.quote, pending.triple) {
                Scan::Closed(end) => {
                    pending.text.extend(&chars[..end]);
                    self.push_at(TokenKind::String, pending.text, pending.start_line);
                    pos = end;
                }
                Scan::Open => {
                    if !pending.triple && chars.last() != Some(&'\n') {
                        return Err(LexError::new(
                            pending.start_line,
                            "unterminated string literal",
                        ));
                    }
                    pending.text.extend(chars);
                    self.pending = Some(pending);
                    return Ok(true);
                }
                Scan::Unterminated => {
                    return Err(LexError::new(
                        pending.start_line,
                        "unterminated string literal",
                    ));
                }
            }
        } else if self.paren_depth == 0 && !self.continued {
            let mut column = 0;
            while pos < chars.len() {
                match chars[pos] {
                    ' ' => column += 1,
                    '\t' => column = (column / TAB_SIZE + 1) * TAB_SIZE,
                    '\x0c' => column = 0,
                    _ => break,
                }
                pos += 1;
            }

            if pos == chars.len() {
                return Ok(false);
            }

            // blank and comment-only lines never affect indentation
            if chars[pos] == '#' || chars[pos] == '\n' {
                if chars[pos] == '#' {
                    let end = line_content_end(chars);
                    self.push(TokenKind::Comment, collect(&chars[pos..end]));
                    pos = end;
                }
                self.push(TokenKind::Nl, collect(&chars[pos..]));
                return Ok(true);
            }

            self.visit_indentation(column, &chars[..pos])?;
        } else {
            self.continued = false;
        }

        self.visit_tokens(chars, pos)?;
        Ok(true)
    }

    fn visit_indentation(&mut self, column: usize, whitespace: &[char]) -> Result<(), LexError> {
        let current = self.indents.last().copied().unwrap_or(0);

        if column > current {
            self.indents.push(column);
            self.push(TokenKind::Indent, collect(whitespace));
            return Ok(());
        }

        while column < self.indents.last().copied().unwrap_or(0) {
            if !self.indents.contains(&column) {
                return Err(LexError::new(
                    self.line_no,
                    "unindent does not match any outer indentation level",
                ));
            }
            self.indents.pop();
            self.push(TokenKind::Dedent, "");
        }

        Ok(())
    }

    fn visit_tokens(&mut self, chars: &[char], mut pos: usize) -> Result<(), LexError> {
        while pos < chars.len() {
            let c = chars[pos];

            if c == ' ' || c == '\t' || c == '\x0c' {
                pos += 1;
                continue;
            }

            pos = match c {
                '#' => {
                    let end = line_content_end(chars);
                    self.push(TokenKind::Comment, collect(&chars[pos..end]));
                    end
                }
                '\n' => {
                    let kind = if self.paren_depth > 0 {
                        TokenKind::Nl
                    } else {
                        TokenKind::Newline
                    };
                    self.push(kind, "\n");
                    pos + 1
                }
                '\\' if pos + 1 >= chars.len() || chars[pos + 1] == '\n' => {
                    self.continued = true;
                    chars.len()
                }
                '\'' | '"' => match self.visit_string(chars, pos, pos)? {
                    Some(end) => end,
                    None => return Ok(()),
                },
                c if c.is_ascii_digit()
                    || (c == '.' && chars.get(pos + 1).is_some_and(|n| n.is_ascii_digit())) =>
                {
                    let end = number_end(chars, pos);
                    self.push(TokenKind::Number, collect(&chars[pos..end]));
                    end
                }
                c if is_identifier_start(c) => {
                    let end = identifier_end(chars, pos);
                    let word: String = collect(&chars[pos..end]);
                    let quote_follows = matches!(chars.get(end), Some('\'') | Some('"'));

                    if quote_follows && is_string_prefix(&word) {
                        match self.visit_string(chars, pos, end)? {
                            Some(end) => end,
                            None => return Ok(()),
                        }
                    } else {
                        self.push(TokenKind::Name, word);
                        end
                    }
                }
                _ => match operator_at(chars, pos) {
                    Some(op) => {
                        match op {
                            "(" | "[" | "{" => self.paren_depth += 1,
                            ")" | "]" | "}" => {
                                self.paren_depth = self.paren_depth.saturating_sub(1)
                            }
                            _ => {}
                        }
                        self.push(TokenKind::Operator(ExactOp::from_text(op)), op);
                        pos + op.chars().count()
                    }
                    None => {
                        self.push(TokenKind::Other, c.to_string());
                        pos + 1
                    }
                },
            };
        }

        Ok(())
    }

    /// Lex a string literal whose prefix starts at `start` and whose opening
    /// quote is at `quote_pos`.
    ///
    /// Returns the index after the literal, or `None` if the literal runs
    /// past the end of this line and is now pending.
    fn visit_string(
        &mut self,
        chars: &[char],
        start: usize,
        quote_pos: usize,
    ) -> Result<Option<usize>, LexError> {
        let quote = chars[quote_pos];
        let triple = chars.get(quote_pos + 1) == Some(&quote) && chars.get(quote_pos + 2) == Some(&quote);
        let body = if triple { quote_pos + 3 } else { quote_pos + 1 };

        match scan_string(chars, body, quote, triple) {
            Scan::Closed(end) => {
                self.push(TokenKind::String, collect(&chars[start..end]));
                Ok(Some(end))
            }
            Scan::Open => {
                if !triple && chars.last() != Some(&'\n') {
                    return Err(LexError::new(self.line_no, "unterminated string literal"));
                }
                self.pending = Some(PendingString {
                    text: collect(&chars[start..]),
                    quote,
                    triple,
                    start_line: self.line_no,
                });
                Ok(None)
            }
            Scan::Unterminated => Err(LexError::new(self.line_no, "unterminated string literal")),
        }
    }

    fn finish(mut self, last_line: &str) -> Result<Vec<Token>, LexError> {
        if let Some(pending) = self.pending {
            return Err(LexError::new(pending.start_line, "EOF in multi-line string"));
        }

        if self.paren_depth > 0 || self.continued {
            return Err(LexError::new(self.line_no, "EOF in multi-line statement"));
        }

        if !last_line.is_empty()
            && !last_line.ends_with('\n')
            && !last_line.trim().starts_with('#')
        {
            self.push(TokenKind::Newline, "");
        }

        for _ in 1..self.indents.len() {
            self.push(TokenKind::Dedent, "");
        }
        self.line_no += 1;
        self.push(TokenKind::EndMarker, "");

        Ok(self.tokens)
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>) {
        let line = self.line_no;
        self.push_at(kind, text, line);
    }

    fn push_at(&mut self, kind: TokenKind, text: impl Into<String>, line: usize) {
        self.tokens.push(Token::new(kind, text, line));
    }
}

/// Find where a string body ends.
///
/// A backslash always escapes the following character, so `\"` never closes
/// a string and a backslash-newline continues a single-quoted one.
fn scan_string(chars: &[char], mut pos: usize, quote: char, triple: bool) -> Scan {
    while pos < chars.len() {
        let c = chars[pos];

        if c == '\\' {
            pos += 2;
            continue;
        }

        if triple {
            if c == quote && chars.get(pos + 1) == Some(&quote) && chars.get(pos + 2) == Some(&quote)
            {
                return Scan::Closed(pos + 3);
            }
        } else if c == quote {
            return Scan::Closed(pos + 1);
        } else if c == '\n' {
            return Scan::Unterminated;
        }

        pos += 1;
    }

    Scan::Open
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

/// Index of the line terminator, or the line length if there is none.
fn line_content_end(chars: &[char]) -> usize {
    match chars.last() {
        Some('\n') => chars.len() - 1,
        _ => chars.len(),
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn identifier_end(chars: &[char], mut pos: usize) -> usize {
    while pos < chars.len() && (chars[pos] == '_' || chars[pos].is_alphanumeric()) {
        pos += 1;
    }
    pos
}

fn is_string_prefix(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    STRING_PREFIXES.contains(&lower.as_str())
}

fn number_end(chars: &[char], start: usize) -> usize {
    let is_hex = chars.get(start) == Some(&'0') && matches!(chars.get(start + 1), Some('x' | 'X'));
    let mut pos = start;

    while pos < chars.len() {
        let c = chars[pos];
        let exponent_sign = !is_hex
            && (c == '+' || c == '-')
            && pos > start
            && matches!(chars[pos - 1], 'e' | 'E');

        if c.is_alphanumeric() || c == '_' || c == '.' || exponent_sign {
            pos += 1;
        } else {
            break;
        }
    }

    pos
}

fn operator_at(chars: &[char], pos: usize) -> Option<&'static str> {
    let matches_at = |op: &str| {
        op.chars()
            .enumerate()
            .all(|(i, c)| chars.get(pos + i) == Some(&c))
    };

    if let Some(op) = OPERATORS_3.iter().find(|op| matches_at(op)) {
        return Some(*op);
    }
    if let Some(op) = OPERATORS_2.iter().find(|op| matches_at(op)) {
        return Some(*op);
    }

    let c = chars[pos];
    OPERATORS_1
        .char_indices()
        .find(|&(_, op)| op == c)
        .map(|(i, _)| &OPERATORS_1[i..i + 1])
}

/// Tokenize Python source.
///
/// # Example
///
/// ```rust
/// use constchecklib::{tokenize, TokenKind};
///
/// let tokens = tokenize("x = 'abc'\n").unwrap();
/// assert_eq!(tokens[2].kind, TokenKind::String);
/// assert_eq!(tokens[2].text, "'abc'");
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Tokenizer::new().run(source)
}
