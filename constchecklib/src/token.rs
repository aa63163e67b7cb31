//! Token model and the predicates the literal reconstructor relies on.
//!
//! A [`Token`] is produced by the [`tokenizer`](crate::tokenizer) and never
//! mutated afterwards. Classification lives in two places:
//!
//! - [`TokenKind`] answers "what kind of token is this" (string, name,
//!   indent, one of the punctuation marks we care about).
//! - [`TokenText`] is a borrowed view of the token's source text with the
//!   quote-related predicates (`is_quoted`, `dequote`, `is_docstring`, ...).

use serde::Serialize;

const SINGLE_QUOTE: &str = "'";
const DOUBLE_QUOTE: &str = "\"";
const QUOTES: [&str; 2] = [SINGLE_QUOTE, DOUBLE_QUOTE];
const TRIPLE_QUOTES: [&str; 2] = ["'''", "\"\"\""];

/// Punctuation the reconstructor distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExactOp {
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Plus,
    Equal,
    Comma,
    /// Any other operator (`==`, `+=`, `.`, `:`, `->`, ...)
    Other,
}

impl ExactOp {
    /// Classify operator text.
    pub fn from_text(text: &str) -> Self {
        match text {
            "(" => ExactOp::LeftParen,
            ")" => ExactOp::RightParen,
            "[" => ExactOp::LeftBracket,
            "]" => ExactOp::RightBracket,
            "{" => ExactOp::LeftBrace,
            "}" => ExactOp::RightBrace,
            "+" => ExactOp::Plus,
            "=" => ExactOp::Equal,
            "," => ExactOp::Comma,
            _ => ExactOp::Other,
        }
    }
}

/// Lexical token type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TokenKind {
    /// Increase in indentation at the start of a logical line
    Indent,
    /// Decrease in indentation
    Dedent,
    /// End of a logical line
    Newline,
    /// Newline that does not end a logical line (blank line, inside brackets)
    Nl,
    Comment,
    /// Identifier or keyword
    Name,
    Number,
    /// String literal, including its prefix and quotes
    String,
    Operator(ExactOp),
    EndMarker,
    /// Anything else the tokenizer could not classify
    #[default]
    Other,
}

impl TokenKind {
    pub fn is_indent(self) -> bool {
        self == TokenKind::Indent
    }

    pub fn is_string(self) -> bool {
        self == TokenKind::String
    }

    pub fn is_name(self) -> bool {
        self == TokenKind::Name
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line the token starts on
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }

    /// Borrowed view of the token text.
    pub fn text(&self) -> TokenText<'_> {
        TokenText::new(&self.text)
    }

    pub fn is_string(&self) -> bool {
        self.kind.is_string()
    }

    pub fn is_name(&self) -> bool {
        self.kind.is_name()
    }

    pub fn is_indent(&self) -> bool {
        self.kind.is_indent()
    }

    fn is_op(&self, op: ExactOp) -> bool {
        self.kind == TokenKind::Operator(op)
    }

    pub fn is_left_paren(&self) -> bool {
        self.is_op(ExactOp::LeftParen)
    }

    pub fn is_right_paren(&self) -> bool {
        self.is_op(ExactOp::RightParen)
    }

    pub fn is_left_bracket(&self) -> bool {
        self.is_op(ExactOp::LeftBracket)
    }

    pub fn is_right_bracket(&self) -> bool {
        self.is_op(ExactOp::RightBracket)
    }

    pub fn is_left_brace(&self) -> bool {
        self.is_op(ExactOp::LeftBrace)
    }

    pub fn is_right_brace(&self) -> bool {
        self.is_op(ExactOp::RightBrace)
    }

    pub fn is_plus(&self) -> bool {
        self.is_op(ExactOp::Plus)
    }

    pub fn is_equal(&self) -> bool {
        self.is_op(ExactOp::Equal)
    }

    pub fn is_comma(&self) -> bool {
        self.is_op(ExactOp::Comma)
    }
}

/// Borrowed token text with quote-aware predicates.
///
/// Exact-punctuation checks are made on the text alone, so they hold for
/// the operator tokens they name and are false for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenText<'a>(&'a str);

impl<'a> TokenText<'a> {
    pub fn new(text: &'a str) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// The punctuation this text spells, if it is one we track.
    pub fn exact_op(&self) -> Option<ExactOp> {
        match ExactOp::from_text(self.0) {
            ExactOp::Other => None,
            op => Some(op),
        }
    }

    pub fn is_left_paren(&self) -> bool {
        self.exact_op() == Some(ExactOp::LeftParen)
    }

    pub fn is_right_paren(&self) -> bool {
        self.exact_op() == Some(ExactOp::RightParen)
    }

    pub fn is_left_bracket(&self) -> bool {
        self.exact_op() == Some(ExactOp::LeftBracket)
    }

    pub fn is_right_bracket(&self) -> bool {
        self.exact_op() == Some(ExactOp::RightBracket)
    }

    pub fn is_left_brace(&self) -> bool {
        self.exact_op() == Some(ExactOp::LeftBrace)
    }

    pub fn is_right_brace(&self) -> bool {
        self.exact_op() == Some(ExactOp::RightBrace)
    }

    pub fn is_plus(&self) -> bool {
        self.exact_op() == Some(ExactOp::Plus)
    }

    pub fn is_equal(&self) -> bool {
        self.exact_op() == Some(ExactOp::Equal)
    }

    pub fn is_comma(&self) -> bool {
        self.exact_op() == Some(ExactOp::Comma)
    }

    pub fn starts_with_quote(&self) -> bool {
        QUOTES.iter().any(|q| self.0.starts_with(q))
    }

    pub fn ends_with_quote(&self) -> bool {
        QUOTES.iter().any(|q| self.0.ends_with(q))
    }

    /// Starts and ends with `'` or `"`.
    pub fn is_quoted(&self) -> bool {
        self.starts_with_quote() && self.ends_with_quote()
    }

    pub fn starts_with_triple_quote(&self) -> bool {
        TRIPLE_QUOTES.iter().any(|q| self.0.starts_with(q))
    }

    pub fn ends_with_triple_quote(&self) -> bool {
        TRIPLE_QUOTES.iter().any(|q| self.0.ends_with(q))
    }

    /// Starts and ends with `'''` or `"""`.
    pub fn is_triple_quoted(&self) -> bool {
        self.starts_with_triple_quote() && self.ends_with_triple_quote()
    }

    /// Strip one layer of quotes, triple quotes first.
    ///
    /// Text that is not quoted (including prefixed literals such as `r"x"`)
    /// is returned unchanged.
    pub fn dequote(&self) -> &'a str {
        if self.is_triple_quoted() {
            return strip_layer(self.0, 3);
        }

        if self.is_quoted() {
            return strip_layer(self.0, 1);
        }

        self.0
    }

    /// The characters before the first quote, e.g. `rb` in `rb"..."`.
    pub fn prefix(&self) -> &'a str {
        let end = self.0.find(['\'', '"']).unwrap_or(0);
        &self.0[..end]
    }

    /// Whether the literal carries an `f`/`F` prefix.
    pub fn is_fstring_prefixed(&self) -> bool {
        self.prefix().contains(['f', 'F'])
    }

    /// Whether a string in this position is documentation rather than data.
    ///
    /// A triple-quoted string is a docstring when it follows an indent, or
    /// when it is not the right-hand side of an `=`.
    pub fn is_docstring(&self, prev_text: TokenText<'_>, prev_kind: TokenKind) -> bool {
        self.is_triple_quoted() && (prev_kind.is_indent() || !prev_text.is_equal())
    }
}

impl std::fmt::Display for TokenText<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

// quote markers are ASCII, so byte offsets are char boundaries
fn strip_layer(text: &str, width: usize) -> &str {
    if text.len() <= 2 * width {
        ""
    } else {
        &text[width..text.len() - width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> TokenText<'_> {
        TokenText::new(s)
    }

    #[test]
    fn dequote_all_quote_styles() {
        assert_eq!(text("abc").dequote(), "abc");
        assert_eq!(text("\"abc\"").dequote(), "abc");
        assert_eq!(text("'abc'").dequote(), "abc");
        assert_eq!(text("\"\"\"abc\"\"\"").dequote(), "abc");
        assert_eq!(text("'''abc'''").dequote(), "abc");
    }

    #[test]
    fn dequote_strips_one_layer_only() {
        assert_eq!(text("'\"'").dequote(), "\"");
        assert_eq!(text("'\"\"\"'").dequote(), "\"\"\"");
        assert_eq!(text("\"'\"").dequote(), "'");
    }

    #[test]
    fn dequote_empty_strings() {
        assert_eq!(text("''").dequote(), "");
        assert_eq!(text("\"\"\"\"\"\"").dequote(), "");
        assert_eq!(text("'").dequote(), "");
    }

    #[test]
    fn dequote_leaves_prefixed_literals() {
        assert_eq!(text("r\"abc\"").dequote(), "r\"abc\"");
        assert!(!text("b'abc'").is_quoted());
    }

    #[test]
    fn triple_quote_detection() {
        assert!(text("'''x'''").is_triple_quoted());
        assert!(text("\"\"\"x\"\"\"").is_triple_quoted());
        assert!(!text("'x'").is_triple_quoted());
        assert!(text("'x'").is_quoted());
    }

    #[test]
    fn fstring_prefixes() {
        assert!(text("f\"{x}\"").is_fstring_prefixed());
        assert!(text("F'{x}'").is_fstring_prefixed());
        assert!(text("rf'{x}'").is_fstring_prefixed());
        assert!(text("Fr\"\"\"{x}\"\"\"").is_fstring_prefixed());
        assert!(!text("'f'").is_fstring_prefixed());
        assert!(!text("b'x'").is_fstring_prefixed());
        assert_eq!(text("rb'x'").prefix(), "rb");
    }

    #[test]
    fn exact_punctuation() {
        assert!(text("(").is_left_paren());
        assert!(text(")").is_right_paren());
        assert!(text("[").is_left_bracket());
        assert!(text("]").is_right_bracket());
        assert!(text("{").is_left_brace());
        assert!(text("}").is_right_brace());
        assert!(text("+").is_plus());
        assert!(text("=").is_equal());
        assert!(text(",").is_comma());
        assert!(!text("==").is_equal());
        assert!(!text("+=").is_plus());
        assert!(!text("'('").is_left_paren());
        assert_eq!(text("print").exact_op(), None);
    }

    #[test]
    fn docstring_heuristic() {
        let doc = text("\"\"\"docs\"\"\"");

        assert!(doc.is_docstring(text(""), TokenKind::Other));
        assert!(doc.is_docstring(text("    "), TokenKind::Indent));
        assert!(doc.is_docstring(text("\n"), TokenKind::Newline));
        assert!(!doc.is_docstring(text("="), TokenKind::Operator(ExactOp::Equal)));
        assert!(!text("'x'").is_docstring(text(""), TokenKind::Indent));
    }

    #[test]
    fn token_predicates_follow_kind() {
        let lpar = Token::new(TokenKind::Operator(ExactOp::LeftParen), "(", 1);
        let name = Token::new(TokenKind::Name, "print", 1);
        let string = Token::new(TokenKind::String, "'('", 1);

        assert!(lpar.is_left_paren());
        assert!(!lpar.is_name());
        assert!(name.is_name());
        assert!(string.is_string());
        assert!(!string.is_left_paren());
    }
}
