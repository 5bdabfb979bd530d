//! Source text representation and error management.

use std::{cell::RefCell, error, fmt};

/// Represents a pointer-path expression as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source<'a> {
    /// Original expression text.
    pub content: &'a str,
    /// Treat every unprefixed digit run as hexadecimal.
    pub hex_mode: bool,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`. Hex mode is off.
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            hex_mode: false,
        }
    }

    pub fn with_hex_mode(self, hex_mode: bool) -> Self {
        Self { hex_mode, ..self }
    }

    /// Renders the expression followed by a line with a caret under the character at `position`.
    /// Positions past the end point just after the last character.
    pub fn excerpt(&self, position: usize) -> String {
        let column = position.min(self.content.chars().count());
        format!("{}\n{}^", self.content, " ".repeat(column))
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

/// Raised when the tokenizer meets a character it cannot start a token with,
/// or a `0x` prefix with no hex digits after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeError {
    message: String,
    character: char,
    position: usize,
}

impl TokenizeError {
    pub fn unrecognized_character(character: char, position: usize) -> Self {
        Self {
            message: format!("unrecognized character '{}'", character),
            character,
            position,
        }
    }

    /// `character` is the first character of the malformed literal.
    pub fn invalid_hex_number(character: char, position: usize) -> Self {
        Self {
            message: "invalid hex number".to_string(),
            character,
            position,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The offending character.
    pub fn character(&self) -> char {
        self.character
    }

    /// 0-based character offset into the expression.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.position)
    }
}

impl error::Error for TokenizeError {}

/// Represents a grammar violation found while parsing a token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
    position: Option<usize>,
}

impl ParseError {
    /// Create a new parse error with the specified `message`, located at `position`.
    pub fn new(message: impl ToString, position: usize) -> Self {
        Self {
            message: message.to_string(),
            position: Some(position),
        }
    }

    /// Create a parse error that has no meaningful position (e.g. an empty expression).
    pub fn without_position(message: impl ToString) -> Self {
        Self {
            message: message.to_string(),
            position: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// The position as a signed integer, `-1` when there is none.
    pub fn position_or_sentinel(&self) -> i64 {
        self.position.map_or(-1, |position| position as i64)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "{} at position {}", self.message, position),
            None => write!(f, "{}", self.message),
        }
    }
}

impl error::Error for ParseError {}

/// Any error produced while turning expression text into an AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Tokenize(TokenizeError),
    Parse(ParseError),
}

impl Error {
    pub fn message(&self) -> &str {
        match self {
            Error::Tokenize(err) => err.message(),
            Error::Parse(err) => err.message(),
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Tokenize(err) => Some(err.position()),
            Error::Parse(err) => err.position(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Tokenize(err) => fmt::Display::fmt(err, f),
            Error::Parse(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Tokenize(err) => Some(err),
            Error::Parse(err) => Some(err),
        }
    }
}

impl From<TokenizeError> for Error {
    fn from(err: TokenizeError) -> Self {
        Error::Tokenize(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

/// An error tied to the (1-based) line of a batch it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub error: Error,
}

/// Manages all the errors of a batch validation run.
pub struct ErrorReporter {
    errors: RefCell<Vec<Diagnostic>>,
}

impl ErrorReporter {
    /// Create an empty `ErrorReporter`.
    pub fn new() -> Self {
        Self {
            errors: RefCell::new(Vec::new()),
        }
    }

    /// Adds an error to the `ErrorReporter`.
    /// This method uses the interior mutability pattern. This does not require mutability for ergonomics.
    pub fn add_error(&self, line: usize, error: impl Into<Error>) {
        // This should be the only place where self.errors is borrowed mutably.
        self.errors.borrow_mut().push(Diagnostic {
            line,
            error: error.into(),
        });
    }

    /// Returns `true` if no errors were reported. Returns `false` otherwise.
    pub fn has_no_errors(&self) -> bool {
        self.errors.borrow().is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.borrow().len()
    }

    /// Returns a copy of the accumulated diagnostics, in the order they were added.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.errors.borrow().clone()
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors.borrow();
        for diagnostic in errors.iter() {
            match diagnostic.error.position() {
                Some(position) => writeln!(
                    f,
                    "ERROR: line {line}: {message} at position {position}",
                    line = diagnostic.line,
                    message = diagnostic.error.message(),
                    position = position
                )?,
                None => writeln!(
                    f,
                    "ERROR: line {line}: {message}",
                    line = diagnostic.line,
                    message = diagnostic.error.message()
                )?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt() {
        let source = Source::new("*bogus");
        assert_eq!(source.excerpt(1), "*bogus\n ^");
        assert_eq!(source.excerpt(100), "*bogus\n      ^");
    }

    #[test]
    fn test_parse_error_sentinel() {
        assert_eq!(ParseError::without_position("empty expression").position_or_sentinel(), -1);
        assert_eq!(ParseError::new("boom", 3).position_or_sentinel(), 3);
        assert_eq!(ParseError::new("boom", 3).to_string(), "boom at position 3");
        assert_eq!(ParseError::without_position("boom").to_string(), "boom");
    }

    #[test]
    fn test_tokenize_error_display() {
        let err = TokenizeError::invalid_hex_number('0', 4);
        assert_eq!(err.to_string(), "invalid hex number at position 4");
        let err = TokenizeError::unrecognized_character('=', 2);
        assert_eq!(err.to_string(), "unrecognized character '=' at position 2");
        assert_eq!(err.character(), '=');
    }

    #[test]
    fn test_error_reporter() {
        let reporter = ErrorReporter::new();
        assert!(reporter.has_no_errors());
        reporter.add_error(1, ParseError::without_position("empty expression"));
        reporter.add_error(3, TokenizeError::unrecognized_character('#', 0));
        assert_eq!(reporter.error_count(), 2);
        assert_eq!(
            reporter.to_string(),
            "ERROR: line 1: empty expression\nERROR: line 3: unrecognized character '#' at position 0\n"
        );
    }
}
