//! Tokenizer for pointer-path expressions.

use std::fmt;

use log::debug;
use logos::{Lexer, Logos};
use ptrpath_source::TokenizeError;

use crate::ast::DataType;

/// Options shared with the logos callbacks through the lexer extras.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenizeOptions {
    /// Interpret every unprefixed number (and any word starting with `a-f`) as hexadecimal.
    pub hex_mode: bool,
}

#[derive(Debug, Logos, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(extras = TokenizeOptions)]
pub enum TokenKind {
    // literals
    #[regex("0[xX][0-9a-fA-F]*")]
    #[regex("[0-9]+", extend_hex_digits)]
    Number,

    // identifiers
    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*")]
    Identifier,
    /// Only generated by [`tokenize`] for identifiers spelling a data type code (e.g. `u32`).
    DataType,
    /// Only generated by [`tokenize`] for a lone `_`.
    Underscore,

    // punctuation
    #[token("$")]
    Dollar,
    #[token(":")]
    Colon,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("?")]
    Question,
    #[token("@")]
    At,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,

    // comparison operators
    #[token("==")]
    Eq,
    #[token("!=")]
    Ne,
    #[token(">")]
    Gt,
    #[token("<")]
    Lt,
    #[token(">=")]
    Ge,
    #[token("<=")]
    Le,

    // bitwise operators
    #[token("&")]
    And,
    #[token("|")]
    Or,
    #[token("^")]
    Xor,

    // logical operators
    #[token("&&")]
    LAnd,
    #[token("||")]
    LOr,
    #[token("!")]
    Not,

    // misc
    #[regex(r"\s+", logos::skip)]
    #[error]
    Error,

    /// Only generated by [`tokenize`] after the input is exhausted.
    Eof,
}

/// In hex mode a number that starts with a decimal digit keeps going through hex letters.
fn extend_hex_digits(lex: &mut Lexer<TokenKind>) -> bool {
    if lex.extras.hex_mode {
        let len = lex
            .remainder()
            .bytes()
            .take_while(|b| b.is_ascii_hexdigit())
            .count();
        lex.bump(len);
    }
    true
}

impl TokenKind {
    /// Upper case name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Number => "NUMBER",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::DataType => "DATA_TYPE",
            TokenKind::Underscore => "UNDERSCORE",
            TokenKind::Dollar => "DOLLAR",
            TokenKind::Colon => "COLON",
            TokenKind::Star => "STAR",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Question => "QUESTION",
            TokenKind::At => "AT",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Comma => "COMMA",
            TokenKind::Eq => "EQ",
            TokenKind::Ne => "NE",
            TokenKind::Gt => "GT",
            TokenKind::Lt => "LT",
            TokenKind::Ge => "GE",
            TokenKind::Le => "LE",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Xor => "XOR",
            TokenKind::LAnd => "LAND",
            TokenKind::LOr => "LOR",
            TokenKind::Not => "NOT",
            TokenKind::Error => "ERROR",
            TokenKind::Eof => "EOF",
        }
    }

    /// Returns `true` for `==`, `!=`, `>`, `<`, `>=` and `<=`.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::Ne
                | TokenKind::Gt
                | TokenKind::Lt
                | TokenKind::Ge
                | TokenKind::Le
        )
    }

    /// Returns `true` for `&`, `|` and `^`.
    pub fn is_bitwise(&self) -> bool {
        matches!(self, TokenKind::And | TokenKind::Or | TokenKind::Xor)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A token together with the text it matched and its character offset in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }
}

/// Tokenizes `input`. The returned sequence always ends with a single [`TokenKind::Eof`]
/// whose position is the character length of `input`.
pub fn tokenize(input: &str, hex_mode: bool) -> Result<Vec<Token>, TokenizeError> {
    tokenize_with_options(input, TokenizeOptions { hex_mode })
}

pub fn tokenize_with_options(
    input: &str,
    options: TokenizeOptions,
) -> Result<Vec<Token>, TokenizeError> {
    let mut lexer = TokenKind::lexer(input);
    lexer.extras = options;
    let mut offsets = CharOffsets::new(input);
    let mut tokens = Vec::new();

    while let Some(kind) = lexer.next() {
        let span = lexer.span();
        let position = offsets.at(span.start);
        let slice = lexer.slice();

        match kind {
            TokenKind::Error => {
                let character = input[span.start..].chars().next().unwrap_or_default();
                return Err(TokenizeError::unrecognized_character(character, position));
            }
            TokenKind::Number => tokens.push(number_token(slice, position, options)?),
            TokenKind::Identifier => push_word(&mut tokens, slice, position, options),
            kind => tokens.push(Token::new(kind, slice, position)),
        }
    }

    tokens.push(Token::new(TokenKind::Eof, "", offsets.at(input.len())));
    debug!(
        "tokenized {} character(s) into {} token(s) (hex mode: {})",
        offsets.at(input.len()),
        tokens.len(),
        options.hex_mode
    );
    Ok(tokens)
}

fn number_token(
    slice: &str,
    position: usize,
    options: TokenizeOptions,
) -> Result<Token, TokenizeError> {
    if slice.starts_with("0x") || slice.starts_with("0X") {
        if slice.len() == 2 {
            return Err(TokenizeError::invalid_hex_number('0', position));
        }
        Ok(Token::new(TokenKind::Number, slice, position))
    } else if options.hex_mode {
        Ok(Token::new(
            TokenKind::Number,
            format!("0x{}", slice),
            position,
        ))
    } else {
        Ok(Token::new(TokenKind::Number, slice, position))
    }
}

/// Pushes the token(s) for an identifier-shaped word.
/// In hex mode a word starting with `a-f` is split into a hex number and, if anything is left, a word.
fn push_word(tokens: &mut Vec<Token>, slice: &str, position: usize, options: TokenizeOptions) {
    let starts_with_hex_letter = slice
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_hexdigit());
    if !(options.hex_mode && starts_with_hex_letter) {
        tokens.push(classify_word(slice, position));
        return;
    }

    // the hex prefix is ASCII, so its byte length is its character length
    let split = slice
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or_else(|| slice.len());
    tokens.push(Token::new(
        TokenKind::Number,
        format!("0x{}", &slice[..split]),
        position,
    ));
    if split < slice.len() {
        tokens.push(classify_word(&slice[split..], position + split));
    }
}

fn classify_word(word: &str, position: usize) -> Token {
    let kind = if word == "_" {
        TokenKind::Underscore
    } else if DataType::from_code(word).is_some() {
        TokenKind::DataType
    } else {
        TokenKind::Identifier
    };
    Token::new(kind, word, position)
}

/// Converts increasing byte offsets into character offsets in a single pass over the input.
struct CharOffsets<'a> {
    input: &'a str,
    byte: usize,
    char: usize,
}

impl<'a> CharOffsets<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            byte: 0,
            char: 0,
        }
    }

    fn at(&mut self, byte: usize) -> usize {
        if byte > self.byte {
            self.char += self.input[self.byte..byte].chars().count();
            self.byte = byte;
        }
        self.char
    }
}

/// Parses the text of a NUMBER token.
///
/// Text with a `0x`/`0X` prefix is hexadecimal. Unprefixed text is also hexadecimal if it contains
/// any of `a-f`/`A-F`, otherwise it is a signed decimal. Hexadecimal values are read as `u64` and
/// reinterpreted as `i64`. Returns `None` for malformed or overflowing text.
pub fn parse_number(text: &str) -> Option<i64> {
    if let Some(digits) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        parse_hex(digits)
    } else if text.chars().any(|c| matches!(c, 'a'..='f' | 'A'..='F')) {
        // NOTE: ambiguous with decimal, kept for expressions saved without a prefix
        parse_hex(text)
    } else {
        text.parse::<i64>().ok()
    }
}

fn parse_hex(digits: &str) -> Option<i64> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(digits, 16).ok().map(|value| value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(source: &str, hex_mode: bool) -> Vec<TokenKind> {
        tokenize(source, hex_mode)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn texts(source: &str, hex_mode: bool) -> Vec<String> {
        tokenize(source, hex_mode)
            .unwrap()
            .into_iter()
            .map(|token| token.text)
            .collect()
    }

    #[test]
    fn test_chain() {
        use TokenKind::*;
        assert_eq!(
            kinds("base: 0x10 + *u64", false),
            vec![Identifier, Colon, Number, Plus, Star, DataType, Eof]
        );
        assert_eq!(
            texts("base: 0x10 + *u64", false),
            vec!["base", ":", "0x10", "+", "*", "u64", ""]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("  $a  + 8", false).unwrap();
        let positions: Vec<_> = tokens.iter().map(|token| token.position).collect();
        assert_eq!(positions, vec![2, 3, 6, 8, 9]);
    }

    #[test]
    fn test_unicode_whitespace_positions() {
        // U+3000 is three bytes but one character
        let tokens = tokenize("8\u{3000}*u8", false).unwrap();
        let positions: Vec<_> = tokens.iter().map(|token| token.position).collect();
        assert_eq!(positions, vec![0, 2, 3, 5]);
    }

    #[test]
    fn test_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("== != >= <= && || > < & | ^ !", false),
            vec![Eq, Ne, Ge, Le, LAnd, LOr, Gt, Lt, And, Or, Xor, Not, Eof]
        );
        assert_eq!(
            kinds("@[_,$i]()?", false),
            vec![At, LBracket, Underscore, Comma, Dollar, Identifier, RBracket, LParen, RParen, Question, Eof]
        );
        assert_eq!(kinds("!!=", false), vec![Not, Ne, Eof]);
        // a lone `=` is not an operator
        assert_eq!(tokenize("!==", false).unwrap_err().position(), 2);
    }

    #[test]
    fn test_words() {
        use TokenKind::*;
        assert_eq!(
            kinds("u8 u16 u32 u64 i8 i16 i32 i64 u128 _ _x x_1", false),
            vec![
                DataType, DataType, DataType, DataType, DataType, DataType, DataType, DataType,
                Identifier, Underscore, Identifier, Identifier, Eof
            ]
        );
    }

    #[test]
    fn test_unicode_identifiers() {
        use TokenKind::*;
        assert_eq!(kinds("$größe", false), vec![Dollar, Identifier, Eof]);
        assert_eq!(texts("größe: 8 $größe", false), vec!["größe", ":", "8", "$", "größe", ""]);

        let tokens = tokenize("größe: 8 $größe", false).unwrap();
        let positions: Vec<_> = tokens.iter().map(|token| token.position).collect();
        assert_eq!(positions, vec![0, 5, 7, 9, 10, 15]);

        // hex-mode splitting only looks at ASCII hex letters
        assert_eq!(texts("äb", true), vec!["äb", ""]);
        assert_eq!(texts("aß", true), vec!["0xa", "ß", ""]);
    }

    #[test]
    fn test_decimal_stops_at_letters() {
        use TokenKind::*;
        assert_eq!(kinds("1ab", false), vec![Number, Identifier, Eof]);
        assert_eq!(texts("1ab", false), vec!["1", "ab", ""]);
    }

    #[test]
    fn test_hex_mode() {
        assert_eq!(texts("10", true), vec!["0x10", ""]);
        assert_eq!(texts("1abz", true), vec!["0x1ab", "z", ""]);
        assert_eq!(texts("add", true), vec!["0xadd", ""]);
        assert_eq!(texts("0x10", true), vec!["0x10", ""]);

        use TokenKind::*;
        assert_eq!(kinds("abu8", true), vec![Number, DataType, Eof]);
        assert_eq!(kinds("fa_", true), vec![Number, Underscore, Eof]);
        assert_eq!(kinds("*u32 $x", true), vec![Star, DataType, Dollar, Identifier, Eof]);

        let tokens = tokenize("a0x5", true).unwrap();
        assert_eq!(tokens[1], Token::new(Identifier, "x5", 2));
    }

    #[test]
    fn test_hex_mode_matches_prefix() {
        let hex_mode = tokenize("10", true).unwrap();
        let prefixed = tokenize("0x10", false).unwrap();
        assert_eq!(parse_number(&hex_mode[0].text), Some(16));
        assert_eq!(parse_number(&hex_mode[0].text), parse_number(&prefixed[0].text));
    }

    #[test]
    fn test_invalid_hex_number() {
        let err = tokenize("8 + 0x", false).unwrap_err();
        assert_eq!(err.position(), 4);
        assert_eq!(err.to_string(), "invalid hex number at position 4");
        assert!(tokenize("0xg", false).is_err());
        assert!(tokenize("0X", true).is_err());
    }

    #[test]
    fn test_unrecognized_character() {
        let err = tokenize("8 = 9", false).unwrap_err();
        assert_eq!(err.character(), '=');
        assert_eq!(err.position(), 2);

        let err = tokenize("€", false).unwrap_err();
        assert_eq!(err.character(), '€');
        assert_eq!(err.position(), 0);

        let err = tokenize("$a # b", false).unwrap_err();
        assert_eq!(err.character(), '#');
        assert_eq!(err.position(), 3);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize("", false).unwrap(), vec![Token::new(TokenKind::Eof, "", 0)]);
        assert_eq!(tokenize(" \t\n", false).unwrap(), vec![Token::new(TokenKind::Eof, "", 3)]);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number("0x2A"), Some(42));
        assert_eq!(parse_number("0X2a"), Some(42));
        assert_eq!(parse_number("2a"), Some(42));
        assert_eq!(parse_number("0xffffffffffffffff"), Some(-1));
        assert_eq!(parse_number("0x8000000000000000"), Some(i64::MIN));
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("0x+5"), None);
        assert_eq!(parse_number("0x10000000000000000"), None);
        assert_eq!(parse_number("99999999999999999999"), None);
        assert_eq!(parse_number("1g"), None);
    }

    proptest! {
        #[test]
        fn tokenize_is_deterministic(source in "[ -~]{0,40}", hex_mode in any::<bool>()) {
            prop_assert_eq!(tokenize(&source, hex_mode), tokenize(&source, hex_mode));
        }

        #[test]
        fn tokenize_ends_with_eof(source in "\\PC{0,40}", hex_mode in any::<bool>()) {
            if let Ok(tokens) = tokenize(&source, hex_mode) {
                let last = tokens.last().unwrap();
                prop_assert_eq!(last.kind, TokenKind::Eof);
                prop_assert_eq!(last.position, source.chars().count());
                prop_assert_eq!(tokens.iter().filter(|token| token.kind == TokenKind::Eof).count(), 1);
            }
        }

        #[test]
        fn parse_number_hex_round_trip(value in any::<u64>()) {
            let text = format!("0x{:X}", value);
            prop_assert_eq!(parse_number(&text), Some(value as i64));
        }

        #[test]
        fn parse_number_decimal_round_trip(value in 0..i64::MAX) {
            prop_assert_eq!(parse_number(&value.to_string()), Some(value));
        }
    }
}
