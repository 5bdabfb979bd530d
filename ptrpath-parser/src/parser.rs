use crate::ast::{ExprNode, CURRENT};
use crate::lexer::{parse_number, Token, TokenKind};
use log::{debug, trace};
use ptrpath_source::ParseError;

mod cond;
mod node;

/// Default number of tokens searched for the `?` of a conditional.
pub const DEFAULT_CONDITIONAL_LOOKAHEAD: usize = 50;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// How many tokens ahead of a node start to search for a `?` before deciding
    /// the position cannot start a conditional.
    pub conditional_lookahead: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            conditional_lookahead: DEFAULT_CONDITIONAL_LOOKAHEAD,
        }
    }
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    /// Index of the current token in `tokens`.
    cursor: usize,
    /// Returned when peeking past the end of `tokens`.
    eof: Token,
    config: ParserConfig,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self::with_config(tokens, ParserConfig::default())
    }

    pub fn with_config(tokens: &'a [Token], config: ParserConfig) -> Self {
        let end = tokens.last().map_or(0, end_of);
        Self {
            tokens,
            cursor: 0,
            eof: Token::new(TokenKind::Eof, "", end),
            config,
        }
    }
}

impl<'a> Parser<'a> {
    /// Parses every top-level node until EOF.
    pub fn parse_program(&mut self) -> ParseResult<Vec<ExprNode>> {
        if self.tokens.iter().all(|token| token.kind == TokenKind::Eof) && self.tokens.len() <= 1 {
            return Err(ParseError::without_position("empty expression"));
        }

        let mut nodes = Vec::new();
        while !self.at(TokenKind::Eof) {
            nodes.push(self.parse_node()?);
        }

        if nodes.is_empty() {
            return Err(ParseError::without_position("no valid nodes parsed"));
        }
        debug!("parsed {} top-level node(s)", nodes.len());
        Ok(nodes)
    }

    /// Parses a single top-level node.
    pub fn parse_node(&mut self) -> ParseResult<ExprNode> {
        trace!("parse_node: next token = {:?}", self.current());

        if self.starts_conditional(self.cursor) {
            return self.parse_conditional();
        }

        match self.current().kind {
            TokenKind::Identifier | TokenKind::Underscore if self.peek(1).kind == TokenKind::Colon => {
                self.parse_var_def()
            }
            _ if self.at_restricted_node() => self.parse_restricted_node(),
            _ if self.conditional_ahead(self.cursor) => self.parse_conditional(),
            _ => Err(self.unrecognized()),
        }
    }

    /// Parses a node allowed inside a variable definition body or a conditional branch:
    /// an offset, a dereference, a variable reference, `_` or a builtin.
    fn parse_restricted_node(&mut self) -> ParseResult<ExprNode> {
        trace!("parse_restricted_node: next token = {:?}", self.current());

        match self.current().kind {
            TokenKind::Plus if self.at_chain_joiner() => {
                self.next();
                self.parse_restricted_node()
            }
            TokenKind::Plus | TokenKind::Minus | TokenKind::Number => self.parse_offset(),
            TokenKind::Star => self.parse_deref(),
            TokenKind::Dollar => self.parse_var_ref(),
            TokenKind::Underscore => {
                self.next();
                Ok(ExprNode::VarRef(CURRENT.to_string()))
            }
            TokenKind::At => self.parse_builtin(),
            _ => Err(self.unrecognized()),
        }
    }

    /// Greedily parses restricted nodes until a token that cannot start one.
    /// Callers decide what an empty result means.
    fn parse_restricted_list(&mut self) -> ParseResult<Vec<ExprNode>> {
        let mut nodes = Vec::new();
        while self.at_restricted_node() {
            nodes.push(self.parse_restricted_node()?);
        }
        Ok(nodes)
    }

    /// Returns `true` if a restricted node can start at the current token.
    ///
    /// This is the single boundary rule for variable definition bodies and both conditional
    /// branches: `name:` never starts one (it is a new definition) and neither does the
    /// start of a conditional.
    fn at_restricted_node(&self) -> bool {
        match self.current().kind {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Number
            | TokenKind::Star
            | TokenKind::Dollar
            | TokenKind::Underscore
            | TokenKind::At => !self.starts_conditional(self.cursor),
            _ => false,
        }
    }

    /// A `+` followed by a non-offset node only joins steps (e.g. `0x10 + *u64`).
    fn at_chain_joiner(&self) -> bool {
        matches!(
            self.peek(1).kind,
            TokenKind::Star | TokenKind::Dollar | TokenKind::Underscore | TokenKind::At
        ) && !self.starts_conditional(self.cursor + 1)
    }

    /// Returns `true` if an operand followed by a comparison or bitwise operator starts at `index`
    /// and a `?` follows within the lookahead window.
    fn starts_conditional(&self, index: usize) -> bool {
        let operand_len = match self.kind_at(index) {
            TokenKind::Underscore | TokenKind::Number => 1,
            TokenKind::Dollar if self.kind_at(index + 1) == TokenKind::Identifier => 2,
            _ => return false,
        };
        let op = self.kind_at(index + operand_len);
        (op.is_comparison() || op.is_bitwise()) && self.conditional_ahead(index)
    }

    /// Scans forward from `index`, without consuming, for a `?` before EOF or `:`.
    /// Gives up after `conditional_lookahead` tokens.
    fn conditional_ahead(&self, index: usize) -> bool {
        self.tokens
            .iter()
            .skip(index)
            .take(self.config.conditional_lookahead)
            .map(|token| token.kind)
            .take_while(|kind| !matches!(kind, TokenKind::Eof | TokenKind::Colon))
            .any(|kind| kind == TokenKind::Question)
    }

    /// Parses a NUMBER token into its value.
    fn parse_number(&mut self) -> ParseResult<i64> {
        let token = self.expect(TokenKind::Number)?;
        parse_number(&token.text).ok_or_else(|| {
            ParseError::new(
                format!("invalid number literal '{}'", token.text),
                token.position,
            )
        })
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, n: usize) -> &Token {
        self.tokens.get(self.cursor + n).unwrap_or(&self.eof)
    }

    fn kind_at(&self, index: usize) -> TokenKind {
        self.tokens
            .get(index)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Consumes the current token and returns it.
    fn next(&mut self) -> Token {
        let token = self.current().clone();
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
        token
    }

    /// Predicate that tests whether the current token has the same kind and eats it if yes as a side effect.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.next(); // eat token
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.next())
        } else {
            Err(self.unexpected(kind.name()))
        }
    }

    /// Creates an error for a token that does not match what the grammar requires here.
    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        ParseError::new(
            format!("expected {}, found {}", expected, describe(token)),
            token.position,
        )
    }

    /// Creates an error for a token that cannot start a node.
    fn unrecognized(&self) -> ParseError {
        let token = self.current();
        ParseError::new(
            format!("unrecognized token {}", describe(token)),
            token.position,
        )
    }
}

fn describe(token: &Token) -> String {
    if token.text.is_empty() {
        token.kind.name().to_string()
    } else {
        format!("{} '{}'", token.kind, token.text)
    }
}

/// Character offset just past `token`.
/// A `0x` NUMBER may carry a hex-mode prefix that is not in the input, so only its digits count.
fn end_of(token: &Token) -> usize {
    let text = match token.kind {
        TokenKind::Number => token
            .text
            .strip_prefix("0x")
            .or_else(|| token.text.strip_prefix("0X"))
            .unwrap_or(&token.text),
        _ => token.text.as_str(),
    };
    token.position + text.chars().count()
}
