//! Tokenizer and parser for pointer-path expressions such as `base: 0x10 *u64 +8 *u32`.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod visitor;

use ast::ExprNode;
use lexer::Token;
use parser::{Parser, ParserConfig};

pub use lexer::tokenize;
pub use ptrpath_source::{ParseError, TokenizeError};

/// Parses a token sequence (as produced by [`tokenize`]) into a non-empty list of top-level nodes.
pub fn parse(tokens: &[Token]) -> Result<Vec<ExprNode>, ParseError> {
    Parser::new(tokens).parse_program()
}

pub fn parse_with_config(
    tokens: &[Token],
    config: ParserConfig,
) -> Result<Vec<ExprNode>, ParseError> {
    Parser::with_config(tokens, config).parse_program()
}
