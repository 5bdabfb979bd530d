use super::*;
use crate::ast::{Builtin, DataType};

impl<'a> Parser<'a> {
    /* Nodes.Offset */
    /// Parses an offset: an optional sign followed by a number literal.
    pub(super) fn parse_offset(&mut self) -> ParseResult<ExprNode> {
        let negative = match self.current().kind {
            TokenKind::Minus => {
                self.next();
                true
            }
            TokenKind::Plus => {
                self.next();
                false
            }
            _ => false,
        };
        let value = self.parse_number()?;
        Ok(ExprNode::Offset(if negative {
            value.wrapping_neg()
        } else {
            value
        }))
    }

    /* Nodes.Deref */
    /// Parses one or more `*` followed by a data type code.
    pub(super) fn parse_deref(&mut self) -> ParseResult<ExprNode> {
        let mut depth = 0;
        while self.eat(TokenKind::Star) {
            depth += 1;
        }
        if depth == 0 {
            return Err(self.unexpected(TokenKind::Star.name()));
        }

        match self.current().kind {
            TokenKind::DataType | TokenKind::Identifier => {
                let token = self.next();
                let data_type = DataType::from_code(&token.text).ok_or_else(|| {
                    ParseError::new(
                        format!("unknown data type '{}'", token.text),
                        token.position,
                    )
                })?;
                Ok(ExprNode::Deref { data_type, depth })
            }
            _ => Err(self.unexpected(TokenKind::DataType.name())),
        }
    }

    /* Nodes.Variables */
    /// Parses `name: body` or `_: body`.
    pub(super) fn parse_var_def(&mut self) -> ParseResult<ExprNode> {
        let name = match self.current().kind {
            TokenKind::Identifier | TokenKind::Underscore => self.next().text,
            _ => return Err(self.unexpected(TokenKind::Identifier.name())),
        };
        self.expect(TokenKind::Colon)?;

        let body_position = self.current().position;
        let body = self.parse_restricted_list()?;
        if body.is_empty() {
            return Err(ParseError::new(
                format!("variable definition '{}' has an empty body", name),
                body_position,
            ));
        }

        Ok(ExprNode::VarDef { name, body })
    }

    /// Parses `$name`.
    pub(super) fn parse_var_ref(&mut self) -> ParseResult<ExprNode> {
        self.expect(TokenKind::Dollar)?;
        let ident = self.expect(TokenKind::Identifier)?;
        Ok(ExprNode::VarRef(ident.text))
    }

    /* Nodes.Builtin */
    /// Parses `@skip`, `@null`, `@stop` or an array access.
    pub(super) fn parse_builtin(&mut self) -> ParseResult<ExprNode> {
        self.expect(TokenKind::At)?;
        if self.at(TokenKind::LBracket) {
            return self.parse_array_access();
        }

        let keyword = self.expect(TokenKind::Identifier)?;
        let builtin = match keyword.text.as_str() {
            "skip" => Builtin::Skip,
            "null" => Builtin::Null,
            "stop" => Builtin::Stop,
            _ => {
                return Err(ParseError::new(
                    format!("unknown builtin '@{}'", keyword.text),
                    keyword.position,
                ))
            }
        };
        Ok(ExprNode::Builtin(builtin))
    }

    /// Parses `[operand]` or `[operand, size]`. The `@` has already been eaten.
    fn parse_array_access(&mut self) -> ParseResult<ExprNode> {
        self.expect(TokenKind::LBracket)?;
        let index = self.parse_operand()?;
        let element_size = if self.eat(TokenKind::Comma) {
            Some(self.parse_number()?)
        } else {
            None
        };
        self.expect(TokenKind::RBracket)?;

        Ok(ExprNode::Builtin(Builtin::ArrayAccess {
            index,
            element_size,
        }))
    }
}
