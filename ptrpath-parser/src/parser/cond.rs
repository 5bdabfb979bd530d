use super::*;
use crate::ast::{BitwiseOp, CompareOp, Condition, LogicalOp, Operand};
use log::trace;

impl<'a> Parser<'a> {
    /* Conditionals */
    /// Parses `condition ? true-branch : false-branch`.
    pub(super) fn parse_conditional(&mut self) -> ParseResult<ExprNode> {
        let condition = self.parse_condition()?;
        self.expect(TokenKind::Question)?;

        let position = self.current().position;
        let true_branch = self.parse_restricted_list()?;
        if true_branch.is_empty() {
            return Err(ParseError::new("conditional true branch is empty", position));
        }
        self.expect(TokenKind::Colon)?;

        let position = self.current().position;
        let false_branch = self.parse_restricted_list()?;
        if false_branch.is_empty() {
            return Err(ParseError::new("conditional false branch is empty", position));
        }

        Ok(ExprNode::Conditional {
            condition,
            true_branch,
            false_branch,
        })
    }

    /* Conditions */
    /// Parses any condition. Precedence from loosest to tightest: `||`, `&&`, `!`, comparison.
    pub fn parse_condition(&mut self) -> ParseResult<Condition> {
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> ParseResult<Condition> {
        let mut lhs = self.parse_logical_and()?;
        while self.eat(TokenKind::LOr) {
            let rhs = self.parse_logical_and()?;
            lhs = Condition::Logical {
                lhs: Box::new(lhs),
                op: LogicalOp::Or,
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_logical_and(&mut self) -> ParseResult<Condition> {
        let mut lhs = self.parse_logical_not()?;
        while self.eat(TokenKind::LAnd) {
            let rhs = self.parse_logical_not()?;
            lhs = Condition::Logical {
                lhs: Box::new(lhs),
                op: LogicalOp::And,
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_logical_not(&mut self) -> ParseResult<Condition> {
        if self.eat(TokenKind::Not) {
            Ok(Condition::Not(Box::new(self.parse_logical_not()?)))
        } else {
            self.parse_comparison()
        }
    }

    /// Parses a parenthesized condition or `operand op operand`.
    fn parse_comparison(&mut self) -> ParseResult<Condition> {
        trace!("parse_comparison: next token = {:?}", self.current());

        if self.eat(TokenKind::LParen) {
            let condition = self.parse_condition()?;
            self.expect(TokenKind::RParen)?;
            return Ok(condition);
        }

        let lhs = self.parse_operand()?;
        let op = self.current().kind;
        if op.is_comparison() {
            self.next();
            let rhs = self.parse_operand()?;
            let op = match op {
                TokenKind::Eq => CompareOp::Eq,
                TokenKind::Ne => CompareOp::Ne,
                TokenKind::Gt => CompareOp::Gt,
                TokenKind::Lt => CompareOp::Lt,
                TokenKind::Ge => CompareOp::Ge,
                _ => CompareOp::Le,
            };
            Ok(Condition::Compare { lhs, op, rhs })
        } else if op.is_bitwise() {
            self.next();
            let rhs = self.parse_operand()?;
            let op = match op {
                TokenKind::And => BitwiseOp::And,
                TokenKind::Or => BitwiseOp::Or,
                _ => BitwiseOp::Xor,
            };
            Ok(Condition::Bitwise { lhs, op, rhs })
        } else {
            Err(self.unexpected("comparison or bitwise operator"))
        }
    }

    /* Operands */
    /// Parses `_`, `$name` or a number.
    pub(super) fn parse_operand(&mut self) -> ParseResult<Operand> {
        match self.current().kind {
            TokenKind::Underscore => {
                self.next();
                Ok(Operand::Current)
            }
            TokenKind::Dollar => {
                self.next();
                let ident = self.expect(TokenKind::Identifier)?;
                Ok(Operand::Variable(ident.text))
            }
            TokenKind::Number => Ok(Operand::Constant(self.parse_number()?)),
            _ => Err(self.unexpected("operand")),
        }
    }
}
