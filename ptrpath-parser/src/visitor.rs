//! Visitor pattern for AST nodes.

use crate::ast::{Builtin, Condition, ExprNode, Operand};

pub trait Visitor<'ast>: Sized {
    fn visit_node(&mut self, node: &'ast ExprNode) {
        walk_node(self, node);
    }
    fn visit_condition(&mut self, condition: &'ast Condition) {
        walk_condition(self, condition);
    }
    fn visit_operand(&mut self, _operand: &'ast Operand) {}
}

/// Iteratively visit all nodes in a `[ExprNode]`.
macro_rules! visit_node_list {
    ($visitor: expr, $body: expr) => {
        for node in $body {
            Visitor::visit_node($visitor, node);
        }
    };
}

/// Visits every top-level node in order.
pub fn walk_program<'ast>(visitor: &mut impl Visitor<'ast>, nodes: &'ast [ExprNode]) {
    visit_node_list!(visitor, nodes);
}

pub fn walk_node<'ast>(visitor: &mut impl Visitor<'ast>, node: &'ast ExprNode) {
    match node {
        ExprNode::Offset(_) => {}
        ExprNode::Deref { .. } => {}
        ExprNode::VarDef { name: _, body } => visit_node_list!(visitor, body),
        ExprNode::VarRef(_) => {}
        ExprNode::Builtin(Builtin::ArrayAccess { index, .. }) => visitor.visit_operand(index),
        ExprNode::Builtin(_) => {}
        ExprNode::Conditional {
            condition,
            true_branch,
            false_branch,
        } => {
            visitor.visit_condition(condition);
            visit_node_list!(visitor, true_branch);
            visit_node_list!(visitor, false_branch);
        }
    }
}

pub fn walk_condition<'ast>(visitor: &mut impl Visitor<'ast>, condition: &'ast Condition) {
    match condition {
        Condition::Logical { lhs, op: _, rhs } => {
            visitor.visit_condition(lhs);
            visitor.visit_condition(rhs);
        }
        Condition::Not(inner) => visitor.visit_condition(inner),
        Condition::Compare { lhs, op: _, rhs } | Condition::Bitwise { lhs, op: _, rhs } => {
            visitor.visit_operand(lhs);
            visitor.visit_operand(rhs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::Parser;

    /// Collects every operand in visiting order.
    #[derive(Default)]
    struct OperandCollector<'ast> {
        operands: Vec<&'ast Operand>,
        nodes: usize,
    }

    impl<'ast> Visitor<'ast> for OperandCollector<'ast> {
        fn visit_node(&mut self, node: &'ast ExprNode) {
            self.nodes += 1;
            walk_node(self, node);
        }

        fn visit_operand(&mut self, operand: &'ast Operand) {
            self.operands.push(operand);
        }
    }

    #[test]
    fn test_walk_program() {
        let tokens = tokenize("a: @[$i] 4 !($x == 1 || _ & 2) ? @[3, 8] : -4", false).unwrap();
        let nodes = Parser::new(&tokens).parse_program().unwrap();

        let mut collector = OperandCollector::default();
        walk_program(&mut collector, &nodes);

        // VarDef, ArrayAccess, Offset, Conditional, ArrayAccess, Offset
        assert_eq!(collector.nodes, 6);
        assert_eq!(
            collector.operands,
            vec![
                &Operand::Variable("i".to_string()),
                &Operand::Variable("x".to_string()),
                &Operand::Constant(1),
                &Operand::Current,
                &Operand::Constant(2),
                &Operand::Constant(3),
            ]
        );
    }
}
