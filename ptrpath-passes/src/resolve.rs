//! Variable resolution pass.

use std::collections::HashSet;
use std::fmt;

use log::debug;
use ptrpath_parser::ast::{ExprNode, Operand, CURRENT};
use ptrpath_parser::visitor::{walk_node, Visitor};

/// A `$name` reference that is neither bound by an earlier definition nor predefined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedVariable {
    pub name: String,
    /// Index of the top-level node the reference appears in.
    pub node_index: usize,
}

impl fmt::Display for UnresolvedVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot resolve variable '${}' in node {}",
            self.name, self.node_index
        )
    }
}

/// Variable resolution pass.
#[derive(Debug, Default)]
pub struct Resolver {
    /// Names that can be referenced at the current point of the walk.
    bound: HashSet<String>,
    /// Index of the top-level node being walked.
    current_node: usize,
    unresolved: Vec<UnresolvedVariable>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `Resolver` where `names` are already bound (e.g. variables supplied by the evaluator).
    pub fn with_predefined<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bound: names.into_iter().map(Into::into).collect(),
            ..Self::new()
        }
    }

    /// Walks `nodes` in order. A definition binds its name once its body has been walked.
    pub fn resolve_program(&mut self, nodes: &[ExprNode]) {
        for (index, node) in nodes.iter().enumerate() {
            self.current_node = index;
            self.visit_node(node);
        }
        debug!(
            "resolved {} node(s), {} unresolved reference(s)",
            nodes.len(),
            self.unresolved.len()
        );
    }

    /// Returns the unresolved references found so far, in source order.
    pub fn unresolved(&self) -> &[UnresolvedVariable] {
        &self.unresolved
    }

    pub fn into_unresolved(self) -> Vec<UnresolvedVariable> {
        self.unresolved
    }

    pub fn is_bound(&self, name: &str) -> bool {
        name == CURRENT || self.bound.contains(name)
    }

    fn resolve_name(&mut self, name: &str) {
        if !self.is_bound(name) {
            self.unresolved.push(UnresolvedVariable {
                name: name.to_string(),
                node_index: self.current_node,
            });
        }
    }
}

impl<'ast> Visitor<'ast> for Resolver {
    fn visit_node(&mut self, node: &'ast ExprNode) {
        match node {
            ExprNode::VarDef { name, body } => {
                for node in body {
                    self.visit_node(node);
                }
                if name != CURRENT {
                    self.bound.insert(name.clone());
                }
            }
            ExprNode::VarRef(name) => self.resolve_name(name),
            _ => walk_node(self, node),
        }
    }

    fn visit_operand(&mut self, operand: &'ast Operand) {
        if let Operand::Variable(name) = operand {
            self.resolve_name(name);
        }
    }
}

/// Returns every unresolved variable reference in `nodes`.
pub fn resolve(nodes: &[ExprNode]) -> Vec<UnresolvedVariable> {
    let mut resolver = Resolver::new();
    resolver.resolve_program(nodes);
    resolver.into_unresolved()
}
