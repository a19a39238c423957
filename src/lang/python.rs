//! Python language adapter with tree-sitter integration.

use tree_sitter::{Node, Parser, Tree};
use tracing::{debug, trace};

use crate::core::errors::{PyshapeError, Result, ResultExt};
use crate::lang::ast::AstNode;
use crate::lang::lowering::{syntax_error, Lowering};

/// Python-specific parsing into the lowered [`AstNode`] tree
pub struct PythonAdapter {
    /// Tree-sitter parser for Python
    parser: Parser,
}

impl PythonAdapter {
    /// Create a new Python adapter
    pub fn new() -> Result<Self> {
        let language = tree_sitter_python::LANGUAGE.into();
        let mut parser = Parser::new();
        parser.set_language(&language).map_err(|e| {
            PyshapeError::parse("python", format!("Failed to set Python language: {:?}", e))
        })?;

        Ok(Self { parser })
    }

    /// Parse source text into a concrete tree, rejecting any syntax error.
    pub fn parse_tree(&mut self, source: &str) -> Result<Tree> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| PyshapeError::parse("python", "Failed to parse Python source"))?;

        let root = tree.root_node();
        if root.has_error() {
            let error = first_error_node(root).unwrap_or(root);
            debug!(
                kind = error.kind(),
                line = error.start_position().row + 1,
                "tree-sitter reported a syntax error"
            );
            return Err(syntax_error(error, "invalid syntax"));
        }

        Ok(tree)
    }

    /// Parse source text into a `Module` node.
    pub fn parse_module(&mut self, source: &str) -> Result<AstNode> {
        let tree = self.parse_tree(source)?;
        let module = Lowering::new(source)
            .module(tree.root_node())
            .context("lowering python module")?;
        trace!(
            statements = module.children.len(),
            nodes = module.node_count(),
            "lowered python module"
        );
        Ok(module)
    }
}

/// First error or missing node in document order.
fn first_error_node(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }

        let descend = node.has_error() && cursor.goto_first_child();
        if descend {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

#[cfg(test)]
#[path = "python_tests.rs"]
mod tests;
