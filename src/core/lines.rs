//! Effective line resolution.
//!
//! Only some nodes carry a line of their own. Everything else is attributed
//! to the nearest ancestor that does; line 0 means no line has been seen yet.

use crate::lang::ast::AstNode;

/// Line attributed to nodes above the first positioned ancestor.
pub const NO_LINE: usize = 0;

/// The node's own line if it has one, otherwise the inherited line.
///
/// The result is also the line inherited by the node's direct children.
pub fn effective_line(node: &AstNode, inherited: usize) -> usize {
    node.line.unwrap_or(inherited)
}
