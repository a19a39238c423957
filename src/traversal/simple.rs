//! Simple strategy: the set of distinct labels found on each line.

use indexmap::IndexSet;

use super::{LineIndex, LineReport};
use crate::core::classifier::label;
use crate::core::lines::{effective_line, NO_LINE};
use crate::lang::ast::AstNode;

/// Per-line label sets, in first-seen order within each line.
pub type LabelReport = LineReport<IndexSet<String>>;

/// Walk the top-level statements of a module.
pub fn traverse(statements: &[AstNode]) -> LabelReport {
    let mut lines = LineIndex::new();
    for statement in statements {
        visit(statement, NO_LINE, &mut lines);
    }
    LineReport { lines }
}

fn visit(node: &AstNode, inherited: usize, lines: &mut LineIndex<IndexSet<String>>) {
    let line = effective_line(node, inherited);
    if let Some(name) = label(node) {
        lines.entry(line).or_default().insert(name);
    }
    for child in &node.children {
        visit(child, line, lines);
    }
}
