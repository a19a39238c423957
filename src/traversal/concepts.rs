//! Concepts strategy: every distinct label used anywhere in the program.

use indexmap::IndexSet;

use super::simple::{self, LabelReport};
use crate::lang::ast::AstNode;

/// Walk the top-level statements of a module.
pub fn traverse(statements: &[AstNode]) -> IndexSet<String> {
    flatten(&simple::traverse(statements))
}

/// Drop line association from a simple report, keeping first-seen order.
pub fn flatten(report: &LabelReport) -> IndexSet<String> {
    report.lines.values().flatten().cloned().collect()
}
