//! Complex strategy: per-line entries carrying their own span.

use serde::Serialize;

use super::{LineIndex, LineReport};
use crate::core::classifier::label;
use crate::core::lines::{effective_line, NO_LINE};
use crate::lang::ast::AstNode;

/// A reported construct with its line span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEntry {
    /// Rendered label
    pub name: String,
    /// Effective line of the node
    pub start_line: usize,
    /// Last line reached by the subtree; absent when equal to `start_line`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
}

impl LineEntry {
    /// Entry that has not been closed yet.
    pub fn new(name: String, start_line: usize) -> Self {
        Self {
            name,
            start_line,
            end_line: None,
        }
    }

    /// Record the subtree's maximum line; only a multi-line span is kept.
    pub fn close(&mut self, max_line: usize) {
        self.end_line = (max_line != self.start_line).then_some(max_line);
    }

    /// `end_line`, falling back to `start_line`.
    pub fn last_line(&self) -> usize {
        self.end_line.unwrap_or(self.start_line)
    }
}

/// Per-line entry lists, in source order.
pub type EntryReport = LineReport<Vec<LineEntry>>;

/// Walk the top-level statements of a module.
pub fn traverse(statements: &[AstNode]) -> EntryReport {
    let mut lines = LineIndex::new();
    for statement in statements {
        visit(statement, NO_LINE, &mut lines);
    }
    LineReport { lines }
}

/// Returns the maximum effective line of the subtree.
fn visit(node: &AstNode, inherited: usize, lines: &mut LineIndex<Vec<LineEntry>>) -> usize {
    let line = effective_line(node, inherited);

    // Entries are only ever appended, so the slot stays valid while the
    // subtree is walked.
    let slot = label(node).map(|name| {
        let entries = lines.entry(line).or_default();
        entries.push(LineEntry::new(name, line));
        entries.len() - 1
    });

    let max_line = node
        .children
        .iter()
        .fold(line, |max_line, child| max_line.max(visit(child, line, lines)));

    if let Some(index) = slot {
        if let Some(entry) = lines.get_mut(&line).and_then(|entries| entries.get_mut(index)) {
            entry.close(max_line);
        }
    }
    max_line
}

/// Total number of entries across all lines.
pub fn entry_count(report: &EntryReport) -> usize {
    report.lines.values().map(Vec::len).sum()
}
