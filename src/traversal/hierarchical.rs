//! Hierarchical strategy: entries nested under their nearest reported
//! ancestor.

use serde::Serialize;

use crate::core::classifier::label;
use crate::core::lines::{effective_line, NO_LINE};
use crate::lang::ast::AstNode;

/// Label of the synthetic root.
pub const ROOT_NAME: &str = "root";

/// A reported construct with its span and nested entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyEntry {
    /// Rendered label
    pub name: String,
    /// Effective line of the node
    pub start_line: usize,
    /// Last line reached by the subtree; absent when equal to `start_line`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    /// Entries for the nearest reported descendants
    pub children: Vec<HierarchyEntry>,
}

impl HierarchyEntry {
    fn new(name: String, start_line: usize) -> Self {
        Self {
            name,
            start_line,
            end_line: None,
            children: Vec::new(),
        }
    }

    /// Number of entries in this subtree, including `self`.
    pub fn entry_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(HierarchyEntry::entry_count)
            .sum::<usize>()
    }
}

/// Synthetic root collecting the top-level entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyRoot {
    /// Always [`ROOT_NAME`]
    pub name: String,
    /// Top-level entries in source order
    pub children: Vec<HierarchyEntry>,
}

impl HierarchyRoot {
    /// Number of entries below the root.
    pub fn entry_count(&self) -> usize {
        self.children.iter().map(HierarchyEntry::entry_count).sum()
    }
}

impl Default for HierarchyRoot {
    fn default() -> Self {
        Self {
            name: ROOT_NAME.to_string(),
            children: Vec::new(),
        }
    }
}

/// Walk the top-level statements of a module.
pub fn traverse(statements: &[AstNode]) -> HierarchyRoot {
    let mut root = HierarchyRoot::default();
    for statement in statements {
        visit(statement, NO_LINE, &mut root.children);
    }
    root
}

/// Attach `node` (or, when skipped, its reported descendants) to `parent`.
/// Returns the maximum effective line of the subtree.
fn visit(node: &AstNode, inherited: usize, parent: &mut Vec<HierarchyEntry>) -> usize {
    let line = effective_line(node, inherited);

    let Some(name) = label(node) else {
        return node
            .children
            .iter()
            .fold(line, |max_line, child| max_line.max(visit(child, line, parent)));
    };

    let mut entry = HierarchyEntry::new(name, line);
    let max_line = node.children.iter().fold(line, |max_line, child| {
        max_line.max(visit(child, line, &mut entry.children))
    });
    entry.end_line = (max_line != line).then_some(max_line);
    parent.push(entry);
    max_line
}
