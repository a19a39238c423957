//! Node classification: which kinds are reported, and under which label.
//!
//! The tables here are fixed. The set of node kinds is closed (it is defined
//! by the grammar), so classification is a lookup rather than dispatch on a
//! node type hierarchy.

use crate::lang::ast::AstNode;

/// Renders the reported label of a node from its content.
pub type ValueRenderer = fn(&AstNode) -> String;

/// What the traversal should do with a node of a given kind.
#[derive(Debug, Clone, Copy)]
pub enum NodeClass {
    /// Never reported; children are still visited.
    Skip,
    /// Reported under a label derived from the node's value.
    RenderValue(ValueRenderer),
    /// Reported under its kind name.
    Verbatim,
}

/// Structural or redundant kinds that never appear in output.
///
/// Operator families are skipped because the concrete operator below them
/// (`Add`, `Lt`, `And`, ...) is reported instead.
pub const SKIPPED_KINDS: &[&str] = &[
    "Store",
    "Load",
    "Name",
    "Expr",
    "arguments",
    "Subscript",
    "BoolOp",
    "BinOp",
    "Compare",
    "UnaryOp",
];

/// Kinds whose label comes from the node's literal value.
pub const RENDERED_KINDS: &[(&str, ValueRenderer)] = &[
    ("Num", render_number_type),
    ("NameConstant", render_constant),
];

/// Classify a node kind.
pub fn classify(kind: &str) -> NodeClass {
    if SKIPPED_KINDS.contains(&kind) {
        return NodeClass::Skip;
    }
    RENDERED_KINDS
        .iter()
        .find(|(rendered, _)| *rendered == kind)
        .map_or(NodeClass::Verbatim, |(_, renderer)| {
            NodeClass::RenderValue(*renderer)
        })
}

/// Reported label for a node, or `None` when the node is skipped.
pub fn label(node: &AstNode) -> Option<String> {
    match classify(node.kind) {
        NodeClass::Skip => None,
        NodeClass::RenderValue(render) => Some(render(node)),
        NodeClass::Verbatim => Some(node.kind.to_string()),
    }
}

/// `True`, `False` or `None`.
fn render_constant(node: &AstNode) -> String {
    node.value
        .as_ref()
        .map_or_else(|| node.kind.to_string(), ToString::to_string)
}

/// Capitalized runtime type name of a numeric literal: `Int`, `Float`,
/// `Complex`.
fn render_number_type(node: &AstNode) -> String {
    node.value
        .as_ref()
        .map_or_else(|| node.kind.to_string(), |value| capitalize(value.type_name()))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
