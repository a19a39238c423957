//! Owned abstract syntax tree produced by the Python frontend.
//!
//! Nodes are labelled with the CPython `ast` class names and keep their
//! children in the order `ast.iter_child_nodes` would yield them. Only nodes
//! that CPython gives a `lineno` carry a line here; everything else inherits
//! its position from the nearest ancestor during traversal.

use std::fmt;

/// Value carried by a literal node.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// `True` / `False`
    Bool(bool),
    /// `None`
    None,
    /// Integer literal, as written in the source
    Int(String),
    /// Floating-point literal, as written in the source
    Float(String),
    /// Imaginary literal (`1j`, `2.5J`), as written in the source
    Complex(String),
}

impl LiteralValue {
    /// Name of the runtime type the literal evaluates to.
    pub fn type_name(&self) -> &'static str {
        match self {
            LiteralValue::Bool(_) => "bool",
            LiteralValue::None => "NoneType",
            LiteralValue::Int(_) => "int",
            LiteralValue::Float(_) => "float",
            LiteralValue::Complex(_) => "complex",
        }
    }

    /// Classify a numeric literal from its source text.
    pub fn number(text: &str, is_float: bool) -> Self {
        let text = text.to_string();
        if text.ends_with('j') || text.ends_with('J') {
            LiteralValue::Complex(text)
        } else if is_float {
            LiteralValue::Float(text)
        } else {
            LiteralValue::Int(text)
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Bool(true) => write!(f, "True"),
            LiteralValue::Bool(false) => write!(f, "False"),
            LiteralValue::None => write!(f, "None"),
            LiteralValue::Int(text) | LiteralValue::Float(text) | LiteralValue::Complex(text) => {
                write!(f, "{text}")
            }
        }
    }
}

/// A single node of the lowered tree.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    /// CPython `ast` class name, e.g. `FunctionDef`
    pub kind: &'static str,
    /// 1-based line number, when the node kind carries position info
    pub line: Option<usize>,
    /// Literal payload for `Num` and `NameConstant`
    pub value: Option<LiteralValue>,
    /// Child nodes in field order
    pub children: Vec<AstNode>,
}

impl AstNode {
    /// Node with a source line.
    pub fn at(kind: &'static str, line: usize) -> Self {
        Self {
            kind,
            line: Some(line),
            value: None,
            children: Vec::new(),
        }
    }

    /// Node without position info (operators, contexts, helper records).
    pub fn bare(kind: &'static str) -> Self {
        Self {
            kind,
            line: None,
            value: None,
            children: Vec::new(),
        }
    }

    /// Literal node with a value payload.
    pub fn literal(kind: &'static str, line: usize, value: LiteralValue) -> Self {
        Self {
            kind,
            line: Some(line),
            value: Some(value),
            children: Vec::new(),
        }
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style child append for optional fields.
    pub fn with_opt(mut self, child: Option<AstNode>) -> Self {
        if let Some(child) = child {
            self.children.push(child);
        }
        self
    }

    /// Builder-style append of a list field.
    pub fn with_children(mut self, children: impl IntoIterator<Item = AstNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        self.descendants().count()
    }

    /// Pre-order iterator over this subtree.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order walk over an [`AstNode`] subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a AstNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a AstNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
