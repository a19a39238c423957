//! Traversal strategies over the lowered AST.
//!
//! All strategies walk the tree depth-first, pre-order, children in source
//! order. Skipped nodes never appear in the output but their children are
//! still visited and inherit the skipped node's effective line.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::PyshapeError;

pub mod complex;
pub mod concepts;
pub mod hierarchical;
pub mod simple;

pub use complex::LineEntry;
pub use hierarchical::{HierarchyEntry, HierarchyRoot};

/// Mapping from effective line number to what was found on that line.
///
/// Keys serialize as strings (`"1"`, `"2"`, ...) and iterate in ascending
/// line order.
pub type LineIndex<T> = BTreeMap<usize, T>;

/// `{"lines": {...}}` wrapper shared by the simple and complex strategies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineReport<T> {
    /// Per-line payload
    pub lines: LineIndex<T>,
}

impl<T> Default for LineReport<T> {
    fn default() -> Self {
        Self {
            lines: LineIndex::new(),
        }
    }
}

/// Which view of the program to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Distinct labels per line
    #[default]
    Simple,
    /// Entries with spans per line, in source order
    Complex,
    /// Nested entries under a synthetic root
    Hierarchical,
    /// Distinct labels anywhere in the program
    Concepts,
}

impl Mode {
    /// All modes, in documentation order.
    pub const ALL: [Mode; 4] = [Mode::Simple, Mode::Complex, Mode::Hierarchical, Mode::Concepts];

    /// Wire name of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Simple => "simple",
            Mode::Complex => "complex",
            Mode::Hierarchical => "hierarchical",
            Mode::Concepts => "concepts",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = PyshapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| PyshapeError::unknown_mode(s))
    }
}
