//! Main shape engine implementation.

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, info};

use crate::api::request::ParseRequest;
use crate::core::config::PyshapeConfig;
use crate::core::errors::Result;
use crate::lang::ast::AstNode;
use crate::lang::python::PythonAdapter;
use crate::traversal::complex::{self, EntryReport};
use crate::traversal::hierarchical::{self, HierarchyRoot};
use crate::traversal::simple::{self, LabelReport};
use crate::traversal::{concepts, Mode};

/// Output of one traversal, shaped by the mode that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ShapeReport {
    /// `{"lines": {"1": ["Assign", "Int"]}}`
    Simple(LabelReport),
    /// `{"lines": {"1": [{"name": "If", "startLine": 1, "endLine": 2}]}}`
    Complex(EntryReport),
    /// `{"name": "root", "children": [...]}`
    Hierarchical(HierarchyRoot),
    /// `["Assign", "Int"]`
    Concepts(IndexSet<String>),
}

impl ShapeReport {
    /// Mode that produces this shape.
    pub fn mode(&self) -> Mode {
        match self {
            ShapeReport::Simple(_) => Mode::Simple,
            ShapeReport::Complex(_) => Mode::Complex,
            ShapeReport::Hierarchical(_) => Mode::Hierarchical,
            ShapeReport::Concepts(_) => Mode::Concepts,
        }
    }

    /// Number of reported items (labels, entries or concepts).
    pub fn entry_count(&self) -> usize {
        match self {
            ShapeReport::Simple(report) => report.lines.values().map(IndexSet::len).sum(),
            ShapeReport::Complex(report) => complex::entry_count(report),
            ShapeReport::Hierarchical(root) => root.entry_count(),
            ShapeReport::Concepts(set) => set.len(),
        }
    }

    /// Render the wire form of the report.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Parses Python source and runs the requested traversal.
pub struct ShapeEngine {
    config: PyshapeConfig,
    adapter: PythonAdapter,
}

impl ShapeEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: PyshapeConfig) -> Result<Self> {
        config.validate()?;
        let adapter = PythonAdapter::new()?;
        debug!(default_mode = %config.default_mode, "shape engine initialized");
        Ok(Self { config, adapter })
    }

    /// Engine configuration
    pub fn config(&self) -> &PyshapeConfig {
        &self.config
    }

    /// Answer a request.
    ///
    /// The code is parsed before the mode name is checked, so a request with
    /// both invalid code and an unknown mode reports the syntax error.
    pub fn analyze_request(&mut self, request: &ParseRequest) -> Result<ShapeReport> {
        info!(
            mode = request.mode.as_deref().unwrap_or("<default>"),
            bytes = request.code.len(),
            "request received"
        );
        self.config.check_source(&request.code)?;
        let module = self.adapter.parse_module(&request.code)?;
        let mode = request.resolve_mode(self.config.default_mode)?;
        Ok(self.run(&module.children, mode))
    }

    /// Analyze source text with an already-resolved mode.
    pub fn analyze_source(&mut self, code: &str, mode: Mode) -> Result<ShapeReport> {
        info!(%mode, bytes = code.len(), "analyzing source");
        self.config.check_source(code)?;
        let module = self.adapter.parse_module(code)?;
        Ok(self.run(&module.children, mode))
    }

    fn run(&self, statements: &[AstNode], mode: Mode) -> ShapeReport {
        debug!(statements = statements.len(), "parse complete");
        let report = match mode {
            Mode::Simple => ShapeReport::Simple(simple::traverse(statements)),
            Mode::Complex => ShapeReport::Complex(complex::traverse(statements)),
            Mode::Hierarchical => ShapeReport::Hierarchical(hierarchical::traverse(statements)),
            Mode::Concepts => ShapeReport::Concepts(concepts::traverse(statements)),
        };
        debug!(
            mode = %report.mode(),
            entries = report.entry_count(),
            "traversal complete"
        );
        report
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
