//! # Pyshape-RS: Line-Indexed Syntax Metadata for Python
//!
//! Parses a Python program and reports which syntactic constructs appear on
//! which lines. Four views of the same walk are available:
//!
//! - **simple**: the distinct construct labels found on each line
//! - **complex**: per-line entries carrying a start line and, for multi-line
//!   constructs, an end line
//! - **hierarchical**: entries nested under their nearest reported ancestor
//! - **concepts**: every distinct label used anywhere in the program
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 API Layer (engine, request)              │
//! ├──────────────────────────────────────────────────────────┤
//! │  Language frontend │  Core                │  Traversal   │
//! │                    │                      │              │
//! │ • tree-sitter      │ • Classifier         │ • simple     │
//! │ • Lowering         │ • Line resolution    │ • complex    │
//! │ • AST model        │ • Config, errors     │ • hierarchy  │
//! │                    │                      │ • concepts   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pyshape_rs::{Mode, PyshapeConfig, ShapeEngine};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = ShapeEngine::new(PyshapeConfig::default())?;
//!     let report = engine.analyze_source("x = 1\ny = True", Mode::Simple)?;
//!
//!     // {"lines":{"1":["Assign","Int"],"2":["Assign","True"]}}
//!     println!("{}", report.to_json(false)?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Core data structures shared by every traversal
pub mod core {
    //! Classification tables, line resolution, configuration and errors.

    pub mod classifier;
    pub mod config;
    pub mod errors;
    pub mod lines;
}

// Python frontend
pub mod lang {
    //! Python parsing and lowering into the owned AST model.

    pub mod ast;
    pub mod lowering;
    pub mod python;
}

// Traversal strategies
pub mod traversal;

// Public API and engine interface
pub mod api {
    //! High-level API and engine interface.

    pub mod engine;
    pub mod request;
}

// Re-export primary types for convenience
pub use api::engine::{ShapeEngine, ShapeReport};
pub use api::request::ParseRequest;
pub use core::config::PyshapeConfig;
pub use core::errors::{PyshapeError, Result, ResultExt};
pub use traversal::Mode;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
