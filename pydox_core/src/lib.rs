//! `pydox_core` is the core library for the pydox doxygen input filter. It
//! rewrites python sources so that doxygen understands their structure:
//! every definition gets a `##` comment block carrying its namespace,
//! privacy and interface facts, and docstrings are turned into structured
//! doxygen commands. Original lines are never changed or removed, only new
//! comment lines are inserted, so line numbers in doxygen's output still
//! point at real code.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source bytes
//!   → Encoding (byte order marks, utf-8, declared latin-1)
//!   → Walker (tree-sitter syntax tree → nodes and members)
//!   → Classifier (conventional or interface docstring style)
//!   → Section parser (one event per resume)
//!   → Handoff (single slot)
//!   → Section formatter (doxygen comment lines)
//!   → Assembler (inserts blocks before their definitions)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Filter options and `pydox.toml` loading.
//! - [`lexer`]: Docstring line classification: headers, items, fields and
//!   underlines.
//! - [`namespace`]: Module names from paths, prefix and override handling.
//! - [`walker`]: Python parsing and definition extraction.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pydox_core::FilterOptions;
//! use pydox_core::filter_source;
//!
//! let source = "def add(a, b):\n    \"\"\"Add two numbers.\"\"\"\n    return a + b\n";
//! let options = FilterOptions {
//! 	autobrief: true,
//! 	..FilterOptions::default()
//! };
//! let output = filter_source(source, Some("calc"), &options).unwrap();
//!
//! print!("{}", output.text());
//! ```

pub use assembler::*;
pub use classifier::classify;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use formatter::SectionFormatter;
pub use handoff::Handoff;
pub use model::*;
pub use section_parser::SectionAmbiguity;
pub use section_parser::SectionParser;

mod assembler;
mod classifier;
pub mod config;
pub mod encoding;
mod engine;
#[allow(unused_assignments)]
mod error;
mod formatter;
mod handoff;
pub mod lexer;
mod model;
pub mod namespace;
mod section_parser;
pub mod walker;

#[cfg(test)]
mod __fixtures;
