use miette::Diagnostic;
use thiserror::Error;

use crate::SectionKind;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum PydoxError {
	#[error(transparent)]
	#[diagnostic(code(pydox::io_error))]
	Io(#[from] std::io::Error),

	#[error("python syntax error at {line}:{column}: {message}")]
	#[diagnostic(
		code(pydox::parse_error),
		help("the source must be valid python before it can be filtered")
	)]
	Parse {
		line: usize,
		column: usize,
		message: String,
	},

	#[error("source is not readable text: {0}")]
	#[diagnostic(
		code(pydox::encoding),
		help("save the file as utf-8, or declare `# -*- coding: latin-1 -*-` on one of the first two lines")
	)]
	Encoding(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(pydox::config_parse),
		help("check that pydox.toml is valid TOML with top level options and an optional [namespace] table")
	)]
	ConfigParse(String),

	#[error("failed to load the python grammar: {0}")]
	#[diagnostic(code(pydox::grammar))]
	Grammar(String),
}

/// Failure to render a single docstring. These never abort a whole file, the
/// engine falls back to the original docstring text instead.
#[derive(Debug, Clone, Diagnostic, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RenderFailure {
	#[error("a brief section may only hold a single line")]
	#[diagnostic(code(pydox::render::brief_overflow))]
	BriefOverflow,

	#[error("the brief section must be the first section")]
	#[diagnostic(code(pydox::render::brief_order))]
	BriefNotFirst,

	#[error("item in `{section}` must carry exactly one name, found {found}")]
	#[diagnostic(code(pydox::render::malformed_item))]
	MalformedItem { section: SectionKind, found: usize },

	#[error("item has an empty name in `{0}`")]
	#[diagnostic(code(pydox::render::empty_name))]
	EmptyName(SectionKind),

	#[error("`{event}` cannot appear inside a `{section}` section")]
	#[diagnostic(code(pydox::render::unexpected_event))]
	UnexpectedEvent {
		event: &'static str,
		section: SectionKind,
	},

	#[error("section `{opened}` started while `{open}` is still open")]
	#[diagnostic(code(pydox::render::nested_section))]
	NestedSection {
		open: SectionKind,
		opened: SectionKind,
	},

	#[error("`{0}` received while no section is open")]
	#[diagnostic(code(pydox::render::no_open_section))]
	NoOpenSection(&'static str),

	#[error("section `{0}` was never closed")]
	#[diagnostic(code(pydox::render::unterminated))]
	Unterminated(SectionKind),

	#[error("event handoff slot is already occupied")]
	#[diagnostic(code(pydox::render::handoff_occupied))]
	HandoffOccupied,
}

pub type PydoxResult<T> = Result<T, PydoxError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyResult<T> = Result<T, AnyError>;
pub type AnyEmptyResult = AnyResult<()>;
