use std::path::Path;

use crate::Assembler;
use crate::DocstringModel;
use crate::Event;
use crate::FilterDiagnostic;
use crate::FilterOptions;
use crate::FilterOutput;
use crate::MemberKind;
use crate::NodeKind;
use crate::PydoxResult;
use crate::RenderFailure;
use crate::StyleTag;
use crate::classifier::classify;
use crate::encoding::decode;
use crate::formatter::SectionFormatter;
use crate::handoff::Handoff;
use crate::lexer::docstring_baseline;
use crate::namespace::NamespaceResolver;
use crate::namespace::module_name_from_path;
use crate::section_parser::SectionAmbiguity;
use crate::section_parser::SectionParser;
use crate::walker::walk;

/// A producer of section events that can be resumed one event at a time.
pub trait EventSource {
	/// The next event, or `None` once the docstring is exhausted.
	fn resume(&mut self) -> Option<Event>;
}

impl EventSource for std::vec::IntoIter<Event> {
	fn resume(&mut self) -> Option<Event> {
		self.next()
	}
}

/// Pump events from `source` into `formatter` through a single-slot
/// handoff. Stops at the first rendering failure.
pub fn drive<S: EventSource + ?Sized>(
	source: &mut S,
	formatter: &mut SectionFormatter,
) -> Result<(), RenderFailure> {
	let mut handoff = Handoff::new();

	while let Some(event) = source.resume() {
		handoff.put(event)?;

		if let Some(event) = handoff.take() {
			formatter.consume(event)?;
		}
	}

	Ok(())
}

/// The comment body produced for one docstring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocstring {
	pub lines: Vec<String>,
	/// Set when rendering failed and `lines` hold the verbatim docstring.
	pub fallback: Option<RenderFailure>,
	pub ambiguities: Vec<SectionAmbiguity>,
}

/// Render a docstring into comment lines.
///
/// With `autobrief` disabled the docstring is copied verbatim. Otherwise it
/// runs through the section parser and formatter, falling back to the
/// verbatim copy when rendering fails.
pub fn render_docstring(docstring: &str, style: StyleTag, options: &FilterOptions) -> RenderedDocstring {
	let baseline = docstring_baseline(docstring, options.tab_length);
	render_with_baseline(docstring, baseline, style, options)
}

/// [`render_docstring`] for a docstring whose baseline the walker already
/// measured.
pub fn render_with_baseline(
	docstring: &str,
	baseline: usize,
	style: StyleTag,
	options: &FilterOptions,
) -> RenderedDocstring {
	if !options.autobrief {
		return RenderedDocstring {
			lines: verbatim_lines(docstring),
			fallback: None,
			ambiguities: Vec::new(),
		};
	}

	let mut parser = SectionParser::new(docstring, baseline, style, options);
	let mut rendered = render_events(&mut parser, docstring);
	rendered.ambiguities = parser.into_ambiguities();

	rendered
}

/// Format the events of `source`. When formatting fails the `docstring` is
/// copied verbatim instead.
pub fn render_events<S: EventSource + ?Sized>(source: &mut S, docstring: &str) -> RenderedDocstring {
	let mut formatter = SectionFormatter::new();

	match drive(source, &mut formatter).and_then(|()| formatter.finish()) {
		Ok(lines) => {
			RenderedDocstring {
				lines,
				fallback: None,
				ambiguities: Vec::new(),
			}
		}
		Err(failure) => {
			tracing::warn!(reason = %failure, "docstring rendered verbatim");

			RenderedDocstring {
				lines: verbatim_lines(docstring),
				fallback: Some(failure),
				ambiguities: Vec::new(),
			}
		}
	}
}

/// The docstring without blank edges, led by an empty marker line.
pub fn verbatim_lines(docstring: &str) -> Vec<String> {
	let lines: Vec<&str> = docstring
		.split('\n')
		.map(|line| line.strip_suffix('\r').unwrap_or(line))
		.collect();
	let start = lines
		.iter()
		.position(|line| !line.trim().is_empty())
		.unwrap_or(lines.len());
	let end = lines
		.iter()
		.rposition(|line| !line.trim().is_empty())
		.map_or(start, |index| index + 1);

	std::iter::once(String::new())
		.chain(lines[start..end].iter().enumerate().map(|(index, line)| {
			// The line holding the opening quotes has no indentation of its own.
			if index == 0 && start == 0 {
				format!(" {}", line.trim())
			} else {
				(*line).to_string()
			}
		}))
		.collect()
}

/// Parse a docstring into a structured model without rendering it.
pub fn parse_docstring(docstring: &str, style: StyleTag, options: &FilterOptions) -> DocstringModel {
	let baseline = docstring_baseline(docstring, options.tab_length);
	let mut parser = SectionParser::new(docstring, baseline, style, options);
	let events = std::iter::from_fn(|| parser.resume());

	DocstringModel::from_events(style, events)
}

/// Filter decoded python source.
///
/// `module_name` is the dotted name derived from the input path. Parse
/// errors are fatal and produce no output. Rendering failures only affect
/// the docstring they occur in and are reported as diagnostics.
pub fn filter_source(
	source: &str,
	module_name: Option<&str>,
	options: &FilterOptions,
) -> PydoxResult<FilterOutput> {
	tracing::info!(module = module_name.unwrap_or("<stdin>"), "filtering source");

	let structure = walk(source, module_name.unwrap_or_default(), options.tab_length)?;
	let resolver = NamespaceResolver::new(&options.namespace, module_name);
	let mut assembler = Assembler::new(source);
	let mut diagnostics = Vec::new();

	for node in &structure.nodes {
		let mut block = Vec::new();

		if let (Some(style), Some(docstring)) = (classify(node), node.docstring.as_deref()) {
			let rendered = render_with_baseline(docstring, node.docstring_indent_baseline, style, options);
			let docstring_line = node.docstring_line.unwrap_or(node.start_line);

			if let Some(failure) = rendered.fallback {
				diagnostics.push(FilterDiagnostic::RenderFallback {
					name: node.name.clone(),
					line: docstring_line,
					reason: failure.to_string(),
				});
			}

			for ambiguity in rendered.ambiguities {
				diagnostics.push(FilterDiagnostic::AmbiguousLine {
					name: node.name.clone(),
					line: docstring_line + ambiguity.offset,
					text: ambiguity.text,
				});
			}

			block.extend(rendered.lines);
		}

		if node.kind == NodeKind::Module {
			// A module block sits in front of the module docstring, so there
			// is nothing to anchor it to without one.
			let Some(line) = node.docstring_line.filter(|_| !block.is_empty()) else {
				continue;
			};

			if let Some(namespace) = resolver.qualify(node) {
				push_tag(&mut block, format!(" @namespace {namespace}"));
			}

			assembler.inject(line, &node.indent, &block);
			continue;
		}

		if let Some(namespace) = resolver.qualify(node) {
			push_tag(&mut block, format!(" @namespace {namespace}"));
		}

		if node.is_interface {
			push_tag(&mut block, format!(" @interface {}", node.name));
		}

		if let Some(tag) = node.visibility().tag() {
			push_tag(&mut block, format!(" {tag}"));
		}

		assembler.inject(node.start_line, &node.indent, &block);
	}

	for member in &structure.members {
		let body: Vec<String> = match &member.kind {
			MemberKind::Attribute { doc } => {
				std::iter::once(format!(" @property {}", member.name))
					.chain(
						doc.lines()
							.map(str::trim)
							.filter(|line| !line.is_empty())
							.map(|line| format!(" {line}")),
					)
					.chain(std::iter::once(" @hideinitializer".to_string()))
					.collect()
			}
			MemberKind::Variable { visibility } => {
				std::iter::once(format!(" @var {}", member.name))
					.chain(std::iter::once(" @hideinitializer".to_string()))
					.chain(visibility.tag().map(|tag| format!(" {tag}")))
					.collect()
			}
			MemberKind::Implements { interfaces } => {
				interfaces
					.iter()
					.map(|interface| format!(" @implements {interface}"))
					.collect()
			}
		};

		assembler.inject(member.line, &member.indent, &body);
	}

	Ok(assembler.finish(diagnostics))
}

/// Decode raw bytes and filter them. Encoding errors are fatal.
pub fn filter_bytes(
	bytes: &[u8],
	module_name: Option<&str>,
	options: &FilterOptions,
) -> PydoxResult<FilterOutput> {
	let source = decode(bytes)?;
	filter_source(&source, module_name, options)
}

/// Read, decode and filter a file. The module name comes from the path.
pub fn filter_file(path: &Path, options: &FilterOptions) -> PydoxResult<FilterOutput> {
	let bytes = std::fs::read(path)?;
	let module_name = module_name_from_path(path);

	filter_bytes(&bytes, Some(module_name.as_str()), options)
}

/// Separate trailing tags from docstring text with one blank comment line.
fn push_tag(block: &mut Vec<String>, tag: String) {
	if block.last().is_some_and(|line| !line.trim().is_empty() && !line.starts_with(" @")) {
		block.push(String::new());
	}

	block.push(tag);
}
