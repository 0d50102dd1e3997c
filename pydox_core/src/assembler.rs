use std::collections::BTreeMap;

use derive_more::Deref;

/// One line of filtered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
	/// 1-based position in the output.
	pub line_number: usize,
	pub content: String,
	pub is_injected: bool,
}

/// A recoverable problem found while filtering a source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FilterDiagnostic {
	/// The docstring of the definition at `line` could not be rendered and
	/// was copied verbatim.
	RenderFallback {
		name: String,
		line: usize,
		reason: String,
	},
	/// A docstring line did not fit its section and was kept as plain text.
	AmbiguousLine {
		name: String,
		line: usize,
		text: String,
	},
}

/// Filtered source. Dereferences to its lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct FilterOutput {
	#[deref]
	pub lines: Vec<OutputLine>,
	pub injected: usize,
	pub diagnostics: Vec<FilterDiagnostic>,
	/// The terminator written after each of `lines`.
	endings: Vec<&'static str>,
}

impl FilterOutput {
	/// The output as text. Source lines keep their own line endings.
	pub fn text(&self) -> String {
		self.lines
			.iter()
			.zip(&self.endings)
			.map(|(line, ending)| format!("{}{ending}", line.content))
			.collect()
	}
}

/// Collects comment blocks keyed by the source line they precede and
/// weaves them into the original lines.
#[derive(Debug)]
pub struct Assembler<'s> {
	lines: Vec<(&'s str, &'static str)>,
	/// Used for injected lines whose anchor has no terminator.
	default_ending: &'static str,
	injections: BTreeMap<usize, Vec<String>>,
}

impl<'s> Assembler<'s> {
	pub fn new(source: &'s str) -> Self {
		let default_ending = if source.contains("\r\n") { "\r\n" } else { "\n" };

		Self {
			lines: source.split_inclusive('\n').map(split_ending).collect(),
			default_ending,
			injections: BTreeMap::new(),
		}
	}

	/// Queue a comment block before the 1-based `line`. The first body line
	/// gets the `##` marker, later ones `#`. Empty bodies are ignored.
	pub fn inject<S: AsRef<str>>(&mut self, line: usize, indent: &str, body: &[S]) {
		if body.is_empty() {
			return;
		}

		let block = self.injections.entry(line).or_default();
		for (index, text) in body.iter().enumerate() {
			let marker = if index == 0 { "##" } else { "#" };
			block.push(format!("{indent}{marker}{}", text.as_ref()));
		}
	}

	pub fn finish(self, diagnostics: Vec<FilterDiagnostic>) -> FilterOutput {
		let Self {
			lines,
			default_ending,
			mut injections,
		} = self;

		let mut woven: Vec<(String, &'static str, bool)> = Vec::with_capacity(lines.len());

		for (index, (line, ending)) in lines.into_iter().enumerate() {
			if let Some(block) = injections.remove(&(index + 1)) {
				// A block takes the ending of the line it precedes.
				let block_ending = if ending.is_empty() { default_ending } else { ending };
				woven.extend(block.into_iter().map(|comment| (comment, block_ending, true)));
			}

			woven.push((line.to_string(), ending, false));
		}

		// Anything anchored past the end goes last.
		for (_, block) in injections {
			if let Some(last) = woven.last_mut().filter(|(_, ending, _)| ending.is_empty()) {
				last.1 = default_ending;
			}
			woven.extend(block.into_iter().map(|comment| (comment, default_ending, true)));
		}

		let injected = woven.iter().filter(|(_, _, is_injected)| *is_injected).count();
		let (lines, endings) = woven
			.into_iter()
			.enumerate()
			.map(|(index, (content, ending, is_injected))| {
				let line = OutputLine {
					line_number: index + 1,
					content,
					is_injected,
				};

				(line, ending)
			})
			.unzip();

		FilterOutput {
			lines,
			injected,
			diagnostics,
			endings,
		}
	}
}

/// Split a line from `split_inclusive` into its content and terminator.
fn split_ending(line: &str) -> (&str, &'static str) {
	if let Some(content) = line.strip_suffix("\r\n") {
		(content, "\r\n")
	} else if let Some(content) = line.strip_suffix('\n') {
		(content, "\n")
	} else {
		(line, "")
	}
}
