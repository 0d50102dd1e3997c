use std::collections::HashSet;

use crate::Event;
use crate::FieldTag;
use crate::Item;
use crate::RenderFailure;
use crate::SectionKind;

/// Rendering state for the section currently open.
#[derive(Debug)]
struct OpenSection {
	kind: SectionKind,
	/// Lines emitted into a brief.
	brief_lines: usize,
	/// Text gathered for a `@return` or `@yield` line.
	joined: Vec<String>,
	/// An autocode `@code` block is open.
	code_open: bool,
	/// Blank code lines held back until more code arrives.
	pending_blank: usize,
}

/// Consumes section events one at a time and renders comment lines.
///
/// The formatter never looks ahead. Each returned line is the text that
/// follows the comment marker, so ` @brief Text` becomes `## @brief Text`
/// once the assembler adds the marker.
#[derive(Debug, Default)]
pub struct SectionFormatter {
	lines: Vec<String>,
	open: Option<OpenSection>,
	sections: usize,
	/// Exception names already listed in the current raises section.
	seen_exceptions: HashSet<String>,
}

impl SectionFormatter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn consume(&mut self, event: Event) -> Result<(), RenderFailure> {
		let name = event.name();

		match event {
			Event::SectionStart(kind) => self.start(kind),
			Event::SectionEnd => self.end(name),
			Event::TextLine(text) => self.text(name, &text),
			Event::CodeLine(code) => self.code(name, code),
			Event::Item(item) => self.item(name, item),
			Event::Field { tag, text } => self.field(name, tag, &text),
		}
	}

	/// Finish rendering and return the comment lines.
	pub fn finish(mut self) -> Result<Vec<String>, RenderFailure> {
		if let Some(section) = self.open.take() {
			return Err(RenderFailure::Unterminated(section.kind));
		}

		while self.lines.last().is_some_and(String::is_empty) {
			self.lines.pop();
		}

		Ok(self.lines)
	}

	fn start(&mut self, kind: SectionKind) -> Result<(), RenderFailure> {
		if let Some(open) = &self.open {
			return Err(RenderFailure::NestedSection {
				open: open.kind.clone(),
				opened: kind,
			});
		}

		if kind == SectionKind::Brief && self.sections > 0 {
			return Err(RenderFailure::BriefNotFirst);
		}

		if self.lines.last().is_some_and(|line| !line.is_empty()) {
			self.lines.push(String::new());
		}

		match &kind {
			SectionKind::Examples => {
				self.lines.push(" @par Examples".to_string());
				self.lines.push(" @code".to_string());
			}
			SectionKind::Freeform(Some(title)) => self.lines.push(format!(" @par {title}")),
			SectionKind::Raises => self.seen_exceptions.clear(),
			_ => {}
		}

		self.sections += 1;
		self.open = Some(OpenSection {
			kind,
			brief_lines: 0,
			joined: Vec::new(),
			code_open: false,
			pending_blank: 0,
		});

		Ok(())
	}

	fn end(&mut self, event: &'static str) -> Result<(), RenderFailure> {
		let Some(section) = self.open.take() else {
			return Err(RenderFailure::NoOpenSection(event));
		};

		match section.kind {
			SectionKind::Returns => self.push_joined("@return", &section.joined),
			SectionKind::Yields => self.push_joined("@yield", &section.joined),
			SectionKind::Examples => {
				self.lines.push(" @endcode".to_string());
				self.push_blanks(section.pending_blank);
			}
			_ if section.code_open => {
				self.lines.push(" @endcode".to_string());
				self.push_blanks(section.pending_blank);
			}
			_ => {}
		}

		Ok(())
	}

	fn text(&mut self, event: &'static str, text: &str) -> Result<(), RenderFailure> {
		let section = open_section(&mut self.open, event)?;

		match section.kind {
			SectionKind::Brief => {
				if section.brief_lines > 0 {
					return Err(RenderFailure::BriefOverflow);
				}
				section.brief_lines += 1;
				self.lines.push(format!(" @brief {text}"));
			}
			SectionKind::Examples => {
				return Err(RenderFailure::UnexpectedEvent {
					event,
					section: SectionKind::Examples,
				});
			}
			SectionKind::Returns | SectionKind::Yields => section.joined.push(text.to_string()),
			_ => {
				self.close_code();
				if text.is_empty() {
					self.lines.push(String::new());
				} else {
					self.lines.push(format!(" {text}"));
				}
			}
		}

		Ok(())
	}

	fn code(&mut self, event: &'static str, code: String) -> Result<(), RenderFailure> {
		let section = open_section(&mut self.open, event)?;

		match section.kind {
			SectionKind::Examples => {}
			SectionKind::Description | SectionKind::Freeform(_) => {
				if !section.code_open {
					section.code_open = true;
					self.lines.push(" @code".to_string());
				}
			}
			ref kind => {
				return Err(RenderFailure::UnexpectedEvent {
					event,
					section: kind.clone(),
				});
			}
		}

		let section = open_section(&mut self.open, event)?;

		if code.trim().is_empty() {
			section.pending_blank += 1;
			return Ok(());
		}

		let blanks = std::mem::take(&mut section.pending_blank);
		self.push_blanks(blanks);
		self.lines.push(code);

		Ok(())
	}

	fn item(&mut self, event: &'static str, item: Item) -> Result<(), RenderFailure> {
		let kind = open_section(&mut self.open, event)?.kind.clone();

		if kind.holds_named_items() || kind.holds_free_text() {
			let [name] = item.names.as_slice() else {
				return Err(RenderFailure::MalformedItem {
					section: kind,
					found: item.names.len(),
				});
			};

			if name.trim().is_empty() {
				return Err(RenderFailure::EmptyName(kind));
			}

			if kind.holds_free_text() {
				self.close_code();
			}

			let tag = if kind == SectionKind::Attributes {
				"@property"
			} else {
				"@param"
			};
			// `[in]` style hints are doxygen parameter directions.
			let (tag, type_hint) = match item.type_hint {
				Some(hint) if is_direction(&hint) => (format!("{tag}{}", hint.replace(' ', "")), None),
				hint => (tag.to_string(), hint.map(|hint| format!("({hint})"))),
			};
			let line = [Some(tag.as_str()), Some(name.as_str()), type_hint.as_deref(), Some(item.description.as_str())]
				.into_iter()
				.flatten()
				.filter(|part| !part.is_empty())
				.collect::<Vec<_>>()
				.join(" ");
			self.lines.push(format!(" {line}"));

			return Ok(());
		}

		if item.names.is_empty() || item.names.iter().any(|name| name.trim().is_empty()) {
			return Err(RenderFailure::EmptyName(kind));
		}

		match kind {
			SectionKind::Raises => {
				let fresh: Vec<String> = item
					.names
					.into_iter()
					.filter(|name| self.seen_exceptions.insert(name.clone()))
					.collect();

				if !fresh.is_empty() {
					self.push_tagged("@exception", &fresh.join(", "), &item.description);
				}
			}
			SectionKind::SeeAlso => {
				self.push_tagged("@sa", &item.names.join(", "), &item.description);
			}
			kind => {
				return Err(RenderFailure::UnexpectedEvent {
					event,
					section: kind,
				});
			}
		}

		Ok(())
	}

	fn field(&mut self, event: &'static str, tag: FieldTag, text: &str) -> Result<(), RenderFailure> {
		let section = open_section(&mut self.open, event)?;

		match section.kind {
			SectionKind::Description | SectionKind::Freeform(_) => {}
			ref kind => {
				return Err(RenderFailure::UnexpectedEvent {
					event,
					section: kind.clone(),
				});
			}
		}

		self.close_code();
		self.lines.push(format!(" {} {text}", tag.tag()));

		Ok(())
	}

	/// Close an autocode block before ordinary text continues.
	fn close_code(&mut self) {
		let Some(section) = self.open.as_mut() else {
			return;
		};

		if section.code_open {
			section.code_open = false;
			let blanks = std::mem::take(&mut section.pending_blank);
			self.lines.push(" @endcode".to_string());
			self.push_blanks(blanks);
		}
	}

	fn push_joined(&mut self, tag: &str, parts: &[String]) {
		let text = parts.join(" ");
		if text.is_empty() {
			self.lines.push(format!(" {tag}"));
		} else {
			self.lines.push(format!(" {tag} {text}"));
		}
	}

	fn push_tagged(&mut self, tag: &str, names: &str, description: &str) {
		if description.is_empty() {
			self.lines.push(format!(" {tag} {names}"));
		} else {
			self.lines.push(format!(" {tag} {names} {description}"));
		}
	}

	fn push_blanks(&mut self, count: usize) {
		self.lines
			.extend(std::iter::repeat_n(String::new(), count));
	}
}

fn is_direction(hint: &str) -> bool {
	hint.strip_prefix('[')
		.and_then(|hint| hint.strip_suffix(']'))
		.is_some_and(|inner| {
			inner
				.split(',')
				.all(|part| matches!(part.trim(), "in" | "out"))
		})
}

fn open_section<'a>(
	open: &'a mut Option<OpenSection>,
	event: &'static str,
) -> Result<&'a mut OpenSection, RenderFailure> {
	open.as_mut().ok_or(RenderFailure::NoOpenSection(event))
}
