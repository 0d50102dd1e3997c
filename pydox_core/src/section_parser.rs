use std::collections::HashSet;

use crate::Event;
use crate::EventSource;
use crate::FieldTag;
use crate::FilterOptions;
use crate::Item;
use crate::SectionKind;
use crate::StyleTag;
use crate::lexer::DocLine;
use crate::lexer::ItemHead;
use crate::lexer::RestField;
use crate::lexer::RestRole;

/// A line the parser could not place and emitted as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionAmbiguity {
	/// 0-based line offset from the line holding the opening quotes.
	pub offset: usize,
	pub section: SectionKind,
	pub text: String,
}

/// State kept for the one section currently open.
#[derive(Debug)]
struct OpenSection {
	kind: SectionKind,
	/// Indentation of the header line. `None` for sections without a header.
	header_indent: Option<usize>,
	/// The header was written with a `----` underline.
	underlined: bool,
	/// Indentation of the first content line.
	content_indent: Option<usize>,
	/// The brief line has been emitted.
	emitted: bool,
	/// Inside an autocode fragment.
	in_code: bool,
	after_blank: bool,
	/// Parameters whose `:type` line was folded into their `:param` item.
	typed: HashSet<String>,
	/// An `:rtype` line was folded into a `:return` field.
	return_typed: bool,
}

/// Splits a docstring into section events.
///
/// Every call to [`EventSource::resume`] yields at most one [`Event`]. The
/// parser may look ahead at later lines to decide what the current line is,
/// but it never holds more than the open section's state between calls.
/// When a line closes one section and opens another, the `SectionEnd` is
/// returned first and the same line is examined again on the next call.
pub struct SectionParser<'a> {
	lines: Vec<DocLine<'a>>,
	/// Number of leading blank lines removed before parsing.
	skipped: usize,
	cursor: usize,
	style: StyleTag,
	autocode: bool,
	baseline: usize,
	open: Option<OpenSection>,
	last_closed: Option<SectionKind>,
	opened_any: bool,
	/// Text following an inline header such as `Returns: the value`.
	inline: Option<&'a str>,
	ambiguities: Vec<SectionAmbiguity>,
}

impl<'a> SectionParser<'a> {
	/// `baseline` is the indentation shared by the docstring's continuation
	/// lines, see [`docstring_baseline`](crate::lexer::docstring_baseline).
	pub fn new(docstring: &'a str, baseline: usize, style: StyleTag, options: &FilterOptions) -> Self {
		let mut lines: Vec<DocLine<'a>> = docstring
			.split('\n')
			.map(|raw| DocLine::new(raw, options.tab_length))
			.collect();

		// The first line follows the opening quotes so its own indentation
		// carries no meaning.
		if let Some(first) = lines.first_mut() {
			first.indent = baseline;
		}

		let start = lines
			.iter()
			.position(|line| !line.is_blank())
			.unwrap_or(lines.len());
		let end = lines
			.iter()
			.rposition(|line| !line.is_blank())
			.map_or(start, |index| index + 1);
		lines.truncate(end);
		lines.drain(..start);

		Self {
			lines,
			skipped: start,
			cursor: 0,
			style,
			autocode: options.autocode,
			baseline,
			open: None,
			last_closed: None,
			opened_any: false,
			inline: None,
			ambiguities: Vec::new(),
		}
	}

	pub fn into_ambiguities(self) -> Vec<SectionAmbiguity> {
		self.ambiguities
	}

	fn next_event(&mut self) -> Option<Event> {
		loop {
			if let Some(inline) = self.inline.take() {
				if let Some(event) = self.inline_event(inline) {
					return Some(event);
				}
			}

			let Some(line) = self.lines.get(self.cursor).cloned() else {
				return self.close();
			};

			let Some(section) = self.open.as_ref() else {
				if line.is_blank() {
					self.cursor += 1;
					continue;
				}

				return Some(self.open_section(&line));
			};

			if self.closes(section, &line) {
				return self.close();
			}

			if let Some(event) = self.content(&line) {
				return Some(event);
			}
		}
	}

	fn close(&mut self) -> Option<Event> {
		let section = self.open.take()?;
		self.last_closed = Some(section.kind);

		Some(Event::SectionEnd)
	}

	fn start(&mut self, kind: SectionKind, header_indent: Option<usize>, underlined: bool) -> Event {
		self.opened_any = true;
		self.open = Some(OpenSection {
			kind: kind.clone(),
			header_indent,
			underlined,
			content_indent: None,
			emitted: false,
			in_code: false,
			after_blank: false,
			typed: HashSet::new(),
			return_typed: false,
		});

		Event::SectionStart(kind)
	}

	/// Decide which section begins at `line`. Header lines are consumed here.
	fn open_section(&mut self, line: &DocLine<'a>) -> Event {
		let first = !self.opened_any;

		if let Some((kind, consumed)) = self.section_header(self.cursor) {
			if let Some((_, inline)) = line.header() {
				self.inline = inline;
			}
			self.cursor += consumed;

			return self.start(kind, Some(line.indent), consumed == 2);
		}

		if first && self.is_brief(self.cursor) {
			return self.start(SectionKind::Brief, None, false);
		}

		let kind = match self.last_closed {
			None | Some(SectionKind::Brief) => SectionKind::Description,
			Some(_) => SectionKind::Freeform(None),
		};

		self.start(kind, None, false)
	}

	/// A header starting at `index` and the number of lines it spans.
	fn section_header(&self, index: usize) -> Option<(SectionKind, usize)> {
		if self.style == StyleTag::Interface {
			return None;
		}

		let line = self.lines.get(index)?;
		if line.is_blank() {
			return None;
		}

		if let Some((kind, _)) = line.header() {
			return Some((kind, 1));
		}

		let underline = self
			.lines
			.get(index + 1)
			.and_then(DocLine::underline_len)
			.filter(|&length| length >= line.text.chars().count());

		if underline.is_some() {
			if let Some(kind) = line.bare_header() {
				return Some((kind, 2));
			}

			if let Some(title) = line.title(false) {
				return Some((SectionKind::Freeform(Some(title.to_string())), 2));
			}
		}

		if line.field().is_none() {
			if let Some(title) = line.title(true) {
				return Some((SectionKind::Freeform(Some(title.to_string())), 1));
			}
		}

		None
	}

	/// The first line is a brief when it stands alone.
	fn is_brief(&self, index: usize) -> bool {
		match self.lines.get(index + 1) {
			None => true,
			Some(next) if next.is_blank() => true,
			Some(_) => self.section_header(index + 1).is_some(),
		}
	}

	/// Whether `line` ends the open section. Blank lines only end a brief.
	fn closes(&self, section: &OpenSection, line: &DocLine<'a>) -> bool {
		if section.kind == SectionKind::Brief {
			return section.emitted;
		}

		if line.is_blank() {
			return false;
		}

		if section.kind == SectionKind::Examples {
			return section
				.content_indent
				.is_some_and(|baseline| line.indent < baseline);
		}

		if self.section_header(self.cursor).is_some() {
			return true;
		}

		let Some(header_indent) = section.header_indent else {
			return false;
		};

		match &section.kind {
			kind if section.underlined && kind.holds_items() => {
				line.indent < header_indent
					|| (line.indent == header_indent && self.item_head(kind, self.cursor).is_none())
			}
			_ if section.underlined => line.indent < header_indent,
			_ => line.indent <= header_indent,
		}
	}

	fn item_head(&self, kind: &SectionKind, index: usize) -> Option<ItemHead> {
		let line = self.lines.get(index)?;
		let head = if kind.holds_name_lists() {
			line.name_list().or_else(|| line.item_head())
		} else {
			line.item_head()
		};

		head.or_else(|| self.bare_item(kind, index))
	}

	/// A parameter name alone on its line under an underlined header, with
	/// its description on the deeper lines below.
	fn bare_item(&self, kind: &SectionKind, index: usize) -> Option<ItemHead> {
		let underlined = self.open.as_ref().is_some_and(|section| section.underlined);
		if !underlined || !kind.holds_named_items() {
			return None;
		}

		let line = self.lines.get(index)?;
		let name = line.bare_name()?;
		let described = self
			.lines
			.get(index + 1)
			.is_some_and(|next| !next.is_blank() && next.indent > line.indent);

		described.then(|| {
			ItemHead {
				names: vec![name.to_string()],
				type_hint: None,
				description: String::new(),
				spaced_colon: false,
			}
		})
	}

	/// Content of the open section at the cursor. Returns `None` for lines
	/// that produce no event.
	fn content(&mut self, line: &DocLine<'a>) -> Option<Event> {
		let kind = self.open.as_ref()?.kind.clone();

		match kind {
			SectionKind::Brief => {
				self.cursor += 1;
				let section = self.open.as_mut()?;
				section.emitted = true;
				Some(Event::TextLine(self.text_of(line)))
			}
			SectionKind::Examples => {
				self.cursor += 1;
				let section = self.open.as_mut()?;

				if section.content_indent.is_none() {
					if line.is_blank() {
						return None;
					}
					section.content_indent = Some(line.indent);
				}

				Some(Event::CodeLine(line.raw.to_string()))
			}
			SectionKind::Returns | SectionKind::Yields => {
				self.cursor += 1;

				if line.is_blank() {
					None
				} else {
					Some(Event::TextLine(line.text.to_string()))
				}
			}
			ref items if items.holds_items() => {
				if line.is_blank() {
					self.cursor += 1;
					return None;
				}

				Some(self.item(items, line))
			}
			_ => self.free_text(line),
		}
	}

	fn item(&mut self, kind: &SectionKind, line: &DocLine<'a>) -> Event {
		let section_indent = self
			.open
			.as_mut()
			.map_or(line.indent, |section| *section.content_indent.get_or_insert(line.indent));
		let underlined = self.open.as_ref().is_some_and(|section| section.underlined);

		let head = if line.indent <= section_indent {
			self.item_head(kind, self.cursor)
		} else {
			None
		};

		self.cursor += 1;

		let Some(head) = head else {
			tracing::debug!(section = %kind, text = line.text, "line does not fit the section");
			self.ambiguities.push(SectionAmbiguity {
				offset: self.skipped + self.cursor - 1,
				section: kind.clone(),
				text: line.text.to_string(),
			});

			return Event::TextLine(line.text.to_string());
		};

		let continuation = self.continuation(kind, line.indent);
		let ItemHead {
			names,
			mut type_hint,
			description,
			spaced_colon,
		} = head;

		// `name : type` followed by an indented description.
		let description = if underlined && spaced_colon && type_hint.is_none() && kind.holds_named_items() {
			type_hint = Some(description).filter(|hint| !hint.is_empty());
			continuation.join(" ")
		} else {
			std::iter::once(description)
				.chain(continuation)
				.filter(|part| !part.is_empty())
				.collect::<Vec<_>>()
				.join(" ")
		};

		Event::Item(Item {
			names,
			type_hint,
			description,
		})
	}

	/// Collect the lines that extend an item head: lines indented deeper than
	/// the head, and for headed sections the lines directly below it at the
	/// same indentation that do not start an item of their own. Blank lines
	/// are only crossed when deeper continuation follows them.
	fn continuation(&mut self, kind: &SectionKind, head_indent: usize) -> Vec<String> {
		let wraps = kind.holds_items() && self.open.as_ref().is_some_and(|section| !section.underlined);
		let mut parts = Vec::new();

		loop {
			let next = (self.cursor..self.lines.len()).find(|&index| !self.lines[index].is_blank());
			let Some(index) = next else {
				break;
			};

			if self.section_header(index).is_some() {
				break;
			}

			let line = &self.lines[index];
			let deeper = line.indent > head_indent;
			let wrapped = wraps
				&& index == self.cursor
				&& line.indent == head_indent
				&& self.item_head(kind, index).is_none();

			if !deeper && !wrapped {
				break;
			}

			parts.push(line.text.to_string());
			self.cursor = index + 1;
		}

		parts
	}

	fn free_text(&mut self, line: &DocLine<'a>) -> Option<Event> {
		self.cursor += 1;

		let autocode = self.autocode;
		let baseline = self.baseline;
		let conventional = self.style == StyleTag::Conventional;
		let in_code = self.open.as_ref().is_some_and(|section| section.in_code);

		if conventional && !in_code {
			if let Some(field) = line.rest_field() {
				if let Some(section) = self.open.as_mut() {
					section.after_blank = false;
				}

				return self.rest_event(line, field);
			}
		}

		let next_code = self.next_is_code();
		let Some(section) = self.open.as_mut() else {
			return Some(Event::TextLine(line.text.to_string()));
		};

		if line.is_blank() {
			section.after_blank = true;

			if section.in_code && next_code {
				return Some(Event::CodeLine(line.raw.to_string()));
			}

			section.in_code = false;
			return Some(Event::TextLine(String::new()));
		}

		let after_blank = std::mem::replace(&mut section.after_blank, false);

		if !section.in_code && conventional {
			if let Some((tag, text)) = line.field() {
				return Some(Event::Field {
					tag,
					text: text.to_string(),
				});
			}
		}

		if autocode {
			let text_indent = section.content_indent.unwrap_or(baseline);
			let indented = after_blank && line.indent > text_indent;

			if section.in_code || line.is_prompt() || indented {
				section.in_code = true;
				return Some(Event::CodeLine(line.raw.to_string()));
			}
		}

		// Text under a header is measured from the section's first line.
		let content_indent = *section.content_indent.get_or_insert(line.indent);
		let base = if section.header_indent.is_some() {
			content_indent
		} else {
			baseline
		};
		let relative = line.indent.saturating_sub(base);

		Some(Event::TextLine(format!("{}{}", " ".repeat(relative), line.text)))
	}

	/// A reStructuredText field in running text. `:type` and `:rtype` lines
	/// further down the same field list are folded into the `:param` and
	/// `:return` they describe and produce no event of their own.
	fn rest_event(&mut self, line: &DocLine<'a>, field: RestField<'a>) -> Option<Event> {
		let kind = self.open.as_ref()?.kind.clone();

		match field.role {
			RestRole::Param => {
				let name = field.name?;
				let continuation = self.continuation(&kind, line.indent);
				let type_hint = field
					.type_hint
					.or_else(|| self.folded_type(Some(name), line.indent));
				let description = std::iter::once(field.text.to_string())
					.chain(continuation)
					.filter(|part| !part.is_empty())
					.collect::<Vec<_>>()
					.join(" ");

				Some(Event::Item(Item {
					names: vec![name.to_string()],
					type_hint,
					description,
				}))
			}
			RestRole::Return => {
				let continuation = self.continuation(&kind, line.indent);
				let text = self
					.folded_type(None, line.indent)
					.into_iter()
					.chain(std::iter::once(field.text.to_string()))
					.chain(continuation)
					.filter(|part| !part.is_empty())
					.collect::<Vec<_>>()
					.join(" ");

				Some(Event::Field {
					tag: FieldTag::Return,
					text,
				})
			}
			RestRole::Type => {
				let folded = field
					.name
					.is_some_and(|name| self.open.as_ref().is_some_and(|section| section.typed.contains(name)));

				(!folded).then(|| Event::TextLine(line.text.to_string()))
			}
			RestRole::ReturnType => {
				let folded = self.open.as_ref().is_some_and(|section| section.return_typed);

				(!folded).then(|| {
					Event::Field {
						tag: FieldTag::Return,
						text: field.text.to_string(),
					}
				})
			}
		}
	}

	/// Find the `:type name:` (or `:rtype:` when `name` is `None`) line later
	/// in the field list starting at `field_indent` and mark it as consumed.
	fn folded_type(&mut self, name: Option<&str>, field_indent: usize) -> Option<String> {
		let wanted = if name.is_some() {
			RestRole::Type
		} else {
			RestRole::ReturnType
		};

		let found = self.lines[self.cursor.min(self.lines.len())..]
			.iter()
			.filter(|line| !line.is_blank())
			.take_while(|line| line.indent > field_indent || line.rest_field().is_some())
			.filter_map(DocLine::rest_field)
			.find(|field| field.role == wanted && field.name == name)?;

		let section = self.open.as_mut()?;
		match name {
			Some(name) => {
				section.typed.insert(name.to_string());
			}
			None => section.return_typed = true,
		}

		Some(found.text.to_string()).filter(|text| !text.is_empty())
	}

	/// Whether the next non-blank line continues an autocode fragment.
	fn next_is_code(&self) -> bool {
		let Some(section) = self.open.as_ref() else {
			return false;
		};
		let text_indent = section.content_indent.unwrap_or(self.baseline);

		self.lines[self.cursor.min(self.lines.len())..]
			.iter()
			.find(|line| !line.is_blank())
			.is_some_and(|line| line.is_prompt() || line.indent > text_indent)
	}

	fn inline_event(&mut self, inline: &'a str) -> Option<Event> {
		let kind = self.open.as_ref()?.kind.clone();
		let line = DocLine::new(inline, 1);

		if kind.holds_name_lists() {
			if let Some(head) = line.name_list() {
				return Some(Event::Item(Item {
					names: head.names,
					type_hint: None,
					description: head.description,
				}));
			}
		}

		Some(Event::TextLine(line.text.to_string()))
	}

	/// Free text with the docstring baseline removed.
	fn text_of(&self, line: &DocLine<'a>) -> String {
		if line.is_blank() {
			return String::new();
		}

		let relative = line.indent.saturating_sub(self.baseline);
		format!("{}{}", " ".repeat(relative), line.text)
	}
}

impl EventSource for SectionParser<'_> {
	fn resume(&mut self) -> Option<Event> {
		self.next_event()
	}
}
