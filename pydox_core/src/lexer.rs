use logos::Logos;

use crate::FieldTag;
use crate::SectionKind;

/// Header spellings (lowercase, single spaced) and the section they open.
pub const SECTION_SYNONYMS: &[(&str, SectionKind)] = &[
	("args", SectionKind::Args),
	("arguments", SectionKind::Args),
	("parameters", SectionKind::Args),
	("params", SectionKind::Args),
	("kwargs", SectionKind::Kwargs),
	("keyword args", SectionKind::Kwargs),
	("keyword arguments", SectionKind::Kwargs),
	("other parameters", SectionKind::Kwargs),
	("attributes", SectionKind::Attributes),
	("attribute", SectionKind::Attributes),
	("returns", SectionKind::Returns),
	("return", SectionKind::Returns),
	("yields", SectionKind::Yields),
	("yield", SectionKind::Yields),
	("raises", SectionKind::Raises),
	("raise", SectionKind::Raises),
	("except", SectionKind::Raises),
	("exception", SectionKind::Raises),
	("exceptions", SectionKind::Raises),
	("see also", SectionKind::SeeAlso),
	("examples", SectionKind::Examples),
	("example", SectionKind::Examples),
	("doctest", SectionKind::Examples),
	("doctests", SectionKind::Examples),
];

/// Single line fields, `Note: text`.
pub const FIELD_TAGS: &[(&str, FieldTag)] = &[
	("note", FieldTag::Note),
	("warning", FieldTag::Warning),
	("author", FieldTag::Author),
	("authors", FieldTag::Author),
	("version", FieldTag::Version),
	("date", FieldTag::Date),
	("copyright", FieldTag::Copyright),
	("file", FieldTag::File),
];

/// What a reStructuredText field such as `:param x:` describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestRole {
	/// `:param [type] name: desc`
	Param,
	/// `:type name: type`
	Type,
	/// `:return: desc`
	Return,
	/// `:rtype: type`
	ReturnType,
}

/// reStructuredText field names and their role.
pub const REST_FIELDS: &[(&str, RestRole)] = &[
	("param", RestRole::Param),
	("parameter", RestRole::Param),
	("arg", RestRole::Param),
	("argument", RestRole::Param),
	("key", RestRole::Param),
	("keyword", RestRole::Param),
	("type", RestRole::Type),
	("return", RestRole::Return),
	("returns", RestRole::Return),
	("rtype", RestRole::ReturnType),
];

/// Raw tokens produced by logos for a single trimmed docstring line.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
	#[regex(r"\*{0,2}[A-Za-z_][A-Za-z0-9_.]*")]
	Word,
	#[token(":")]
	Colon,
	#[regex(r"-+")]
	Dashes,
	#[regex(r"=+")]
	Equals,
	#[token(",")]
	Comma,
	#[token("&")]
	Ampersand,
	#[token("(")]
	OpenParen,
	#[token(")")]
	CloseParen,
	#[token("[")]
	OpenBracket,
	#[token("]")]
	CloseBracket,
	#[token(">>>")]
	Prompt,
	#[regex(r"[ \t]+")]
	Space,
}

/// A token with its byte range inside the trimmed text. Bytes logos does not
/// recognise become `None`.
type Spanned = (Option<RawToken>, std::ops::Range<usize>);

fn tokenize(text: &str) -> Vec<Spanned> {
	RawToken::lexer(text)
		.spanned()
		.map(|(token, span)| (token.ok(), span))
		.collect()
}

/// Column width of `prefix` once tabs are expanded.
pub fn indent_width(prefix: &str, tab_length: usize) -> usize {
	let tab_length = tab_length.max(1);

	prefix.chars().fold(0, |column, c| {
		if c == '\t' {
			(column / tab_length + 1) * tab_length
		} else {
			column + 1
		}
	})
}

/// Replace tabs with spaces up to the next tab stop.
pub fn expand_tabs(line: &str, tab_length: usize) -> String {
	let tab_length = tab_length.max(1);
	let mut expanded = String::with_capacity(line.len());
	let mut column = 0;

	for c in line.chars() {
		if c == '\t' {
			let width = tab_length - column % tab_length;
			expanded.extend(std::iter::repeat_n(' ', width));
			column += width;
		} else {
			expanded.push(c);
			column += 1;
		}
	}

	expanded
}

/// Smallest indentation of the non-blank lines after the first one. The
/// first line follows the opening quotes so it is not measured.
pub fn docstring_baseline(docstring: &str, tab_length: usize) -> usize {
	docstring
		.split('\n')
		.skip(1)
		.map(|raw| DocLine::new(raw, tab_length))
		.filter(|line| !line.is_blank())
		.map(|line| line.indent)
		.min()
		.unwrap_or(0)
}

/// A parsed `:role args: text` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestField<'a> {
	pub role: RestRole,
	/// The parameter a `:param` or `:type` field names.
	pub name: Option<&'a str>,
	/// Words between the role and the name, `:param int x:`.
	pub type_hint: Option<String>,
	pub text: &'a str,
}

/// The head of an item line, `name (type): description`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemHead {
	pub names: Vec<String>,
	pub type_hint: Option<String>,
	pub description: String,
	/// `name : text` with whitespace before the colon, the numpy spelling.
	pub spaced_colon: bool,
}

/// One line of a docstring together with its measured indentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLine<'a> {
	/// The line exactly as it appears in the source, minus the line ending.
	pub raw: &'a str,
	/// Indentation in columns with tabs expanded.
	pub indent: usize,
	/// The line without surrounding whitespace.
	pub text: &'a str,
}

impl<'a> DocLine<'a> {
	pub fn new(raw: &'a str, tab_length: usize) -> Self {
		let raw = raw.strip_suffix('\r').unwrap_or(raw);
		let text = raw.trim();
		let leading = &raw[..raw.len() - raw.trim_start().len()];

		Self {
			raw,
			indent: indent_width(leading, tab_length),
			text,
		}
	}

	pub fn is_blank(&self) -> bool {
		self.text.is_empty()
	}

	pub fn is_prompt(&self) -> bool {
		self.text.starts_with(">>>")
	}

	/// A header on its own line, `Args:`. Returns the section and any text
	/// following the colon on the same line.
	pub fn header(&self) -> Option<(SectionKind, Option<&'a str>)> {
		let (name, rest) = self.text.split_once(':')?;
		let kind = lookup_section(name)?;
		let rest = rest.trim();

		if rest.is_empty() {
			return Some((kind, None));
		}

		// Inline content is only meaningful for sections that take free text
		// or a list of names.
		match kind {
			SectionKind::Returns | SectionKind::Yields | SectionKind::Raises | SectionKind::SeeAlso => {
				Some((kind, Some(rest)))
			}
			_ => None,
		}
	}

	/// The section named by the whole line, without a colon. Used for
	/// underlined headers.
	pub fn bare_header(&self) -> Option<SectionKind> {
		lookup_section(self.text)
	}

	/// A capitalised one or two word title, with or without a trailing colon.
	pub fn title(&self, needs_colon: bool) -> Option<&'a str> {
		let text = match self.text.strip_suffix(':') {
			Some(stripped) => stripped,
			None if needs_colon => return None,
			None => self.text,
		};

		let tokens = tokenize(text);
		let words: Vec<&str> = tokens
			.iter()
			.filter(|(token, _)| *token != Some(RawToken::Space))
			.map(|(token, span)| {
				match token {
					Some(RawToken::Word) => Some(&text[span.clone()]),
					_ => None,
				}
			})
			.collect::<Option<_>>()?;

		let valid = (1..=2).contains(&words.len())
			&& words.iter().all(|word| {
				word.starts_with(|c: char| c.is_ascii_uppercase())
					&& word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
			});

		valid.then_some(text)
	}

	/// The length of a `----` or `====` underline.
	pub fn underline_len(&self) -> Option<usize> {
		match tokenize(self.text).as_slice() {
			[(Some(RawToken::Dashes | RawToken::Equals), _)] => Some(self.text.chars().count()),
			_ => None,
		}
	}

	/// `Note: text` style fields.
	pub fn field(&self) -> Option<(FieldTag, &'a str)> {
		let (name, rest) = self.text.split_once(':')?;
		let name = name.trim().to_ascii_lowercase();
		let rest = rest.trim();

		if rest.is_empty() {
			return None;
		}

		FIELD_TAGS
			.iter()
			.find(|(candidate, _)| *candidate == name)
			.map(|(_, tag)| (*tag, rest))
	}

	/// `name: desc`, `name - desc`, `name (type): desc` or `*args: desc`.
	pub fn item_head(&self) -> Option<ItemHead> {
		let text = self.text;
		let tokens = tokenize(text);
		let mut cursor = tokens.iter().peekable();

		let (Some(RawToken::Word), span) = cursor.next()? else {
			return None;
		};
		let name = &text[span.clone()];

		if name.ends_with('.') {
			return None;
		}

		let mut spaced = false;
		if matches!(cursor.peek(), Some((Some(RawToken::Space), _))) {
			cursor.next();
			spaced = true;
		}

		let mut type_hint = None;
		if matches!(cursor.peek(), Some((Some(RawToken::OpenParen), _))) {
			let (_, open) = cursor.next()?;
			let mut depth = 1usize;
			let mut close = None;

			for (token, span) in cursor.by_ref() {
				match token {
					Some(RawToken::OpenParen | RawToken::OpenBracket) => depth += 1,
					Some(RawToken::CloseParen | RawToken::CloseBracket) => {
						depth -= 1;
						if depth == 0 {
							close = Some(span.start);
							break;
						}
					}
					_ => {}
				}
			}

			type_hint = Some(text[open.end..close?].trim().to_string());
			spaced = false;

			if matches!(cursor.peek(), Some((Some(RawToken::Space), _))) {
				cursor.next();
				spaced = true;
			}
		}

		let (separator, span) = cursor.next()?;
		let description_start = match separator {
			Some(RawToken::Colon) => span.end,
			// A dash separator needs space on both sides to tell it from
			// hyphenated prose.
			Some(RawToken::Dashes) if spaced && span.len() <= 2 => {
				match cursor.peek() {
					Some((Some(RawToken::Space), _)) | None => span.end,
					_ => return None,
				}
			}
			_ => return None,
		};

		Some(ItemHead {
			names: vec![name.to_string()],
			type_hint,
			description: text[description_start..].trim().to_string(),
			spaced_colon: spaced && *separator == Some(RawToken::Colon),
		})
	}

	/// A single identifier alone on its line, the numpy spelling of a
	/// parameter whose description follows on deeper lines.
	pub fn bare_name(&self) -> Option<&'a str> {
		match tokenize(self.text).as_slice() {
			[(Some(RawToken::Word), _)] if !self.text.ends_with('.') => Some(self.text),
			_ => None,
		}
	}

	/// A reStructuredText field, `:param x: desc` or `:rtype: int`.
	pub fn rest_field(&self) -> Option<RestField<'a>> {
		let (inner, text) = self.text.strip_prefix(':')?.split_once(':')?;
		let mut words = inner.split_whitespace();
		let keyword = words.next()?.to_ascii_lowercase();
		let role = REST_FIELDS
			.iter()
			.find(|(candidate, _)| *candidate == keyword)
			.map(|(_, role)| *role)?;
		let words: Vec<&str> = words.collect();
		let text = text.trim();

		match role {
			RestRole::Param => {
				let (name, hint) = words.split_last()?;
				if !is_identifier(name) {
					return None;
				}

				Some(RestField {
					role,
					name: Some(*name),
					type_hint: Some(hint.join(" ")).filter(|hint| !hint.is_empty()),
					text,
				})
			}
			RestRole::Type => {
				let [name] = words.as_slice() else {
					return None;
				};

				is_identifier(name).then_some(RestField {
					role,
					name: Some(*name),
					type_hint: None,
					text,
				})
			}
			RestRole::Return | RestRole::ReturnType => {
				words.is_empty().then_some(RestField {
					role,
					name: None,
					type_hint: None,
					text,
				})
			}
		}
	}

	/// A list of names, `A, B, & C.` or `A and B`, optionally followed by a
	/// colon and a description.
	pub fn name_list(&self) -> Option<ItemHead> {
		let text = self.text;
		let mut names = Vec::new();
		let mut expect_name = true;
		let mut description = String::new();

		for (token, span) in tokenize(text) {
			match token {
				Some(RawToken::Space) => {}
				Some(RawToken::Word) if &text[span.clone()] == "and" => {
					if expect_name && names.is_empty() {
						return None;
					}
					expect_name = true;
				}
				Some(RawToken::Word) => {
					if !expect_name {
						return None;
					}
					names.push(text[span].trim_end_matches('.').to_string());
					expect_name = false;
				}
				Some(RawToken::Comma | RawToken::Ampersand) => {
					if names.is_empty() {
						return None;
					}
					expect_name = true;
				}
				Some(RawToken::Colon) if !names.is_empty() => {
					description = text[span.end..].trim().to_string();
					break;
				}
				_ => return None,
			}
		}

		if names.is_empty() || names.iter().any(String::is_empty) {
			return None;
		}

		Some(ItemHead {
			names,
			type_hint: None,
			description,
			spaced_colon: false,
		})
	}
}

fn is_identifier(word: &str) -> bool {
	let name = word.trim_start_matches('*');

	name.starts_with(|c: char| c.is_alphabetic() || c == '_')
		&& name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Normalise a header candidate and find its section.
fn lookup_section(name: &str) -> Option<SectionKind> {
	let normalized = name
		.split_whitespace()
		.collect::<Vec<_>>()
		.join(" ")
		.to_ascii_lowercase();

	SECTION_SYNONYMS
		.iter()
		.find(|(synonym, _)| *synonym == normalized)
		.map(|(_, kind)| kind.clone())
}
