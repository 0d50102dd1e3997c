use std::fmt::Display;

/// The kind of definition a [`Node`] was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Module,
	Class,
	Function,
}

/// Visibility derived from a python name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
	#[default]
	Public,
	/// Single leading underscore, `_name`.
	Protected,
	/// Double leading underscore without a dunder suffix, `__name`.
	Private,
}

impl Visibility {
	/// Classify a python identifier. Dunder names such as `__init__` are
	/// public, `__name` is private and `_name` is protected.
	pub fn of(name: &str) -> Self {
		if name.ends_with("__") {
			return Self::Public;
		}

		if name.starts_with("__") {
			Self::Private
		} else if name.starts_with('_') {
			Self::Protected
		} else {
			Self::Public
		}
	}

	/// The doxygen tag for non-public visibilities.
	pub fn tag(self) -> Option<&'static str> {
		match self {
			Self::Public => None,
			Self::Protected => Some("@protected"),
			Self::Private => Some("@private"),
		}
	}
}

/// A definition found by the structural walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
	pub kind: NodeKind,
	pub name: String,
	/// Names of the enclosing classes and functions, outermost first. The
	/// module itself is not part of this path.
	pub namespace_path: Vec<String>,
	/// 1-based line of the `def`/`class` keyword (after any decorators). For
	/// the module node this is the first line of the file.
	pub start_line: usize,
	pub end_line: usize,
	pub is_private: bool,
	pub is_protected: bool,
	pub is_interface: bool,
	/// Raw docstring content between the quotes.
	pub docstring: Option<String>,
	/// 1-based line where the docstring literal starts.
	pub docstring_line: Option<usize>,
	/// Indentation (tab-expanded) shared by the docstring's continuation
	/// lines.
	pub docstring_indent_baseline: usize,
	/// Leading whitespace of the definition line, reused for injected lines.
	pub indent: String,
}

impl Node {
	pub fn visibility(&self) -> Visibility {
		if self.is_private {
			Visibility::Private
		} else if self.is_protected {
			Visibility::Protected
		} else {
			Visibility::Public
		}
	}

	/// Whether the node carries a docstring with any non-blank content.
	pub fn has_docstring(&self) -> bool {
		self.docstring
			.as_deref()
			.is_some_and(|doc| !doc.trim().is_empty())
	}
}

/// Declarations found inside definition bodies that get their own tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
	pub name: String,
	/// 1-based line of the statement.
	pub line: usize,
	pub indent: String,
	pub kind: MemberKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
	/// `name = Attribute("doc")` inside an interface declaration.
	Attribute { doc: String },
	/// Assignment to a private or protected simple name.
	Variable { visibility: Visibility },
	/// An interface protocol call or `@implementer(...)` decorator.
	Implements { interfaces: Vec<String> },
}

/// How a docstring should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTag {
	/// Headers and items are recognised.
	Conventional,
	/// Only brief and description are recognised.
	Interface,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKind {
	Brief,
	Description,
	Args,
	Kwargs,
	Attributes,
	Returns,
	Yields,
	Raises,
	SeeAlso,
	Examples,
	/// A section without a known header. Titled when opened by a `Title:`
	/// line, untitled when text continues after a dedent.
	Freeform(Option<String>),
}

impl SectionKind {
	/// Sections whose body is made of named items.
	pub fn holds_named_items(&self) -> bool {
		matches!(self, Self::Args | Self::Kwargs | Self::Attributes)
	}

	/// Sections whose items are name lists.
	pub fn holds_name_lists(&self) -> bool {
		matches!(self, Self::Raises | Self::SeeAlso)
	}

	pub fn holds_items(&self) -> bool {
		self.holds_named_items() || self.holds_name_lists()
	}

	/// Sections of running text, where fields and reStructuredText
	/// parameters may appear.
	pub fn holds_free_text(&self) -> bool {
		matches!(self, Self::Description | Self::Freeform(_))
	}
}

impl Display for SectionKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Brief => "brief",
			Self::Description => "description",
			Self::Args => "args",
			Self::Kwargs => "kwargs",
			Self::Attributes => "attributes",
			Self::Returns => "returns",
			Self::Yields => "yields",
			Self::Raises => "raises",
			Self::SeeAlso => "see also",
			Self::Examples => "examples",
			Self::Freeform(Some(title)) => return write!(f, "freeform `{title}`"),
			Self::Freeform(None) => "freeform",
		};

		write!(f, "{name}")
	}
}

/// A named entry inside a section, e.g. one argument.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Item {
	pub names: Vec<String>,
	pub type_hint: Option<String>,
	pub description: String,
}

impl Item {
	pub fn named(name: impl Into<String>, description: impl Into<String>) -> Self {
		Self {
			names: vec![name.into()],
			type_hint: None,
			description: description.into(),
		}
	}
}

/// Single-line fields rendered with their own tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTag {
	Note,
	Warning,
	Author,
	Version,
	Date,
	Copyright,
	File,
	/// A reStructuredText `:return:` field.
	Return,
}

impl FieldTag {
	pub fn tag(self) -> &'static str {
		match self {
			Self::Note => "@note",
			Self::Warning => "@warning",
			Self::Author => "@author",
			Self::Version => "@version",
			Self::Date => "@date",
			Self::Copyright => "@copyright",
			Self::File => "@file",
			Self::Return => "@return",
		}
	}
}

/// The unit passed from the section parser to the formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
	SectionStart(SectionKind),
	Item(Item),
	TextLine(String),
	CodeLine(String),
	Field { tag: FieldTag, text: String },
	SectionEnd,
}

impl Event {
	pub fn name(&self) -> &'static str {
		match self {
			Self::SectionStart(_) => "section start",
			Self::Item(_) => "item",
			Self::TextLine(_) => "text line",
			Self::CodeLine(_) => "code line",
			Self::Field { .. } => "field",
			Self::SectionEnd => "section end",
		}
	}
}

/// A fully collected section. Only built when a whole model is requested,
/// the streaming path never holds more than one open section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
	pub kind: SectionKind,
	pub items: Vec<Item>,
	pub raw_lines: Vec<String>,
}

/// Structured view of a docstring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocstringModel {
	pub style_tag: StyleTag,
	pub sections: Vec<Section>,
}

impl DocstringModel {
	/// Collect an event stream into sections. Fields are kept as raw lines of
	/// the section they appear in.
	pub fn from_events(style_tag: StyleTag, events: impl IntoIterator<Item = Event>) -> Self {
		let mut sections = Vec::new();
		let mut current: Option<Section> = None;

		for event in events {
			match event {
				Event::SectionStart(kind) => {
					if let Some(section) = current.take() {
						sections.push(section);
					}

					current = Some(Section {
						kind,
						items: Vec::new(),
						raw_lines: Vec::new(),
					});
				}
				Event::SectionEnd => {
					if let Some(section) = current.take() {
						sections.push(section);
					}
				}
				Event::Item(item) => {
					if let Some(section) = current.as_mut() {
						section.items.push(item);
					}
				}
				Event::TextLine(line) | Event::CodeLine(line) => {
					if let Some(section) = current.as_mut() {
						section.raw_lines.push(line);
					}
				}
				Event::Field { tag, text } => {
					if let Some(section) = current.as_mut() {
						section.raw_lines.push(format!("{} {text}", tag.tag()));
					}
				}
			}
		}

		if let Some(section) = current {
			sections.push(section);
		}

		Self {
			style_tag,
			sections,
		}
	}

	pub fn section(&self, kind: &SectionKind) -> Option<&Section> {
		self.sections.iter().find(|section| &section.kind == kind)
	}
}
