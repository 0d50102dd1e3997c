use tree_sitter::Node as SyntaxNode;
use tree_sitter::Parser;
use tree_sitter::Tree;

use crate::Member;
use crate::MemberKind;
use crate::Node;
use crate::NodeKind;
use crate::PydoxError;
use crate::PydoxResult;
use crate::Visibility;
use crate::lexer::docstring_baseline;

/// Base class spellings that mark an interface declaration.
const INTERFACE_BASES: [&str; 3] = ["Interface", "interface.Interface", "zope.interface.Interface"];

/// Callables that declare an interface attribute.
const ATTRIBUTE_CALLS: [&str; 3] = ["Attribute", "interface.Attribute", "zope.interface.Attribute"];

/// Interface protocol calls, compared case-insensitively against the last
/// dotted component.
const PROTOCOL_CALLS: [&str; 8] = [
	"implements",
	"provides",
	"classimplements",
	"classprovides",
	"moduleimplements",
	"moduleprovides",
	"directlyimplements",
	"directlyprovides",
];

/// Everything the walker extracted from one source unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Structure {
	/// The module node first, then every class and function in source order.
	pub nodes: Vec<Node>,
	pub members: Vec<Member>,
}

/// Parse python source. Any error or missing node in the tree is fatal.
pub fn parse_python(source: &str) -> PydoxResult<Tree> {
	let mut parser = Parser::new();
	parser
		.set_language(&tree_sitter_python::LANGUAGE.into())
		.map_err(|e| PydoxError::Grammar(e.to_string()))?;

	let tree = parser
		.parse(source, None)
		.ok_or_else(|| PydoxError::Grammar("the parser produced no syntax tree".to_string()))?;

	let root = tree.root_node();
	if root.has_error() {
		let node = first_error(root).unwrap_or(root);
		let position = node.start_position();
		let message = if node.is_missing() {
			format!("expected `{}`", node.kind())
		} else {
			let text = node
				.utf8_text(source.as_bytes())
				.unwrap_or_default()
				.lines()
				.next()
				.unwrap_or_default();
			format!("invalid syntax near `{text}`")
		};

		return Err(PydoxError::Parse {
			line: position.row + 1,
			column: position.column + 1,
			message,
		});
	}

	Ok(tree)
}

fn first_error(node: SyntaxNode<'_>) -> Option<SyntaxNode<'_>> {
	if node.is_error() || node.is_missing() {
		return Some(node);
	}

	if !node.has_error() {
		return None;
	}

	let mut cursor = node.walk();
	let children: Vec<_> = node.children(&mut cursor).collect();
	children.into_iter().find_map(first_error)
}

/// Walk a python source unit and collect its definitions.
///
/// `module_name` names the module node. It is only used for reporting, the
/// namespace resolver decides the emitted namespace.
pub fn walk(source: &str, module_name: &str, tab_length: usize) -> PydoxResult<Structure> {
	let tree = parse_python(source)?;
	let root = tree.root_node();
	let mut walker = Walker {
		source,
		lines: source.lines().collect(),
		tab_length,
		structure: Structure::default(),
	};

	walker.module(root, module_name);
	walker.visit_children(root, &mut Vec::new());

	Ok(walker.structure)
}

struct Docstring {
	text: String,
	line: usize,
	baseline: usize,
}

struct Walker<'s> {
	source: &'s str,
	lines: Vec<&'s str>,
	tab_length: usize,
	structure: Structure,
}

impl<'s> Walker<'s> {
	fn text(&self, node: SyntaxNode<'_>) -> &'s str {
		node.utf8_text(self.source.as_bytes()).unwrap_or_default()
	}

	/// Leading whitespace of a 1-based source line.
	fn indent_of(&self, line: usize) -> String {
		self.lines
			.get(line.saturating_sub(1))
			.map(|text| text[..text.len() - text.trim_start().len()].to_string())
			.unwrap_or_default()
	}

	fn module(&mut self, root: SyntaxNode<'_>, module_name: &str) {
		let docstring = self.docstring(root);
		let indent = docstring
			.as_ref()
			.map(|doc| self.indent_of(doc.line))
			.unwrap_or_default();

		self.structure.nodes.push(Node {
			kind: NodeKind::Module,
			name: module_name.to_string(),
			namespace_path: Vec::new(),
			start_line: 1,
			end_line: self.lines.len().max(1),
			is_private: false,
			is_protected: false,
			is_interface: false,
			indent,
			docstring_line: docstring.as_ref().map(|doc| doc.line),
			docstring_indent_baseline: docstring.as_ref().map_or(0, |doc| doc.baseline),
			docstring: docstring.map(|doc| doc.text),
		});
	}

	fn visit_children(&mut self, node: SyntaxNode<'_>, path: &mut Vec<String>) {
		let mut cursor = node.walk();
		let children: Vec<_> = node.named_children(&mut cursor).collect();

		for child in children {
			self.visit(child, path);
		}
	}

	fn visit(&mut self, node: SyntaxNode<'_>, path: &mut Vec<String>) {
		match node.kind() {
			"function_definition" | "class_definition" => self.definition(node, path),
			"decorated_definition" => {
				if let Some(definition) = node.child_by_field_name("definition") {
					self.decorators(node, definition);
					self.definition(definition, path);
				}
			}
			"expression_statement" => self.statement(node),
			_ => self.visit_children(node, path),
		}
	}

	fn definition(&mut self, node: SyntaxNode<'_>, path: &mut Vec<String>) {
		let Some(name_node) = node.child_by_field_name("name") else {
			return;
		};

		let name = self.text(name_node).to_string();
		let kind = if node.kind() == "class_definition" {
			NodeKind::Class
		} else {
			NodeKind::Function
		};
		let body = node.child_by_field_name("body");
		let docstring = body.and_then(|body| self.docstring(body));
		let visibility = Visibility::of(&name);
		let start_line = node.start_position().row + 1;
		let is_interface = kind == NodeKind::Class && self.is_interface(node);
		let indent = self.indent_of(start_line);

		tracing::debug!(name = %name, line = start_line, kind = ?kind, "walked definition");

		self.structure.nodes.push(Node {
			kind,
			name: name.clone(),
			namespace_path: path.clone(),
			start_line,
			end_line: node.end_position().row + 1,
			is_private: visibility == Visibility::Private,
			is_protected: visibility == Visibility::Protected,
			is_interface,
			indent,
			docstring_line: docstring.as_ref().map(|doc| doc.line),
			docstring_indent_baseline: docstring.as_ref().map_or(0, |doc| doc.baseline),
			docstring: docstring.map(|doc| doc.text),
		});

		if let Some(body) = body {
			path.push(name);
			self.visit_children(body, path);
			path.pop();
		}
	}

	/// The first statement of a body when it is a plain string literal.
	fn docstring(&self, body: SyntaxNode<'_>) -> Option<Docstring> {
		let mut cursor = body.walk();
		let first = body
			.named_children(&mut cursor)
			.find(|child| child.kind() != "comment")?;

		if first.kind() != "expression_statement" || first.named_child_count() != 1 {
			return None;
		}

		let string = first.named_child(0)?;
		if string.kind() != "string" {
			return None;
		}

		let text = string_body(self.text(string))?.to_string();
		let baseline = docstring_baseline(&text, self.tab_length);

		Some(Docstring {
			text,
			line: string.start_position().row + 1,
			baseline,
		})
	}

	fn is_interface(&self, class: SyntaxNode<'_>) -> bool {
		if let Some(bases) = class.child_by_field_name("superclasses") {
			let mut cursor = bases.walk();
			let derives = bases
				.named_children(&mut cursor)
				.any(|base| INTERFACE_BASES.contains(&self.text(base)));

			if derives {
				return true;
			}
		}

		let Some(body) = class.child_by_field_name("body") else {
			return false;
		};

		let mut declarative = false;
		let mut cursor = body.walk();
		let statements: Vec<_> = body.named_children(&mut cursor).collect();

		for statement in statements {
			match statement.kind() {
				"comment" | "pass_statement" => {}
				"expression_statement" => {
					let Some(expression) = statement.named_child(0) else {
						return false;
					};

					match expression.kind() {
						"string" => {}
						"assignment" => {
							let right = expression.child_by_field_name("right");
							if right.and_then(|right| self.attribute_call(right)).is_none() {
								return false;
							}
							declarative = true;
						}
						"call" if self.protocol_call(expression).is_some() => declarative = true,
						_ => return false,
					}
				}
				"function_definition" if self.is_declaration_only(statement) => {}
				"decorated_definition" => {
					let declaration = statement
						.child_by_field_name("definition")
						.is_some_and(|definition| self.is_declaration_only(definition));
					if !declaration {
						return false;
					}
				}
				_ => return false,
			}
		}

		declarative
	}

	/// A method whose body holds nothing but a docstring, `pass` or `...`.
	fn is_declaration_only(&self, function: SyntaxNode<'_>) -> bool {
		if function.kind() != "function_definition" {
			return false;
		}

		let Some(body) = function.child_by_field_name("body") else {
			return false;
		};

		let mut cursor = body.walk();
		body.named_children(&mut cursor).all(|statement| {
			match statement.kind() {
				"comment" | "pass_statement" => true,
				"expression_statement" => {
					statement
						.named_child(0)
						.is_some_and(|expression| matches!(expression.kind(), "string" | "ellipsis"))
				}
				_ => false,
			}
		})
	}

	/// The argument list of an `Attribute(...)` call.
	fn attribute_call<'t>(&self, expression: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
		if expression.kind() != "call" {
			return None;
		}

		let function = expression.child_by_field_name("function")?;
		if !ATTRIBUTE_CALLS.contains(&self.text(function)) {
			return None;
		}

		expression.child_by_field_name("arguments")
	}

	/// The interfaces named by a protocol call such as `implements(IFoo)`.
	fn protocol_call(&self, expression: SyntaxNode<'_>) -> Option<Vec<String>> {
		if expression.kind() != "call" {
			return None;
		}

		let function = self.text(expression.child_by_field_name("function")?);
		let short = function.rsplit('.').next()?.to_ascii_lowercase();
		if !PROTOCOL_CALLS.contains(&short.as_str()) {
			return None;
		}

		// `classImplements(Target, IFoo)` names its target first.
		let skip = usize::from(short.starts_with("class") || short.starts_with("directly"));
		Some(self.argument_names(expression, skip))
	}

	fn argument_names(&self, call: SyntaxNode<'_>, skip: usize) -> Vec<String> {
		let Some(arguments) = call.child_by_field_name("arguments") else {
			return Vec::new();
		};

		let mut cursor = arguments.walk();
		arguments
			.named_children(&mut cursor)
			.filter(|argument| matches!(argument.kind(), "identifier" | "attribute"))
			.skip(skip)
			.map(|argument| self.text(argument).to_string())
			.collect()
	}

	fn decorators(&mut self, decorated: SyntaxNode<'_>, definition: SyntaxNode<'_>) {
		if definition.kind() != "class_definition" {
			return;
		}

		let line = definition.start_position().row + 1;
		let mut cursor = decorated.walk();
		let decorators: Vec<_> = decorated
			.named_children(&mut cursor)
			.filter(|child| child.kind() == "decorator")
			.collect();

		for decorator in decorators {
			let Some(call) = decorator.named_child(0).filter(|call| call.kind() == "call") else {
				continue;
			};
			let Some(function) = call.child_by_field_name("function") else {
				continue;
			};

			if self.text(function).rsplit('.').next() != Some("implementer") {
				continue;
			}

			let interfaces = self.argument_names(call, 0);
			if interfaces.is_empty() {
				continue;
			}

			let indent = self.indent_of(line);
			self.structure.members.push(Member {
				name: "implementer".to_string(),
				line,
				indent,
				kind: MemberKind::Implements { interfaces },
			});
		}
	}

	/// Assignments and protocol calls that carry their own tags.
	fn statement(&mut self, statement: SyntaxNode<'_>) {
		let line = statement.start_position().row + 1;
		let mut cursor = statement.walk();
		let expressions: Vec<_> = statement.named_children(&mut cursor).collect();

		for expression in expressions {
			match expression.kind() {
				"assignment" => self.assignment(expression, line),
				"call" => {
					let Some(interfaces) = self.protocol_call(expression) else {
						continue;
					};
					let Some(function) = expression.child_by_field_name("function") else {
						continue;
					};

					if interfaces.is_empty() {
						continue;
					}

					let name = self.text(function).to_string();
					let indent = self.indent_of(line);
					self.structure.members.push(Member {
						name,
						line,
						indent,
						kind: MemberKind::Implements { interfaces },
					});
				}
				_ => {}
			}
		}
	}

	fn assignment(&mut self, assignment: SyntaxNode<'_>, line: usize) {
		let Some(left) = assignment.child_by_field_name("left") else {
			return;
		};

		// `self.x = ...` and tuple targets are not declarations.
		if left.kind() != "identifier" {
			return;
		}

		let name = self.text(left).to_string();
		let attribute = assignment
			.child_by_field_name("right")
			.and_then(|right| self.attribute_call(right));

		let kind = if let Some(arguments) = attribute {
			let mut cursor = arguments.walk();
			let doc = arguments
				.named_children(&mut cursor)
				.find(|argument| argument.kind() == "string")
				.and_then(|argument| string_value(self.text(argument)))
				.unwrap_or_default();

			MemberKind::Attribute { doc }
		} else {
			let visibility = Visibility::of(&name);
			if visibility == Visibility::Public {
				return;
			}

			MemberKind::Variable { visibility }
		};

		let indent = self.indent_of(line);
		self.structure.members.push(Member {
			name,
			line,
			indent,
			kind,
		});
	}
}

/// Split a string literal into its prefix and the quoted remainder.
fn split_prefix(literal: &str) -> (&str, &str) {
	let quote = literal.find(['"', '\'']).unwrap_or(literal.len());
	literal.split_at(quote)
}

/// The characters between the quotes of a plain string literal. Byte and
/// formatted strings are not docstrings.
fn string_body(literal: &str) -> Option<&str> {
	let (prefix, quoted) = split_prefix(literal);
	if prefix.contains(['b', 'B', 'f', 'F']) {
		return None;
	}

	for delimiter in ["\"\"\"", "'''", "\"", "'"] {
		if quoted.len() >= delimiter.len() * 2 && quoted.starts_with(delimiter) && quoted.ends_with(delimiter) {
			return Some(&quoted[delimiter.len()..quoted.len() - delimiter.len()]);
		}
	}

	None
}

/// The value of a string literal with escapes resolved where possible.
fn string_value(literal: &str) -> Option<String> {
	let (prefix, quoted) = split_prefix(literal);
	let body = string_body(literal)?;

	if prefix.contains(['r', 'R']) || quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
		return Some(body.to_string());
	}

	Some(snailquote::unescape(quoted).unwrap_or_else(|_| body.to_string()))
}
