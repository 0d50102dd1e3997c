use std::path::Component;
use std::path::Path;

use crate::Node;
use crate::NodeKind;
use crate::config::NamespaceOptions;

/// Derive a dotted module name from a source path.
///
/// `./pkg/sub/mod.py` becomes `pkg.sub.mod`. Parent and root components are
/// dropped.
pub fn module_name_from_path(path: &Path) -> String {
	let without_extension = if path.extension().is_some_and(|ext| ext == "py") {
		path.with_extension("")
	} else {
		path.to_path_buf()
	};

	without_extension
		.components()
		.filter_map(|component| {
			match component {
				Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
				_ => None,
			}
		})
		.collect::<Vec<_>>()
		.join(".")
}

/// Computes `@namespace` values for the nodes of one source unit.
#[derive(Debug, Clone)]
pub struct NamespaceResolver {
	/// Prefix and module name, already joined.
	root: Vec<String>,
	enabled: bool,
}

impl NamespaceResolver {
	/// `file_module` is the dotted name derived from the input path, if any.
	pub fn new(options: &NamespaceOptions, file_module: Option<&str>) -> Self {
		let mut module = file_module.unwrap_or_default().to_string();

		if options.strip_init {
			module = strip_init(&module);
		}

		if let Some(name) = options.override_name.as_deref().filter(|name| !name.is_empty()) {
			module = apply_override(&module, name);
		}

		let root = options
			.prefix
			.iter()
			.map(String::as_str)
			.chain(std::iter::once(module.as_str()))
			.flat_map(|part| part.split('.'))
			.filter(|part| !part.is_empty())
			.map(ToString::to_string)
			.collect();

		Self {
			root,
			enabled: options.enabled,
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// The module namespace, e.g. `prefix.pkg.mod`.
	pub fn module(&self) -> Option<String> {
		if self.root.is_empty() {
			None
		} else {
			Some(self.root.join("."))
		}
	}

	/// Fully qualified namespace of a node. `None` when namespaces are
	/// disabled or there is nothing to name.
	pub fn qualify(&self, node: &Node) -> Option<String> {
		if !self.enabled {
			return None;
		}

		if node.kind == NodeKind::Module {
			return self.module();
		}

		let parts: Vec<&str> = self
			.root
			.iter()
			.chain(node.namespace_path.iter())
			.map(String::as_str)
			.chain(std::iter::once(node.name.as_str()))
			.filter(|part| !part.is_empty())
			.collect();

		if parts.is_empty() {
			None
		} else {
			Some(parts.join("."))
		}
	}
}

fn strip_init(module: &str) -> String {
	if module == "__init__" {
		return String::new();
	}

	module
		.strip_suffix(".__init__")
		.unwrap_or(module)
		.to_string()
}

/// When `name` occurs as a run of whole components inside `module`, keep the
/// module from that point on. Otherwise `name` replaces the module outright.
fn apply_override(module: &str, name: &str) -> String {
	let components: Vec<&str> = module.split('.').collect();
	let wanted: Vec<&str> = name.split('.').collect();

	let found = (0..components.len())
		.find(|&start| components[start..].starts_with(&wanted));

	match found {
		Some(start) => components[start..].join("."),
		None => name.to_string(),
	}
}
