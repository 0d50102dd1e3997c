use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::PydoxError;
use crate::PydoxResult;

/// Default number of columns a tab advances to.
pub const DEFAULT_TAB_LENGTH: usize = 4;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["pydox.toml", ".pydox.toml", ".config/pydox.toml"];

/// Options applied uniformly to every definition in a source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct FilterOptions {
	/// Run the docstring heuristics. When disabled docstrings are copied into
	/// the comment block verbatim.
	pub autobrief: bool,
	/// Detect indented or `>>>` fragments in free text and wrap them in code
	/// blocks.
	pub autocode: bool,
	pub tab_length: usize,
	pub namespace: NamespaceOptions,
}

impl Default for FilterOptions {
	fn default() -> Self {
		Self {
			autobrief: false,
			autocode: false,
			tab_length: DEFAULT_TAB_LENGTH,
			namespace: NamespaceOptions::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamespaceOptions {
	/// Prefixed to every computed namespace path.
	pub prefix: Option<String>,
	/// Replaces the module name derived from the file path.
	#[serde(rename = "override")]
	pub override_name: Option<String>,
	/// Drop a trailing `__init__` from the module name.
	pub strip_init: bool,
	/// Emit `@namespace` tags at all.
	pub enabled: bool,
}

impl Default for NamespaceOptions {
	fn default() -> Self {
		Self {
			prefix: None,
			override_name: None,
			strip_init: false,
			enabled: true,
		}
	}
}

/// The contents of a `pydox.toml` file.
///
/// ```toml
/// autobrief = true
/// autocode = false
/// tab_length = 4
///
/// [namespace]
/// prefix = "project"
/// override = "pkg"
/// strip_init = true
/// enabled = true
/// ```
///
/// Every key is optional. Command line flags take precedence over values
/// read from the file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PydoxConfig {
	pub autobrief: Option<bool>,
	pub autocode: Option<bool>,
	pub tab_length: Option<usize>,
	#[serde(default)]
	pub namespace: Option<NamespaceOptions>,
}

impl PydoxConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> PydoxResult<Option<PydoxConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_file(&config_path).map(Some)
	}

	/// Load the config from an explicit path.
	pub fn load_file(path: &Path) -> PydoxResult<PydoxConfig> {
		let content = std::fs::read_to_string(path)?;
		Self::parse(&content)
	}

	pub fn parse(content: &str) -> PydoxResult<PydoxConfig> {
		let config: PydoxConfig =
			toml::from_str(content).map_err(|e| PydoxError::ConfigParse(e.to_string()))?;

		if config.tab_length == Some(0) {
			return Err(PydoxError::ConfigParse(
				"`tab_length` must be at least 1".to_string(),
			));
		}

		Ok(config)
	}

	/// Build filter options from the file, falling back to defaults for
	/// missing keys.
	pub fn to_options(&self) -> FilterOptions {
		let defaults = FilterOptions::default();

		FilterOptions {
			autobrief: self.autobrief.unwrap_or(defaults.autobrief),
			autocode: self.autocode.unwrap_or(defaults.autocode),
			tab_length: self.tab_length.unwrap_or(defaults.tab_length),
			namespace: self.namespace.clone().unwrap_or(defaults.namespace),
		}
	}
}
