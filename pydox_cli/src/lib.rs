use std::path::Path;
use std::path::PathBuf;

use clap::ArgAction;
use clap::Parser;
use clap::builder::RangedU64ValueParser;
use pydox_core::FilterOptions;
use pydox_core::PydoxConfig;
use pydox_core::PydoxResult;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Doxygen input filter that turns python docstrings into structured doxygen comments.",
	long_about = "pydox reads a python source file and writes it back out with doxygen comment \
	              blocks inserted in front of every module, class and function. Original lines \
	              are never changed, so line numbers in doxygen's output still point at the real \
	              code.\n\nUse it as doxygen's FILTER_PATTERNS entry:\n  FILTER_PATTERNS = \
	              *.py=\"pydox -a\""
)]
#[allow(clippy::struct_excessive_bools)]
pub struct PydoxCli {
	/// The python file to filter. Reads standard input when omitted or `-`.
	pub input: Option<PathBuf>,

	/// Parse docstrings into brief, params, returns and the other sections.
	/// Without it docstrings are copied into the comment verbatim.
	#[arg(long, short, default_value_t = false)]
	pub autobrief: bool,

	/// Wrap indented fragments and `>>>` sessions in free text in code
	/// blocks.
	#[arg(long, short = 'c', default_value_t = false)]
	pub autocode: bool,

	/// Prefix added in front of every namespace.
	#[arg(long, short = 'p', value_name = "PREFIX")]
	pub namespace_prefix: Option<String>,

	/// Use this name instead of the module name derived from the input path.
	#[arg(long, short = 'n', value_name = "NAME")]
	pub namespace_override: Option<String>,

	/// Drop a trailing `__init__` from package module names.
	#[arg(long, short, default_value_t = false)]
	pub strip_init: bool,

	/// Do not emit `@namespace` tags.
	#[arg(long, default_value_t = false)]
	pub no_namespace: bool,

	/// Number of columns a tab advances to.
	#[arg(long, short, value_name = "N", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
	pub tab_length: Option<usize>,

	/// Write the result to this file instead of standard output.
	#[arg(long, short, value_name = "PATH")]
	pub output: Option<PathBuf>,

	/// Read options from this file instead of discovering `pydox.toml`.
	#[arg(long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Log more to standard error. Repeat for more detail.
	#[arg(long, short, action = ArgAction::Count)]
	pub verbose: u8,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

impl PydoxCli {
	/// The input path, or `None` for standard input.
	pub fn input_path(&self) -> Option<&Path> {
		self.input
			.as_deref()
			.filter(|path| path.as_os_str() != "-")
	}

	/// The `tracing` level selected by `-v`.
	pub fn log_level(&self) -> &'static str {
		match self.verbose {
			0 => "warn",
			1 => "info",
			2 => "debug",
			_ => "trace",
		}
	}

	/// Load the config file and apply command line flags on top.
	pub fn filter_options(&self, root: &Path) -> PydoxResult<FilterOptions> {
		let config = match &self.config {
			Some(path) => Some(PydoxConfig::load_file(path)?),
			None => PydoxConfig::load(root)?,
		};

		let mut options = config
			.as_ref()
			.map(PydoxConfig::to_options)
			.unwrap_or_default();
		self.apply(&mut options);

		Ok(options)
	}

	fn apply(&self, options: &mut FilterOptions) {
		options.autobrief |= self.autobrief;
		options.autocode |= self.autocode;

		if let Some(tab_length) = self.tab_length {
			options.tab_length = tab_length;
		}

		let namespace = &mut options.namespace;
		if let Some(prefix) = &self.namespace_prefix {
			namespace.prefix = Some(prefix.clone());
		}
		if let Some(name) = &self.namespace_override {
			namespace.override_name = Some(name.clone());
		}
		namespace.strip_init |= self.strip_init;
		if self.no_namespace {
			namespace.enabled = false;
		}
	}
}

#[cfg(test)]
mod tests {
	use clap::Parser;
	use similar_asserts::assert_eq;

	use super::*;

	#[test]
	fn flags_override_config() -> PydoxResult<()> {
		let dir = tempfile::tempdir()?;
		std::fs::write(
			dir.path().join("pydox.toml"),
			"tab_length = 8\n\n[namespace]\nprefix = \"file\"\n",
		)?;

		let cli = PydoxCli::parse_from(["pydox", "-a", "-p", "flag", "--no-namespace", "mod.py"]);
		let options = cli.filter_options(dir.path())?;

		assert!(options.autobrief);
		assert_eq!(options.tab_length, 8);
		assert_eq!(options.namespace.prefix.as_deref(), Some("flag"));
		assert!(!options.namespace.enabled);

		Ok(())
	}

	#[test]
	fn dash_means_standard_input() {
		let cli = PydoxCli::parse_from(["pydox", "-"]);
		assert_eq!(cli.input_path(), None);

		let cli = PydoxCli::parse_from(["pydox", "-vv", "pkg/mod.py"]);
		assert_eq!(cli.input_path(), Some(Path::new("pkg/mod.py")));
		assert_eq!(cli.log_level(), "debug");
	}

	#[test]
	fn zero_tab_length_is_rejected() {
		assert!(PydoxCli::try_parse_from(["pydox", "-t", "0"]).is_err());
	}
}
