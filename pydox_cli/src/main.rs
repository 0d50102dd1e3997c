use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use pydox_cli::PydoxCli;
use pydox_core::AnyEmptyResult;
use pydox_core::FilterDiagnostic;
use pydox_core::filter_bytes;
use pydox_core::namespace::module_name_from_path;
use tracing_subscriber::EnvFilter;

fn main() {
	let args = PydoxCli::parse();
	let use_color = !args.no_color;

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::new(args.log_level()))
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.init();

	if let Err(e) = run(&args) {
		match e.downcast::<pydox_core::PydoxError>() {
			Ok(pydox_err) => {
				let report: miette::Report = (*pydox_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("error: {e}");
			}
		}
		process::exit(2);
	}
}

fn run(args: &PydoxCli) -> AnyEmptyResult {
	let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
	let options = args.filter_options(&root)?;

	let (bytes, module_name) = match args.input_path() {
		Some(path) => (std::fs::read(path)?, Some(module_name_from_path(path))),
		None => {
			let mut bytes = Vec::new();
			std::io::stdin().read_to_end(&mut bytes)?;
			(bytes, None)
		}
	};

	let output = filter_bytes(&bytes, module_name.as_deref(), &options)?;
	tracing::info!(
		lines = output.len(),
		injected = output.injected,
		"filtered source"
	);

	let label = args
		.input_path()
		.map_or_else(|| "<stdin>".to_string(), |path| path.display().to_string());
	for diagnostic in &output.diagnostics {
		eprintln!("{:?}", diagnostic_to_report(diagnostic, &label));
	}

	let text = output.text();
	match &args.output {
		Some(path) => write_atomically(path, text.as_bytes())?,
		None => {
			let mut stdout = std::io::stdout().lock();
			stdout.write_all(text.as_bytes())?;
			stdout.flush()?;
		}
	}

	Ok(())
}

/// Write through a temporary file in the target directory so a failed run
/// never leaves a partial file behind.
fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
	let dir = path
		.parent()
		.filter(|parent| !parent.as_os_str().is_empty())
		.unwrap_or_else(|| Path::new("."));

	let mut file = tempfile::NamedTempFile::new_in(dir)?;
	file.write_all(contents)?;
	file.flush()?;
	file.persist(path).map_err(|e| e.error)?;

	Ok(())
}

/// Convert a `FilterDiagnostic` into a warning `miette::Report`.
fn diagnostic_to_report(diagnostic: &FilterDiagnostic, file: &str) -> miette::Report {
	let (message, code, help) = match diagnostic {
		FilterDiagnostic::RenderFallback { name, line, reason } => {
			(
				format!("[{file}:{line}] docstring of `{name}` copied verbatim: {reason}"),
				"pydox::render_fallback",
				"the docstring layout did not match any known section structure",
			)
		}
		FilterDiagnostic::AmbiguousLine { name, line, text } => {
			(
				format!("[{file}:{line}] line in the docstring of `{name}` kept as text: {text}"),
				"pydox::ambiguous_line",
				"line up item lines with the first item of the section",
			)
		}
		_ => {
			(
				format!("[{file}] {diagnostic:?}"),
				"pydox::diagnostic",
				"",
			)
		}
	};

	let value = miette::MietteDiagnostic::new(message)
		.with_code(code)
		.with_help(help)
		.with_severity(miette::Severity::Warning);
	miette::Report::new(value)
}
