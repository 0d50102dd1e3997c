mod common;

use predicates::prelude::*;
use pydox_core::AnyEmptyResult;
use rstest::rstest;
use similar_asserts::assert_eq;

#[test]
fn filters_standard_input() -> AnyEmptyResult {
	let output = common::pydox_cmd()
		.arg("-a")
		.arg("--no-namespace")
		.write_stdin("def f():\n    \"\"\"Do it.\"\"\"\n")
		.output()?;

	assert!(output.status.success());
	assert_eq!(
		String::from_utf8(output.stdout)?,
		"## @brief Do it.\ndef f():\n    \"\"\"Do it.\"\"\"\n"
	);

	Ok(())
}

#[test]
fn dash_reads_standard_input() {
	common::pydox_cmd()
		.arg("-")
		.write_stdin("_cache = {}\n")
		.assert()
		.success()
		.stdout("## @var _cache\n# @hideinitializer\n# @protected\n_cache = {}\n");
}

#[test]
fn file_input_gets_module_namespace() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("shapes.py"), common::SHAPES)?;

	let output = common::pydox_cmd()
		.current_dir(tmp.path())
		.arg("-a")
		.arg("shapes.py")
		.output()?;
	let expected = r#"## @brief Shapes.
# @namespace shapes
"""Shapes."""


## @brief A square.
#
# @param side (int) Length of one side.
# @namespace shapes.Square
class Square:
    """A square.

    Args:
        side (int): Length of one side.
    """

    ## @namespace shapes.Square._area
    # @protected
    def _area(self):
        return 0
"#;

	assert!(output.status.success());
	assert_eq!(String::from_utf8(output.stdout)?, expected);

	Ok(())
}

#[rstest]
#[case::prefix(&["-p", "project"], "# @namespace project.shapes.Square")]
#[case::override_name(&["-n", "geometry"], "# @namespace geometry.Square")]
fn namespace_flags(#[case] flags: &[&str], #[case] expected: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("shapes.py"), common::SHAPES)?;

	common::pydox_cmd()
		.current_dir(tmp.path())
		.args(flags)
		.arg("shapes.py")
		.assert()
		.success()
		.stdout(predicate::str::contains(expected));

	Ok(())
}

#[test]
fn output_file_is_written() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let target = tmp.path().join("out.py");

	common::pydox_cmd()
		.arg("--no-namespace")
		.arg("-o")
		.arg(&target)
		.write_stdin("class _Hidden:\n    pass\n")
		.assert()
		.success()
		.stdout("");

	assert_eq!(
		std::fs::read_to_string(&target)?,
		"## @protected\nclass _Hidden:\n    pass\n"
	);

	Ok(())
}

#[test]
fn syntax_error_produces_no_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let target = tmp.path().join("out.py");

	common::pydox_cmd()
		.arg("-o")
		.arg(&target)
		.write_stdin("def broken(:\n    pass\n")
		.assert()
		.code(2)
		.stdout("")
		.stderr(predicate::str::contains("pydox::parse_error"));

	assert!(!target.exists());

	Ok(())
}

#[test]
fn invalid_encoding_is_fatal() {
	common::pydox_cmd()
		.write_stdin(b"x = '\xff'\n".to_vec())
		.assert()
		.code(2)
		.stdout("")
		.stderr(predicate::str::contains("pydox::encoding"));
}

#[test]
fn config_file_is_discovered() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("pydox.toml"),
		"autobrief = true\n\n[namespace]\nenabled = false\n",
	)?;

	common::pydox_cmd()
		.current_dir(tmp.path())
		.write_stdin("def f():\n    \"\"\"Do it.\"\"\"\n")
		.assert()
		.success()
		.stdout("## @brief Do it.\ndef f():\n    \"\"\"Do it.\"\"\"\n");

	Ok(())
}

#[test]
fn explicit_config_path() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config = tmp.path().join("custom.toml");
	std::fs::write(&config, "autobrief = true\n\n[namespace]\nenabled = false\n")?;

	common::pydox_cmd()
		.arg("--config")
		.arg(&config)
		.write_stdin("def f():\n    \"\"\"Do it.\"\"\"\n")
		.assert()
		.success()
		.stdout("## @brief Do it.\ndef f():\n    \"\"\"Do it.\"\"\"\n");

	Ok(())
}

#[test]
fn invalid_config_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("pydox.toml"), "autobrief = \"yes\"\n")?;

	common::pydox_cmd()
		.current_dir(tmp.path())
		.write_stdin("x = 1\n")
		.assert()
		.code(2)
		.stderr(predicate::str::contains("pydox::config_parse"));

	Ok(())
}

#[test]
fn ambiguous_lines_are_reported_as_warnings() {
	common::pydox_cmd()
		.arg("-a")
		.write_stdin("def f(a):\n    \"\"\"Do.\n\n    Args:\n        a: first.\n      not an item here\n    \"\"\"\n")
		.assert()
		.success()
		.stdout(predicate::str::contains("# not an item here"))
		.stderr(predicate::str::contains("pydox::ambiguous_line"));
}
