use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn pydox_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("pydox"));
	cmd.arg("--no-color");
	cmd
}

pub const SHAPES: &str = r#""""Shapes."""


class Square:
    """A square.

    Args:
        side (int): Length of one side.
    """

    def _area(self):
        return 0
"#;
