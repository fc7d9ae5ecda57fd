use std::path::Path;
use std::process::Command;

use insta_cmd::assert_cmd_snapshot;
use insta_cmd::get_cargo_bin;

fn extract_cmd(fixture: &str, source: &str) -> Command {
	let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
		.join("tests/fixtures")
		.join(fixture);
	let mut cmd = Command::new(get_cargo_bin("asciicode"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd.current_dir(dir);
	cmd.args(["extract", source]);
	cmd
}

// greeting_c: C block comments around a small program

#[test]
fn greeting_c() {
	assert_cmd_snapshot!("greeting_c", extract_cmd("greeting_c", "greeting.c"));
}

// modeline_python: the modeline picks comment tags and numbering

#[test]
fn modeline_python() {
	assert_cmd_snapshot!(
		"modeline_python",
		extract_cmd("modeline_python", "tool.py")
	);
}
