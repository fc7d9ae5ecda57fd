mod common;

use asciicode_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;

const C_SOURCE: &str = "/*.\nHello\n.*/\nint main(){}\n";

#[test]
fn extract_renders_file_by_extension() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let source = tmp.path().join("hello.c");
	std::fs::write(&source, C_SOURCE)?;

	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.current_dir(tmp.path())
		.arg("extract")
		.arg(&source)
		.assert()
		.success()
		.stdout("Hello\n\n[source,c]\n-----\nint main(){}\n-----\n");

	Ok(())
}

#[test]
fn extract_reads_stdin_with_language() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "-", "--language", "python"])
		.write_stdin("'''.\nIntro\n.'''\nprint(1)\n")
		.assert()
		.success()
		.stdout("Intro\n\n[source,python]\n-----\nprint(1)\n-----\n");
}

#[test]
fn extract_stdin_without_language_fails() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.arg("extract")
		.write_stdin(C_SOURCE)
		.assert()
		.code(2)
		.stdout("")
		.stderr(predicates::str::contains("no language or comment grammar"));
}

#[test]
fn extract_unknown_language_fails() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "--language", "cobol"])
		.write_stdin("MOVE A TO B.\n")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("cobol"));
}

#[test]
fn extract_numbered_flag() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "-l", "c", "--numbered"])
		.write_stdin(C_SOURCE)
		.assert()
		.success()
		.stdout(predicates::str::contains("[source,c,numbered]"));
}

#[test]
fn modeline_overrides_flags() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "-l", "c", "--numbered"])
		.write_stdin("// :asciicode-numbered: no\nint a;\n")
		.assert()
		.success()
		.stdout(
			predicates::str::contains("[source,c]")
				.and(predicates::str::contains("numbered]").not()),
		);
}

#[test]
fn extract_explicit_comments() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "-l", "lua", "--comments", r#"("--[[.", ".]]")"#])
		.write_stdin("--[[.\nNotes\n.]]\nprint(1)\n")
		.assert()
		.success()
		.stdout("Notes\n\n[source,lua]\n-----\nprint(1)\n-----\n");
}

#[test]
fn extract_rejects_invalid_comments_literal() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "-l", "c", "--comments", "(1, 2)"])
		.write_stdin(C_SOURCE)
		.assert()
		.failure()
		.stderr(predicates::str::contains("--comments"));
}

#[test]
fn extract_span_strategy() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "-l", "c", "--strategy", "spans"])
		.write_stdin("int x; /*. Inline .*/\nint y;\n")
		.assert()
		.success()
		.stdout(
			"[source,c]\n-----\nint x; \n-----\n\nInline \n\n[source,c]\n-----\nint \
			 y;\n-----\n",
		);
}

#[test]
fn extract_json_lists_blocks() -> AnyEmptyResult {
	let mut cmd = common::asciicode_cmd();
	let output = cmd
		.args(["extract", "-l", "c", "--format", "json"])
		.write_stdin(C_SOURCE)
		.output()?;
	assert!(output.status.success());

	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["path"], Value::Null);

	let blocks = json["blocks"].as_array().ok_or("blocks should be an array")?;
	assert_eq!(blocks.len(), 2);
	assert_eq!(blocks[0]["type"], "doc");
	assert_eq!(blocks[0]["content"], "Hello\n");
	assert_eq!(blocks[1]["type"], "code");
	assert_eq!(blocks[1]["language"], "c");
	assert_eq!(blocks[1]["numbered"], false);

	Ok(())
}

#[test]
fn extract_writes_output_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let target = tmp.path().join("out.adoc");

	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "-l", "c", "--output"])
		.arg(&target)
		.write_stdin(C_SOURCE)
		.assert()
		.success()
		.stdout("");

	assert_eq!(
		std::fs::read_to_string(&target)?,
		"Hello\n\n[source,c]\n-----\nint main(){}\n-----\n"
	);

	Ok(())
}

#[test]
fn extract_unterminated_fails() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "-l", "c"])
		.write_stdin("int a;\n/*.\nopen\n")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("never closed"));
}

#[test]
fn extract_allow_unterminated_warns() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "-l", "c", "--allow-unterminated"])
		.write_stdin("int a;\n/*.\nopen\n")
		.assert()
		.success()
		.stdout("[source,c]\n-----\nint a;\n-----\n\nopen\n\n")
		.stderr(predicates::str::contains("left open"));
}

#[test]
fn extract_malformed_block_fails() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "-l", "c", "--comments", r#"("/*.", " *", ".*/")"#])
		.write_stdin("/*.\n * ok\nnot ok\n.*/\n")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("line 3"));
}

#[test]
fn extract_passes_unknown_extensions_through() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let source = tmp.path().join("notes.adoc");
	std::fs::write(&source, "= Notes\n\nPlain text.\n")?;

	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.current_dir(tmp.path())
		.arg("extract")
		.arg(&source)
		.assert()
		.success()
		.stdout("= Notes\n\nPlain text.\n");

	Ok(())
}

#[test]
fn extract_missing_file_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.current_dir(tmp.path())
		.args(["extract", "missing.c"])
		.assert()
		.code(2);

	Ok(())
}

#[cfg(unix)]
#[test]
fn extract_render_with_command() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let source = tmp.path().join("hello.c");
	std::fs::write(&source, C_SOURCE)?;

	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.current_dir(tmp.path())
		.arg("extract")
		.arg(&source)
		.args(["--render-with", "tr a-z A-Z"])
		.assert()
		.success()
		.stdout("HELLO\n\n[SOURCE,C]\n-----\nINT MAIN(){}\n-----\n");

	Ok(())
}

#[cfg(unix)]
#[test]
fn extract_render_with_failing_command() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "-l", "c", "--render-with", "echo renderer exploded >&2; exit 4"])
		.write_stdin(C_SOURCE)
		.assert()
		.code(2)
		.stderr(predicates::str::contains("renderer exploded"));
}

#[test]
fn verbose_logs_to_stderr() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["--verbose", "extract", "-l", "c"])
		.write_stdin(C_SOURCE)
		.assert()
		.success()
		.stdout("Hello\n\n[source,c]\n-----\nint main(){}\n-----\n")
		.stderr(predicates::str::contains("resolved comment grammar"));
}

#[test]
fn missing_subcommand_fails() {
	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.assert()
		.code(1)
		.stderr(predicates::str::contains("No subcommand specified"));
}
