mod common;

use asciicode_core::AnyEmptyResult;
use serde_json::Value;

const LUA_CONFIG: &str = r#"[defaults]
numbered = true

[languages.lua]
start = "--[[."
end = ".]]"
"#;

#[test]
fn discovered_config_adds_languages_and_defaults() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("asciicode.toml"), LUA_CONFIG)?;
	std::fs::write(tmp.path().join("init.lua"), "--[[.\nSetup\n.]]\nreturn {}\n")?;

	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.current_dir(tmp.path())
		.args(["extract", "init.lua"])
		.assert()
		.success()
		.stdout("Setup\n\n[source,lua,numbered]\n-----\nreturn {}\n-----\n");

	Ok(())
}

#[test]
fn dot_config_directory_is_discovered() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join(".config"))?;
	std::fs::write(
		tmp.path().join(".config/asciicode.toml"),
		"[defaults]\nlanguage = \"go\"\n",
	)?;

	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.current_dir(tmp.path())
		.arg("extract")
		.write_stdin("package main\n")
		.assert()
		.success()
		.stdout("[source,go]\n-----\npackage main\n-----\n");

	Ok(())
}

#[test]
fn explicit_config_path() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config = tmp.path().join("custom.toml");
	std::fs::write(&config, "[defaults]\nlanguage = \"java\"\n")?;

	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "--config"])
		.arg(&config)
		.write_stdin("class A {}\n")
		.assert()
		.success()
		.stdout("[source,java]\n-----\nclass A {}\n-----\n");

	Ok(())
}

#[test]
fn flags_override_config_defaults() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("asciicode.toml"),
		"[defaults]\nlanguage = \"go\"\nstrategy = \"spans\"\n",
	)?;

	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.current_dir(tmp.path())
		.args(["extract", "-l", "c", "--strategy", "lines"])
		.write_stdin("/*.\nHello\n.*/\nint main(){}\n")
		.assert()
		.success()
		.stdout("Hello\n\n[source,c]\n-----\nint main(){}\n-----\n");

	Ok(())
}

#[test]
fn invalid_config_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("asciicode.toml"), "[output]\nformat = 1\n")?;

	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.current_dir(tmp.path())
		.args(["extract", "-l", "c"])
		.write_stdin("int a;\n")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}

#[test]
fn missing_explicit_config_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.args(["extract", "-l", "c", "--config"])
		.arg(tmp.path().join("absent.toml"))
		.write_stdin("int a;\n")
		.assert()
		.code(2);

	Ok(())
}

#[test]
fn languages_lists_builtin_grammars() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::asciicode_cmd();
	let _ = cmd
		.current_dir(tmp.path())
		.arg("languages")
		.assert()
		.success()
		.stdout(predicates::str::contains("LANGUAGE"))
		.stdout(predicates::str::is_match(r"(?m)^python\s+'''\.\s+-\s+\.'''$")?)
		.stdout(predicates::str::is_match(r"(?m)^java\s+/\*\.\s+-\s+\.\*/$")?);

	Ok(())
}

#[test]
fn languages_json_includes_config_entries() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("asciicode.toml"), LUA_CONFIG)?;

	let mut cmd = common::asciicode_cmd();
	let output = cmd
		.current_dir(tmp.path())
		.args(["languages", "--format", "json"])
		.output()?;
	assert!(output.status.success());

	let json: Value = serde_json::from_slice(&output.stdout)?;
	let entries = json.as_array().ok_or("languages should be an array")?;
	let lua = entries
		.iter()
		.find(|entry| entry["language"] == "lua")
		.ok_or("lua should be listed")?;
	assert_eq!(lua["start"], "--[[.");
	assert_eq!(lua["end"], ".]]");
	assert!(lua.get("mid").is_none());
	assert!(entries.iter().any(|entry| entry["language"] == "python"));

	Ok(())
}
