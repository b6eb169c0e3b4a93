mod common;

use doxtree_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;

const CLEAN_HEADER: &str = "/// A point in the plane.\nstruct Point {\n  /// Horizontal position.\n  int x;\n};\n";
const NOISY_HEADER: &str = "/// @frobnicate Does things.\nvoid f();\n";

#[test]
fn check_passes_without_warnings() {
	let tmp = common::project(&[("include/point.hpp", CLEAN_HEADER)]);

	let mut cmd = common::doxtree_cmd();
	cmd.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Check passed: 1 file, no warnings."));
}

#[test]
fn check_reports_unrecognized_commands() {
	let tmp = common::project(&[("noisy.hpp", NOISY_HEADER)]);

	let mut cmd = common::doxtree_cmd();
	cmd.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("noisy.hpp:1:"))
		.stdout(predicates::str::contains("unrecognized command: frobnicate"))
		.stdout(predicates::str::contains("[doxtree::unrecognized_command]"))
		.stdout(predicates::str::contains("Check finished: 1 file, 1 warning."))
		.stderr(predicates::str::contains("frobnicate").not());
}

#[test]
fn deny_warnings_fails_the_check() {
	let tmp = common::project(&[("noisy.hpp", NOISY_HEADER)]);

	let mut cmd = common::doxtree_cmd();
	cmd.arg("check")
		.arg("--deny-warnings")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1);
}

#[test]
fn deny_warnings_passes_a_clean_project() {
	let tmp = common::project(&[("point.hpp", CLEAN_HEADER)]);

	let mut cmd = common::doxtree_cmd();
	cmd.arg("check")
		.arg("--deny-warnings")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();
}

#[test]
fn check_reports_unmatched_literal_patterns() {
	let tmp = common::project(&[
		("doxtree.yaml", "files:\n  - missing.hpp\n  - \"*.hpp\"\n"),
		("point.hpp", CLEAN_HEADER),
	]);

	let mut cmd = common::doxtree_cmd();
	cmd.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("doxtree.yaml:1:1:"))
		.stdout(predicates::str::contains("no file matches `missing.hpp`"));
}

#[test]
fn check_json_lists_files_and_diagnostics() -> AnyEmptyResult {
	let tmp = common::project(&[("a.hpp", CLEAN_HEADER), ("b.hpp", NOISY_HEADER)]);

	let mut cmd = common::doxtree_cmd();
	let output = cmd
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	assert!(output.status.success());

	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["ok"], false);
	assert_eq!(json["files"], serde_json::json!(["a.hpp", "b.hpp"]));

	let diagnostics = json["diagnostics"]
		.as_array()
		.unwrap_or_else(|| panic!("diagnostics should be an array"));
	assert_eq!(diagnostics.len(), 1);
	assert_eq!(diagnostics[0]["file"], "b.hpp");
	assert_eq!(diagnostics[0]["line"], 1);
	assert_eq!(diagnostics[0]["code"], "doxtree::unrecognized_command");

	Ok(())
}

#[test]
fn invalid_config_is_a_fatal_error() {
	let tmp = common::project(&[("doxtree.yaml", "files: [\n")]);

	let mut cmd = common::doxtree_cmd();
	cmd.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("doxtree::config_parse"))
		.stdout(predicates::str::contains("Check").not());
}
