mod common;

use doxtree_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;

const GEOMETRY: &str = r"/// Geometry helpers.
namespace geo {
/// A point in the plane.
struct Point {
  /// Horizontal position.
  int x;
};

/// @internal Not for users.
void secret();
}

namespace empty {
void undocumented();
}
";

#[test]
fn tree_prints_an_indented_outline() {
	let tmp = common::project(&[
		("doxtree.yaml", "title: Geometry\n"),
		("geo.hpp", GEOMETRY),
	]);

	let mut cmd = common::doxtree_cmd();
	cmd.arg("tree")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::starts_with("Geometry\n"))
		.stdout(predicates::str::contains("namespace geo"))
		.stdout(predicates::str::contains("\n  type Point: A point in the plane.\n"))
		.stdout(predicates::str::contains("\n    variable x: Horizontal position.\n"));
}

#[test]
fn tree_skips_hidden_entities_and_empty_namespaces() {
	let tmp = common::project(&[("geo.hpp", GEOMETRY)]);

	let mut cmd = common::doxtree_cmd();
	cmd.arg("tree")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("secret").not())
		.stdout(predicates::str::contains("namespace empty").not())
		.stdout(predicates::str::contains("undocumented").not());
}

#[test]
fn tree_json_serializes_the_entity_tree() -> AnyEmptyResult {
	let tmp = common::project(&[("geo.hpp", GEOMETRY)]);

	let mut cmd = common::doxtree_cmd();
	let output = cmd
		.arg("tree")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	assert!(output.status.success());

	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["kind"], "root");

	let geo = &json["namespaces"][0];
	assert_eq!(geo["name"], "geo");
	assert_eq!(geo["types"][0]["name"], "Point");
	assert_eq!(geo["types"][0]["declaration"], "struct Point");
	assert_eq!(geo["types"][0]["source_path"], "geo.hpp");
	assert_eq!(geo["types"][0]["variables"][0]["name"], "x");

	Ok(())
}
