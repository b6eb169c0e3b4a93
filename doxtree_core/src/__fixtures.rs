use std::path::Path;

use crate::DoxResult;
use crate::Entity;
use crate::EntityKind;
use crate::SourceParser;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Location;
use crate::diagnostics::SourceDiagnostic;
use crate::preprocess::Defines;
use crate::translator::Translation;
use crate::translator::translate;

/// Parse one C++ source as `test.hpp` into a fresh root.
pub fn parse_cpp(source: &str) -> DoxResult<(Entity, Vec<SourceDiagnostic>)> {
	parse_cpp_with(source, &[], Entity::root())
}

/// Parse one C++ source with macro definitions into `root`.
pub fn parse_cpp_with(
	source: &str,
	defines: &[(&str, &str)],
	mut root: Entity,
) -> DoxResult<(Entity, Vec<SourceDiagnostic>)> {
	let defines = defines_from(defines);
	let mut diagnostics = Diagnostics::new();
	let mut parser = SourceParser::new()?;
	parser.parse_text(Path::new("test.hpp"), source, &defines, &mut root, &mut diagnostics);

	Ok((root, diagnostics.into_entries()))
}

pub fn defines_from(pairs: &[(&str, &str)]) -> Defines {
	pairs
		.iter()
		.map(|(name, value)| ((*name).to_string(), (*value).to_string()))
		.collect()
}

/// Translate a single comment with no carried indent.
pub fn translate_comment(comment: &str) -> DoxResult<Translation> {
	let mut diagnostics = Diagnostics::new();
	let mut indent = 0;
	let translation = translate(comment, &mut indent, Location::new(1, 1), &mut diagnostics)?;

	Ok(translation.unwrap_or_else(|| panic!("not a doc comment: {comment}")))
}

/// A root entity holding one empty group per name.
pub fn root_with_groups(names: &[&str]) -> Entity {
	let mut root = Entity::root();
	for name in names {
		root.insert(Entity::new(EntityKind::Group, *name));
	}
	root
}

/// A documented leaf entity.
pub fn documented(kind: EntityKind, name: &str) -> Entity {
	let mut entity = Entity::new(kind, name);
	entity.documentation = format!("Docs for {name}.\n\n");
	entity
}

/// Write `files` below a fresh temporary directory.
pub fn write_project(files: &[(&str, &str)]) -> tempfile::TempDir {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	for (path, content) in files {
		let full = tmp.path().join(path);
		if let Some(parent) = full.parent() {
			std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create dir: {e}"));
		}
		std::fs::write(&full, content).unwrap_or_else(|e| panic!("write {path}: {e}"));
	}
	tmp
}
