use std::path::Path;

use crate::DoxResult;
use crate::Entity;
use crate::assembler::assemble;
use crate::diagnostics::DiagnosticKind;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Location;
use crate::preprocess::Defines;
use crate::preprocess::preprocess;
use crate::preprocess::report_errors;
use crate::stack::ByteRange;
use crate::syntax::SyntaxEngine;

/// Runs one file at a time through preprocessing, querying and assembly,
/// merging the result into a shared root entity.
///
/// Owns a single parser. Files are processed to completion one after
/// another.
pub struct SourceParser {
	engine: SyntaxEngine,
}

impl SourceParser {
	pub fn new() -> DoxResult<Self> {
		Ok(Self {
			engine: SyntaxEngine::new()?,
		})
	}

	/// Read and parse `path`. A file that cannot be read is skipped with a
	/// diagnostic.
	pub fn parse_file(&mut self, path: &Path, defines: &Defines, root: &mut Entity, diagnostics: &mut Diagnostics) {
		match std::fs::read_to_string(path) {
			Ok(text) => self.parse_text(path, &text, defines, root, diagnostics),
			Err(error) => {
				diagnostics.set_file(path);
				diagnostics.push(
					DiagnosticKind::UnparsableFile {
						reason: error.to_string(),
					},
					Location::new(1, 1),
				);
			}
		}
	}

	/// Parse `text` as the contents of `source_path`, merging its entities
	/// into `root`.
	pub fn parse_text(
		&mut self,
		source_path: &Path,
		text: &str,
		defines: &Defines,
		root: &mut Entity,
		diagnostics: &mut Diagnostics,
	) {
		diagnostics.set_file(source_path);
		tracing::debug!(file = %source_path.display(), "parsing");

		let Some(mut parsed) = self.engine.parse(normalize_line_endings(text)) else {
			unparsable(diagnostics, "the parser produced no syntax tree");
			return;
		};

		if !preprocess(&mut self.engine, &mut parsed, defines, diagnostics) {
			unparsable(diagnostics, "reparsing after a macro edit failed");
			return;
		}

		report_errors(&parsed, diagnostics);

		let items = self.engine.declarations(&parsed);
		tracing::trace!(file = %source_path.display(), matches = items.len(), "queried declarations");

		let range = ByteRange::new(0, parsed.text.len());
		let base = std::mem::take(root);
		*root = assemble(&parsed.text, source_path, items, base, range, diagnostics);
	}
}

fn unparsable(diagnostics: &mut Diagnostics, reason: &str) {
	diagnostics.push(
		DiagnosticKind::UnparsableFile {
			reason: reason.to_string(),
		},
		Location::new(1, 1),
	);
}

/// Normalize CRLF and lone CR line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}
