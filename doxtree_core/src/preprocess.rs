use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::Node;

use crate::diagnostics::DiagnosticKind;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Location;
use crate::stack::ByteRange;
use crate::syntax::ParsedSource;
use crate::syntax::SyntaxEngine;
use crate::syntax::find_node;

/// Macro name to replacement text.
pub type Defines = BTreeMap<String, String>;

/// Identifiers that look like a macro: upper case, at least three
/// characters.
static MACRO_LIKE: LazyLock<Regex> = LazyLock::new(|| {
	match Regex::new(r"^[A-Z_][A-Z0-9_]{2,}$") {
		Ok(regex) => regex,
		Err(error) => panic!("invalid macro pattern: {error}"),
	}
});

/// Rewrite `source` so the declaration query sees parsable code.
///
/// Configured macros are expanded in place, then syntax errors caused by
/// unknown macro-like identifiers are healed by blanking them with spaces,
/// which keeps every line and column where it was. The tree is kept current
/// through incremental edits. Returns `false` when a reparse failed and the
/// tree can no longer be trusted.
pub fn preprocess(
	engine: &mut SyntaxEngine,
	source: &mut ParsedSource,
	defines: &Defines,
	diagnostics: &mut Diagnostics,
) -> bool {
	expand_macros(engine, source, defines) && recover_errors(engine, source, diagnostics)
}

/// A span of text produced by expanding one macro.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Expansion {
	name: String,
	range: ByteRange,
}

/// Tracks expanded regions so that a macro is never expanded again inside
/// its own expansion.
#[derive(Debug, Default)]
struct ExpansionGuard {
	expansions: Vec<Expansion>,
}

impl ExpansionGuard {
	fn allows(&self, name: &str, at: usize) -> bool {
		!self
			.expansions
			.iter()
			.any(|expansion| expansion.name == name && expansion.range.start <= at && at < expansion.range.end)
	}

	/// Record that `replaced` now holds `length` bytes expanded from `name`,
	/// moving the regions that follow or enclose it.
	fn record(&mut self, name: &str, replaced: ByteRange, length: usize) {
		for expansion in &mut self.expansions {
			if expansion.range.start >= replaced.end {
				expansion.range.start = expansion.range.start - replaced.end + replaced.start + length;
				expansion.range.end = expansion.range.end - replaced.end + replaced.start + length;
			} else if expansion.range.start <= replaced.start && replaced.end <= expansion.range.end {
				expansion.range.end = expansion.range.end - replaced.end + replaced.start + length;
			}
		}

		self.expansions.push(Expansion {
			name: name.to_string(),
			range: ByteRange::new(replaced.start, replaced.start + length),
		});
	}
}

struct Substitution {
	name: String,
	range: ByteRange,
	replacement: String,
}

fn expand_macros(engine: &mut SyntaxEngine, source: &mut ParsedSource, defines: &Defines) -> bool {
	if defines.is_empty() {
		return true;
	}

	let mut guard = ExpansionGuard::default();
	let mut resume = None;

	loop {
		let text = &source.text;
		let found = find_node(&source.tree, resume, |node| {
			if node.child_count() != 0 {
				return None;
			}

			let name = text.get(node.byte_range())?;
			let replacement = defines.get(name)?;
			guard.allows(name, node.start_byte()).then(|| {
				Substitution {
					name: name.to_string(),
					range: ByteRange::new(node.start_byte(), node.end_byte()),
					replacement: replacement.clone(),
				}
			})
		});

		let Some(substitution) = found else {
			return true;
		};

		tracing::trace!(
			name = %substitution.name,
			offset = substitution.range.start,
			"expanding macro"
		);

		if !engine.splice(source, substitution.range, &substitution.replacement) {
			return false;
		}

		guard.record(
			&substitution.name,
			substitution.range,
			substitution.replacement.len(),
		);
		resume = Some(substitution.range.start);
	}
}

struct Recovery {
	range: ByteRange,
	text: String,
	location: Location,
}

fn recover_errors(engine: &mut SyntaxEngine, source: &mut ParsedSource, diagnostics: &mut Diagnostics) -> bool {
	let mut resume = None;

	loop {
		let text = &source.text;
		let found = find_node(&source.tree, resume, |node| {
			if !node.is_error() {
				return None;
			}

			let mut candidates = Vec::new();
			collect_descendants(node, &mut candidates);
			candidates.push(node);
			candidates.into_iter().find_map(|candidate| {
				let candidate_text = text.get(candidate.byte_range())?;
				MACRO_LIKE.is_match(candidate_text).then(|| {
					Recovery {
						range: ByteRange::new(candidate.start_byte(), candidate.end_byte()),
						text: candidate_text.to_string(),
						location: Location::from_point(candidate.start_position()),
					}
				})
			})
		});

		let Some(recovery) = found else {
			return true;
		};

		diagnostics.push(
			DiagnosticKind::ParseRecovery {
				text: recovery.text.clone(),
			},
			recovery.location,
		);

		let blank = " ".repeat(recovery.text.len());
		if !engine.splice(source, recovery.range, &blank) {
			return false;
		}

		resume = Some(recovery.range.start);
	}
}

/// Every node below `node`, in document order.
fn collect_descendants<'t>(node: Node<'t>, found: &mut Vec<Node<'t>>) {
	let mut cursor = node.walk();
	for child in node.children(&mut cursor) {
		found.push(child);
		collect_descendants(child, found);
	}
}

/// Report every syntax error left in the final tree. The tree is not
/// changed.
pub fn report_errors(source: &ParsedSource, diagnostics: &mut Diagnostics) {
	find_node(&source.tree, None, |node| {
		if node.is_error() {
			let excerpt = source
				.text
				.get(node.start_byte()..)
				.unwrap_or_default()
				.chars()
				.take(40)
				.collect();
			diagnostics.push(
				DiagnosticKind::ParseError { excerpt },
				Location::from_point(node.start_position()),
			);
		}

		None::<()>
	});
}

