use std::path::Path;
use std::path::PathBuf;

use crate::DoxError;
use crate::Entity;
use crate::EntityKind;
use crate::diagnostics::DiagnosticKind;
use crate::diagnostics::Diagnostics;
use crate::stack::ByteRange;
use crate::stack::ContainmentStack;
use crate::syntax::DeclarationMatch;
use crate::syntax::QueryItem;
use crate::syntax::Span;
use crate::translator::Opening;
use crate::translator::translate;

/// Characters trimmed from the end of a displayed declaration.
const DECLARATION_TRIM: [char; 7] = [' ', '\t', '\n', '\r', '\\', '=', ';'];

/// Where a finished declaration goes once its parent is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
	/// The parent is a template: the declaration is what it templates.
	MergeIntoTemplate,
	/// The declaration opens a new frame.
	Push,
}

impl Placement {
	pub fn for_parent(parent: EntityKind) -> Self {
		if parent == EntityKind::Template {
			Self::MergeIntoTemplate
		} else {
			Self::Push
		}
	}
}

/// The signature of a declaration: the text from `start` up to `middle` (the
/// start of its body or initializer), without trailing blanks, `=`, `;` or
/// line continuations.
pub fn trim_declaration(text: &str, start: usize, middle: usize) -> String {
	text.get(start..middle.max(start))
		.unwrap_or_default()
		.trim_end_matches(DECLARATION_TRIM)
		.to_string()
}

/// Builds a nested entity tree from the ordered query result stream of one
/// file.
///
/// Comments that open before their subject document the entity under
/// construction. Trailing comments (`///<`) document the entity on top of
/// the stack, which is the declaration that most recently ended.
pub struct Assembler<'t, 'd> {
	text: &'t str,
	source_path: PathBuf,
	stack: ContainmentStack,
	working: Entity,
	indent: usize,
	diagnostics: &'d mut Diagnostics,
}

impl<'t, 'd> Assembler<'t, 'd> {
	/// Start assembling into `root`, which spans `range` of `text`.
	pub fn new(
		text: &'t str,
		source_path: &Path,
		root: Entity,
		range: ByteRange,
		diagnostics: &'d mut Diagnostics,
	) -> Self {
		Self {
			text,
			source_path: source_path.to_path_buf(),
			stack: ContainmentStack::new(root, range),
			working: Entity::default(),
			indent: 0,
			diagnostics,
		}
	}

	pub fn feed(&mut self, item: QueryItem) {
		match item {
			QueryItem::Comment(span) => self.comment(span),
			QueryItem::Declaration(declaration) => self.declaration(declaration),
		}
	}

	/// Fold every open frame and return the root.
	pub fn finish(self) -> Entity {
		self.stack.finish(self.diagnostics)
	}

	fn comment(&mut self, span: Span) {
		let comment = span.text(self.text);
		let opens_after = comment.starts_with("/**<")
			|| comment.starts_with("/*!<")
			|| comment.starts_with("///<")
			|| comment.starts_with("//!<");

		let indent = if opens_after {
			&mut self.stack.top_mut().indent
		} else {
			&mut self.indent
		};

		let translation = match translate(comment, indent, span.location(), self.diagnostics) {
			Ok(Some(translation)) => translation,
			Ok(None) => return,
			Err(error) => {
				let text = match error {
					DoxError::UnrecognizedToken { text, .. } => text,
					other => other.to_string(),
				};
				self.diagnostics
					.push(DiagnosticKind::UnrecognizedToken { text }, span.location());
				return;
			}
		};

		match translation.opening {
			Opening::Before => translation.apply_to(&mut self.working),
			Opening::After => translation.apply_to(&mut self.stack.top_mut().entity),
		}
	}

	fn declaration(&mut self, found: DeclarationMatch) {
		let mut entity = std::mem::take(&mut self.working);
		let indent = std::mem::take(&mut self.indent);
		let range = found.span.range();

		entity.kind = found.kind;
		entity.source_path.clone_from(&self.source_path);
		entity.start_line = found.span.start_line;
		entity.end_line = found.span.end_line;

		if let Some(name) = found.name {
			entity.name = name.text(self.text).to_string();
		}

		if let Some(nested) = found.nested_name {
			entity.name = self.open_enclosing_namespaces(nested, range, &found.span);
		}

		entity.declaration = trim_declaration(
			self.text,
			found.span.start,
			found.body_start.unwrap_or(found.span.end),
		);

		let parent = self.stack.unwind(range, self.diagnostics).entity.kind;
		if matches!(parent, EntityKind::Type | EntityKind::Template) {
			// Members stay with their type whatever group they name.
			entity.group = None;
		}

		match Placement::for_parent(parent) {
			Placement::MergeIntoTemplate => self.stack.top_mut().entity.absorb_templated(entity),
			Placement::Push => {
				tracing::trace!(kind = %entity.kind, name = %entity.name, "open declaration");
				self.stack.push(entity, range);
				self.stack.top_mut().indent = indent;
			}
		}
	}

	/// Push one namespace frame per leading segment of `a::b::c` and return
	/// the last segment.
	fn open_enclosing_namespaces(&mut self, nested: Span, range: ByteRange, whole: &Span) -> String {
		let mut segments: Vec<&str> = nested
			.text(self.text)
			.split("::")
			.map(|segment| {
				let segment = segment.trim();
				segment
					.strip_prefix("inline")
					.filter(|rest| rest.starts_with(char::is_whitespace))
					.map_or(segment, str::trim_start)
			})
			.collect();
		let last = segments.pop().unwrap_or_default().to_string();

		self.stack.unwind(range, self.diagnostics);
		for segment in segments {
			let mut namespace = Entity::new(EntityKind::Namespace, segment);
			namespace.source_path.clone_from(&self.source_path);
			namespace.start_line = whole.start_line;
			namespace.end_line = whole.end_line;
			self.stack.push(namespace, range);
		}

		last
	}
}

/// Assemble one file's query results into `root`.
pub fn assemble(
	text: &str,
	source_path: &Path,
	items: impl IntoIterator<Item = QueryItem>,
	root: Entity,
	range: ByteRange,
	diagnostics: &mut Diagnostics,
) -> Entity {
	let mut assembler = Assembler::new(text, source_path, root, range, diagnostics);
	for item in items {
		assembler.feed(item);
	}

	assembler.finish()
}
