use streaming_iterator::StreamingIterator;
use tree_sitter::InputEdit;
use tree_sitter::Language;
use tree_sitter::Node;
use tree_sitter::Parser;
use tree_sitter::Point;
use tree_sitter::Query;
use tree_sitter::QueryCursor;
use tree_sitter::Tree;

use crate::DoxError;
use crate::DoxResult;
use crate::EntityKind;
use crate::diagnostics::Location;
use crate::stack::ByteRange;

/// Declarations and doc comments to extract from C++ sources.
///
/// Matches are produced in document order. A declaration match carries the
/// whole declaration as its kind capture (`@function`, `@type`, ...) plus a
/// `@name` and an optional `@body`/`@value` that ends the displayed
/// signature.
pub const DECLARATION_QUERY: &str = r#"
[
  ;; documentation
  (comment) @docs

  ;; namespace definition
  (namespace_definition
      name: (namespace_identifier) @name
      body: (declaration_list)? @body) @namespace

  ;; nested namespace definition, e.g. `namespace a::b::c`
  (namespace_definition
      (nested_namespace_specifier) @nested_name
      body: (declaration_list)? @body) @namespace

  ;; template declaration
  (template_declaration
      [
        (class_specifier)
        (struct_specifier)
        (union_specifier)
        (alias_declaration)
        (concept_definition)
        (declaration)
        (field_declaration)
        (function_definition)
      ] @body) @template

  ;; class, struct and union definitions, including specializations
  (class_specifier
      name: [
        (type_identifier) @name
        (template_type) @name
      ]
      body: (field_declaration_list)? @body) @type

  (struct_specifier
      name: [
        (type_identifier) @name
        (template_type) @name
      ]
      body: (field_declaration_list)? @body) @type

  (union_specifier
      name: [
        (type_identifier) @name
        (template_type) @name
      ]
      body: (field_declaration_list)? @body) @type

  ;; enum definition
  (enum_specifier
      name: (type_identifier) @name
      body: (enumerator_list)? @body) @type

  ;; typedef, including function pointer types
  (type_definition
      declarator: [
        (type_identifier) @name
        (function_declarator
          declarator: (parenthesized_declarator
            (pointer_declarator
              declarator: (type_identifier) @name)))
        (pointer_declarator
          declarator: (function_declarator
            declarator: (type_identifier) @name))
      ]) @typedef

  ;; type alias
  (alias_declaration
      name: (type_identifier) @name) @typedef

  ;; concept
  (concept_definition
      name: (identifier) @name
      (_)) @concept

  ;; variable
  (declaration
      declarator: [
        (identifier) @name
        (array_declarator (identifier) @name)
        (reference_declarator (identifier) @name)
        (pointer_declarator (identifier) @name)
        (init_declarator
          declarator: [
            (identifier) @name
            (array_declarator (identifier) @name)
            (reference_declarator (identifier) @name)
            (pointer_declarator (identifier) @name)
          ]
          value: (_) @value)
        (function_declarator
          declarator: (parenthesized_declarator
            (pointer_declarator
              declarator: (identifier) @name)))
      ]) @variable

  ;; member variable
  (field_declaration
      declarator: [
        (field_identifier) @name
        (array_declarator (field_identifier) @name)
        (reference_declarator (field_identifier) @name)
        (pointer_declarator (field_identifier) @name)
        (init_declarator
          declarator: [
            (identifier) @name
            (field_identifier) @name
            (array_declarator (identifier) @name)
            (array_declarator (field_identifier) @name)
            (reference_declarator (identifier) @name)
            (reference_declarator (field_identifier) @name)
            (pointer_declarator (identifier) @name)
            (pointer_declarator (field_identifier) @name)
          ]
          value: (_) @value)
        (function_declarator
          declarator: (parenthesized_declarator
            (pointer_declarator
              declarator: (field_identifier) @name)))
      ]
      default_value: (_)? @value) @variable

  ;; function
  (_
      declarator: [
        (function_declarator
          declarator: [
            (identifier) @name
            (field_identifier) @name
            (destructor_name) @name
          ])
        (reference_declarator
          (function_declarator
            declarator: [
              (identifier) @name
              (field_identifier) @name
              (destructor_name) @name
            ]))
        (pointer_declarator
          (function_declarator
            declarator: [
              (identifier) @name
              (field_identifier) @name
              (destructor_name) @name
            ]))
        (function_declarator
          declarator: (parenthesized_declarator
            (pointer_declarator
              (function_declarator
                declarator: [
                  (identifier) @name
                  (field_identifier) @name
                  (destructor_name) @name
                ]))))
      ]
      [
        (field_initializer_list)
        body: (_)
      ]? @body) @function

  ;; operator
  (_
      declarator: [
        (function_declarator
          declarator: (operator_name) @name)
        (reference_declarator
          (function_declarator
            declarator: (operator_name) @name))
        (pointer_declarator
          (function_declarator
            declarator: (operator_name) @name))
        (operator_cast
          type: (_) @name)
      ]
      body: (_)? @body) @operator

  ;; enumeration value
  (enumerator
      name: (identifier) @name) @enumerator

  ;; macro
  (preproc_def
      name: (identifier) @name
      value: (_) @value) @macro
  (preproc_function_def
      name: (identifier) @name
      value: (_) @value) @macro
]
"#;

/// Node kinds whose contents are never rewritten or reported.
const MACRO_DEFINITIONS: [&str; 2] = ["preproc_def", "preproc_function_def"];

/// A captured node's byte range and position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
	pub start: usize,
	pub end: usize,
	/// 0-indexed.
	pub start_line: usize,
	/// 0-indexed, in bytes.
	pub start_column: usize,
	/// 0-indexed.
	pub end_line: usize,
}

impl Span {
	pub fn of(node: Node<'_>) -> Self {
		let start = node.start_position();
		Self {
			start: node.start_byte(),
			end: node.end_byte(),
			start_line: start.row,
			start_column: start.column,
			end_line: node.end_position().row,
		}
	}

	pub fn range(&self) -> ByteRange {
		ByteRange::new(self.start, self.end)
	}

	pub fn location(&self) -> Location {
		Location::new(self.start_line + 1, self.start_column + 1)
	}

	pub fn text<'a>(&self, source: &'a str) -> &'a str {
		source.get(self.start..self.end).unwrap_or_default()
	}
}

/// One declaration matched by [`DECLARATION_QUERY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationMatch {
	pub kind: EntityKind,
	/// The whole declaration.
	pub span: Span,
	pub name: Option<Span>,
	/// Scoped name of a nested namespace definition, e.g. `a::b::c`.
	pub nested_name: Option<Span>,
	/// Start of the body or initializer, which ends the displayed signature.
	pub body_start: Option<usize>,
}

/// An item of the ordered query result stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryItem {
	Comment(Span),
	Declaration(DeclarationMatch),
}

/// Source text together with its current syntax tree.
#[derive(Debug)]
pub struct ParsedSource {
	pub text: String,
	pub tree: Tree,
}

/// The C++ parser and compiled declaration query.
///
/// Not shareable between threads at once: each worker owns one engine.
pub struct SyntaxEngine {
	parser: Parser,
	query: Query,
}

impl SyntaxEngine {
	pub fn new() -> DoxResult<Self> {
		let language: Language = tree_sitter_cpp::LANGUAGE.into();
		let mut parser = Parser::new();
		parser
			.set_language(&language)
			.map_err(|e| DoxError::Language(e.to_string()))?;

		let query = Query::new(&language, DECLARATION_QUERY).map_err(|e| {
			DoxError::InvalidQuery {
				from: DECLARATION_QUERY
					.get(e.offset..)
					.unwrap_or_default()
					.chars()
					.take(40)
					.collect(),
				message: e.message,
			}
		})?;

		Ok(Self { parser, query })
	}

	/// Parse `text` from scratch. Returns `None` when the parser gives up.
	pub fn parse(&mut self, text: String) -> Option<ParsedSource> {
		self.parser.reset();
		let tree = self.parser.parse(&text, None)?;
		Some(ParsedSource { text, tree })
	}

	/// Replace `range` of the source with `replacement`, then bring the tree
	/// up to date with an incremental reparse. Returns `false` when the
	/// reparse fails, in which case the text is updated but the tree is stale.
	pub fn splice(&mut self, source: &mut ParsedSource, range: ByteRange, replacement: &str) -> bool {
		let start_position = point_at(&source.text, range.start);
		let old_end_position = point_at(&source.text, range.end);

		source.text.replace_range(range.start..range.end, replacement);

		let new_end_byte = range.start + replacement.len();
		source.tree.edit(&InputEdit {
			start_byte: range.start,
			old_end_byte: range.end,
			new_end_byte,
			start_position,
			old_end_position,
			new_end_position: point_at(&source.text, new_end_byte),
		});

		self.parser.reset();
		match self.parser.parse(&source.text, Some(&source.tree)) {
			Some(tree) => {
				source.tree = tree;
				true
			}
			None => false,
		}
	}

	/// Run the declaration query, returning comments and declarations in the
	/// order the query engine yields them.
	pub fn declarations(&self, source: &ParsedSource) -> Vec<QueryItem> {
		let names = self.query.capture_names();
		let mut cursor = QueryCursor::new();
		let mut matches = cursor.matches(&self.query, source.tree.root_node(), source.text.as_bytes());
		let mut items = Vec::new();

		while let Some(found) = matches.next() {
			let mut declaration = DeclarationMatch::default();
			let mut comment = None;

			for capture in found.captures {
				let node = capture.node;
				let name = names.get(capture.index as usize).copied().unwrap_or_default();
				match name {
					"docs" => comment = Some(Span::of(node)),
					"name" => declaration.name = Some(Span::of(node)),
					"nested_name" => declaration.nested_name = Some(Span::of(node)),
					"body" | "value" => declaration.body_start = Some(node.start_byte()),
					other => {
						if let Some(kind) = kind_for_capture(other) {
							declaration.kind = kind;
							declaration.span = Span::of(node);
						}
					}
				}
			}

			if let Some(span) = comment {
				items.push(QueryItem::Comment(span));
			} else if declaration.kind != EntityKind::None {
				items.push(QueryItem::Declaration(declaration));
			}
		}

		items
	}
}

fn kind_for_capture(name: &str) -> Option<EntityKind> {
	let kind = match name {
		"namespace" => EntityKind::Namespace,
		"template" => EntityKind::Template,
		"type" | "typedef" => EntityKind::Type,
		"concept" => EntityKind::Concept,
		"variable" => EntityKind::Variable,
		"function" => EntityKind::Function,
		"operator" => EntityKind::Operator,
		"enumerator" => EntityKind::Enumerator,
		"macro" => EntityKind::Macro,
		_ => return None,
	};

	Some(kind)
}

/// Row and byte column of `byte` within `text`.
pub fn point_at(text: &str, byte: usize) -> Point {
	let before = text.get(..byte).unwrap_or(text);
	match before.rfind('\n') {
		Some(newline) => Point::new(before.matches('\n').count(), byte - newline - 1),
		None => Point::new(0, byte),
	}
}

/// Visit nodes depth first, starting from the deepest node at `from` (or the
/// root), until `visit` returns a value. Macro definitions are not entered.
///
/// After an edit, calling this again with the edited byte offset resumes the
/// traversal where the edit happened.
pub fn find_node<'t, T>(
	tree: &'t Tree,
	from: Option<usize>,
	mut visit: impl FnMut(Node<'t>) -> Option<T>,
) -> Option<T> {
	let mut cursor = tree.walk();
	if let Some(byte) = from {
		while cursor.goto_first_child_for_byte(byte).is_some() {}
	}

	loop {
		let node = cursor.node();
		if let Some(found) = visit(node) {
			return Some(found);
		}

		if !MACRO_DEFINITIONS.contains(&node.kind()) && cursor.goto_first_child() {
			continue;
		}

		loop {
			if cursor.goto_next_sibling() {
				break;
			}

			if !cursor.goto_parent() {
				return None;
			}
		}
	}
}
