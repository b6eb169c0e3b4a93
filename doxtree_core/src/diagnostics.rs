use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// A 1-indexed line and column within a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
	pub line: usize,
	pub column: usize,
}

impl Location {
	pub fn new(line: usize, column: usize) -> Self {
		Self { line, column }
	}

	/// Convert a 0-indexed tree-sitter point into a location.
	pub fn from_point(point: tree_sitter::Point) -> Self {
		Self {
			line: point.row + 1,
			column: point.column + 1,
		}
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.line, self.column)
	}
}

/// The kind of non-fatal condition reported while building the entity tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DiagnosticKind {
	/// A macro-like token was blanked so that the surrounding code parses.
	ParseRecovery { text: String },
	/// A syntax error survived preprocessing. Processing continued.
	ParseError { excerpt: String },
	/// An `@ingroup` directive named a group that does not exist.
	UnresolvedGroup { group: String, entity: String },
	/// A doc comment used a command that is not understood.
	UnrecognizedCommand { command: String },
	/// A doc comment contained text no token pattern accepts.
	UnrecognizedToken { text: String },
	/// The file could not be read or parsed at all and was skipped.
	UnparsableFile { reason: String },
	/// A literal file pattern in the configuration matched no file.
	UnmatchedFilePattern { pattern: String },
	/// A configured group has no name and was skipped.
	MissingGroupName,
	/// An entity of a kind that cannot be filed anywhere was dropped.
	UnfiledEntity { name: String },
}

/// A warning produced while preprocessing, translating or assembling one
/// source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDiagnostic {
	/// The file the diagnostic belongs to. Empty for project-level warnings.
	pub file: PathBuf,
	/// The kind of diagnostic.
	pub kind: DiagnosticKind,
	/// 1-indexed line number.
	pub line: usize,
	/// 1-indexed column number.
	pub column: usize,
}

impl SourceDiagnostic {
	/// Human-readable message for this diagnostic.
	pub fn message(&self) -> String {
		match &self.kind {
			DiagnosticKind::ParseRecovery { text } => {
				format!("parse error at `{text}`, treated as a macro and ignored")
			}
			DiagnosticKind::ParseError { excerpt } => {
				format!("parse error at `{excerpt}`, but will continue")
			}
			DiagnosticKind::UnresolvedGroup { group, entity } => {
				format!("ignoring @ingroup {group} on `{entity}`, no such group")
			}
			DiagnosticKind::UnrecognizedCommand { command } => {
				format!("unrecognized command: {command}")
			}
			DiagnosticKind::UnrecognizedToken { text } => {
				format!("unrecognized token `{text}` in comment, comment skipped")
			}
			DiagnosticKind::UnparsableFile { reason } => format!("cannot parse file, skipping: {reason}"),
			DiagnosticKind::UnmatchedFilePattern { pattern } => {
				format!("no file matches `{pattern}`")
			}
			DiagnosticKind::MissingGroupName => "group is missing a name, skipping".to_string(),
			DiagnosticKind::UnfiledEntity { name } => {
				format!("unrecognized entity type for `{name}`, ignoring")
			}
		}
	}

	/// Short stable code for this diagnostic, suitable for tooling output.
	pub fn code(&self) -> &'static str {
		match &self.kind {
			DiagnosticKind::ParseRecovery { .. } => "doxtree::parse_recovery",
			DiagnosticKind::ParseError { .. } => "doxtree::parse_error",
			DiagnosticKind::UnresolvedGroup { .. } => "doxtree::unresolved_group",
			DiagnosticKind::UnrecognizedCommand { .. } => "doxtree::unrecognized_command",
			DiagnosticKind::UnrecognizedToken { .. } => "doxtree::unrecognized_token",
			DiagnosticKind::UnparsableFile { .. } => "doxtree::unparsable_file",
			DiagnosticKind::UnmatchedFilePattern { .. } => "doxtree::unmatched_file_pattern",
			DiagnosticKind::MissingGroupName => "doxtree::missing_group_name",
			DiagnosticKind::UnfiledEntity { .. } => "doxtree::unfiled_entity",
		}
	}
}

/// Collects warnings for one whole run.
///
/// Every recorded warning is also emitted as a `tracing` event at debug
/// level. Callers own the user-facing report. Unrecognized
/// doc comment commands are reported once per command name for the lifetime
/// of the collector, however many files or comments use them.
#[derive(Debug, Default)]
pub struct Diagnostics {
	entries: Vec<SourceDiagnostic>,
	warned_commands: HashSet<String>,
	file: PathBuf,
}

impl Diagnostics {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the file that subsequent warnings are attributed to.
	pub fn set_file(&mut self, file: &Path) {
		file.clone_into(&mut self.file);
	}

	pub fn push(&mut self, kind: DiagnosticKind, location: Location) {
		let diagnostic = SourceDiagnostic {
			file: self.file.clone(),
			kind,
			line: location.line,
			column: location.column,
		};

		tracing::debug!(
			file = %diagnostic.file.display(),
			line = diagnostic.line,
			column = diagnostic.column,
			"{}",
			diagnostic.message()
		);

		self.entries.push(diagnostic);
	}

	/// Report an unrecognized command unless it has been reported before.
	/// Returns `true` when a warning was recorded.
	pub fn unrecognized_command(&mut self, command: &str, location: Location) -> bool {
		if !self.warned_commands.insert(command.to_string()) {
			return false;
		}

		self.push(
			DiagnosticKind::UnrecognizedCommand {
				command: command.to_string(),
			},
			location,
		);

		true
	}

	pub fn entries(&self) -> &[SourceDiagnostic] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn into_entries(self) -> Vec<SourceDiagnostic> {
		self.entries
	}
}
