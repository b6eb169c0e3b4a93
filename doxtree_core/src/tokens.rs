use std::fmt::Display;

use bitflags::bitflags;

bitflags! {
	/// Token categories of the doc comment language.
	///
	/// Each token carries exactly one flag. Combinations form masks for
	/// [`DocLexer::consume`](crate::lexer::DocLexer::consume).
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct TokenKind: u16 {
		/// `/**<`, `/*!<`, `///<` or `//!<`: documents the preceding entity.
		const OPEN_AFTER = 1;
		/// `/**`, `/*!`, `///` or `//!`: documents the following entity.
		const OPEN_BEFORE = 1 << 1;
		/// `*/`
		const CLOSE = 1 << 2;
		/// `@word` or `\word`, optionally qualified e.g. `@param[in]`.
		const COMMAND = 1 << 3;
		/// Two consecutive line breaks.
		const PARA = 1 << 4;
		/// A line break with any leading `*` continuation.
		const LINE = 1 << 5;
		/// `.`, `!` or `?`
		const SENTENCE = 1 << 6;
		const WHITESPACE = 1 << 7;
		const WORD = 1 << 8;
		const STAR = 1 << 9;
		const SLASH = 1 << 10;

		/// Either doc comment opener.
		const OPEN = Self::OPEN_AFTER.bits() | Self::OPEN_BEFORE.bits();
	}
}

/// A token of a doc comment, borrowing its text from the comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocToken<'a> {
	pub kind: TokenKind,
	pub text: &'a str,
	/// Byte offset of the token within the comment.
	pub offset: usize,
}

impl<'a> DocToken<'a> {
	pub fn new(kind: TokenKind, text: &'a str, offset: usize) -> Self {
		Self { kind, text, offset }
	}

	pub fn is(&self, mask: TokenKind) -> bool {
		self.kind.intersects(mask)
	}

	/// The command name without its leading `@` or `\`.
	pub fn command(&self) -> &'a str {
		self.text.get(1..).unwrap_or_default()
	}

	/// Whether this command uses the legacy `\` escape.
	pub fn is_legacy_command(&self) -> bool {
		self.text.starts_with('\\')
	}

	/// Byte offset one past the end of the token within the comment.
	pub fn end(&self) -> usize {
		self.offset + self.text.len()
	}
}

impl Display for DocToken<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.text)
	}
}
