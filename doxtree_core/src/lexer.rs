use std::sync::LazyLock;

use regex::Regex;

use crate::DoxError;
use crate::DoxResult;
use crate::tokens::DocToken;
use crate::tokens::TokenKind;

/// How a token pattern recognises a prefix of the remaining input.
enum Matcher {
	Pattern(Regex),
	/// A line break, then an optional `*` continuation that is not the start
	/// of `*/`, then one optional blank.
	Line,
	/// Two [`Matcher::Line`] breaks in a row.
	Para,
}

impl Matcher {
	fn pattern(source: &str) -> Self {
		// Every pattern is anchored to the current position.
		match Regex::new(&format!("^(?:{source})")) {
			Ok(regex) => Self::Pattern(regex),
			Err(error) => panic!("invalid token pattern `{source}`: {error}"),
		}
	}

	fn find(&self, rest: &str) -> Option<usize> {
		match self {
			Self::Pattern(regex) => regex.find(rest).map(|found| found.end()),
			Self::Line => match_line(rest),
			Self::Para => {
				let first = match_line(rest)?;
				let second = match_line(&rest[first..])?;
				Some(first + second)
			}
		}
	}
}

fn match_line(rest: &str) -> Option<usize> {
	let bytes = rest.as_bytes();
	let blank = |index: usize| matches!(bytes.get(index), Some(b' ' | b'\t'));

	let mut end = 0;
	while blank(end) {
		end += 1;
	}

	if bytes.get(end) != Some(&b'\n') {
		return None;
	}

	end += 1;

	let mut star = end;
	while blank(star) {
		star += 1;
	}

	if bytes.get(star) == Some(&b'*') && bytes.get(star + 1) != Some(&b'/') {
		end = star + 1;
	}

	if blank(end) {
		end += 1;
	}

	Some(end)
}

/// Token patterns in priority order. The first pattern that matches a prefix
/// of the remaining input wins, so more specific patterns come first.
static PATTERNS: LazyLock<Vec<(TokenKind, Matcher)>> = LazyLock::new(|| {
	vec![
		(
			TokenKind::OPEN_AFTER,
			Matcher::pattern(r"(?:/\*\*|/\*!|///|//!)<[ \t]?"),
		),
		(
			TokenKind::OPEN_BEFORE,
			Matcher::pattern(r"(?:/\*\*|/\*!|///|//!)[ \t]?"),
		),
		(TokenKind::CLOSE, Matcher::pattern(r"\*/")),
		(
			TokenKind::COMMAND,
			Matcher::pattern(r"[@\\](?:param\[(?:in|out|in,out)\]|f[$\[\]]|\w+|@|\\|/)"),
		),
		(TokenKind::PARA, Matcher::Para),
		(TokenKind::LINE, Matcher::Line),
		(TokenKind::SENTENCE, Matcher::pattern(r"[.!?]")),
		(TokenKind::WHITESPACE, Matcher::pattern(r"\s+")),
		(TokenKind::WORD, Matcher::pattern(r"[^\s*/]+")),
		(TokenKind::STAR, Matcher::pattern(r"\*")),
		(TokenKind::SLASH, Matcher::pattern(r"/")),
	]
});

/// Splits one comment into [`DocToken`]s.
///
/// The sequence is lazy and cannot be restarted. After an
/// [`DoxError::UnrecognizedToken`] error the lexer yields nothing further.
pub struct DocLexer<'a> {
	comment: &'a str,
	position: usize,
}

impl<'a> DocLexer<'a> {
	pub fn new(comment: &'a str) -> Self {
		Self {
			comment,
			position: 0,
		}
	}

	/// Pull tokens until one matches `stop`, returning it. Returns `None` when
	/// the comment ends first.
	pub fn consume(&mut self, stop: TokenKind) -> DoxResult<Option<DocToken<'a>>> {
		for token in self.by_ref() {
			let token = token?;
			if token.is(stop) {
				return Ok(Some(token));
			}
		}

		Ok(None)
	}

}

impl<'a> Iterator for DocLexer<'a> {
	type Item = DoxResult<DocToken<'a>>;

	fn next(&mut self) -> Option<Self::Item> {
		let rest = self.comment.get(self.position..)?;
		if rest.is_empty() {
			return None;
		}

		let offset = self.position;
		// Openers only count at the very start of the comment.
		let matched = PATTERNS
			.iter()
			.filter(|(kind, _)| offset == 0 || !kind.intersects(TokenKind::OPEN))
			.find_map(|(kind, matcher)| matcher.find(rest).map(|length| (*kind, length)))
			.filter(|(_, length)| *length > 0);

		let Some((kind, length)) = matched else {
			self.position = self.comment.len();
			let text: String = rest.chars().take(40).collect();
			return Some(Err(DoxError::UnrecognizedToken { offset, text }));
		};

		self.position += length;
		Some(Ok(DocToken::new(kind, &rest[..length], offset)))
	}
}
