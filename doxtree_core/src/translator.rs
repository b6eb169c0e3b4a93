use crate::DoxResult;
use crate::Entity;
use crate::EntityKind;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Location;
use crate::lexer::DocLexer;
use crate::tokens::DocToken;
use crate::tokens::TokenKind;

/// Which entity a doc comment documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opening {
	/// `/** ... */`, `/// ...`: the entity that follows the comment.
	Before,
	/// `/**< ... */`, `///< ...`: the entity that precedes the comment.
	After,
}

/// The output of translating one doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
	pub opening: Opening,
	/// Formatted text, ending in a paragraph break when not empty.
	pub documentation: String,
	/// Text captured by `@brief` or `@short`.
	pub brief: String,
	/// Group named by `@ingroup`.
	pub group: Option<String>,
	/// Set by `@internal`.
	pub hidden: bool,
	/// Set by `@file`: the comment describes the file, not an entity.
	pub file_level: bool,
}

impl Translation {
	fn new(opening: Opening) -> Self {
		Self {
			opening,
			documentation: String::new(),
			brief: String::new(),
			group: None,
			hidden: false,
			file_level: false,
		}
	}

	/// Merge this translation into the entity it documents.
	pub fn apply_to(self, entity: &mut Entity) {
		if self.file_level {
			entity.documentation.clear();
			entity.brief.clear();
		} else {
			entity.documentation.push_str(&self.documentation);
			entity.brief.push_str(&self.brief);
		}

		if self.group.is_some() {
			entity.group = self.group;
		}

		entity.hidden = entity.hidden || self.hidden;

		if self.file_level && entity.kind == EntityKind::None {
			entity.kind = EntityKind::File;
		}
	}
}

/// Translate one comment.
///
/// Returns `None` for ordinary comments that do not start with a doc
/// opener. `indent` carries the continuation indent of the documented entity
/// from one comment to the next, so that a run of `///` lines continues a
/// parameter or admonition block. `location` is where the comment starts and
/// is used to place warnings.
pub fn translate(
	comment: &str,
	indent: &mut usize,
	location: Location,
	diagnostics: &mut Diagnostics,
) -> DoxResult<Option<Translation>> {
	let mut lexer = DocLexer::new(comment);
	let opening = match lexer.next().transpose()? {
		Some(token) if token.is(TokenKind::OPEN_AFTER) => Opening::After,
		Some(token) if token.is(TokenKind::OPEN_BEFORE) => Opening::Before,
		_ => return Ok(None),
	};

	let mut translator = Translator {
		comment,
		lexer,
		peeked: None,
		output: Translation::new(opening),
		indent: *indent,
		location,
		diagnostics,
	};
	translator.run()?;
	*indent = translator.indent;

	Ok(Some(translator.finish()))
}

const ADMONITIONS: [&str; 12] = [
	"note", "abstract", "info", "tip", "success", "question", "warning", "failure", "danger", "bug",
	"example", "quote",
];

/// Javadoc style tagging commands that are discarded with their argument.
const NOISE: [&str; 12] = [
	"def",
	"var",
	"fn",
	"class",
	"struct",
	"union",
	"enum",
	"typedef",
	"namespace",
	"interface",
	"protocol",
	"property",
];

struct Translator<'a, 'd> {
	comment: &'a str,
	lexer: DocLexer<'a>,
	peeked: Option<DocToken<'a>>,
	output: Translation,
	indent: usize,
	location: Location,
	diagnostics: &'d mut Diagnostics,
}

impl<'a> Translator<'a, '_> {
	fn next_token(&mut self) -> DoxResult<Option<DocToken<'a>>> {
		if let Some(token) = self.peeked.take() {
			return Ok(Some(token));
		}

		self.lexer.next().transpose()
	}

	fn consume(&mut self, stop: TokenKind) -> DoxResult<Option<DocToken<'a>>> {
		if let Some(token) = self.peeked.take() {
			if token.is(stop) {
				return Ok(Some(token));
			}
		}

		self.lexer.consume(stop)
	}

	fn consume_word(&mut self) -> DoxResult<&'a str> {
		Ok(self.consume(TokenKind::WORD)?.map(|token| token.text).unwrap_or_default())
	}

	fn docs(&mut self) -> &mut String {
		&mut self.output.documentation
	}

	fn push_indent(&mut self) {
		let indent = self.indent;
		self.docs().extend(std::iter::repeat_n(' ', indent));
	}

	fn run(&mut self) -> DoxResult<()> {
		let Some(mut token) = self.next_token()? else {
			// An empty line comment ends the current paragraph.
			self.indent = self.indent.saturating_sub(4);
			return Ok(());
		};

		let mut first = true;
		loop {
			if token.is(TokenKind::COMMAND) {
				self.command(token)?;
			} else if token.is(TokenKind::PARA) {
				if !first {
					self.docs().push_str("\n\n");
					self.indent = self.indent.saturating_sub(4);
				}
			} else if token.is(TokenKind::LINE) {
				if !first {
					self.docs().push('\n');
					self.push_indent();
				}
			} else if !token.is(TokenKind::CLOSE) {
				if first {
					self.push_indent();
				}
				self.docs().push_str(token.text);
			}

			first = false;
			match self.next_token()? {
				Some(next) => token = next,
				None => return Ok(()),
			}
		}
	}

	fn command(&mut self, token: DocToken<'a>) -> DoxResult<()> {
		let command = token.command();
		match command {
			"param" | "param[in]" => self.definition(":material-location-enter: **Parameter**", true)?,
			"param[out]" => self.definition(":material-location-exit: **Parameter**", true)?,
			"param[in,out]" => {
				self.definition(
					":material-location-enter::material-location-exit: **Parameter**",
					true,
				)?;
			}
			"tparam" => self.definition(":material-code-tags: **Template parameter**", true)?,
			"return" | "returns" | "result" => {
				self.definition(":material-keyboard-return: **Return**", false)?;
			}
			"pre" => self.definition(":material-check-circle-outline: **Pre-condition**", false)?,
			"post" => self.definition(":material-check-circle-outline: **Post-condition**", false)?,
			"throw" => self.definition(":material-alert-circle-outline: **Throw**", false)?,
			"see" | "sa" => self.definition(":material-eye-outline: **See**", false)?,
			"attention" => self.admonition("warning \"Attention\"")?,
			"todo" => self.admonition("example \"To-do\"")?,
			"remark" => self.admonition("quote \"Remark\"")?,
			name if ADMONITIONS.contains(&name) => self.admonition(name)?,
			"ingroup" => {
				let group = self.consume_word()?;
				if !group.is_empty() {
					self.output.group = Some(group.to_string());
				}
			}
			"brief" | "short" => self.brief()?,
			"file" => self.output.file_level = true,
			"internal" => self.output.hidden = true,
			"e" | "em" | "a" => self.wrap_word("*")?,
			"b" => self.wrap_word("**")?,
			"c" | "p" => self.wrap_word("`")?,
			"f$" => self.docs().push('$'),
			"f[" | "f]" => self.docs().push_str("$$"),
			"li" | "arg" => {
				self.docs().push_str("  - ");
				self.skip_whitespace()?;
			}
			"anchor" => {
				let name = self.consume_word()?;
				let anchor = format!("<a name=\"{name}\"></a>");
				self.docs().push_str(&anchor);
			}
			"ref" => {
				let href = self.consume_word()?;
				let text = self.consume_word()?;
				let link = format!("[{text}](#{href})");
				self.docs().push_str(&link);
			}
			"code" | "endcode" | "verbatim" | "endverbatim" => self.docs().push_str("\n```"),
			name if NOISE.contains(&name) => {
				self.consume(TokenKind::WORD)?;
			}
			"@" => self.docs().push('@'),
			"/" => self.docs().push('/'),
			_ if token.is_legacy_command() => {
				// Probably a foreign macro, e.g. LaTeX inside math.
				self.docs().push_str(token.text);
			}
			_ => {
				let location = self.location_of(token.offset);
				self.diagnostics.unrecognized_command(command, location);
				self.docs().push_str(token.text);
			}
		}

		Ok(())
	}

	/// Start a definition list entry, optionally naming the next word.
	fn definition(&mut self, label: &str, named: bool) -> DoxResult<()> {
		self.docs().push('\n');
		self.docs().push_str(label);
		if named {
			let name = self.consume_word()?;
			let name = format!(" `{name}`");
			self.docs().push_str(&name);
			self.indent = 4;
		}
		self.docs().push_str("\n:   ");
		self.skip_whitespace()
	}

	fn admonition(&mut self, title: &str) -> DoxResult<()> {
		let opener = format!("\n!!! {title}\n");
		self.docs().push_str(&opener);
		self.indent += 4;
		self.push_indent();
		self.skip_whitespace()
	}

	/// Drop one whitespace token after a block marker, which already
	/// separates the marker from its body.
	fn skip_whitespace(&mut self) -> DoxResult<()> {
		match self.next_token()? {
			Some(token) if token.is(TokenKind::WHITESPACE) => {}
			other => self.peeked = other,
		}

		Ok(())
	}

	fn wrap_word(&mut self, marker: &str) -> DoxResult<()> {
		let word = self.consume_word()?;
		let wrapped = format!("{marker}{word}{marker}");
		self.docs().push_str(&wrapped);
		Ok(())
	}

	/// Capture the first sentence after `@brief` into both the brief and the
	/// documentation.
	fn brief(&mut self) -> DoxResult<()> {
		let mut brief = String::new();
		while let Some(token) = self.next_token()? {
			if token.is(TokenKind::PARA | TokenKind::CLOSE | TokenKind::COMMAND) {
				self.peeked = Some(token);
				break;
			}

			if token.is(TokenKind::LINE | TokenKind::WHITESPACE) {
				if !brief.is_empty() && !brief.ends_with(' ') {
					brief.push(' ');
				}
				continue;
			}

			brief.push_str(token.text);
			if token.text.ends_with(['.', '!', '?']) {
				break;
			}
		}

		let brief = brief.trim_end();
		self.output.brief.push_str(brief);
		self.docs().push_str(brief);
		Ok(())
	}

	fn location_of(&self, offset: usize) -> Location {
		let before = self.comment.get(..offset).unwrap_or_default();
		match before.rfind('\n') {
			Some(newline) => {
				Location::new(
					self.location.line + before.matches('\n').count(),
					offset - newline,
				)
			}
			None => Location::new(self.location.line, self.location.column + offset),
		}
	}

	fn finish(mut self) -> Translation {
		let trimmed = self.output.documentation.trim_end().len();
		self.output.documentation.truncate(trimmed);
		if !self.output.documentation.is_empty() {
			self.output.documentation.push_str("\n\n");
		}

		self.output
	}
}
