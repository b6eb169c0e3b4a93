use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DoxError {
	#[error(transparent)]
	#[diagnostic(code(doxtree::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(doxtree::config_parse),
		help("check that doxtree.yaml is valid and uses the `files`, `defines` and `groups` keys")
	)]
	ConfigParse(String),

	#[error("unsupported config file format: `{0}`")]
	#[diagnostic(
		code(doxtree::unsupported_format),
		help("supported formats: yaml, yml, toml, json")
	)]
	UnsupportedConfigFormat(String),

	#[error("invalid file pattern `{pattern}`: {reason}")]
	#[diagnostic(code(doxtree::invalid_glob))]
	InvalidGlob { pattern: String, reason: String },

	#[error("invalid declaration query starting `{from}`: {message}")]
	#[diagnostic(
		code(doxtree::invalid_query),
		help("the declaration query does not match the C++ grammar in use")
	)]
	InvalidQuery { from: String, message: String },

	#[error("failed to load the C++ grammar: {0}")]
	#[diagnostic(code(doxtree::language))]
	Language(String),

	#[error("unrecognized token in comment at byte {offset}: `{text}`")]
	#[diagnostic(code(doxtree::unrecognized_token))]
	UnrecognizedToken { offset: usize, text: String },
}

pub type DoxResult<T> = Result<T, DoxError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
