use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum AsciiCodeError {
	#[error(transparent)]
	#[diagnostic(code(asciicode::io_error))]
	Io(#[from] std::io::Error),

	#[error("no language or comment grammar was provided")]
	#[diagnostic(
		code(asciicode::missing_language),
		help(
			"pass `--language`, add a `:asciicode-language: <name>` modeline, or declare \
			 `:asciicode-comments: (\"start\", \"end\")`"
		)
	)]
	MissingLanguage,

	#[error("no comment grammar is known for language `{0}`")]
	#[diagnostic(
		code(asciicode::unknown_language),
		help("declare the tags with `comments` or add a `[languages.{0}]` entry to asciicode.toml")
	)]
	UnknownLanguage(String),

	#[error("invalid comment grammar: {0}")]
	#[diagnostic(
		code(asciicode::invalid_comment_grammar),
		help("expected two or three quoted strings, e.g. `(\"/*.\", \" *\", \".*/\")`")
	)]
	InvalidCommentGrammar(String),

	#[error("invalid value `{value}` for modeline option `{key}`: {reason}")]
	#[diagnostic(code(asciicode::invalid_modeline_value))]
	InvalidModelineValue {
		key: String,
		value: String,
		reason: String,
	},

	#[error("line {line} inside a documentation block does not start with `{mid}`")]
	#[diagnostic(
		code(asciicode::malformed_block),
		help("every line between the start and end tags must begin with the continuation tag")
	)]
	MalformedBlock { mid: String, line: usize },

	#[error("documentation block opened with `{start}` on line {line} is never closed")]
	#[diagnostic(
		code(asciicode::unterminated_doc_block),
		help("add the closing tag, or pass `--allow-unterminated` to keep the trailing text as documentation")
	)]
	UnterminatedDocBlock { start: String, line: usize },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(asciicode::config_parse),
		help("check that asciicode.toml is valid TOML with [defaults] and/or [languages] sections")
	)]
	ConfigParse(String),

	#[error("document renderer failed: {0}")]
	#[diagnostic(code(asciicode::render))]
	Render(String),
}

impl AsciiCodeError {
	/// Returns true for the errors caused by missing or contradictory
	/// configuration rather than by the shape of the source text.
	pub fn is_configuration_error(&self) -> bool {
		matches!(
			self,
			Self::MissingLanguage
				| Self::UnknownLanguage(_)
				| Self::InvalidCommentGrammar(_)
				| Self::InvalidModelineValue { .. }
				| Self::ConfigParse(_)
		)
	}
}

pub type AsciiCodeResult<T> = Result<T, AsciiCodeError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
