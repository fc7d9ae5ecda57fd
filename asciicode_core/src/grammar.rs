use std::collections::BTreeMap;
use std::fmt::Display;
use std::ops::Range;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::AsciiCodeError;
use crate::AsciiCodeResult;
use crate::lexer::parse_comment_tags;

/// Built-in comment grammars as `(language, start, mid, end)`.
///
/// Python uses a docstring-style triple quote with a trailing `.` so ordinary
/// docstrings are left alone. The C family uses block comments with a `.`
/// marker for the same reason.
pub const BUILTIN_GRAMMARS: &[(&str, &str, Option<&str>, &str)] = &[
	("python", "'''.", None, ".'''"),
	("py", "'''.", None, ".'''"),
	("c", "/*.", None, ".*/"),
	("h", "/*.", None, ".*/"),
	("c++", "/*.", None, ".*/"),
	("cpp", "/*.", None, ".*/"),
	("cxx", "/*.", None, ".*/"),
	("hpp", "/*.", None, ".*/"),
	("java", "/*.", None, ".*/"),
	("go", "/*.", None, ".*/"),
	("rust", "/*.", None, ".*/"),
	("rs", "/*.", None, ".*/"),
	("js", "/*.", None, ".*/"),
	("javascript", "/*.", None, ".*/"),
	("ts", "/*.", None, ".*/"),
	("typescript", "/*.", None, ".*/"),
];

/// The tags that delimit a documentation span inside a language's comments.
///
/// ```rust
/// use asciicode_core::CommentGrammar;
///
/// let grammar = CommentGrammar::new("/*.", Some(" *"), ".*/");
/// assert_eq!(grammar.start, "/*.");
/// assert_eq!(grammar.mid.as_deref(), Some(" *"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentGrammar {
	/// Opens a documentation span.
	pub start: String,
	/// Continuation tag repeated at the front of every documentation line.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mid: Option<String>,
	/// Closes a documentation span.
	pub end: String,
}

impl CommentGrammar {
	pub fn new(start: impl Into<String>, mid: Option<&str>, end: impl Into<String>) -> Self {
		Self {
			start: start.into(),
			mid: mid.map(ToString::to_string),
			end: end.into(),
		}
	}

	/// Build a grammar from a two element `(start, end)` or three element
	/// `(start, mid, end)` sequence. A missing or empty middle element means
	/// the grammar has no continuation tag.
	pub fn from_parts(parts: Vec<Option<String>>) -> AsciiCodeResult<Self> {
		let (start, mid, end) = match <[Option<String>; 3]>::try_from(parts) {
			Ok([start, mid, end]) => (start, mid, end),
			Err(parts) if parts.len() == 2 => {
				let mut parts = parts.into_iter();
				(parts.next().flatten(), None, parts.next().flatten())
			}
			Err(parts) => {
				return Err(AsciiCodeError::InvalidCommentGrammar(format!(
					"expected 2 or 3 tags, found {}",
					parts.len()
				)));
			}
		};

		let grammar = Self {
			start: start.unwrap_or_default(),
			mid: mid.filter(|mid| !mid.trim().is_empty()),
			end: end.unwrap_or_default(),
		};
		grammar.validate()?;

		Ok(grammar)
	}

	/// Check that both the start and end tags are present.
	pub fn validate(&self) -> AsciiCodeResult<()> {
		if self.start.trim().is_empty() {
			return Err(AsciiCodeError::InvalidCommentGrammar(
				"the start tag is empty".to_string(),
			));
		}

		if self.end.trim().is_empty() {
			return Err(AsciiCodeError::InvalidCommentGrammar(
				"the end tag is empty".to_string(),
			));
		}

		Ok(())
	}
}

impl Display for CommentGrammar {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.mid {
			Some(mid) => write!(f, "{} {} {}", self.start, mid, self.end),
			None => write!(f, "{} {}", self.start, self.end),
		}
	}
}

/// Parse the literal form used by modelines and the command line, e.g.
/// `("/*.", " *", ".*/")`.
impl FromStr for CommentGrammar {
	type Err = AsciiCodeError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Self::from_parts(parse_comment_tags(value)?)
	}
}

/// A documentation span found by [`TagMatcher::find_span`]. Offsets are byte
/// offsets into the searched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanMatch {
	/// Offset of the first byte of the start tag.
	pub start: usize,
	/// The documentation body between the tags.
	pub body: Range<usize>,
	/// Offset just past the end tag and its optional line break. `None` when
	/// the span runs to the end of the text without a closing tag.
	pub end: Option<usize>,
}

/// Recognizes the tags of a comment grammar. The segmentation strategies only
/// talk to this trait.
pub trait TagMatcher {
	fn start_tag(&self) -> &str;
	fn mid_tag(&self) -> Option<&str>;

	/// If `line` holds nothing but the start tag, return the number of
	/// whitespace characters in front of it.
	fn match_start(&self, line: &str) -> Option<usize> {
		match_lone_tag(line, self.start_tag())
	}

	/// Whether `line` holds nothing but the end tag.
	fn match_end(&self, line: &str) -> bool;

	/// Remove the continuation tag and one following separator from `line`.
	/// Lines pass through untouched when the grammar has no continuation tag
	/// and `None` is returned when the tag is required but missing.
	fn strip_mid<'a>(&self, line: &'a str) -> Option<&'a str> {
		let Some(mid) = self.mid_tag().map(str::trim_start).filter(|mid| !mid.is_empty()) else {
			return Some(line);
		};

		let rest = line.trim_start_matches(is_inline_whitespace).strip_prefix(mid)?;

		Some(rest.strip_prefix([' ', '\t']).unwrap_or(rest))
	}

	/// Find the earliest documentation span in `text`: a start tag directly
	/// followed by one whitespace character or a `\r\n` line break, then the shortest run of text up
	/// to the end tag, then an optional line break.
	fn find_span(&self, text: &str) -> Option<SpanMatch>;
}

impl TagMatcher for CommentGrammar {
	fn start_tag(&self) -> &str {
		&self.start
	}

	fn mid_tag(&self) -> Option<&str> {
		self.mid.as_deref()
	}

	fn match_end(&self, line: &str) -> bool {
		match_lone_tag(line, &self.end).is_some()
	}

	fn find_span(&self, text: &str) -> Option<SpanMatch> {
		let mut search_from = 0;

		while search_from < text.len() {
			let start = search_from + text[search_from..].find(&self.start)?;
			let after_start = start + self.start.len();

			let rest = &text[after_start..];
			let delimiter = if rest.starts_with("\r\n") {
				2
			} else {
				match rest.chars().next() {
					Some(c) if c.is_whitespace() => c.len_utf8(),
					_ => {
						search_from = after_start;
						continue;
					}
				}
			};

			let body_start = after_start + delimiter;
			let Some(end_offset) = text[body_start..].find(&self.end) else {
				return Some(SpanMatch {
					start,
					body: body_start..text.len(),
					end: None,
				});
			};

			let body_end = body_start + end_offset;
			let after_end = body_end + self.end.len();
			let line_break = if text[after_end..].starts_with("\r\n") {
				2
			} else {
				usize::from(text[after_end..].starts_with('\n'))
			};

			return Some(SpanMatch {
				start,
				body: body_start..body_end,
				end: Some(after_end + line_break),
			});
		}

		None
	}
}

/// Spaces and tabs, plus any other non line-breaking whitespace.
pub(crate) fn is_inline_whitespace(c: char) -> bool {
	c.is_whitespace() && !matches!(c, '\n' | '\r')
}

/// Remove at most `indent` leading whitespace characters, never consuming the
/// line terminator.
pub fn strip_indent(line: &str, indent: usize) -> &str {
	let mut rest = line;

	for _ in 0..indent {
		match rest.chars().next() {
			Some(c) if is_inline_whitespace(c) => rest = &rest[c.len_utf8()..],
			_ => break,
		}
	}

	rest
}

fn match_lone_tag(line: &str, tag: &str) -> Option<usize> {
	let body = line.trim_start_matches(is_inline_whitespace);
	let rest = body.strip_prefix(tag)?;

	if !rest.trim().is_empty() {
		return None;
	}

	Some(line[..line.len() - body.len()].chars().count())
}

/// Language name to comment grammar lookup. Starts out with the built-in
/// grammars and can be extended from `asciicode.toml`.
#[derive(Debug, Clone)]
pub struct GrammarTable {
	entries: BTreeMap<String, CommentGrammar>,
}

impl Default for GrammarTable {
	fn default() -> Self {
		let entries = BUILTIN_GRAMMARS
			.iter()
			.map(|(language, start, mid, end)| {
				((*language).to_string(), CommentGrammar::new(*start, *mid, *end))
			})
			.collect();

		Self { entries }
	}
}

impl GrammarTable {
	/// Add or replace the grammar for `language`.
	pub fn insert(&mut self, language: &str, grammar: CommentGrammar) -> AsciiCodeResult<()> {
		grammar.validate()?;
		self.entries.insert(language.to_ascii_lowercase(), grammar);

		Ok(())
	}

	/// Case-insensitive lookup.
	pub fn get(&self, language: &str) -> Option<&CommentGrammar> {
		self.entries.get(&language.to_ascii_lowercase())
	}

	pub fn contains(&self, language: &str) -> bool {
		self.get(language).is_some()
	}

	/// Every language in the table in name order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &CommentGrammar)> {
		self.entries
			.iter()
			.map(|(language, grammar)| (language.as_str(), grammar))
	}

	/// Pick the grammar for a segmentation pass. An explicit grammar always
	/// wins over the language table, even when a language is also given.
	pub fn resolve(
		&self,
		language: Option<&str>,
		explicit: Option<&CommentGrammar>,
	) -> AsciiCodeResult<CommentGrammar> {
		if let Some(grammar) = explicit {
			grammar.validate()?;
			return Ok(grammar.clone());
		}

		let Some(language) = language else {
			return Err(AsciiCodeError::MissingLanguage);
		};

		self.get(language)
			.cloned()
			.ok_or_else(|| AsciiCodeError::UnknownLanguage(language.to_string()))
	}
}

/// Resolve a grammar against the built-in table.
pub fn resolve(
	language: Option<&str>,
	explicit: Option<&CommentGrammar>,
) -> AsciiCodeResult<CommentGrammar> {
	GrammarTable::default().resolve(language, explicit)
}
