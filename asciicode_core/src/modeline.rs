//! Modelines are configuration directives embedded in the first lines of a
//! source file. Two forms are understood.
//!
//! The per-attribute form sets one option per line and may appear on any
//! number of the scanned lines:
//!
//! ```text
//! # :asciicode-language: python
//! # :asciicode-numbered: no
//! # :asciicode-comments: ("#.", "#", "#.")
//! ```
//!
//! The single-line form sets several options at once. Words are split the way
//! a shell would split them, so values may be quoted. The directive ends at a
//! lone `.` word and scanning stops at the first one found:
//!
//! ```text
//! // asciicode: language=go numbered no_foo .
//! /* asciicode: comments="'/*.', ' *', '.*/'" scan_depth=20 . */
//! ```
//!
//! `key=value` sets a value, `key` sets a flag and `no_key` clears it.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::AsciiCodeError;
use crate::AsciiCodeResult;
use crate::CommentGrammar;
use crate::Strategy;
use crate::lexer::split_words;

/// Number of leading lines searched for a modeline when nothing else is
/// configured.
pub const DEFAULT_SCAN_DEPTH: usize = 10;

/// Prefix of the per-attribute form, e.g. `:asciicode-numbered: no`.
pub const ATTRIBUTE_MARKER: &str = ":asciicode-";

/// Word that introduces the single-line form.
pub const DIRECTIVE_MARKER: &str = "asciicode:";

/// Word that ends the single-line form.
pub const DIRECTIVE_TERMINATOR: &str = ".";

/// Raw value of an option the core does not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ModelineValue {
	Text(String),
	Flag(bool),
}

/// Options collected from a modeline. Every field is optional so the result
/// can be layered over other configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelineConfig {
	pub language: Option<String>,
	pub numbered: Option<bool>,
	pub comments: Option<CommentGrammar>,
	pub scan_depth: Option<usize>,
	pub strategy: Option<Strategy>,
	/// Options with no meaning to the core, kept for callers.
	pub extra: BTreeMap<String, ModelineValue>,
}

impl ModelineConfig {
	pub fn is_empty(&self) -> bool {
		self == &Self::default()
	}

	/// Apply one option. Dashes in `key` are read as underscores so
	/// `scan-depth` and `scan_depth` are the same option.
	pub fn set(&mut self, key: &str, value: ModelineValue) -> AsciiCodeResult<()> {
		let key = key.trim().replace('-', "_");

		match (key.as_str(), value) {
			("language", ModelineValue::Text(language)) => self.language = Some(language),
			("language", ModelineValue::Flag(false)) => self.language = None,
			("numbered", ModelineValue::Text(value)) => self.numbered = Some(parse_flag(&value)),
			("numbered", ModelineValue::Flag(flag)) => self.numbered = Some(flag),
			("comments", ModelineValue::Text(value)) => self.comments = Some(value.parse()?),
			("comments", ModelineValue::Flag(false)) => self.comments = None,
			("scan_depth", ModelineValue::Text(value)) => {
				let depth = value.trim().parse::<usize>().map_err(|e| {
					AsciiCodeError::InvalidModelineValue {
						key: key.clone(),
						value: value.clone(),
						reason: e.to_string(),
					}
				})?;
				self.scan_depth = Some(depth);
			}
			("strategy", ModelineValue::Text(value)) => {
				self.strategy = Some(value.parse()?);
			}
			("language" | "comments" | "scan_depth" | "strategy", ModelineValue::Flag(flag)) => {
				return Err(AsciiCodeError::InvalidModelineValue {
					key: key.clone(),
					value: if flag { key.clone() } else { format!("no_{key}") },
					reason: "a value is required".to_string(),
				});
			}
			(_, value) => {
				self.extra.insert(key.clone(), value);
			}
		}

		Ok(())
	}
}

/// `no`, `false` and `0` (any case) are false, everything else is true.
pub fn parse_flag(value: &str) -> bool {
	let value = value.trim();

	!["no", "false", "0"]
		.iter()
		.any(|falsy| value.eq_ignore_ascii_case(falsy))
}

/// Scan at most `depth` leading lines for modeline directives.
pub fn scan<I, S>(lines: I, depth: usize) -> AsciiCodeResult<ModelineConfig>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut config = ModelineConfig::default();

	for (index, line) in lines.into_iter().take(depth).enumerate() {
		let line = line.as_ref();

		if let Some(words) = parse_directive_line(line) {
			debug!(line = index + 1, "found single-line modeline");

			for word in &words {
				let (key, value) = parse_directive_word(word);
				config.set(key, value)?;
			}

			break;
		}

		if let Some((attribute, value)) = parse_attribute_line(line) {
			debug!(line = index + 1, attribute, "found modeline attribute");
			config.set(attribute, ModelineValue::Text(value.to_string()))?;
		}
	}

	Ok(config)
}

/// Scan the leading lines of `content`.
pub fn scan_str(content: &str, depth: usize) -> AsciiCodeResult<ModelineConfig> {
	scan(content.lines(), depth)
}

/// Match `<anything>:asciicode-<attribute>: <value>`.
fn parse_attribute_line(line: &str) -> Option<(&str, &str)> {
	line.match_indices(ATTRIBUTE_MARKER).find_map(|(offset, _)| {
		let rest = &line[offset + ATTRIBUTE_MARKER.len()..];
		let (attribute, after) = rest.split_once(':')?;

		if attribute.is_empty() || !after.starts_with(char::is_whitespace) {
			return None;
		}

		let value = after.trim();
		(!value.is_empty()).then_some((attribute, value))
	})
}

/// Return the words between the directive marker and the terminator.
fn parse_directive_line(line: &str) -> Option<Vec<String>> {
	if !line.contains(DIRECTIVE_MARKER) {
		return None;
	}

	let words = split_words(line)?;
	let start = words.iter().position(|word| word == DIRECTIVE_MARKER)? + 1;
	let length = words[start..]
		.iter()
		.position(|word| word == DIRECTIVE_TERMINATOR)?;

	Some(words[start..start + length].to_vec())
}

fn parse_directive_word(word: &str) -> (&str, ModelineValue) {
	if let Some((key, value)) = word.split_once('=') {
		return (key, ModelineValue::Text(value.to_string()));
	}

	match word.strip_prefix("no_") {
		Some(key) if !key.is_empty() => (key, ModelineValue::Flag(false)),
		_ => (word, ModelineValue::Flag(true)),
	}
}
