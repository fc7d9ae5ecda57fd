use logos::Logos;
use snailquote::unescape;

use crate::AsciiCodeError;
use crate::AsciiCodeResult;

/// Pieces of a shell-style modeline. Adjacent pieces with no whitespace
/// between them belong to the same word, so `key="a b"` is a single word.
#[derive(Logos, Debug, PartialEq)]
enum WordToken {
	#[regex(r"[ \t\r\n\f]+")]
	Whitespace,
	#[regex(r#""([^"\\]|\\.)*""#)]
	DoubleQuoted,
	#[regex(r"'[^']*'")]
	SingleQuoted,
	#[regex(r#"[^ \t\r\n\f"']+"#)]
	Bare,
}

/// Split a line into shell-style words. Returns `None` when a quote is left
/// open or an escape sequence is invalid.
pub(crate) fn split_words(line: &str) -> Option<Vec<String>> {
	let mut words = Vec::new();
	let mut current: Option<String> = None;

	for (token, span) in WordToken::lexer(line).spanned() {
		let slice = &line[span];
		let piece = match token.ok()? {
			WordToken::Whitespace => {
				words.extend(current.take());
				continue;
			}
			WordToken::DoubleQuoted | WordToken::SingleQuoted => unquote(slice)?,
			WordToken::Bare => slice.to_string(),
		};

		current.get_or_insert_with(String::new).push_str(&piece);
	}

	words.extend(current);

	Some(words)
}

/// Strip the quotes from a quoted slice. Escapes are only read inside double
/// quotes.
fn unquote(slice: &str) -> Option<String> {
	if slice.starts_with('"') && slice.contains('\\') {
		return unescape(slice).ok();
	}

	Some(slice[1..slice.len() - 1].to_string())
}

/// Tokens of the `comments` literal: up to three quoted strings, optionally
/// wrapped in parentheses or brackets. Nothing else is accepted.
#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum TagToken {
	#[token("(")]
	OpenParen,
	#[token(")")]
	CloseParen,
	#[token("[")]
	OpenBracket,
	#[token("]")]
	CloseBracket,
	#[token(",")]
	Comma,
	#[token("None")]
	Nothing,
	#[regex(r#""([^"\\]|\\.)*""#)]
	DoubleQuotedString,
	#[regex(r"'[^']*'")]
	SingleQuotedString,
}

/// Parse the value of a `comments` modeline option into its tags. `None`
/// entries mark an omitted tag.
///
/// Accepted shapes: `("/*.", ".*/")`, `['/*.', ' *', '.*/']`,
/// `"'''.", None, ".'''"`.
pub(crate) fn parse_comment_tags(input: &str) -> AsciiCodeResult<Vec<Option<String>>> {
	let mut tokens = Vec::new();

	for (token, span) in TagToken::lexer(input).spanned() {
		let Ok(token) = token else {
			return Err(invalid_tags(format!(
				"unexpected `{}` at offset {}",
				&input[span.clone()],
				span.start
			)));
		};
		tokens.push((token, &input[span]));
	}

	let mut cursor = tokens.iter().peekable();
	let closing = match cursor.peek() {
		Some((TagToken::OpenParen, _)) => Some(TagToken::CloseParen),
		Some((TagToken::OpenBracket, _)) => Some(TagToken::CloseBracket),
		_ => None,
	};

	if closing.is_some() {
		cursor.next();
	}

	let mut tags = Vec::new();

	loop {
		match cursor.next() {
			Some((TagToken::DoubleQuotedString | TagToken::SingleQuotedString, slice)) => {
				let value = unquote(slice)
					.ok_or_else(|| invalid_tags(format!("invalid escape sequence in {slice}")))?;
				tags.push(Some(value));
			}
			Some((TagToken::Nothing, _)) => tags.push(None),
			Some((token, _)) if Some(token) == closing.as_ref() && tags.is_empty() => break,
			Some((_, slice)) => return Err(invalid_tags(format!("expected a tag, found `{slice}`"))),
			None => break,
		}

		if tags.len() > 3 {
			return Err(invalid_tags("at most three tags are allowed".to_string()));
		}

		match cursor.next() {
			Some((TagToken::Comma, _)) => {
				let ends_here = match cursor.peek() {
					None => true,
					Some((token, _)) => Some(token) == closing.as_ref(),
				};

				if ends_here {
					if closing.is_some() && cursor.next().is_none() {
						return Err(invalid_tags("missing closing bracket".to_string()));
					}
					break;
				}
			}
			Some((token, _)) if Some(token) == closing.as_ref() => break,
			None if closing.is_none() => break,
			None => return Err(invalid_tags("missing closing bracket".to_string())),
			Some((_, slice)) => return Err(invalid_tags(format!("expected `,`, found `{slice}`"))),
		}
	}

	if cursor.next().is_some() {
		return Err(invalid_tags("unexpected text after the tags".to_string()));
	}

	if tags.is_empty() {
		return Err(invalid_tags("no tags were given".to_string()));
	}

	Ok(tags)
}

fn invalid_tags(reason: String) -> AsciiCodeError {
	AsciiCodeError::InvalidCommentGrammar(reason)
}
