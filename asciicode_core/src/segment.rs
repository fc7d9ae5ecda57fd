use std::fmt::Display;
use std::str::FromStr;

use derive_more::Deref;
use derive_more::DerefMut;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::AsciiCodeError;
use crate::AsciiCodeResult;
use crate::grammar::TagMatcher;
use crate::grammar::strip_indent;

/// Untouched source text, rendered inside a source fence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
	pub content: String,
	pub language: String,
	pub numbered: bool,
}

/// Documentation text with its comment tags and indentation removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocBlock {
	pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
#[allow(variant_size_differences)]
pub enum Block {
	Code(CodeBlock),
	Doc(DocBlock),
}

impl Block {
	pub fn content(&self) -> &str {
		match self {
			Self::Code(code) => &code.content,
			Self::Doc(doc) => &doc.content,
		}
	}

	pub fn is_code(&self) -> bool {
		matches!(self, Self::Code(_))
	}

	pub fn is_doc(&self) -> bool {
		matches!(self, Self::Doc(_))
	}
}

/// Blocks in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deref, DerefMut)]
pub struct Blocks(Vec<Block>);

impl From<Vec<Block>> for Blocks {
	fn from(blocks: Vec<Block>) -> Self {
		Self(blocks)
	}
}

impl Blocks {
	/// Concatenate every block's content in order. For well formed input this
	/// is the source text without its tag lines.
	pub fn joined_content(&self) -> String {
		self.iter().map(Block::content).collect()
	}

	/// Merge runs of adjacent code blocks that share a language and
	/// numbering, then drop code blocks holding nothing but whitespace.
	#[must_use]
	pub fn coalesce(self) -> Self {
		let mut merged: Vec<Block> = Vec::with_capacity(self.len());

		for block in self.0 {
			if let (Some(Block::Code(previous)), Block::Code(code)) = (merged.last_mut(), &block) {
				if previous.language == code.language && previous.numbered == code.numbered {
					previous.content.push_str(&code.content);
					continue;
				}
			}

			merged.push(block);
		}

		merged.retain(|block| !matches!(block, Block::Code(code) if code.content.trim().is_empty()));

		Self(merged)
	}
}

/// How documentation spans are found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
	/// Tags sit on lines of their own; documentation lines may carry a
	/// continuation tag and indentation.
	#[default]
	Lines,
	/// Tags may appear anywhere and spans may cross lines freely.
	Spans,
}

impl Strategy {
	fn segmenter(self) -> &'static dyn Segmenter {
		match self {
			Self::Lines => &LineSegmenter,
			Self::Spans => &SpanSegmenter,
		}
	}
}

impl Display for Strategy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Lines => write!(f, "lines"),
			Self::Spans => write!(f, "spans"),
		}
	}
}

impl FromStr for Strategy {
	type Err = AsciiCodeError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim().to_ascii_lowercase().as_str() {
			"lines" | "line" => Ok(Self::Lines),
			"spans" | "span" => Ok(Self::Spans),
			_ => {
				Err(AsciiCodeError::InvalidModelineValue {
					key: "strategy".to_string(),
					value: value.to_string(),
					reason: "expected `lines` or `spans`".to_string(),
				})
			}
		}
	}
}

/// Settings for one segmentation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentOptions {
	pub strategy: Strategy,
	/// Language recorded on every code block.
	pub language: String,
	/// Numbering recorded on every code block.
	pub numbered: bool,
	/// Keep a documentation span that is still open at the end of the input
	/// instead of failing.
	pub allow_unterminated: bool,
}

impl SegmentOptions {
	pub fn new(language: impl Into<String>) -> Self {
		Self {
			strategy: Strategy::default(),
			language: language.into(),
			numbered: false,
			allow_unterminated: false,
		}
	}

	fn code_block(&self, content: String) -> Block {
		Block::Code(CodeBlock {
			content,
			language: self.language.clone(),
			numbered: self.numbered,
		})
	}
}

/// Splits a buffer into documentation and code blocks.
pub trait Segmenter {
	fn segment(
		&self,
		content: &str,
		matcher: &dyn TagMatcher,
		options: &SegmentOptions,
	) -> AsciiCodeResult<Blocks>;
}

/// Split `content` into blocks with the strategy named in `options`.
///
/// ```rust
/// use asciicode_core::Block;
/// use asciicode_core::CommentGrammar;
/// use asciicode_core::SegmentOptions;
/// use asciicode_core::segment;
///
/// let grammar = CommentGrammar::new("/*.", None, ".*/");
/// let blocks = segment("/*.\nHello\n.*/\nint main(){}\n", &grammar, &SegmentOptions::new("c"))?;
///
/// assert_eq!(blocks.len(), 2);
/// assert!(matches!(&blocks[0], Block::Doc(doc) if doc.content == "Hello\n"));
/// assert!(matches!(&blocks[1], Block::Code(code) if code.content == "int main(){}\n"));
/// # Ok::<(), asciicode_core::AsciiCodeError>(())
/// ```
pub fn segment(
	content: &str,
	matcher: &dyn TagMatcher,
	options: &SegmentOptions,
) -> AsciiCodeResult<Blocks> {
	debug!(strategy = %options.strategy, language = %options.language, "segmenting");
	options
		.strategy
		.segmenter()
		.segment(content, matcher, options)
}

/// Strip the recorded indentation and then the continuation tag from one
/// documentation line. `None` when the continuation tag is missing.
pub fn strip_doc_line<'a>(
	matcher: &dyn TagMatcher,
	line: &'a str,
	indent: usize,
) -> Option<&'a str> {
	matcher.strip_mid(strip_indent(line, indent))
}

/// Walks the buffer one line at a time, switching between code and
/// documentation on lines that hold nothing but a start or end tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineSegmenter;

impl Segmenter for LineSegmenter {
	fn segment(
		&self,
		content: &str,
		matcher: &dyn TagMatcher,
		options: &SegmentOptions,
	) -> AsciiCodeResult<Blocks> {
		let mut walker = LineWalker {
			matcher,
			options,
			blocks: Blocks::default(),
			buffer: String::new(),
			state: LineState::Code,
		};

		for (index, line) in content.split_inclusive('\n').enumerate() {
			walker.step(index + 1, line)?;
		}

		walker.finish()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
	Code,
	Doc { indent: usize, opened_at: usize },
}

struct LineWalker<'a> {
	matcher: &'a dyn TagMatcher,
	options: &'a SegmentOptions,
	blocks: Blocks,
	/// Text of the block currently open.
	buffer: String,
	state: LineState,
}

impl LineWalker<'_> {
	fn step(&mut self, number: usize, line: &str) -> AsciiCodeResult<()> {
		match self.state {
			LineState::Code => {
				if let Some(indent) = self.matcher.match_start(line) {
					trace!(line = number, indent, "documentation opened");
					self.flush_code();
					self.state = LineState::Doc {
						indent,
						opened_at: number,
					};
				} else {
					self.buffer.push_str(line);
				}
			}
			LineState::Doc { indent, .. } => {
				if self.matcher.match_end(line) {
					trace!(line = number, "documentation closed");
					self.flush_doc();
					self.state = LineState::Code;
				} else {
					let text = strip_doc_line(self.matcher, line, indent).ok_or_else(|| {
						AsciiCodeError::MalformedBlock {
							mid: self.matcher.mid_tag().unwrap_or_default().to_string(),
							line: number,
						}
					})?;
					self.buffer.push_str(text);
				}
			}
		}

		Ok(())
	}

	fn flush_code(&mut self) {
		if !self.buffer.is_empty() {
			let content = std::mem::take(&mut self.buffer);
			self.blocks.push(self.options.code_block(content));
		}
	}

	/// Empty documentation blocks are kept.
	fn flush_doc(&mut self) {
		let content = std::mem::take(&mut self.buffer);
		self.blocks.push(Block::Doc(DocBlock { content }));
	}

	fn finish(mut self) -> AsciiCodeResult<Blocks> {
		match self.state {
			LineState::Code => self.flush_code(),
			LineState::Doc { opened_at, .. } => {
				if !self.options.allow_unterminated {
					return Err(AsciiCodeError::UnterminatedDocBlock {
						start: self.matcher.start_tag().to_string(),
						line: opened_at,
					});
				}

				warn!(line = opened_at, "documentation block left open at end of input");
				self.flush_doc();
			}
		}

		Ok(self.blocks)
	}
}

/// Repeatedly searches the remaining buffer for the next tagged span. Tags
/// need not sit on their own lines, but continuation tags and indentation are
/// not stripped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanSegmenter;

impl Segmenter for SpanSegmenter {
	fn segment(
		&self,
		content: &str,
		matcher: &dyn TagMatcher,
		options: &SegmentOptions,
	) -> AsciiCodeResult<Blocks> {
		let mut blocks = Blocks::default();
		let mut consumed = 0;

		while let Some(found) = matcher.find_span(&content[consumed..]) {
			let before = &content[consumed..consumed + found.start];
			if !before.is_empty() {
				blocks.push(options.code_block(before.to_string()));
			}

			let body = &content[consumed + found.body.start..consumed + found.body.end];
			blocks.push(Block::Doc(DocBlock {
				content: body.to_string(),
			}));

			let Some(end) = found.end else {
				let line = line_number(content, consumed + found.start);
				if !options.allow_unterminated {
					return Err(AsciiCodeError::UnterminatedDocBlock {
						start: matcher.start_tag().to_string(),
						line,
					});
				}

				warn!(line, "documentation span left open at end of input");
				return Ok(blocks);
			};

			trace!(offset = consumed + found.start, "documentation span");
			consumed += end;
		}

		if consumed < content.len() {
			blocks.push(options.code_block(content[consumed..].to_string()));
		}

		Ok(blocks)
	}
}

/// 1-indexed line containing the byte `offset`.
fn line_number(content: &str, offset: usize) -> usize {
	content[..offset].bytes().filter(|byte| *byte == b'\n').count() + 1
}
