use crate::Block;
use crate::Blocks;
use crate::CodeBlock;

/// Delimiter line around a listing block.
pub const FENCE: &str = "-----";

/// Serialize blocks into AsciiDoc.
///
/// ```rust
/// use asciicode_core::Block;
/// use asciicode_core::CodeBlock;
/// use asciicode_core::DocBlock;
/// use asciicode_core::render;
///
/// let blocks = vec![
/// 	Block::Doc(DocBlock { content: "Hello\n".into() }),
/// 	Block::Code(CodeBlock {
/// 		content: "int main(){}\n".into(),
/// 		language: "c".into(),
/// 		numbered: false,
/// 	}),
/// ];
///
/// assert_eq!(render(&blocks), "Hello\n\n[source,c]\n-----\nint main(){}\n-----\n");
/// ```
pub fn render(blocks: &[Block]) -> String {
	let mut output = String::new();
	render_into(blocks, &mut output);
	output
}

/// Append the AsciiDoc for `blocks` to `output`. Documentation is written
/// verbatim and followed by a blank line. Adjacent code blocks share one
/// fence when their language and numbering match. Otherwise each gets its
/// own fence, separated by a blank line. Code blocks that are empty or only
/// whitespace are skipped.
pub fn render_into(blocks: &[Block], output: &mut String) {
	let blocks = Blocks::from(blocks.to_vec()).coalesce();
	let count = blocks.len();

	for (index, block) in blocks.iter().enumerate() {
		match block {
			Block::Doc(doc) => {
				output.push_str(&doc.content);
				ensure_newline(output);
				output.push('\n');
			}
			Block::Code(code) => {
				output.push_str(&attribute_line(code));
				output.push('\n');
				output.push_str(FENCE);
				output.push('\n');
				output.push_str(&code.content);
				ensure_newline(output);
				output.push_str(FENCE);
				output.push('\n');

				if index + 1 < count {
					output.push('\n');
				}
			}
		}
	}
}

/// `[source,<language>]`, with `numbered` appended when requested.
pub fn attribute_line(code: &CodeBlock) -> String {
	if code.numbered {
		format!("[source,{},numbered]", code.language)
	} else {
		format!("[source,{}]", code.language)
	}
}

fn ensure_newline(output: &mut String) {
	if !output.is_empty() && !output.ends_with('\n') {
		output.push('\n');
	}
}
