use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;

use tracing::debug;

use crate::AsciiCodeError;
use crate::AsciiCodeResult;
use crate::Block;
use crate::Blocks;
use crate::CommentGrammar;
use crate::DocBlock;
use crate::GrammarTable;
use crate::ModelineConfig;
use crate::SegmentOptions;
use crate::Strategy;
use crate::modeline::DEFAULT_SCAN_DEPTH;
use crate::modeline::scan_str;
use crate::render;
use crate::segment;

/// Language name meaning "already AsciiDoc, pass it through untouched".
pub const PLAIN_TEXT_LANGUAGE: &str = "text";

/// Caller supplied settings for one extraction. A modeline in the input
/// overrides any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
	pub language: Option<String>,
	/// Explicit grammar, preferred over the language table.
	pub comments: Option<CommentGrammar>,
	pub numbered: bool,
	/// Lines searched for a modeline. Defaults to [`DEFAULT_SCAN_DEPTH`].
	pub scan_depth: Option<usize>,
	pub strategy: Strategy,
	pub allow_unterminated: bool,
}

impl Options {
	/// Layer modeline values over these options.
	#[must_use]
	pub fn merged_with(&self, modeline: &ModelineConfig) -> Self {
		Self {
			language: modeline.language.clone().or_else(|| self.language.clone()),
			comments: modeline.comments.clone().or_else(|| self.comments.clone()),
			numbered: modeline.numbered.unwrap_or(self.numbered),
			scan_depth: modeline.scan_depth.or(self.scan_depth),
			strategy: modeline.strategy.unwrap_or(self.strategy),
			allow_unterminated: self.allow_unterminated,
		}
	}

	/// Fill in the language from the file extension when none is set. Files
	/// whose extension has no grammar are treated as plain AsciiDoc.
	#[must_use]
	pub fn with_path_defaults(&self, table: &GrammarTable, path: &Path) -> Self {
		let mut options = self.clone();

		if options.language.is_none() && options.comments.is_none() {
			let language =
				language_for_path(table, path).unwrap_or_else(|| PLAIN_TEXT_LANGUAGE.to_string());
			debug!(path = %path.display(), %language, "language from extension");
			options.language = Some(language);
		}

		options
	}
}

/// The lower-cased extension of `path` when the table has a grammar for it.
pub fn language_for_path(table: &GrammarTable, path: &Path) -> Option<String> {
	let extension = path.extension()?.to_str()?.to_ascii_lowercase();
	table.contains(&extension).then_some(extension)
}

/// What to do with a buffer once its configuration is known.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Plan {
	PlainText,
	Segment {
		grammar: CommentGrammar,
		options: SegmentOptions,
	},
}

/// Scan the modeline using the caller's depth. When the modeline names a
/// different depth the buffer is scanned once more with that depth.
pub fn read_modeline(content: &str, options: &Options) -> AsciiCodeResult<ModelineConfig> {
	let depth = options.scan_depth.unwrap_or(DEFAULT_SCAN_DEPTH);
	let modeline = scan_str(content, depth)?;

	match modeline.scan_depth {
		Some(declared) if declared != depth => {
			debug!(depth, declared, "rescanning with the modeline's depth");
			scan_str(content, declared)
		}
		_ => Ok(modeline),
	}
}

fn plan(table: &GrammarTable, content: &str, options: &Options) -> AsciiCodeResult<Plan> {
	let modeline = read_modeline(content, options)?;
	let options = options.merged_with(&modeline);
	let language = options.language.as_deref();

	if options.comments.is_none()
		&& language.is_some_and(|language| language.eq_ignore_ascii_case(PLAIN_TEXT_LANGUAGE))
	{
		return Ok(Plan::PlainText);
	}

	let grammar = table.resolve(language, options.comments.as_ref())?;
	debug!(%grammar, "resolved comment grammar");

	Ok(Plan::Segment {
		grammar,
		options: SegmentOptions {
			strategy: options.strategy,
			language: language.unwrap_or(PLAIN_TEXT_LANGUAGE).to_string(),
			numbered: options.numbered,
			allow_unterminated: options.allow_unterminated,
		},
	})
}

/// Turn a source buffer into AsciiDoc using the built-in grammars.
///
/// ```rust
/// use asciicode_core::Options;
/// use asciicode_core::extract;
///
/// let options = Options {
/// 	language: Some("c".into()),
/// 	..Options::default()
/// };
/// let output = extract("/*.\nHello\n.*/\nint main(){}\n", &options)?;
///
/// assert_eq!(output, "Hello\n\n[source,c]\n-----\nint main(){}\n-----\n");
/// # Ok::<(), asciicode_core::AsciiCodeError>(())
/// ```
pub fn extract(content: &str, options: &Options) -> AsciiCodeResult<String> {
	extract_with(&GrammarTable::default(), content, options)
}

/// Like [`extract`], resolving languages against `table`.
pub fn extract_with(
	table: &GrammarTable,
	content: &str,
	options: &Options,
) -> AsciiCodeResult<String> {
	match plan(table, content, options)? {
		Plan::PlainText => Ok(content.to_string()),
		Plan::Segment { grammar, options } => {
			let blocks = segment(content, &grammar, &options)?;
			Ok(render(&blocks))
		}
	}
}

/// Segment without rendering, using the built-in grammars.
pub fn extract_blocks(content: &str, options: &Options) -> AsciiCodeResult<Blocks> {
	extract_blocks_with(&GrammarTable::default(), content, options)
}

/// Segment without rendering. Plain text input comes back as a single
/// documentation block.
pub fn extract_blocks_with(
	table: &GrammarTable,
	content: &str,
	options: &Options,
) -> AsciiCodeResult<Blocks> {
	match plan(table, content, options)? {
		Plan::PlainText => {
			Ok(Blocks::from(vec![Block::Doc(DocBlock {
				content: content.to_string(),
			})]))
		}
		Plan::Segment { grammar, options } => segment(content, &grammar, &options),
	}
}

/// Extract from lines that have had their terminators removed.
pub fn extract_lines<S: AsRef<str>>(lines: &[S], options: &Options) -> AsciiCodeResult<String> {
	let content: String = lines
		.iter()
		.map(|line| format!("{}\n", line.as_ref()))
		.collect();

	extract(&content, options)
}

/// Read a file and extract from it, picking the language from its extension
/// when the options and modeline leave it open.
pub fn extract_path(
	table: &GrammarTable,
	path: &Path,
	options: &Options,
) -> AsciiCodeResult<String> {
	let content = std::fs::read_to_string(path)?;
	extract_with(table, &content, &options.with_path_defaults(table, path))
}

/// The downstream document renderer. Receives the generated AsciiDoc and,
/// when known, the path of the source file it came from.
pub trait MarkupRenderer {
	fn render(&self, markup: &str, path: Option<&Path>) -> AsciiCodeResult<String>;
}

impl<F> MarkupRenderer for F
where
	F: Fn(&str, Option<&Path>) -> AsciiCodeResult<String>,
{
	fn render(&self, markup: &str, path: Option<&Path>) -> AsciiCodeResult<String> {
		self(markup, path)
	}
}

/// Extract and hand the result to `renderer`.
pub fn process(
	renderer: &dyn MarkupRenderer,
	content: &str,
	path: Option<&Path>,
	options: &Options,
) -> AsciiCodeResult<String> {
	process_with(&GrammarTable::default(), renderer, content, path, options)
}

/// Like [`process`], resolving languages against `table`.
pub fn process_with(
	table: &GrammarTable,
	renderer: &dyn MarkupRenderer,
	content: &str,
	path: Option<&Path>,
	options: &Options,
) -> AsciiCodeResult<String> {
	let markup = extract_with(table, content, options)?;
	renderer.render(&markup, path)
}

/// Pipes markup through a shell command, e.g. `asciidoctor -o - -`. The
/// source path, when known, is exported as `ASCIICODE_PATH`.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
	command: String,
	working_dir: Option<PathBuf>,
}

impl CommandRenderer {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			working_dir: None,
		}
	}

	#[must_use]
	pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.working_dir = Some(dir.into());
		self
	}

	fn shell(&self) -> Command {
		let mut command = if cfg!(windows) {
			let mut command = Command::new("cmd");
			command.arg("/C");
			command
		} else {
			let mut command = Command::new("sh");
			command.arg("-c");
			command
		};

		command.arg(&self.command);
		if let Some(dir) = &self.working_dir {
			command.current_dir(dir);
		}

		command
	}
}

impl MarkupRenderer for CommandRenderer {
	fn render(&self, markup: &str, path: Option<&Path>) -> AsciiCodeResult<String> {
		let mut command = self.shell();
		command
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped());
		if let Some(path) = path {
			command.env("ASCIICODE_PATH", path);
		}

		debug!(command = %self.command, "running document renderer");
		let mut child = command.spawn()?;
		let mut stdin = child
			.stdin
			.take()
			.ok_or_else(|| AsciiCodeError::Render("renderer stdin is unavailable".to_string()))?;

		// stdin is written on its own thread while the output is collected.
		let output = std::thread::scope(|scope| {
			let writer = scope.spawn(move || stdin.write_all(markup.as_bytes()));
			let output = child.wait_with_output();
			let written = writer
				.join()
				.map_err(|_| AsciiCodeError::Render("stdin writer panicked".to_string()))?;

			match written {
				Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e.into()),
				_ => {}
			}

			output.map_err(AsciiCodeError::from)
		})?;

		if !output.status.success() {
			let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
			let reason = if stderr.is_empty() {
				format!(
					"`{}` exited with status {}",
					self.command,
					output
						.status
						.code()
						.map_or_else(|| "unknown".to_string(), |code| code.to_string())
				)
			} else {
				stderr
			};

			return Err(AsciiCodeError::Render(reason));
		}

		String::from_utf8(output.stdout).map_err(|e| AsciiCodeError::Render(e.to_string()))
	}
}
