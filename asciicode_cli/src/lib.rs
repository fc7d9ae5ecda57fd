use std::path::PathBuf;

use asciicode_core::CommentGrammar;
use asciicode_core::Options;
use asciicode_core::Strategy;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

pub mod logger;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Pull AsciiDoc prose out of source comments and fence the code around it.",
	long_about = "asciicode turns a commented source file into an AsciiDoc document.\n\nText \
	              between documentation tags (for example `/*.` and `.*/` in C) is written \
	              verbatim. Everything else becomes a `[source,<language>]` listing.\n\nQuick \
	              start:\n  asciicode extract main.c        Print the document for a file\n  \
	              asciicode extract - -l python   Read a Python file from stdin\n  asciicode \
	              languages             List the known comment grammars"
)]
pub struct AsciiCodeCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to a config file. Defaults to `asciicode.toml`,
	/// `.asciicode.toml` or `.config/asciicode.toml` in the working
	/// directory.
	#[arg(long, short, global = true)]
	pub config: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Extract the AsciiDoc document from a source file.
	///
	/// Documentation spans are copied verbatim and the code around them is
	/// wrapped in `[source,<language>]` listing blocks. A modeline in the
	/// first lines of the file overrides every flag.
	Extract(ExtractArgs),
	/// List the languages with a known comment grammar.
	///
	/// Includes the built-in grammars and any `[languages]` entries from the
	/// config file.
	Languages {
		/// Output format. Use `text` for a table or `json` for programmatic
		/// consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
	/// Source file to read. Use `-` or leave it out to read stdin.
	pub file: Option<PathBuf>,

	/// Language of the source. Defaults to the config file, then the file
	/// extension.
	#[arg(long, short)]
	pub language: Option<String>,

	/// Explicit comment tags, e.g. `("/*.", " *", ".*/")`. Takes precedence
	/// over the language's grammar.
	#[arg(long)]
	pub comments: Option<CommentGrammar>,

	/// Ask for line numbers on every listing.
	#[arg(long, short, default_value_t = false)]
	pub numbered: bool,

	/// Number of leading lines searched for a modeline.
	#[arg(long)]
	pub scan_depth: Option<usize>,

	/// How documentation spans are found: `lines` or `spans`.
	#[arg(long)]
	pub strategy: Option<Strategy>,

	/// Keep a documentation block that is still open at the end of the file
	/// instead of failing.
	#[arg(long, default_value_t = false)]
	pub allow_unterminated: bool,

	/// Write the result to this file instead of stdout.
	#[arg(long, short)]
	pub output: Option<PathBuf>,

	/// Output format. `json` prints the segmented blocks instead of the
	/// AsciiDoc document.
	#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,

	/// Pipe the document through this shell command, e.g.
	/// `asciidoctor -o - -`. The source path is exported as
	/// `ASCIICODE_PATH`.
	#[arg(long, conflicts_with = "format")]
	pub render_with: Option<String>,
}

impl ExtractArgs {
	/// Whether the input comes from stdin.
	pub fn reads_stdin(&self) -> bool {
		self.file
			.as_ref()
			.is_none_or(|file| file.as_os_str() == "-")
	}

	/// Layer the flags over `options`, which usually carry the config file
	/// defaults.
	#[must_use]
	pub fn apply(&self, mut options: Options) -> Options {
		if let Some(language) = &self.language {
			options.language = Some(language.clone());
			options.comments = None;
		}

		if let Some(comments) = &self.comments {
			options.comments = Some(comments.clone());
		}

		if self.numbered {
			options.numbered = true;
		}

		if let Some(depth) = self.scan_depth {
			options.scan_depth = Some(depth);
		}

		if let Some(strategy) = self.strategy {
			options.strategy = strategy;
		}

		if self.allow_unterminated {
			options.allow_unterminated = true;
		}

		options
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable output.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
