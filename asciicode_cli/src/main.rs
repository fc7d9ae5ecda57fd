use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use asciicode_cli::AsciiCodeCli;
use asciicode_cli::Commands;
use asciicode_cli::ExtractArgs;
use asciicode_cli::OutputFormat;
use asciicode_cli::logger::init_logger;
use asciicode_core::AnyEmptyResult;
use asciicode_core::AsciiCodeConfig;
use asciicode_core::AsciiCodeResult;
use asciicode_core::Blocks;
use asciicode_core::CommandRenderer;
use asciicode_core::CommentGrammar;
use asciicode_core::GrammarTable;
use asciicode_core::extract_blocks_with;
use asciicode_core::extract_with;
use asciicode_core::process_with;
use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::debug;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = AsciiCodeCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_logger(args.verbose, use_color);

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Extract(extract)) => run_extract(&args, extract),
		Some(Commands::Languages { format }) => run_languages(&args, *format),
		None => {
			eprintln!("No subcommand specified. Run `asciicode --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<asciicode_core::AsciiCodeError>() {
			Ok(error) => {
				let report: miette::Report = (*error).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// The `--config` file, or the first config file found in the working
/// directory. Missing config means built-in defaults.
fn load_config(args: &AsciiCodeCli) -> AsciiCodeResult<AsciiCodeConfig> {
	if let Some(path) = &args.config {
		debug!(path = %path.display(), "loading config");
		return AsciiCodeConfig::load_file(path);
	}

	let root = std::env::current_dir()?;
	let config = AsciiCodeConfig::load(&root)?;
	if config.is_some() {
		debug!(root = %root.display(), "loaded discovered config");
	}

	Ok(config.unwrap_or_default())
}

fn read_input(extract: &ExtractArgs) -> AsciiCodeResult<(String, Option<PathBuf>)> {
	if extract.reads_stdin() {
		let mut content = String::new();
		std::io::stdin().read_to_string(&mut content)?;
		return Ok((content, None));
	}

	let path = extract.file.clone().unwrap_or_default();
	let content = std::fs::read_to_string(&path)?;

	Ok((content, Some(path)))
}

#[derive(Serialize)]
struct ExtractReport<'a> {
	path: Option<&'a Path>,
	blocks: Blocks,
}

fn run_extract(args: &AsciiCodeCli, extract: &ExtractArgs) -> AnyEmptyResult {
	let config = load_config(args)?;
	let table = config.grammar_table()?;
	let (content, path) = read_input(extract)?;

	let mut options = extract.apply(config.options());
	if let Some(path) = &path {
		options = options.with_path_defaults(&table, path);
	}

	let output = match (extract.format, &extract.render_with) {
		(OutputFormat::Json, _) => {
			let blocks = extract_blocks_with(&table, &content, &options)?;
			let report = ExtractReport {
				path: path.as_deref(),
				blocks,
			};
			format!("{}\n", serde_json::to_string_pretty(&report)?)
		}
		(OutputFormat::Text, Some(command)) => {
			let renderer = CommandRenderer::new(command);
			process_with(&table, &renderer, &content, path.as_deref(), &options)?
		}
		(OutputFormat::Text, None) => extract_with(&table, &content, &options)?,
	};

	match &extract.output {
		Some(target) => {
			std::fs::write(target, output)?;
			debug!(path = %target.display(), "wrote output");
		}
		None => {
			let mut stdout = std::io::stdout().lock();
			stdout.write_all(output.as_bytes())?;
			stdout.flush()?;
		}
	}

	Ok(())
}

#[derive(Serialize)]
struct LanguageEntry<'a> {
	language: &'a str,
	#[serde(flatten)]
	grammar: &'a CommentGrammar,
}

fn run_languages(args: &AsciiCodeCli, format: OutputFormat) -> AnyEmptyResult {
	let config = load_config(args)?;
	let table: GrammarTable = config.grammar_table()?;

	match format {
		OutputFormat::Json => {
			let entries: Vec<LanguageEntry<'_>> = table
				.iter()
				.map(|(language, grammar)| LanguageEntry { language, grammar })
				.collect();
			println!("{}", serde_json::to_string_pretty(&entries)?);
		}
		OutputFormat::Text => {
			println!(
				"{}",
				colored!(format!("{:<12} {:<8} {:<8} {}", "LANGUAGE", "START", "MID", "END"), bold)
			);
			for (language, grammar) in table.iter() {
				println!(
					"{language:<12} {:<8} {:<8} {}",
					grammar.start,
					grammar.mid.as_deref().unwrap_or("-"),
					grammar.end
				);
			}
		}
	}

	Ok(())
}
