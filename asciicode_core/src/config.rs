use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::AsciiCodeError;
use crate::AsciiCodeResult;
use crate::CommentGrammar;
use crate::GrammarTable;
use crate::Options;
use crate::Strategy;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"asciicode.toml",
	".asciicode.toml",
	".config/asciicode.toml",
];

/// Configuration loaded from an `asciicode.toml` file.
///
/// ```toml
/// [defaults]
/// language = "c"
/// numbered = true
/// scan_depth = 20
/// strategy = "lines"
/// allow_unterminated = false
///
/// [languages.lua]
/// start = "--[[."
/// end = ".]]"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AsciiCodeConfig {
	/// Settings applied to every file before its modeline is read.
	#[serde(default)]
	pub defaults: DefaultsConfig,
	/// Extra comment grammars keyed by language. These replace built-in
	/// grammars of the same name.
	#[serde(default)]
	pub languages: BTreeMap<String, CommentGrammar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
	pub language: Option<String>,
	pub comments: Option<CommentGrammar>,
	pub numbered: Option<bool>,
	pub scan_depth: Option<usize>,
	pub strategy: Option<Strategy>,
	pub allow_unterminated: Option<bool>,
}

impl AsciiCodeConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> AsciiCodeResult<Option<Self>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_file(&config_path).map(Some)
	}

	/// Load a config file from an explicit path.
	pub fn load_file(path: &Path) -> AsciiCodeResult<Self> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// The built-in grammars extended with the `[languages]` table.
	pub fn grammar_table(&self) -> AsciiCodeResult<GrammarTable> {
		let mut table = GrammarTable::default();

		for (language, grammar) in &self.languages {
			table.insert(language, grammar.clone())?;
		}

		Ok(table)
	}

	/// Options carrying the configured defaults.
	pub fn options(&self) -> Options {
		let defaults = &self.defaults;

		Options {
			language: defaults.language.clone(),
			comments: defaults.comments.clone(),
			numbered: defaults.numbered.unwrap_or_default(),
			scan_depth: defaults.scan_depth,
			strategy: defaults.strategy.unwrap_or_default(),
			allow_unterminated: defaults.allow_unterminated.unwrap_or_default(),
		}
	}
}

impl std::str::FromStr for AsciiCodeConfig {
	type Err = AsciiCodeError;

	fn from_str(content: &str) -> Result<Self, Self::Err> {
		toml::from_str(content).map_err(|e| AsciiCodeError::ConfigParse(e.to_string()))
	}
}
