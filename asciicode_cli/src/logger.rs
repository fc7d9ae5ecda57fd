//! Diagnostics for the command line, written to stderr so they never mix with
//! the generated document.
//!
//! `--verbose` turns on debug output for the asciicode crates. Otherwise
//! `RUST_LOG` is honoured and warnings are shown by default.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used by `--verbose`.
pub const VERBOSE_FILTER: &str = "asciicode_core=debug,asciicode_cli=debug";

/// Filter used when neither `--verbose` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "warn";

/// Pick the filter for the given verbosity.
pub fn filter(verbose: bool) -> EnvFilter {
	if verbose {
		EnvFilter::new(VERBOSE_FILTER)
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
	}
}

/// Install the global subscriber. Call once, before anything is logged.
pub fn init_logger(verbose: bool, use_color: bool) {
	let fmt_layer = fmt::layer()
		.with_writer(std::io::stderr)
		.with_target(false)
		.with_level(true)
		.with_ansi(use_color)
		.compact();

	let _ = tracing_subscriber::registry()
		.with(filter(verbose))
		.with(fmt_layer)
		.try_init();
}
