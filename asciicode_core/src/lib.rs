//! `asciicode_core` pulls [AsciiDoc](https://asciidoc.org) prose out of
//! source file comments and interleaves it with fenced, syntax-tagged listings
//! of the surrounding code. Authors keep documentation next to runnable source
//! and get a readable document out of the same file.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source file
//!   → Modeline scanner (reads options from the first lines)
//!   → Grammar table (resolves the comment tags for the language)
//!   → Segmenter (splits the buffer into documentation and code blocks)
//!   → Renderer (writes documentation verbatim, code inside [source] fences)
//!   → Document renderer (external, e.g. asciidoctor)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Loads `asciicode.toml` with defaults and extra comment grammars.
//! - [`grammar`]: Built-in comment grammars and tag matching.
//! - [`modeline`]: Per-file options embedded in the leading lines of a source file.
//!
//! ## Key Types
//!
//! - [`CommentGrammar`]: Start, continuation and end tags of a documentation span.
//! - [`Block`]: A documentation or code block produced by segmentation.
//! - [`Strategy`]: Line-by-line tag matching or free-form span matching.
//! - [`Options`]: Per-call settings, overridden by the file's modeline.
//!
//! ## Quick Start
//!
//! ```rust
//! use asciicode_core::Options;
//! use asciicode_core::extract;
//!
//! let source = "'''.\nGreeting\n========\n:asciicode-language: python\n.'''\nprint('hi')\n";
//! let markup = extract(source, &Options::default())?;
//!
//! assert_eq!(
//! 	markup,
//! 	"Greeting\n========\n:asciicode-language: python\n\n[source,python]\n-----\nprint('hi')\n-----\n"
//! );
//! # Ok::<(), asciicode_core::AsciiCodeError>(())
//! ```

pub use config::*;
pub use error::*;
pub use grammar::*;
pub use modeline::ModelineConfig;
pub use modeline::ModelineValue;
pub use pipeline::*;
pub use render::*;
pub use segment::*;

pub mod config;
#[allow(unused_assignments)]
mod error;
pub mod grammar;
pub(crate) mod lexer;
pub mod modeline;
mod pipeline;
mod render;
mod segment;
