//! # Stanza - Declarative Command-Line Framework
//!
//! Stanza builds command-line applications out of a tree of named commands.
//! An application declares its commands, their aliases, their typed flags and
//! how many positional arguments they accept; stanza parses the command line,
//! walks the tree, fills in defaults and calls the right handler.
//!
//! When something is wrong, exactly one [`Diagnostic`] is recorded and
//! printed, with "did you mean" suggestions for misspelled command names.
//!
//! ## Core Concepts
//!
//! - [`App`]: top-level flags, the command tree and the run loop
//! - [`Command`]: an executable leaf or a branch with subcommands
//! - [`Flag`] / [`FlagRegistry`]: typed `--long` / `-s` options
//! - [`ArgumentSpecification`]: how many positionals a command accepts
//! - [`CommandLineParser`]: token-level parsing with boolean lookahead
//! - [`Diagnostics`]: single-slot failure recorder
//! - [`SuggestionEngine`]: edit-distance ranking of near misses
//!
//! ## Quick Start
//!
//! ```rust
//! use stanza::{App, ArgumentSpecification, BufferConsole, Command, Flag, ParsedFlags};
//!
//! let add = Command::executable("add", "Add numbers", |flags: &ParsedFlags, args: &[String]| {
//!     let mut total = 0i64;
//!     for arg in args {
//!         total += arg.parse::<i64>()?;
//!     }
//!     if flags.get_bool("verbose") == Some(true) {
//!         return Ok::<_, anyhow::Error>(format!("{} = {}", args.join(" + "), total));
//!     }
//!     Ok(total.to_string())
//! })
//! .with_flag(Flag::boolean("verbose").short('v'))?
//! .with_argument_spec(ArgumentSpecification::minimum(2))?;
//!
//! let mut app = App::builder()
//!     .name("calc")
//!     .version("1.0.0")
//!     .command(add)?
//!     .build();
//!
//! let mut console = BufferConsole::new();
//! app.run_with(["calc", "add", "-v", "2", "5"], &mut console).unwrap();
//! assert_eq!(console.stdout(), "2 + 5 = 7\n");
//! # Ok::<(), stanza::Diagnostic>(())
//! ```
//!
//! ## Flag Syntax
//!
//! A flag token is `--name` or `-n`. A non-boolean flag takes the next token
//! as its value. A boolean flag looks ahead: a following `true` or `false`
//! is consumed as its value, anything else leaves the flag set to `true`.
//! Flags are resolved against the registry of the command being parsed,
//! which includes persistent flags of its ancestors.

mod app;
mod args;
mod command;
mod commands;
mod console;
mod diagnostics;
mod flag;
mod handler;
mod parser;
mod suggest;

pub mod help;

pub use app::{exit_code, App, AppBuilder, RunError};
pub use args::ArgumentSpecification;
pub use command::{Command, CommandAction};
pub use commands::Commands;
pub use console::{BufferConsole, Console, StdConsole};
pub use diagnostics::{Diagnostic, Diagnostics, ErrorKind};
pub use flag::{Flag, FlagRegistry, FlagType, FlagValue};
pub use handler::{FnHandler, Handler, HandlerResult, IntoHandlerResult, Output};
pub use help::{render_help, HelpData};
pub use parser::{flag_name, CommandLineParser, ParsedFlag, ParsedFlags, Tokens};
pub use suggest::{Suggestion, SuggestionEngine, DEFAULT_MAX_DISTANCE};

/// Result type for tree-building operations.
pub type Result<T> = std::result::Result<T, Diagnostic>;
