//! The application root: top-level flags, the command tree and the run loop.
//!
//! # Running
//!
//! [`App::run_with`] takes the full argument list (program name first) and a
//! [`Console`]. It parses the app-level flags, dispatches through the tree
//! and writes either the handler's [`Output`] or a single diagnostic:
//!
//! ```rust
//! use stanza::{App, BufferConsole, Command, ErrorKind, ParsedFlags, RunError};
//!
//! let mut app = App::builder()
//!     .name("calc")
//!     .command(Command::executable("add", "Add numbers", |_f: &ParsedFlags, args: &[String]| {
//!         let mut sum = 0i64;
//!         for arg in args {
//!             sum += arg.parse::<i64>()?;
//!         }
//!         Ok::<_, anyhow::Error>(sum.to_string())
//!     }))?
//!     .build();
//!
//! let mut console = BufferConsole::new();
//! app.run_with(["calc", "add", "2", "5"], &mut console).unwrap();
//! assert_eq!(console.stdout(), "7\n");
//!
//! let mut console = BufferConsole::new();
//! let err = app.run_with(["calc", "ad"], &mut console).unwrap_err();
//! assert!(matches!(err, RunError::Diagnosed(ErrorKind::CommandNotAdded)));
//! assert_eq!(
//!     console.stderr(),
//!     "error: command `ad` not added\n\ndid you mean one of these?\n    add\n"
//! );
//! # Ok::<(), stanza::Diagnostic>(())
//! ```
//!
//! # Exit Codes
//!
//! [`RunError::exit_code`] maps usage failures (bad flags, unknown
//! commands, argument counts) to `2` and handler failures to `1`.

use crate::command::{Command, Failure, Invocation};
use crate::commands::Commands;
use crate::console::{Console, StdConsole};
use crate::diagnostics::{Diagnostic, Diagnostics, ErrorKind};
use crate::flag::{Flag, FlagRegistry};
use crate::handler::Output;
use crate::help::{render_help, HelpData};
use crate::parser::CommandLineParser;
use crate::suggest::{SuggestionEngine, DEFAULT_MAX_DISTANCE};

/// Why [`App::run_with`] failed.
///
/// Diagnosed failures have already been written to the console; the full
/// record stays available through [`App::diagnostics`].
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("{0}")]
    Diagnosed(ErrorKind),
    #[error(transparent)]
    Handler(anyhow::Error),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl RunError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            RunError::Diagnosed(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Diagnosed(kind) if kind.is_usage() => 2,
            _ => 1,
        }
    }
}

/// Process exit code for a run result.
pub fn exit_code(result: &Result<(), RunError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.exit_code(),
    }
}

/// Builder for [`App`].
///
/// Commands added here go through the same checks as
/// [`Commands::add`]: they are frozen, and a command that already had a
/// parent is refused.
#[derive(Debug)]
pub struct AppBuilder {
    name: String,
    description: String,
    version: Option<String>,
    flags: FlagRegistry,
    commands: Commands,
    max_distance: usize,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            version: None,
            flags: FlagRegistry::new(),
            commands: Commands::new(),
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Maximum edit distance for "did you mean" suggestions.
    pub fn suggestion_distance(mut self, max_distance: usize) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Adds an app-level flag. Persistent ones reach every command.
    pub fn flag(mut self, flag: Flag) -> Result<Self, Diagnostic> {
        self.flags.add(flag)?;
        Ok(self)
    }

    pub fn command(mut self, command: Command) -> Result<Self, Diagnostic> {
        self.commands.add(command, false)?;
        Ok(self)
    }

    pub fn build(self) -> App {
        App {
            name: self.name,
            description: self.description,
            version: self.version,
            flags: self.flags,
            commands: self.commands,
            suggestions: SuggestionEngine::new(self.max_distance),
            diagnostics: Diagnostics::new(),
        }
    }
}

/// A command-line application.
#[derive(Debug)]
pub struct App {
    name: String,
    description: String,
    version: Option<String>,
    flags: FlagRegistry,
    commands: Commands,
    suggestions: SuggestionEngine,
    diagnostics: Diagnostics,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn flags(&self) -> &FlagRegistry {
        &self.flags
    }

    pub fn commands(&self) -> &Commands {
        &self.commands
    }

    /// The failure recorded by the last run, if any.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Walks `path` (names or aliases) to a command.
    pub fn command(&self, path: &[&str]) -> Option<&Command> {
        let (first, rest) = path.split_first()?;
        let mut command = self.commands.resolve(first)?;
        for segment in rest {
            command = command.subcommands()?.resolve(segment)?;
        }
        Some(command)
    }

    /// Walks `path` to a command, mutably.
    ///
    /// Every command in the tree is frozen, so mutating calls on the result
    /// fail with [`Diagnostic::CommandAlreadyFrozen`].
    pub fn command_mut(&mut self, path: &[&str]) -> Option<&mut Command> {
        let (first, rest) = path.split_first()?;
        let mut command = self.commands.get_mut(first)?;
        for segment in rest {
            command = command.subcommands_mut()?.get_mut(segment)?;
        }
        Some(command)
    }

    /// Help data for the root (empty `path`) or for a command.
    pub fn help_data(&self, path: &[&str]) -> Option<HelpData> {
        let Some((first, rest)) = path.split_first() else {
            return Some(HelpData::for_app(
                &self.name,
                self.version.as_deref(),
                &self.description,
                &self.flags,
                &self.commands,
            ));
        };

        let mut inherited = self.flags.persistent();
        let mut command = self.commands.resolve(first)?;
        let mut names = vec![self.name.as_str(), command.name()];
        for segment in rest {
            inherited = FlagRegistry::scoped(command.flags(), &inherited).persistent();
            command = command.subcommands()?.resolve(segment)?;
            names.push(command.name());
        }

        let scope = FlagRegistry::scoped(command.flags(), &inherited);
        Some(HelpData::for_command(command, &names, &scope))
    }

    /// Rendered help for the root (empty `path`) or for a command.
    pub fn help(&self, path: &[&str]) -> Option<String> {
        self.help_data(path).map(|data| render_help(&data))
    }

    /// Runs with the process arguments, writing to stdout and stderr.
    pub fn run(&mut self) -> Result<(), RunError> {
        self.run_from(std::env::args())
    }

    /// Runs with `args` (program name first), writing to stdout and stderr.
    pub fn run_from<I, S>(&mut self, args: I) -> Result<(), RunError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut console = StdConsole::new();
        self.run_with(args, &mut console)
    }

    /// Runs with `args` (program name first), writing to `console`.
    pub fn run_with<I, S>(&mut self, args: I, console: &mut dyn Console) -> Result<(), RunError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = args.into_iter().skip(1).map(Into::into).collect();
        self.diagnostics.clear();
        tracing::debug!(app = %self.name, tokens = tokens.len(), "run");

        match self.execute(&tokens) {
            Ok(output) => {
                if let Some(text) = output.render()? {
                    if text.ends_with('\n') {
                        console.print(format_args!("{}", text));
                    } else {
                        console.print(format_args!("{}\n", text));
                    }
                }
                Ok(())
            }
            Err(Failure::Diagnosed(record)) => {
                let kind = self.diagnostics.report_and_fail(record);
                self.diagnostics.log(console);
                Err(RunError::Diagnosed(kind))
            }
            Err(Failure::Handler(err)) => {
                tracing::debug!(error = %err, "handler failed");
                console.print_error(format_args!("error: {:#}\n", err));
                Err(RunError::Handler(err))
            }
        }
    }

    fn execute(&mut self, tokens: &[String]) -> Result<Output, Failure> {
        let mut invocation = Invocation::new(tokens, self.suggestions);
        invocation.path.push(self.name.clone());

        let parser = CommandLineParser::new(&self.name, &self.flags, true);
        let positionals = parser.parse(&mut invocation.tokens, &mut invocation.flags)?;
        invocation.flags.fill_defaults(&self.flags);

        let Some(name) = positionals.into_iter().next() else {
            return Err(Diagnostic::MissingCommandNameToExecute { command: None }.into());
        };
        self.commands
            .dispatch(None, name, &self.flags.persistent(), &mut invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ArgumentSpecification;
    use crate::console::BufferConsole;
    use crate::parser::ParsedFlags;
    use std::cell::Cell;
    use std::rc::Rc;

    fn sum(args: &[String]) -> anyhow::Result<i64> {
        let mut total = 0;
        for arg in args {
            total += arg.parse::<i64>()?;
        }
        Ok(total)
    }

    fn calc() -> App {
        let add = Command::executable("add", "Add numbers", |flags: &ParsedFlags, args: &[String]| {
            let total = sum(args)?;
            if flags.get_bool("verbose") == Some(true) {
                Ok::<_, anyhow::Error>(format!("{} = {}", args.join(" + "), total))
            } else {
                Ok(total.to_string())
            }
        })
        .with_flag(Flag::boolean("verbose").short('v'))
        .unwrap()
        .with_argument_spec(ArgumentSpecification::minimum(2))
        .unwrap();

        App::builder()
            .name("calc")
            .version("1.0.0")
            .command(add)
            .unwrap()
            .command(Command::executable("str", "", |_f: &ParsedFlags, _a: &[String]| {
                Ok::<_, anyhow::Error>(())
            }))
            .unwrap()
            .command(Command::executable("strm", "", |_f: &ParsedFlags, _a: &[String]| {
                Ok::<_, anyhow::Error>(())
            }))
            .unwrap()
            .build()
    }

    fn run(app: &mut App, args: &[&str]) -> (Result<(), RunError>, BufferConsole) {
        let mut console = BufferConsole::new();
        let mut full = vec!["calc"];
        full.extend_from_slice(args);
        let result = app.run_with(full, &mut console);
        (result, console)
    }

    #[test]
    fn test_add_prints_sum() {
        let mut app = calc();
        let (result, console) = run(&mut app, &["add", "2", "5"]);
        assert!(result.is_ok());
        assert_eq!(console.stdout(), "7\n");
        assert_eq!(console.stderr(), "");
        assert!(app.diagnostics().record().is_none());
    }

    #[test]
    fn test_boolean_flag_before_positionals() {
        let mut app = calc();
        let (result, console) = run(&mut app, &["add", "--verbose", "2", "5"]);
        assert!(result.is_ok());
        assert_eq!(console.stdout(), "2 + 5 = 7\n");
    }

    #[test]
    fn test_unknown_command_suggests() {
        let mut app = calc();
        let (result, console) = run(&mut app, &["strn"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::CommandNotAdded));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            console.stderr(),
            "error: command `strn` not added\n\ndid you mean one of these?\n    str\n    strm\n"
        );
        assert_eq!(app.diagnostics().kind(), Some(ErrorKind::CommandNotAdded));
    }

    #[test]
    fn test_suggestion_distance_is_configurable() {
        let mut app = App::builder()
            .name("calc")
            .suggestion_distance(0)
            .command(Command::group("str", ""))
            .unwrap()
            .build();
        let (_, console) = run(&mut app, &["strn"]);
        assert_eq!(console.stderr(), "error: command `strn` not added\n");
    }

    #[test]
    fn test_missing_command_name() {
        let mut app = calc();
        let (result, console) = run(&mut app, &[]);
        assert_eq!(
            result.unwrap_err().kind(),
            Some(ErrorKind::MissingCommandNameToExecute)
        );
        assert_eq!(console.stderr(), "error: missing command name\n");
    }

    #[test]
    fn test_argument_spec_checked_before_handler() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let show = Command::executable("show", "", move |_f: &ParsedFlags, _a: &[String]| {
            seen.set(seen.get() + 1);
            Ok::<_, anyhow::Error>(())
        })
        .with_argument_spec(ArgumentSpecification::maximum(3))
        .unwrap();
        let mut app = App::builder().name("calc").command(show).unwrap().build();

        let (result, _) = run(&mut app, &["show", "a", "b", "c", "d"]);
        assert_eq!(
            result.unwrap_err().kind(),
            Some(ErrorKind::ArgumentsGreaterThanMaximum)
        );
        assert_eq!(calls.get(), 0);

        let (result, _) = run(&mut app, &["show", "a", "b", "c"]);
        assert!(result.is_ok());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_handler_error_exit_code() {
        let mut app = calc();
        let (result, console) = run(&mut app, &["add", "2", "x"]);
        let err = result.unwrap_err();
        assert!(matches!(err, RunError::Handler(_)));
        assert_eq!(err.exit_code(), 1);
        assert!(console.stderr().starts_with("error: invalid digit"));
        assert!(app.diagnostics().record().is_none());
    }

    #[test]
    fn test_run_clears_previous_record() {
        let mut app = calc();
        let _ = run(&mut app, &["nope"]);
        assert!(app.diagnostics().record().is_some());
        let (result, _) = run(&mut app, &["add", "1", "2"]);
        assert!(result.is_ok());
        assert!(app.diagnostics().record().is_none());
    }

    #[test]
    fn test_persistent_app_flag_reaches_nested_command() {
        let remote_add = Command::executable("add", "", |flags: &ParsedFlags, args: &[String]| {
            Ok::<_, anyhow::Error>(format!(
                "{} {}",
                flags.get_bool("verbose").unwrap_or(false),
                args.join(",")
            ))
        });
        let remote = Command::group("remote", "").with_subcommand(remote_add).unwrap();
        let mut app = App::builder()
            .name("git")
            .flag(Flag::boolean("verbose").short('v').persistent())
            .unwrap()
            .command(remote)
            .unwrap()
            .build();

        let (_, console) = run(&mut app, &["remote", "add", "-v", "origin"]);
        assert_eq!(console.stdout(), "true origin\n");

        let (_, console) = run(&mut app, &["-v", "remote", "add", "origin"]);
        assert_eq!(console.stdout(), "true origin\n");

        let (_, console) = run(&mut app, &["remote", "add", "origin"]);
        assert_eq!(console.stdout(), "false origin\n");
    }

    #[test]
    fn test_json_output_is_pretty_printed() {
        let show = Command::executable("show", "", |_f: &ParsedFlags, _a: &[String]| {
            Ok::<_, anyhow::Error>(serde_json::json!({"ok": true}))
        });
        let mut app = App::builder().name("calc").command(show).unwrap().build();
        let (_, console) = run(&mut app, &["show"]);
        assert_eq!(console.stdout(), "{\n  \"ok\": true\n}\n");
    }

    #[test]
    fn test_command_mut_reaches_frozen_command() {
        let mut app = calc();
        let add = app.command_mut(&["add"]).unwrap();
        assert_eq!(
            add.add_alias("plus").unwrap_err(),
            Diagnostic::CommandAlreadyFrozen {
                command: "add".into()
            }
        );
        assert!(app.command_mut(&["nope"]).is_none());
        assert!(app.command_mut(&[]).is_none());
    }

    #[test]
    fn test_builder_refuses_duplicate_command() {
        let err = App::builder()
            .command(Command::group("remote", ""))
            .unwrap()
            .command(Command::group("remote", ""))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandNameAlreadyExists);
    }

    #[test]
    fn test_help_for_nested_command_includes_inherited_flags() {
        let remote = Command::group("remote", "Manage remotes")
            .with_subcommand(Command::executable("add", "Add a remote", |_f: &ParsedFlags, _a: &[String]| {
                Ok::<_, anyhow::Error>(())
            }))
            .unwrap();
        let app = App::builder()
            .name("git")
            .flag(Flag::boolean("verbose").persistent())
            .unwrap()
            .flag(Flag::boolean("local"))
            .unwrap()
            .command(remote)
            .unwrap()
            .build();

        let data = app.help_data(&["remote", "add"]).unwrap();
        assert_eq!(data.usage, "git remote add [flags] [args...]");
        let flags: Vec<_> = data.flags.iter().map(|f| f.long.as_str()).collect();
        assert_eq!(flags, vec!["verbose"]);

        assert!(app.help(&["remote", "nope"]).is_none());
        assert!(app.help(&[]).unwrap().starts_with("git\n"));
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(exit_code(&Ok(())), 0);
        assert_eq!(
            exit_code(&Err(RunError::Diagnosed(ErrorKind::FlagNotFound))),
            2
        );
        assert_eq!(
            exit_code(&Err(RunError::Handler(anyhow::anyhow!("boom")))),
            1
        );
    }
}
