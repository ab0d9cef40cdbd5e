//! Typed diagnostics for registration, parsing and dispatch failures.
//!
//! Every failure in stanza is described by a [`Diagnostic`]: a tagged record
//! carrying exactly the context needed to explain what went wrong (flag
//! names, counts, offending values). Build-time operations return the record
//! directly as their error. At run time the [`App`](crate::App) files the
//! record into its [`Diagnostics`] slot and hands the caller only the
//! fieldless [`ErrorKind`], so renderers can still report the exact context
//! after control flow has unwound.
//!
//! # Single Slot
//!
//! [`Diagnostics`] holds at most one record. Reporting a new one overwrites
//! the previous one. Parsing, validation and dispatch all abort on the first
//! failure, so only the latest record is ever relevant.
//!
//! ```rust
//! use stanza::{BufferConsole, Diagnostic, Diagnostics, ErrorKind};
//!
//! let mut diagnostics = Diagnostics::new();
//! let kind = diagnostics.report_and_fail(Diagnostic::FlagNotFound {
//!     flag: "verbos".into(),
//! });
//! assert_eq!(kind, ErrorKind::FlagNotFound);
//!
//! let mut console = BufferConsole::new();
//! diagnostics.log(&mut console);
//! assert_eq!(console.stderr(), "error: flag `verbos` not found\n");
//! ```

use std::fmt;

use thiserror::Error;

use crate::args::plural;
use crate::console::Console;
use crate::flag::FlagType;

/// A structured failure record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// A flag with this name is already registered.
    #[error("flag `{flag}` already exists")]
    FlagNameAlreadyExists { flag: String },

    /// Another flag already uses this short name.
    #[error("short name `-{short_name}` already exists for flag `{flag}`")]
    FlagShortNameAlreadyExists { short_name: char, flag: String },

    /// The command line names a flag nobody registered.
    #[error("flag `{flag}` not found")]
    FlagNotFound { flag: String },

    /// A boolean flag value other than `true` or `false`.
    #[error("invalid boolean `{value}` for flag `{flag}`, expected `true` or `false`")]
    InvalidBoolean { flag: String, value: String },

    /// A value that does not parse as a 64-bit integer.
    #[error("invalid integer `{value}` for flag `{flag}`")]
    InvalidInteger { flag: String, value: String },

    /// A non-boolean flag with nothing usable after it.
    #[error("no value provided for flag `{flag}`")]
    NoFlagValueProvided { flag: String },

    /// A flag given to a command without any applicable flags.
    #[error("flag `{flag}` passed to `{command}`, which accepts no flags")]
    NoFlagsAddedToCommand { command: String, flag: String },

    /// A default whose type differs from the flag's.
    #[error("default value of flag `{flag}` is not of type {expected}")]
    InvalidFlagDefault { flag: String, expected: FlagType },

    /// A sibling already uses this command name.
    #[error("command `{command}` already exists")]
    CommandNameAlreadyExists { command: String },

    /// A sibling already uses this alias.
    #[error("alias `{alias}` of command `{command}` already exists")]
    CommandAliasAlreadyExists { alias: String, command: String },

    /// The command is already attached elsewhere in a tree.
    #[error("command `{command}` already has a parent")]
    CommandHasAParent { command: String },

    /// Executable commands cannot have children.
    #[error("cannot add subcommand `{subcommand}` to executable command `{command}`")]
    SubCommandAddedToExecutable { command: String, subcommand: String },

    /// No command name where one was required.
    #[error("{}", missing_command_message(.command.as_deref()))]
    MissingCommandNameToExecute { command: Option<String> },

    /// No child of `command` matches the given name.
    #[error("subcommand `{subcommand}` not added to command `{command}`")]
    SubcommandNotAddedToParentCommand {
        command: String,
        subcommand: String,
        suggestions: Vec<String>,
    },

    /// No top-level command matches the given name.
    #[error("command `{command}` not added")]
    CommandNotAdded {
        command: String,
        suggestions: Vec<String>,
    },

    /// The tree was frozen by a run and can no longer change.
    #[error("command `{command}` is frozen and can no longer be modified")]
    CommandAlreadyFrozen { command: String },

    /// Arguments given to a command that takes none.
    #[error("expected no arguments, got {actual}")]
    ArgumentsNotEqualToZero { actual: usize },

    /// Fewer arguments than the minimum.
    #[error("expected at least {expected} {}, got {actual}", plural(*.expected))]
    ArgumentsLessThanMinimum { expected: usize, actual: usize },

    /// More arguments than the maximum.
    #[error("expected at most {expected} {}, got {actual}", plural(*.expected))]
    ArgumentsGreaterThanMaximum { expected: usize, actual: usize },

    /// Not exactly the required number of arguments.
    #[error("expected exactly {expected} {}, got {actual}", plural(*.expected))]
    ArgumentsNotEqualToExact { expected: usize, actual: usize },

    /// Outside a range whose upper bound is excluded.
    #[error("expected at least {min} and fewer than {max} arguments, got {actual}")]
    ArgumentsNotInEndExclusiveRange {
        min: usize,
        max: usize,
        actual: usize,
    },

    /// Outside a range whose upper bound is included.
    #[error("expected between {min} and {max} arguments, got {actual}")]
    ArgumentsNotInEndInclusiveRange {
        min: usize,
        max: usize,
        actual: usize,
    },

    /// A range that admits no argument count.
    #[error("invalid argument range {min}..{max}")]
    InvalidRange { min: usize, max: usize },
}

fn missing_command_message(command: Option<&str>) -> String {
    match command {
        Some(command) => format!("missing subcommand name for `{}`", command),
        None => "missing command name".to_string(),
    }
}

/// The fieldless tag of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FlagNameAlreadyExists,
    FlagShortNameAlreadyExists,
    FlagNotFound,
    InvalidBoolean,
    InvalidInteger,
    NoFlagValueProvided,
    NoFlagsAddedToCommand,
    InvalidFlagDefault,
    CommandNameAlreadyExists,
    CommandAliasAlreadyExists,
    CommandHasAParent,
    SubCommandAddedToExecutable,
    MissingCommandNameToExecute,
    SubcommandNotAddedToParentCommand,
    CommandNotAdded,
    CommandAlreadyFrozen,
    ArgumentsNotEqualToZero,
    ArgumentsLessThanMinimum,
    ArgumentsGreaterThanMaximum,
    ArgumentsNotEqualToExact,
    ArgumentsNotInEndExclusiveRange,
    ArgumentsNotInEndInclusiveRange,
    InvalidRange,
}

impl ErrorKind {
    /// Returns true for failures caused by the command line a user typed,
    /// as opposed to mistakes in how the application built its tree.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            ErrorKind::FlagNotFound
                | ErrorKind::InvalidBoolean
                | ErrorKind::InvalidInteger
                | ErrorKind::NoFlagValueProvided
                | ErrorKind::NoFlagsAddedToCommand
                | ErrorKind::MissingCommandNameToExecute
                | ErrorKind::SubcommandNotAddedToParentCommand
                | ErrorKind::CommandNotAdded
                | ErrorKind::ArgumentsNotEqualToZero
                | ErrorKind::ArgumentsLessThanMinimum
                | ErrorKind::ArgumentsGreaterThanMaximum
                | ErrorKind::ArgumentsNotEqualToExact
                | ErrorKind::ArgumentsNotInEndExclusiveRange
                | ErrorKind::ArgumentsNotInEndInclusiveRange
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Diagnostic {
    /// Maps this record to its tag.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Diagnostic::FlagNameAlreadyExists { .. } => ErrorKind::FlagNameAlreadyExists,
            Diagnostic::FlagShortNameAlreadyExists { .. } => ErrorKind::FlagShortNameAlreadyExists,
            Diagnostic::FlagNotFound { .. } => ErrorKind::FlagNotFound,
            Diagnostic::InvalidBoolean { .. } => ErrorKind::InvalidBoolean,
            Diagnostic::InvalidInteger { .. } => ErrorKind::InvalidInteger,
            Diagnostic::NoFlagValueProvided { .. } => ErrorKind::NoFlagValueProvided,
            Diagnostic::NoFlagsAddedToCommand { .. } => ErrorKind::NoFlagsAddedToCommand,
            Diagnostic::InvalidFlagDefault { .. } => ErrorKind::InvalidFlagDefault,
            Diagnostic::CommandNameAlreadyExists { .. } => ErrorKind::CommandNameAlreadyExists,
            Diagnostic::CommandAliasAlreadyExists { .. } => ErrorKind::CommandAliasAlreadyExists,
            Diagnostic::CommandHasAParent { .. } => ErrorKind::CommandHasAParent,
            Diagnostic::SubCommandAddedToExecutable { .. } => {
                ErrorKind::SubCommandAddedToExecutable
            }
            Diagnostic::MissingCommandNameToExecute { .. } => {
                ErrorKind::MissingCommandNameToExecute
            }
            Diagnostic::SubcommandNotAddedToParentCommand { .. } => {
                ErrorKind::SubcommandNotAddedToParentCommand
            }
            Diagnostic::CommandNotAdded { .. } => ErrorKind::CommandNotAdded,
            Diagnostic::CommandAlreadyFrozen { .. } => ErrorKind::CommandAlreadyFrozen,
            Diagnostic::ArgumentsNotEqualToZero { .. } => ErrorKind::ArgumentsNotEqualToZero,
            Diagnostic::ArgumentsLessThanMinimum { .. } => ErrorKind::ArgumentsLessThanMinimum,
            Diagnostic::ArgumentsGreaterThanMaximum { .. } => {
                ErrorKind::ArgumentsGreaterThanMaximum
            }
            Diagnostic::ArgumentsNotEqualToExact { .. } => ErrorKind::ArgumentsNotEqualToExact,
            Diagnostic::ArgumentsNotInEndExclusiveRange { .. } => {
                ErrorKind::ArgumentsNotInEndExclusiveRange
            }
            Diagnostic::ArgumentsNotInEndInclusiveRange { .. } => {
                ErrorKind::ArgumentsNotInEndInclusiveRange
            }
            Diagnostic::InvalidRange { .. } => ErrorKind::InvalidRange,
        }
    }

    /// "Did you mean" candidates carried by unresolved-command records.
    pub fn suggestions(&self) -> &[String] {
        match self {
            Diagnostic::SubcommandNotAddedToParentCommand { suggestions, .. }
            | Diagnostic::CommandNotAdded { suggestions, .. } => suggestions,
            _ => &[],
        }
    }
}

/// Single-slot recorder for the most recent [`Diagnostic`].
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    slot: Option<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record`, replacing any previous one, and returns its kind.
    pub fn report_and_fail(&mut self, record: Diagnostic) -> ErrorKind {
        let kind = record.kind();
        tracing::debug!(%kind, "diagnostic reported");
        self.slot = Some(record);
        kind
    }

    /// The stored record, if any.
    pub fn record(&self) -> Option<&Diagnostic> {
        self.slot.as_ref()
    }

    /// The kind of the stored record, if any.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.slot.as_ref().map(Diagnostic::kind)
    }

    /// Empties the slot.
    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// Renders the stored record to the console's error stream.
    pub fn log(&self, console: &mut dyn Console) {
        let Some(record) = &self.slot else {
            return;
        };
        console.print_error(format_args!("error: {}\n", record));

        let suggestions = record.suggestions();
        if !suggestions.is_empty() {
            console.print_error(format_args!("\ndid you mean one of these?\n"));
            for suggestion in suggestions {
                console.print_error(format_args!("    {}\n", suggestion));
            }
        }
    }
}
