//! Commands: named units of a command tree.
//!
//! A [`Command`] is either executable (it owns a [`Handler`]) or a branch
//! (it owns a nested [`Commands`] collection). It may carry aliases, local
//! flags and an [`ArgumentSpecification`].
//!
//! # Build, Then Freeze
//!
//! Commands are configured before they are linked into a tree. Adding a
//! command to a parent or to the app freezes it; from then on every
//! mutating call fails with [`Diagnostic::CommandAlreadyFrozen`].
//!
//! ```rust
//! use stanza::{ArgumentSpecification, Command, Flag, ParsedFlags};
//!
//! let add = Command::executable("add", "Add numbers", |_flags: &ParsedFlags, args: &[String]| {
//!     Ok::<_, anyhow::Error>(format!("{} numbers", args.len()))
//! })
//! .with_alias("plus")?
//! .with_flag(Flag::boolean("verbose").short('v'))?
//! .with_argument_spec(ArgumentSpecification::minimum(2))?;
//!
//! let mut math = Command::group("math", "Arithmetic");
//! math.add_subcommand(add)?;
//!
//! let add = math.subcommands().and_then(|c| c.resolve("plus")).unwrap();
//! assert!(add.is_frozen());
//! # Ok::<(), stanza::Diagnostic>(())
//! ```

use std::fmt;

use crate::args::ArgumentSpecification;
use crate::commands::Commands;
use crate::diagnostics::Diagnostic;
use crate::flag::{Flag, FlagRegistry};
use crate::handler::{FnHandler, Handler, IntoHandlerResult, Output};
use crate::parser::{CommandLineParser, ParsedFlags, Tokens};
use crate::suggest::SuggestionEngine;

/// What a command does when it is reached.
pub enum CommandAction {
    /// A leaf that runs a handler.
    Executable(Box<dyn Handler>),
    /// A branch whose next token names a child command.
    Subcommands(Commands),
}

impl fmt::Debug for CommandAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandAction::Executable(_) => f.write_str("Executable(..)"),
            CommandAction::Subcommands(commands) => {
                f.debug_tuple("Subcommands").field(commands).finish()
            }
        }
    }
}

/// A failure while executing a command line.
#[derive(Debug)]
pub(crate) enum Failure {
    Diagnosed(Diagnostic),
    Handler(anyhow::Error),
}

impl From<Diagnostic> for Failure {
    fn from(record: Diagnostic) -> Self {
        Failure::Diagnosed(record)
    }
}

/// State carried down the tree during one invocation.
pub(crate) struct Invocation<'a> {
    pub tokens: Tokens<'a>,
    pub flags: ParsedFlags,
    pub path: Vec<String>,
    pub suggestions: SuggestionEngine,
}

impl<'a> Invocation<'a> {
    pub fn new(tokens: &'a [String], suggestions: SuggestionEngine) -> Self {
        Self {
            tokens: Tokens::new(tokens),
            flags: ParsedFlags::new(),
            path: Vec::new(),
            suggestions,
        }
    }
}

/// A named node of the command tree.
#[derive(Debug)]
pub struct Command {
    name: String,
    description: String,
    action: CommandAction,
    aliases: Vec<String>,
    argument_spec: Option<ArgumentSpecification>,
    local_flags: Option<FlagRegistry>,
    has_parent: bool,
    frozen: bool,
}

impl Command {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        action: CommandAction,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            action,
            aliases: Vec::new(),
            argument_spec: None,
            local_flags: None,
            has_parent: false,
            frozen: false,
        }
    }

    /// An executable command backed by a closure.
    pub fn executable<F, R>(name: impl Into<String>, description: impl Into<String>, f: F) -> Self
    where
        F: FnMut(&ParsedFlags, &[String]) -> R + 'static,
        R: IntoHandlerResult + 'static,
    {
        Self::with_handler(name, description, FnHandler::new(f))
    }

    /// An executable command backed by a [`Handler`] implementation.
    pub fn with_handler<H>(name: impl Into<String>, description: impl Into<String>, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        Self::new(name, description, CommandAction::Executable(Box::new(handler)))
    }

    /// A branch command with no subcommands yet.
    pub fn group(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(
            name,
            description,
            CommandAction::Subcommands(Commands::new()),
        )
    }

    fn ensure_mutable(&self) -> Result<(), Diagnostic> {
        if self.frozen {
            return Err(Diagnostic::CommandAlreadyFrozen {
                command: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Adds an alternative name.
    pub fn add_alias(&mut self, alias: impl Into<String>) -> Result<(), Diagnostic> {
        self.ensure_mutable()?;
        let alias = alias.into();
        if alias == self.name || self.aliases.contains(&alias) {
            return Err(Diagnostic::CommandAliasAlreadyExists {
                alias,
                command: self.name.clone(),
            });
        }
        self.aliases.push(alias);
        Ok(())
    }

    /// Adds a flag to this command's local registry.
    pub fn add_flag(&mut self, flag: Flag) -> Result<(), Diagnostic> {
        self.ensure_mutable()?;
        self.local_flags
            .get_or_insert_with(FlagRegistry::new)
            .add(flag)
    }

    pub fn set_argument_spec(&mut self, spec: ArgumentSpecification) -> Result<(), Diagnostic> {
        self.ensure_mutable()?;
        self.argument_spec = Some(spec);
        Ok(())
    }

    /// Attaches `child` below this command and freezes it.
    ///
    /// Fails when this command is frozen, is executable, or already has a
    /// command or alias with one of the child's names.
    pub fn add_subcommand(&mut self, mut child: Command) -> Result<(), Diagnostic> {
        self.ensure_mutable()?;
        child.has_parent = true;
        match &mut self.action {
            CommandAction::Executable(_) => Err(Diagnostic::SubCommandAddedToExecutable {
                command: self.name.clone(),
                subcommand: child.name,
            }),
            CommandAction::Subcommands(commands) => commands.add(child, true),
        }
    }

    /// Detaches a child by name or alias.
    ///
    /// The child stays frozen and keeps its parent mark. Returns `None`
    /// for an executable command or an unknown name.
    pub fn remove_subcommand(&mut self, name: &str) -> Result<Option<Command>, Diagnostic> {
        self.ensure_mutable()?;
        Ok(self.subcommands_mut().and_then(|commands| commands.remove(name)))
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Result<Self, Diagnostic> {
        self.add_alias(alias)?;
        Ok(self)
    }

    pub fn with_flag(mut self, flag: Flag) -> Result<Self, Diagnostic> {
        self.add_flag(flag)?;
        Ok(self)
    }

    pub fn with_argument_spec(mut self, spec: ArgumentSpecification) -> Result<Self, Diagnostic> {
        self.set_argument_spec(spec)?;
        Ok(self)
    }

    pub fn with_subcommand(mut self, child: Command) -> Result<Self, Diagnostic> {
        self.add_subcommand(child)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn argument_spec(&self) -> Option<&ArgumentSpecification> {
        self.argument_spec.as_ref()
    }

    pub fn flags(&self) -> Option<&FlagRegistry> {
        self.local_flags.as_ref()
    }

    pub fn action(&self) -> &CommandAction {
        &self.action
    }

    pub fn is_executable(&self) -> bool {
        matches!(self.action, CommandAction::Executable(_))
    }

    pub fn subcommands(&self) -> Option<&Commands> {
        match &self.action {
            CommandAction::Subcommands(commands) => Some(commands),
            CommandAction::Executable(_) => None,
        }
    }

    /// Mutable access to the children, for walking down to a descendant.
    pub(crate) fn subcommands_mut(&mut self) -> Option<&mut Commands> {
        match &mut self.action {
            CommandAction::Subcommands(commands) => Some(commands),
            CommandAction::Executable(_) => None,
        }
    }

    pub fn has_parent(&self) -> bool {
        self.has_parent
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Parses this command's level and either runs the handler or descends.
    pub(crate) fn execute(
        &mut self,
        inherited: &FlagRegistry,
        invocation: &mut Invocation<'_>,
    ) -> Result<Output, Failure> {
        invocation.path.push(self.name.clone());

        // A local flag owns its name at this level and below.
        if let Some(local) = &self.local_flags {
            for flag in local.iter() {
                invocation.flags.remove(flag.name());
            }
        }

        let scope = FlagRegistry::scoped(self.local_flags.as_ref(), inherited);
        let parser = CommandLineParser::new(&self.name, &scope, !self.is_executable());
        let positionals = parser.parse(&mut invocation.tokens, &mut invocation.flags)?;
        invocation.flags.fill_defaults(&scope);

        match &mut self.action {
            CommandAction::Executable(handler) => {
                if let Some(spec) = &self.argument_spec {
                    spec.validate(positionals.len())?;
                }
                tracing::debug!(
                    path = %invocation.path.join(" "),
                    args = positionals.len(),
                    "invoking handler"
                );
                handler
                    .handle(&invocation.flags, &positionals)
                    .map_err(Failure::Handler)
            }
            CommandAction::Subcommands(commands) => {
                let Some(name) = positionals.into_iter().next() else {
                    return Err(Diagnostic::MissingCommandNameToExecute {
                        command: Some(self.name.clone()),
                    }
                    .into());
                };
                commands.dispatch(Some(&self.name), name, &scope.persistent(), invocation)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorKind;

    fn noop(name: &str) -> Command {
        Command::executable(name, "", |_f: &ParsedFlags, _a: &[String]| {
            Ok::<_, anyhow::Error>(())
        })
    }

    fn echo(name: &str) -> Command {
        Command::executable(name, "", |flags: &ParsedFlags, args: &[String]| {
            let json = serde_json::json!({
                "flags": flags,
                "args": args,
            });
            Ok::<_, anyhow::Error>(json)
        })
    }

    fn run(command: &mut Command, raw: &[&str]) -> Result<Output, Failure> {
        let raw: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
        let mut invocation = Invocation::new(&raw, SuggestionEngine::default());
        command.execute(&FlagRegistry::new(), &mut invocation)
    }

    fn diagnosed(result: Result<Output, Failure>) -> Diagnostic {
        match result {
            Err(Failure::Diagnosed(record)) => record,
            other => panic!("expected a diagnostic, got {:?}", other),
        }
    }

    #[test]
    fn test_add_subcommand_to_executable_fails() {
        let mut leaf = noop("add");
        let err = leaf.add_subcommand(noop("sub")).unwrap_err();
        assert_eq!(
            err,
            Diagnostic::SubCommandAddedToExecutable {
                command: "add".into(),
                subcommand: "sub".into()
            }
        );
    }

    #[test]
    fn test_add_subcommand_freezes_child() {
        let mut parent = Command::group("remote", "");
        parent.add_subcommand(noop("add")).unwrap();

        let child = parent.subcommands().unwrap().resolve("add").unwrap();
        assert!(child.is_frozen());
        assert!(child.has_parent());
        assert!(!parent.is_frozen());
    }

    #[test]
    fn test_group_with_children_can_be_attached() {
        let inner = Command::group("config", "")
            .with_subcommand(noop("get"))
            .unwrap();
        let outer = Command::group("app", "").with_subcommand(inner).unwrap();
        let config = outer.subcommands().unwrap().resolve("config").unwrap();
        assert!(config.subcommands().unwrap().resolve("get").is_some());
    }

    #[test]
    fn test_frozen_command_rejects_mutation() {
        let mut parent = Command::group("remote", "");
        parent.add_subcommand(noop("add")).unwrap();
        let child = parent
            .subcommands_mut()
            .unwrap()
            .get_mut("add")
            .unwrap();

        let frozen = Diagnostic::CommandAlreadyFrozen {
            command: "add".into(),
        };
        assert_eq!(child.add_alias("a").unwrap_err(), frozen);
        assert_eq!(child.add_flag(Flag::boolean("x")).unwrap_err(), frozen);
        assert_eq!(
            child
                .set_argument_spec(ArgumentSpecification::zero())
                .unwrap_err(),
            frozen
        );
        assert!(child.aliases().is_empty());
        assert!(child.flags().is_none());
    }

    #[test]
    fn test_remove_subcommand() {
        let mut parent = Command::group("remote", "");
        parent.add_subcommand(noop("add")).unwrap();

        let removed = parent.remove_subcommand("add").unwrap().unwrap();
        assert!(removed.is_frozen());
        assert!(removed.has_parent());
        assert!(parent.remove_subcommand("add").unwrap().is_none());

        let mut outer = Command::group("outer", "");
        outer.add_subcommand(parent).unwrap();
        let parent = outer.subcommands_mut().unwrap().get_mut("remote").unwrap();
        assert_eq!(
            parent.remove_subcommand("add").unwrap_err().kind(),
            ErrorKind::CommandAlreadyFrozen
        );
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let mut command = noop("list");
        command.add_alias("ls").unwrap();
        assert_eq!(
            command.add_alias("ls").unwrap_err().kind(),
            ErrorKind::CommandAliasAlreadyExists
        );
        assert_eq!(
            command.add_alias("list").unwrap_err().kind(),
            ErrorKind::CommandAliasAlreadyExists
        );
        assert_eq!(command.aliases(), ["ls"]);
    }

    #[test]
    fn test_execute_runs_handler_with_flags_and_args() {
        let mut command = echo("add")
            .with_flag(Flag::boolean("verbose"))
            .unwrap();
        let output = run(&mut command, &["2", "5", "--verbose"]).unwrap();
        assert_eq!(
            output,
            Output::Json(serde_json::json!({
                "flags": {"verbose": true},
                "args": ["2", "5"],
            }))
        );
    }

    #[test]
    fn test_execute_validates_argument_spec_before_handler() {
        let mut command = Command::executable("add", "", |_f: &ParsedFlags, _a: &[String]| {
            Err::<(), _>(anyhow::anyhow!("handler must not run"))
        })
        .with_argument_spec(ArgumentSpecification::maximum(3))
        .unwrap();

        let err = diagnosed(run(&mut command, &["1", "2", "3", "4"]));
        assert_eq!(
            err,
            Diagnostic::ArgumentsGreaterThanMaximum {
                expected: 3,
                actual: 4
            }
        );
    }

    #[test]
    fn test_execute_fills_defaults() {
        let mut command = echo("get")
            .with_flag(Flag::int64("limit").default_value(10))
            .unwrap();
        let output = run(&mut command, &[]).unwrap();
        let Output::Json(json) = output else {
            panic!("expected json output");
        };
        assert_eq!(json["flags"]["limit"], 10);
    }

    #[test]
    fn test_execute_descends_into_subcommand() {
        let mut kubectl = Command::group("kubectl", "")
            .with_flag(Flag::boolean("verbose").persistent())
            .unwrap()
            .with_flag(Flag::int64("timeout").short('t'))
            .unwrap()
            .with_subcommand(echo("get"))
            .unwrap();

        let output = run(&mut kubectl, &["--verbose", "-t", "23", "get", "pods"]).unwrap();
        assert_eq!(
            output,
            Output::Json(serde_json::json!({
                "flags": {"verbose": true, "timeout": 23},
                "args": ["pods"],
            }))
        );
    }

    #[test]
    fn test_persistent_flag_visible_below_local_flag_not() {
        let mut remote = Command::group("remote", "")
            .with_flag(Flag::boolean("verbose").short('v').persistent())
            .unwrap()
            .with_flag(Flag::boolean("local"))
            .unwrap()
            .with_subcommand(echo("add"))
            .unwrap();

        let output = run(&mut remote, &["add", "-v", "origin"]).unwrap();
        let Output::Json(json) = output else {
            panic!("expected json output");
        };
        assert_eq!(json["flags"]["verbose"], true);
        assert_eq!(json["args"], serde_json::json!(["origin"]));

        let err = diagnosed(run(&mut remote, &["add", "--local"]));
        assert_eq!(
            err,
            Diagnostic::FlagNotFound {
                flag: "local".into()
            }
        );
    }

    #[test]
    fn test_missing_subcommand_name() {
        let mut remote = Command::group("remote", "").with_subcommand(noop("add")).unwrap();
        let err = diagnosed(run(&mut remote, &[]));
        assert_eq!(
            err,
            Diagnostic::MissingCommandNameToExecute {
                command: Some("remote".into())
            }
        );
    }

    #[test]
    fn test_unknown_subcommand_carries_suggestions() {
        let mut remote = Command::group("remote", "")
            .with_subcommand(noop("add"))
            .unwrap()
            .with_subcommand(noop("remove"))
            .unwrap();

        let err = diagnosed(run(&mut remote, &["ad"]));
        assert_eq!(
            err,
            Diagnostic::SubcommandNotAddedToParentCommand {
                command: "remote".into(),
                subcommand: "ad".into(),
                suggestions: vec!["add".into()],
            }
        );
    }

    #[test]
    fn test_handler_error_is_not_a_diagnostic() {
        let mut command = Command::executable("fail", "", |_f: &ParsedFlags, _a: &[String]| {
            Err::<(), _>(anyhow::anyhow!("boom"))
        });
        match run(&mut command, &[]) {
            Err(Failure::Handler(err)) => assert_eq!(err.to_string(), "boom"),
            other => panic!("expected handler failure, got {:?}", other),
        }
    }

    #[test]
    fn test_explicit_false_for_persistent_flag_in_child() {
        let mut remote = Command::group("remote", "")
            .with_flag(Flag::boolean("verbose").persistent().default_value(true))
            .unwrap()
            .with_subcommand(echo("add"))
            .unwrap();

        let output = run(&mut remote, &["add", "--verbose", "false"]).unwrap();
        let Output::Json(json) = output else {
            panic!("expected json output");
        };
        assert_eq!(json["flags"]["verbose"], false);
        assert_eq!(json["args"], serde_json::json!([]));
    }
}
