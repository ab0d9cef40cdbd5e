//! The command tree: a name-and-alias keyed collection of commands.

use std::collections::HashMap;

use crate::command::{Command, Failure, Invocation};
use crate::diagnostics::Diagnostic;
use crate::flag::FlagRegistry;
use crate::handler::Output;
use crate::suggest::SuggestionEngine;

/// Commands at one level of the tree, in insertion order.
///
/// Every primary name and every alias is a key, and each key maps to exactly
/// one command. Lookups are exact; near misses only show up as
/// [`suggestions_for`](Commands::suggestions_for).
#[derive(Debug, Default)]
pub struct Commands {
    commands: Vec<Command>,
    index: HashMap<String, usize>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a command and freezes it.
    ///
    /// With `allow_parent` unset, a command that already belonged to a
    /// parent is refused; the app's top level adds commands this way. The
    /// insert is atomic: if the name or any alias collides with an existing
    /// key, nothing changes.
    pub fn add(&mut self, mut command: Command, allow_parent: bool) -> Result<(), Diagnostic> {
        if !allow_parent && command.has_parent() {
            return Err(Diagnostic::CommandHasAParent {
                command: command.name().to_string(),
            });
        }
        if self.index.contains_key(command.name()) {
            return Err(Diagnostic::CommandNameAlreadyExists {
                command: command.name().to_string(),
            });
        }
        for alias in command.aliases() {
            if self.index.contains_key(alias) {
                return Err(Diagnostic::CommandAliasAlreadyExists {
                    alias: alias.clone(),
                    command: command.name().to_string(),
                });
            }
        }

        command.freeze();
        let position = self.commands.len();
        self.index.insert(command.name().to_string(), position);
        for alias in command.aliases() {
            self.index.insert(alias.clone(), position);
        }
        tracing::debug!(command = command.name(), "command added");
        self.commands.push(command);
        Ok(())
    }

    /// Exact lookup by name or alias.
    pub fn resolve(&self, name: &str) -> Option<&Command> {
        self.index.get(name).map(|&i| &self.commands[i])
    }

    /// Exact lookup by name or alias, mutable.
    ///
    /// The command is frozen, so this is only useful for reaching its
    /// descendants or observing that mutation is refused.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Command> {
        self.index.get(name).map(|&i| &mut self.commands[i])
    }

    /// Detaches a command, with all its keys, from this level.
    ///
    /// The command stays frozen and remembers that it had a parent.
    pub fn remove(&mut self, name: &str) -> Option<Command> {
        let position = self.index.get(name).copied()?;
        let command = self.commands.remove(position);
        self.index = self
            .commands
            .iter()
            .enumerate()
            .flat_map(|(i, c)| keys(c).map(move |k| (k.to_string(), i)))
            .collect();
        Some(command)
    }

    /// Commands in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Every key (names and aliases) in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().flat_map(keys)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered names and aliases close to `name`, closest first.
    pub fn suggestions_for(&self, name: &str, engine: &SuggestionEngine) -> Vec<String> {
        engine
            .suggest(name, self.names())
            .into_iter()
            .map(|s| s.name)
            .collect()
    }

    /// Resolves `name` at this level and executes the command.
    ///
    /// `parent` is `None` at the app's top level.
    pub(crate) fn dispatch(
        &mut self,
        parent: Option<&str>,
        name: String,
        inherited: &FlagRegistry,
        invocation: &mut Invocation<'_>,
    ) -> Result<Output, Failure> {
        if let Some(&position) = self.index.get(&name) {
            tracing::debug!(command = %name, "resolved");
            return self.commands[position].execute(inherited, invocation);
        }

        let suggestions = self.suggestions_for(&name, &invocation.suggestions);
        let record = match parent {
            Some(parent) => Diagnostic::SubcommandNotAddedToParentCommand {
                command: parent.to_string(),
                subcommand: name,
                suggestions,
            },
            None => Diagnostic::CommandNotAdded {
                command: name,
                suggestions,
            },
        };
        Err(record.into())
    }
}

fn keys(command: &Command) -> impl Iterator<Item = &str> {
    std::iter::once(command.name()).chain(command.aliases().iter().map(String::as_str))
}
