//! Token-by-token command-line parsing.
//!
//! A [`CommandLineParser`] handles exactly one command level. It walks a
//! [`Tokens`] cursor, writes flag values into a shared [`ParsedFlags`] and
//! returns the positional tokens it saw, in order.
//!
//! # Flag Grammar
//!
//! A token is flag-like when it is `-X` (one dash, one non-dash character)
//! or `--X...` (two dashes, then at least one character that is not a dash).
//! Everything else is a literal: a positional argument or a flag value.
//! `--name=value` and combined short flags are not recognized.
//!
//! # Transitions
//!
//! The parser remembers the last flag still waiting for a value:
//!
//! ```text
//! flag-like token, pending boolean      → pending := true, resolve new flag
//! flag-like token, pending non-boolean  → NoFlagValueProvided
//! literal, pending boolean, true|false  → consume as the boolean's value
//! literal, pending boolean, other       → pending := true, token is positional
//! literal, pending non-boolean          → convert and record
//! literal, nothing pending              → positional
//! end of input, pending boolean         → pending := true
//! end of input, pending non-boolean     → NoFlagValueProvided
//! ```
//!
//! At a level with subcommands, scanning stops right after the first
//! positional token: that token names the subcommand and everything after
//! it stays in the cursor for the child's own parser. This includes the case
//! where a boolean flag declines a non-literal token, which then becomes the
//! subcommand name.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::diagnostics::Diagnostic;
use crate::flag::{Flag, FlagRegistry, FlagValue};

/// A cursor over raw command-line tokens.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    tokens: &'a [String],
    position: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Tokens not consumed yet.
    pub fn remaining(&self) -> &'a [String] {
        &self.tokens[self.position..]
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.tokens.len()
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }
}

/// Returns the flag name inside a flag-like token, dashes stripped.
pub fn flag_name(token: &str) -> Option<&str> {
    if let Some(rest) = token.strip_prefix("--") {
        return match rest.chars().next() {
            Some(c) if c != '-' => Some(rest),
            _ => None,
        };
    }

    let rest = token.strip_prefix('-')?;
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '-' => Some(rest),
        _ => None,
    }
}

/// A flag name and the value it was given.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParsedFlag {
    pub name: String,
    pub value: FlagValue,
}

/// Flag values collected while parsing, in first-seen order.
///
/// Values given on the command line and defaults of flags that were not
/// given both end up here. Handlers receive it read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFlags {
    flags: Vec<ParsedFlag>,
}

impl ParsedFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value, replacing an earlier value for the same flag.
    pub(crate) fn set(&mut self, name: &str, value: FlagValue) {
        match self.flags.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.value = value,
            None => self.flags.push(ParsedFlag {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Forgets the value recorded for `name`, if any.
    pub(crate) fn remove(&mut self, name: &str) {
        self.flags.retain(|f| f.name != name);
    }

    /// Adds defaults for flags of `registry` that have no value yet, or
    /// whose value was recorded for a different flag of the same name.
    pub(crate) fn fill_defaults(&mut self, registry: &FlagRegistry) {
        for flag in registry.iter() {
            if let Some(default) = flag.default() {
                let stale = self
                    .get(flag.name())
                    .map_or(true, |value| value.flag_type() != flag.flag_type());
                if stale {
                    self.set(flag.name(), default.clone());
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.flags.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FlagValue::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FlagValue::as_int)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FlagValue::as_str)
    }

    /// True when the flag was given, or has a default.
    pub fn contains(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsedFlag> {
        self.flags.iter()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, FlagValue)> for ParsedFlags {
    fn from_iter<I: IntoIterator<Item = (N, FlagValue)>>(iter: I) -> Self {
        let mut flags = ParsedFlags::new();
        for (name, value) in iter {
            flags.set(&name.into(), value);
        }
        flags
    }
}

impl Serialize for ParsedFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.flags.len()))?;
        for flag in &self.flags {
            map.serialize_entry(&flag.name, &flag.value)?;
        }
        map.end()
    }
}

/// Parses the tokens of one command level.
#[derive(Debug, Clone, Copy)]
pub struct CommandLineParser<'r> {
    command: &'r str,
    registry: &'r FlagRegistry,
    has_subcommands: bool,
}

impl<'r> CommandLineParser<'r> {
    /// `command` names the level in diagnostics; `registry` holds every flag
    /// applicable at this level, inherited ones included.
    pub fn new(command: &'r str, registry: &'r FlagRegistry, has_subcommands: bool) -> Self {
        Self {
            command,
            registry,
            has_subcommands,
        }
    }

    /// Consumes tokens for this level and returns its positional arguments.
    ///
    /// With subcommands, at most one positional token is returned and the
    /// cursor is left just after it.
    pub fn parse(
        &self,
        tokens: &mut Tokens<'_>,
        flags: &mut ParsedFlags,
    ) -> Result<Vec<String>, Diagnostic> {
        let mut positionals = Vec::new();
        let mut pending: Option<&'r Flag> = None;

        while let Some(token) = tokens.next() {
            tracing::trace!(command = self.command, token, "token");

            if let Some(name) = flag_name(token) {
                if let Some(flag) = pending.take() {
                    self.implicit_true(flag, flags)?;
                }
                pending = Some(self.resolve(name)?);
                continue;
            }

            match pending.take() {
                Some(flag) if flag.is_boolean() => {
                    if token == "true" || token == "false" {
                        flags.set(flag.name(), flag.convert(token)?);
                    } else {
                        flags.set(flag.name(), FlagValue::Bool(true));
                        positionals.push(token.to_string());
                        if self.has_subcommands {
                            break;
                        }
                    }
                }
                Some(flag) => {
                    flags.set(flag.name(), flag.convert(token)?);
                }
                None => {
                    positionals.push(token.to_string());
                    if self.has_subcommands {
                        break;
                    }
                }
            }
        }

        if let Some(flag) = pending {
            self.implicit_true(flag, flags)?;
        }

        Ok(positionals)
    }

    fn resolve(&self, name: &str) -> Result<&'r Flag, Diagnostic> {
        if self.registry.is_empty() {
            return Err(Diagnostic::NoFlagsAddedToCommand {
                command: self.command.to_string(),
                flag: name.to_string(),
            });
        }
        self.registry
            .resolve(name)
            .ok_or_else(|| Diagnostic::FlagNotFound {
                flag: name.to_string(),
            })
    }

    /// A pending flag whose value never came: fine for booleans only.
    fn implicit_true(&self, flag: &Flag, flags: &mut ParsedFlags) -> Result<(), Diagnostic> {
        if !flag.is_boolean() {
            return Err(Diagnostic::NoFlagValueProvided {
                flag: flag.name().to_string(),
            });
        }
        flags.set(flag.name(), FlagValue::Bool(true));
        Ok(())
    }
}
