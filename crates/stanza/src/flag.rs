//! Typed flags and per-command flag registries.
//!
//! A [`Flag`] has a long name, an optional one-character short name, a
//! [`FlagType`], an optional default and a persistence bit. A
//! [`FlagRegistry`] is the set of flags one command level accepts; it keeps
//! long and short names unique and resolves tokens to flags.
//!
//! ```rust
//! use stanza::{Flag, FlagRegistry, FlagValue};
//!
//! let mut registry = FlagRegistry::new();
//! registry.add(Flag::boolean("verbose").short('v'))?;
//! registry.add(Flag::int64("timeout").short('t').default_value(30))?;
//!
//! let timeout = registry.resolve("t").unwrap();
//! assert_eq!(timeout.name(), "timeout");
//! assert_eq!(timeout.convert("23")?, FlagValue::Int(23));
//! # Ok::<(), stanza::Diagnostic>(())
//! ```
//!
//! # Persistence
//!
//! Flags marked [`persistent`](Flag::persistent) are inherited by every
//! descendant of the command (or app) that declares them. At each level the
//! applicable registry is built with [`FlagRegistry::scoped`]: the level's
//! own flags first, then inherited flags whose long and short names are not
//! already taken.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::diagnostics::Diagnostic;

/// The value type a flag accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    Boolean,
    Int64,
    String,
}

impl fmt::Display for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlagType::Boolean => "boolean",
            FlagType::Int64 => "int64",
            FlagType::String => "string",
        };
        f.write_str(name)
    }
}

/// A typed flag value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl FlagValue {
    /// The type this value belongs to.
    pub fn flag_type(&self) -> FlagType {
        match self {
            FlagValue::Bool(_) => FlagType::Boolean,
            FlagValue::Int(_) => FlagType::Int64,
            FlagValue::Str(_) => FlagType::String,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FlagValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{}", b),
            FlagValue::Int(n) => write!(f, "{}", n),
            FlagValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        FlagValue::Int(value)
    }
}

impl From<i32> for FlagValue {
    fn from(value: i32) -> Self {
        FlagValue::Int(value.into())
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Str(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::Str(value)
    }
}

/// A named, typed command-line switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    name: String,
    short_name: Option<char>,
    flag_type: FlagType,
    default: Option<FlagValue>,
    persistent: bool,
    description: String,
}

impl Flag {
    /// Creates a local flag of the given type with no short name or default.
    pub fn new(name: impl Into<String>, flag_type: FlagType) -> Self {
        Self {
            name: name.into(),
            short_name: None,
            flag_type,
            default: None,
            persistent: false,
            description: String::new(),
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FlagType::Boolean)
    }

    pub fn int64(name: impl Into<String>) -> Self {
        Self::new(name, FlagType::Int64)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FlagType::String)
    }

    /// Sets the one-character short name (`-x`).
    pub fn short(mut self, short_name: char) -> Self {
        self.short_name = Some(short_name);
        self
    }

    /// Sets the value used when the flag is not given.
    ///
    /// The value's type is checked against the flag's when the flag is
    /// added to a registry.
    pub fn default_value(mut self, value: impl Into<FlagValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Makes the flag visible to all descendant commands.
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_name(&self) -> Option<char> {
        self.short_name
    }

    pub fn flag_type(&self) -> FlagType {
        self.flag_type
    }

    pub fn default(&self) -> Option<&FlagValue> {
        self.default.as_ref()
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn is_boolean(&self) -> bool {
        self.flag_type == FlagType::Boolean
    }

    pub fn about(&self) -> &str {
        &self.description
    }

    /// Converts a raw token into a value of this flag's type.
    ///
    /// Booleans accept exactly `true` and `false`, integers a base-10
    /// signed 64-bit literal, strings anything verbatim.
    pub fn convert(&self, raw: &str) -> Result<FlagValue, Diagnostic> {
        match self.flag_type {
            FlagType::Boolean => match raw {
                "true" => Ok(FlagValue::Bool(true)),
                "false" => Ok(FlagValue::Bool(false)),
                _ => Err(Diagnostic::InvalidBoolean {
                    flag: self.name.clone(),
                    value: raw.to_string(),
                }),
            },
            FlagType::Int64 => {
                raw.parse::<i64>()
                    .map(FlagValue::Int)
                    .map_err(|_| Diagnostic::InvalidInteger {
                        flag: self.name.clone(),
                        value: raw.to_string(),
                    })
            }
            FlagType::String => Ok(FlagValue::Str(raw.to_string())),
        }
    }
}

/// The flags accepted at one command level.
#[derive(Debug, Clone, Default)]
pub struct FlagRegistry {
    flags: Vec<Flag>,
    by_name: HashMap<String, usize>,
    by_short: HashMap<char, usize>,
}

impl FlagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a flag.
    ///
    /// Fails if the long name or the short name is already taken, or if the
    /// default value does not match the flag type. Nothing is inserted on
    /// failure.
    pub fn add(&mut self, flag: Flag) -> Result<(), Diagnostic> {
        if self.by_name.contains_key(&flag.name) {
            return Err(Diagnostic::FlagNameAlreadyExists { flag: flag.name });
        }
        if let Some(short_name) = flag.short_name {
            if let Some(&owner) = self.by_short.get(&short_name) {
                return Err(Diagnostic::FlagShortNameAlreadyExists {
                    short_name,
                    flag: self.flags[owner].name.clone(),
                });
            }
        }
        if let Some(default) = &flag.default {
            if default.flag_type() != flag.flag_type {
                return Err(Diagnostic::InvalidFlagDefault {
                    flag: flag.name,
                    expected: flag.flag_type,
                });
            }
        }

        self.insert(flag);
        Ok(())
    }

    fn insert(&mut self, flag: Flag) {
        let index = self.flags.len();
        self.by_name.insert(flag.name.clone(), index);
        if let Some(short_name) = flag.short_name {
            self.by_short.insert(short_name, index);
        }
        self.flags.push(flag);
    }

    /// Resolves a token with its dashes stripped.
    ///
    /// The token matches a long name exactly or, when it is a single
    /// character, a registered short name.
    pub fn resolve(&self, token: &str) -> Option<&Flag> {
        if let Some(&index) = self.by_name.get(token) {
            return Some(&self.flags[index]);
        }

        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.by_short.get(&c).map(|&index| &self.flags[index]),
            _ => None,
        }
    }

    /// Looks up a flag by long name only.
    pub fn get(&self, name: &str) -> Option<&Flag> {
        self.by_name.get(name).map(|&index| &self.flags[index])
    }

    /// Converts `raw` for `flag`. See [`Flag::convert`].
    pub fn convert(&self, flag: &Flag, raw: &str) -> Result<FlagValue, Diagnostic> {
        flag.convert(raw)
    }

    /// Flags in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// The persistent subset, handed down to child commands.
    pub fn persistent(&self) -> FlagRegistry {
        let mut inherited = FlagRegistry::new();
        for flag in self.flags.iter().filter(|f| f.persistent) {
            inherited.insert(flag.clone());
        }
        inherited
    }

    /// Builds the registry applicable at one command level.
    ///
    /// Local flags come first. An inherited flag is dropped when its long
    /// name or short name is already taken by a local flag.
    pub fn scoped(local: Option<&FlagRegistry>, inherited: &FlagRegistry) -> FlagRegistry {
        let mut scope = local.cloned().unwrap_or_default();
        for flag in inherited.iter() {
            let shadowed = scope.by_name.contains_key(&flag.name)
                || flag
                    .short_name
                    .is_some_and(|c| scope.by_short.contains_key(&c));
            if !shadowed {
                scope.insert(flag.clone());
            }
        }
        scope
    }
}
