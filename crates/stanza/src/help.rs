//! Help data extraction and plain-text rendering.
//!
//! [`HelpData`] is a serializable snapshot of everything a help screen
//! needs: names, aliases, the argument constraint, the applicable flags and
//! the subcommands. [`render_help`] turns it into aligned plain text.
//! Applications wanting a different layout can serialize `HelpData` and
//! render it themselves.

use serde::Serialize;

use crate::command::Command;
use crate::commands::Commands;
use crate::flag::{Flag, FlagRegistry, FlagType, FlagValue};

/// Fixed width for the name column (commands and flags).
pub(crate) const NAME_COLUMN_WIDTH: usize = 14;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HelpData {
    pub name: String,
    pub version: Option<String>,
    pub description: String,
    pub usage: String,
    pub aliases: Vec<String>,
    pub arguments: Option<String>,
    pub flags: Vec<FlagHelp>,
    pub subcommands: Vec<SubcommandHelp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagHelp {
    pub long: String,
    pub short: Option<char>,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub default: Option<FlagValue>,
    pub persistent: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubcommandHelp {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
}

impl HelpData {
    /// Help for the application root.
    pub fn for_app(
        name: &str,
        version: Option<&str>,
        description: &str,
        flags: &FlagRegistry,
        commands: &Commands,
    ) -> Self {
        let mut usage = name.to_string();
        if !flags.is_empty() {
            usage.push_str(" [flags]");
        }
        usage.push_str(" <command>");

        Self {
            name: name.to_string(),
            version: version.map(String::from),
            description: description.to_string(),
            usage,
            aliases: Vec::new(),
            arguments: None,
            flags: flags.iter().map(FlagHelp::from).collect(),
            subcommands: commands.iter().map(SubcommandHelp::from).collect(),
        }
    }

    /// Help for a command reached through `path` (app name first).
    ///
    /// `scope` is the registry applicable at the command's level, inherited
    /// flags included.
    pub fn for_command(command: &Command, path: &[&str], scope: &FlagRegistry) -> Self {
        let mut usage = path.join(" ");
        if !scope.is_empty() {
            usage.push_str(" [flags]");
        }
        match command.subcommands() {
            Some(_) => usage.push_str(" <command>"),
            None => {
                let takes_arguments = command
                    .argument_spec()
                    .map_or(true, |spec| spec.bounds() != (0, Some(0)));
                if takes_arguments {
                    usage.push_str(" [args...]");
                }
            }
        }

        Self {
            name: command.name().to_string(),
            version: None,
            description: command.description().to_string(),
            usage,
            aliases: command.aliases().to_vec(),
            arguments: command.argument_spec().map(ToString::to_string),
            flags: scope.iter().map(FlagHelp::from).collect(),
            subcommands: command
                .subcommands()
                .map(|c| c.iter().map(SubcommandHelp::from).collect())
                .unwrap_or_default(),
        }
    }
}

impl From<&Flag> for FlagHelp {
    fn from(flag: &Flag) -> Self {
        Self {
            long: flag.name().to_string(),
            short: flag.short_name(),
            flag_type: flag.flag_type(),
            default: flag.default().cloned(),
            persistent: flag.is_persistent(),
            description: flag.about().to_string(),
        }
    }
}

impl From<&Command> for SubcommandHelp {
    fn from(command: &Command) -> Self {
        Self {
            name: command.name().to_string(),
            aliases: command.aliases().to_vec(),
            description: command.description().to_string(),
        }
    }
}

/// Renders help as plain text.
pub fn render_help(data: &HelpData) -> String {
    let mut out = String::new();

    match &data.version {
        Some(version) => out.push_str(&format!("{} {}\n", data.name, version)),
        None => out.push_str(&format!("{}\n", data.name)),
    }
    if !data.description.is_empty() {
        out.push_str(&format!("{}\n", data.description));
    }
    out.push_str(&format!("\nUsage: {}\n", data.usage));

    if !data.aliases.is_empty() {
        out.push_str(&format!("\nAliases: {}\n", data.aliases.join(", ")));
    }
    if let Some(arguments) = &data.arguments {
        out.push_str(&format!("\nArguments: {}\n", arguments));
    }

    if !data.subcommands.is_empty() {
        out.push_str("\nCommands:\n");
        for sub in &data.subcommands {
            let mut line = sub.description.clone();
            if !sub.aliases.is_empty() {
                line.push_str(&format!(" (aliases: {})", sub.aliases.join(", ")));
            }
            push_row(&mut out, &sub.name, line.trim_start());
        }
    }

    if !data.flags.is_empty() {
        out.push_str("\nFlags:\n");
        for flag in &data.flags {
            let name = match flag.short {
                Some(short) => format!("-{}, --{}", short, flag.long),
                None => format!("    --{}", flag.long),
            };
            let mut line = flag.description.clone();
            if flag.flag_type != FlagType::Boolean {
                line.push_str(&format!(" <{}>", flag.flag_type));
            }
            if let Some(default) = &flag.default {
                line.push_str(&format!(" [default: {}]", default));
            }
            push_row(&mut out, &name, line.trim_start());
        }
    }

    out
}

fn push_row(out: &mut String, name: &str, text: &str) {
    let pad = NAME_COLUMN_WIDTH.saturating_sub(name.len()).max(2);
    out.push_str(&format!("  {}{}{}\n", name, " ".repeat(pad), text).trim_end());
    out.push('\n');
}
