//! Property-based tests for the command tree, argument specifications and
//! the parser.

use std::collections::BTreeSet;

use proptest::prelude::*;
use stanza::{
    ArgumentSpecification, Command, CommandLineParser, Commands, ErrorKind, Flag, FlagRegistry,
    ParsedFlags, Tokens,
};

// ============================================================================
// Test helpers
// ============================================================================

fn noop(name: &str, aliases: &[String]) -> Command {
    let mut command = Command::executable(name, "", |_f: &ParsedFlags, _a: &[String]| {
        Ok::<_, anyhow::Error>(())
    });
    for alias in aliases {
        command.add_alias(alias.clone()).unwrap();
    }
    command
}

// Distinct keys split into commands of one name and up to two aliases.
fn tree_strategy() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::btree_set("[a-z]{1,8}", 1..24).prop_map(|keys: BTreeSet<String>| {
        let keys: Vec<String> = keys.into_iter().collect();
        keys.chunks(3)
            .map(|chunk| (chunk[0].clone(), chunk[1..].to_vec()))
            .collect()
    })
}

fn build(spec: &[(String, Vec<String>)]) -> Commands {
    let mut commands = Commands::new();
    for (name, aliases) in spec {
        commands.add(noop(name, aliases), false).unwrap();
    }
    commands
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Every key of a command resolves to that command.
    #[test]
    fn resolve_by_name_or_alias_is_same_command(spec in tree_strategy()) {
        let commands = build(&spec);
        for (name, aliases) in &spec {
            prop_assert_eq!(commands.resolve(name).map(Command::name), Some(name.as_str()));
            for alias in aliases {
                prop_assert_eq!(commands.resolve(alias).map(Command::name), Some(name.as_str()));
            }
        }
    }

    /// Keys that were never registered do not resolve.
    #[test]
    fn unregistered_name_resolves_to_none(spec in tree_strategy(), probe in "[A-Z]{1,8}") {
        let commands = build(&spec);
        prop_assert!(commands.resolve(&probe).is_none());
    }

    /// A colliding add fails and leaves the tree unchanged.
    #[test]
    fn colliding_add_is_atomic(
        spec in tree_strategy(),
        pick in any::<prop::sample::Index>(),
        fresh in "[A-Z]{1,8}",
        as_alias in any::<bool>(),
    ) {
        let mut commands = build(&spec);
        let before: Vec<String> = commands.names().map(String::from).collect();
        let existing = pick.get(&before).clone();

        let result = if as_alias {
            commands.add(noop(&fresh, &[existing]), false)
        } else {
            commands.add(noop(&existing, &[fresh.clone()]), false)
        };

        let kind = result.unwrap_err().kind();
        prop_assert!(matches!(
            kind,
            ErrorKind::CommandNameAlreadyExists | ErrorKind::CommandAliasAlreadyExists
        ));
        let after: Vec<String> = commands.names().map(String::from).collect();
        prop_assert_eq!(before, after);
        prop_assert!(commands.resolve(&fresh).is_none());
    }

    /// Exact(n) accepts n and rejects its neighbours.
    #[test]
    fn exact_accepts_only_n(n in 0usize..1000) {
        let spec = ArgumentSpecification::exact(n);
        prop_assert!(spec.validate(n).is_ok());
        prop_assert_eq!(
            spec.validate(n + 1).unwrap_err().kind(),
            ErrorKind::ArgumentsNotEqualToExact
        );
        if n > 0 {
            prop_assert_eq!(
                spec.validate(n - 1).unwrap_err().kind(),
                ErrorKind::ArgumentsNotEqualToExact
            );
        }
    }

    /// The upper bound is excluded from an end-exclusive range.
    #[test]
    fn end_exclusive_rejects_max(min in 0usize..500, width in 1usize..500) {
        let max = min + width;
        let spec = ArgumentSpecification::end_exclusive(min, max).unwrap();
        prop_assert!(spec.validate(min).is_ok());
        prop_assert!(spec.validate(max - 1).is_ok());
        prop_assert_eq!(
            spec.validate(max).unwrap_err().kind(),
            ErrorKind::ArgumentsNotInEndExclusiveRange
        );
    }

    /// The upper bound is included in an end-inclusive range.
    #[test]
    fn end_inclusive_accepts_max(min in 0usize..500, width in 0usize..500) {
        let max = min + width;
        let spec = ArgumentSpecification::end_inclusive(min, max).unwrap();
        prop_assert!(spec.validate(min).is_ok());
        prop_assert!(spec.validate(max).is_ok());
        prop_assert_eq!(
            spec.validate(max + 1).unwrap_err().kind(),
            ErrorKind::ArgumentsNotInEndInclusiveRange
        );
    }

    /// Plain words pass through a leaf parse in order.
    #[test]
    fn positionals_keep_order(words in prop::collection::vec("[a-z0-9]{1,6}", 0..12)) {
        let mut registry = FlagRegistry::new();
        registry.add(Flag::boolean("verbose")).unwrap();

        let raw = words.clone();
        let mut stream = Tokens::new(&raw);
        let mut flags = ParsedFlags::new();
        let parser = CommandLineParser::new("add", &registry, false);
        let positionals = parser.parse(&mut stream, &mut flags).unwrap();

        prop_assert_eq!(positionals, words);
        prop_assert!(flags.is_empty());
    }

    /// An int64 flag takes any value token that is not itself flag-like.
    #[test]
    fn int_flag_value_is_parsed(value in any::<i64>()) {
        // `-1` through `-9` read as short flags.
        prop_assume!(!(-9..=-1).contains(&value));

        let mut registry = FlagRegistry::new();
        registry.add(Flag::int64("timeout").short('t')).unwrap();

        let raw = vec!["-t".to_string(), value.to_string()];
        let mut stream = Tokens::new(&raw);
        let mut flags = ParsedFlags::new();
        let parser = CommandLineParser::new("get", &registry, false);
        parser.parse(&mut stream, &mut flags).unwrap();

        prop_assert_eq!(flags.get_int("timeout"), Some(value));
    }
}
