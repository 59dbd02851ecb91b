use cmdgen_schema::{
    emit_table, parse_command_table, CommandTable, FirstKey, FirstKeyMethod, ResolvedCommand,
};
use proptest::prelude::*;

fn name() -> impl Strategy<Value = String> {
    // Server command names: upper case, digits, dots and hyphens.
    proptest::string::string_regex("[A-Z][A-Z0-9.-]{0,8}").unwrap()
}

fn first_key() -> impl Strategy<Value = FirstKey> {
    prop_oneof![
        Just(FirstKey::NONE),
        Just(FirstKey::UNKNOWN),
        (1u32..8).prop_map(FirstKey::index),
        (1u32..8).prop_map(FirstKey::keynum),
    ]
}

fn arity() -> impl Strategy<Value = i64> {
    prop_oneof![(1i64..10), (-10i64..=-1)]
}

fn command() -> impl Strategy<Value = ResolvedCommand> {
    (name(), proptest::option::of(name()), arity(), first_key()).prop_map(
        |(display_name, subcommand, arity, first_key)| ResolvedCommand {
            display_name,
            subcommand,
            arity,
            first_key,
        },
    )
}

fn table() -> impl Strategy<Value = CommandTable> {
    proptest::collection::vec(command(), 0..24).prop_map(|commands| commands.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn emitted_table_reads_back_identical(t in table()) {
        let text = emit_table(&t);
        let reread: CommandTable = parse_command_table("roundtrip", &text)
            .expect("emitted text must parse")
            .into_iter()
            .collect();
        prop_assert_eq!(&reread, &t);
        prop_assert_eq!(emit_table(&reread), text);
    }

    #[test]
    fn emission_is_sorted_by_canonical_key(commands in proptest::collection::vec(command(), 0..24)) {
        let t: CommandTable = commands.iter().rev().cloned().collect();
        let emitted: Vec<String> = parse_command_table("sorted", &emit_table(&t))
            .expect("parse")
            .iter()
            .map(ResolvedCommand::canonical_key)
            .collect();
        let mut sorted = emitted.clone();
        sorted.sort_unstable();
        prop_assert_eq!(emitted, sorted);
    }

    #[test]
    fn containers_never_appear_bare(commands in proptest::collection::vec(command(), 0..24)) {
        let t: CommandTable = commands.into_iter().collect();
        for command in t.commands() {
            if command.subcommand.is_none() {
                prop_assert!(!t.is_container(&command.display_name));
            }
        }
    }

    #[test]
    fn shadowing_ignores_insertion_order(
        container in name(),
        sub in name(),
        before in any::<bool>(),
    ) {
        let bare = ResolvedCommand {
            display_name: container.clone(),
            subcommand: None,
            arity: -2,
            first_key: FirstKey::NONE,
        };
        let with_sub = ResolvedCommand {
            subcommand: Some(sub.clone()),
            ..bare.clone()
        };
        let ordered = if before {
            vec![bare, with_sub]
        } else {
            vec![with_sub, bare]
        };
        let t: CommandTable = ordered.into_iter().collect();
        prop_assert_eq!(t.keys().collect::<Vec<_>>(), vec![format!("{container}_{sub}")]);
    }
}

#[test]
fn positions_survive_round_trip_only_for_positional_methods() {
    let t: CommandTable = [ResolvedCommand {
        display_name: "XREAD".to_string(),
        subcommand: None,
        arity: -4,
        first_key: FirstKey::UNKNOWN,
    }]
    .into_iter()
    .collect();
    let reread = parse_command_table("x", &emit_table(&t)).expect("parse");
    assert_eq!(reread[0].first_key.method, FirstKeyMethod::Unknown);
    assert_eq!(reread[0].first_key.position, 0);
}
