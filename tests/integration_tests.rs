//! Integration tests for the complete cmdgen pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - descriptor JSON → resolver → table → emitted text
//! - emitted text → table parser → identical table
//! - mixed sources with override and container shadowing
//!
//! Run with: cargo test --test integration_tests

use std::fs;
use std::path::{Path, PathBuf};

use cmdgen_ingest_json::{compile_paths, CompileOptions};
use cmdgen_schema::{
    descriptors_from_str, emit_table, parse_command_table, resolve_command, CommandTable,
    FirstKey, FirstKeyMethod,
};
use tempfile::tempdir;

fn write(dir: &Path, rel: &str, text: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, text).unwrap();
    path
}

fn table_from_json(text: &str) -> CommandTable {
    descriptors_from_str("inline.json", text)
        .expect("should parse")
        .iter()
        .map(|d| resolve_command(d).expect("should resolve"))
        .collect()
}

fn declarations(text: &str) -> Vec<&str> {
    text.lines().filter(|l| l.starts_with("COMMAND(")).collect()
}

// ============================================================================
// Descriptor → emitted table
// ============================================================================

#[test]
fn test_key_spec_commands() {
    let table = table_from_json(
        r#"{
            "EXPIRE": {
                "arity": -3,
                "key_specs": [{"begin_search": {"index": {"pos": 1}}, "find_keys": {"range": {"lastkey": 0}}}]
            },
            "EVAL": {
                "arity": -3,
                "key_specs": [{
                    "begin_search": {"index": {"pos": 2}},
                    "find_keys": {"keynum": {"keynumidx": 0, "firstkey": 1, "step": 1}}
                }]
            }
        }"#,
    );

    assert_eq!(
        declarations(&emit_table(&table)),
        vec![
            "COMMAND(EVAL, \"EVAL\", NULL, -3, KEYNUM, 2)",
            "COMMAND(EXPIRE, \"EXPIRE\", NULL, -3, INDEX, 1)",
        ]
    );
}

#[test]
fn test_keyless_subcommand_and_module_command() {
    let table = table_from_json(
        r#"{
            "GET": {"container": "CONFIG", "arity": -3},
            "MOD.CACHE SET": {
                "arguments": [{"name": "key", "type": "key"}, {"name": "value", "type": "string"}]
            }
        }"#,
    );

    assert_eq!(
        declarations(&emit_table(&table)),
        vec![
            "COMMAND(CONFIG_GET, \"CONFIG\", \"GET\", -3, NONE, 0)",
            "COMMAND(MOD_CACHE_SET, \"MOD.CACHE\", \"SET\", -1, INDEX, 2)",
        ]
    );
}

#[test]
fn test_sorting_is_independent_of_input_order() {
    let table = table_from_json(
        r#"{
            "SET": {"arity": -3, "key_specs": [{"begin_search": {"index": {"pos": 1}}, "find_keys": {"range": {}}}]},
            "MSET": {"arity": -3, "key_specs": [{"begin_search": {"index": {"pos": 1}}, "find_keys": {"range": {}}}]},
            "GET": {"arity": 2, "key_specs": [{"begin_search": {"index": {"pos": 1}}, "find_keys": {"range": {}}}]}
        }"#,
    );

    let names: Vec<&str> = table.commands().map(|c| c.display_name.as_str()).collect();
    assert_eq!(names, vec!["GET", "MSET", "SET"]);
}

// ============================================================================
// Emitted table → table parser
// ============================================================================

#[test]
fn test_emitted_table_reads_back() {
    let table = table_from_json(
        r#"{
            "GET": {"container": "CONFIG", "arity": -3},
            "XLIKE": {"arguments": [{"name": "count", "type": "integer", "optional": true}, {"name": "key", "type": "key"}]},
            "SET-EX": {"arity": -4, "key_specs": [{"begin_search": {"index": {"pos": 1}}, "find_keys": {"range": {}}}]}
        }"#,
    );
    assert_eq!(table.get("XLIKE").unwrap().first_key, FirstKey::UNKNOWN);

    let text = emit_table(&table);
    assert!(text.contains("COMMAND(SET_EX, \"SET-EX\", NULL, -4, INDEX, 1)"));

    let commands = parse_command_table("cmddef.h", &text).expect("should parse");
    let reread: CommandTable = commands.into_iter().collect();
    assert_eq!(reread, table);
    assert_eq!(emit_table(&reread), text);
}

// ============================================================================
// Full Pipeline Test
// ============================================================================

#[test]
fn test_complete_pipeline() {
    let dir = tempdir().unwrap();
    let server = dir.path().join("server");
    write(&server, "src/commands/config.json", r#"{"CONFIG": {"arity": -2}}"#);
    write(
        &server,
        "src/commands/config-get.json",
        r#"{"GET": {"container": "CONFIG", "arity": -3}}"#,
    );
    write(
        &server,
        "src/commands/get.json",
        r#"{"GET": {"arity": 2, "key_specs": [{"begin_search": {"index": {"pos": 1}}, "find_keys": {"range": {}}}]}}"#,
    );
    let module = write(
        dir.path(),
        "module.json",
        r#"{"GET": {"arity": 3, "arguments": [{"name": "key", "type": "key"}]}}"#,
    );

    let options = CompileOptions::default();
    let table = compile_paths(&[server.clone(), module], &options).unwrap();

    // The container row never shows up bare, and the later GET wins.
    assert_eq!(table.keys().collect::<Vec<_>>(), vec!["CONFIG_GET", "GET"]);
    assert!(table.is_container("CONFIG"));
    let get = table.get("GET").unwrap();
    assert_eq!(get.arity, 3);
    assert_eq!(get.first_key.method, FirstKeyMethod::Index);

    // Feed the emitted table back in front of the server tree.
    let cmddef = write(dir.path(), "cmddef.h", &emit_table(&table));
    let rebuilt = compile_paths(&[cmddef, server], &options).unwrap();
    assert_eq!(rebuilt.get("GET").unwrap().arity, 2);
    assert_eq!(rebuilt.len(), 2);
}
