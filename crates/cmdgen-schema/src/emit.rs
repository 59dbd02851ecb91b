//! Canonical emission of a command table.

use std::fmt::Write;

use crate::model::ResolvedCommand;
use crate::table::CommandTable;

pub const GENERATED_MARKER: &str = "/* This file was generated using cmdgen */";
pub const FORMAT_OFF_MARKER: &str = "/* clang-format off */";

/// Turns a canonical key into a C identifier: hyphens and every other
/// character outside `[A-Za-z0-9_]` become `_`.
pub fn sanitize_identifier(key: &str) -> String {
    key.replace('-', "_")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

pub fn format_declaration(command: &ResolvedCommand) -> String {
    let ident = sanitize_identifier(&command.canonical_key());
    let subcommand = match &command.subcommand {
        Some(sub) => format!("\"{sub}\""),
        None => "NULL".to_string(),
    };
    format!(
        "COMMAND({ident}, \"{}\", {subcommand}, {}, {}, {})",
        command.display_name, command.arity, command.first_key.method, command.first_key.position
    )
}

/// Renders the whole table, sorted by canonical key.
pub fn emit_table(table: &CommandTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{GENERATED_MARKER}");
    let _ = writeln!(out);
    let _ = writeln!(out, "{FORMAT_OFF_MARKER}");
    for command in table {
        let _ = writeln!(out, "{}", format_declaration(command));
    }
    out
}
