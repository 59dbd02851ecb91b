//! Command table compiler core.
//!
//! Turns server command descriptors (one JSON record per command or
//! subcommand) into a sorted table of resolved metadata: the command's arity
//! and where its first key argument can be found.
//!
//! Pipeline stages, one module each:
//! - [`descriptor`]: decode a generic JSON value tree into [`CommandDescriptor`]s
//! - [`resolve`]: descriptor → [`FirstKey`] (the tiered key-position resolver)
//! - [`table`]: fold resolved commands into a [`CommandTable`] (subcommand merge
//!   and container shadowing)
//! - [`emit`]: deterministic `COMMAND(...)` declarations
//! - [`canonical`]: read previously emitted declarations back in

pub mod canonical;
pub mod descriptor;
pub mod emit;
pub mod error;
pub mod model;
pub mod resolve;
pub mod table;

pub use canonical::{parse_command_table, parse_declaration};
pub use descriptor::{descriptors_from_str, descriptors_from_value};
pub use emit::{emit_table, format_declaration, sanitize_identifier};
pub use error::SchemaError;
pub use model::{
    ArgKind, ArgMeta, ArgumentNode, BeginSearch, CommandDescriptor, FindKeys, FirstKey,
    FirstKeyMethod, KeySpec, ResolvedCommand,
};
pub use resolve::resolve_first_key;
pub use table::{resolve_command, CommandTable, InsertOutcome};
