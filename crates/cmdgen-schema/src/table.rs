//! The command table: resolved commands keyed by canonical key.
//!
//! Subcommands are folded in under their container's name. Once a container
//! has any subcommand in the table, the bare container entry is dropped and
//! can never come back, whatever order the sources arrive in.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::SchemaError;
use crate::model::{CommandDescriptor, ResolvedCommand};
use crate::resolve::resolve_first_key;

/// Arity recorded for descriptors that do not declare one: at least the name.
pub const DEFAULT_ARITY: i64 = -1;

/// Resolves a descriptor into a table row.
///
/// A descriptor with a container becomes `container` / `name`. A name with
/// an embedded space (`"FT.CONFIG GET"`) is split the same way; its resolved
/// position is then shifted by one because the subcommand token occupies a
/// slot of its own.
pub fn resolve_command(descriptor: &CommandDescriptor) -> Result<ResolvedCommand, SchemaError> {
    let first_key = resolve_first_key(descriptor)?;
    let arity = descriptor.arity.unwrap_or(DEFAULT_ARITY);

    if let Some(container) = descriptor.container() {
        return Ok(ResolvedCommand {
            display_name: container.to_string(),
            subcommand: Some(descriptor.name.clone()),
            arity,
            first_key,
        });
    }

    let full_name = descriptor.name.trim();
    match full_name.split_once(char::is_whitespace) {
        Some((name, subcommand)) if !subcommand.trim().is_empty() => Ok(ResolvedCommand {
            display_name: name.to_string(),
            subcommand: Some(subcommand.trim().to_string()),
            arity,
            first_key: first_key.shifted(1),
        }),
        _ => Ok(ResolvedCommand {
            display_name: full_name.to_string(),
            subcommand: None,
            arity,
            first_key,
        }),
    }
}

/// What happened to a row handed to [`CommandTable::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// An earlier row with the same canonical key was overwritten.
    Replaced,
    /// A bare row refused because its name is a container.
    Shadowed,
}

#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    entries: BTreeMap<String, ResolvedCommand>,
    containers: BTreeSet<String>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row, last write wins per canonical key.
    pub fn insert(&mut self, command: ResolvedCommand) -> InsertOutcome {
        if command.subcommand.is_some() {
            let container = &command.display_name;
            if self.containers.insert(container.clone()) {
                debug!(container = %container, "registered container");
            }
            let shadows_bare = self
                .entries
                .get(container)
                .is_some_and(|existing| existing.subcommand.is_none());
            if shadows_bare {
                self.entries.remove(container);
                debug!(container = %container, "dropped bare entry shadowed by subcommand");
            }
        } else if self.containers.contains(&command.display_name) {
            debug!(
                command = %command.display_name,
                "ignored bare entry for a container with subcommands"
            );
            return InsertOutcome::Shadowed;
        }

        let key = command.canonical_key();
        match self.entries.insert(key, command) {
            Some(previous) => {
                debug!(key = %previous.canonical_key(), "replaced earlier entry");
                InsertOutcome::Replaced
            }
            None => InsertOutcome::Inserted,
        }
    }

    pub fn get(&self, canonical_key: &str) -> Option<&ResolvedCommand> {
        self.entries.get(canonical_key)
    }

    pub fn contains_key(&self, canonical_key: &str) -> bool {
        self.entries.contains_key(canonical_key)
    }

    /// True if some subcommand of `name` has been inserted.
    pub fn is_container(&self, name: &str) -> bool {
        self.containers.contains(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Rows in ascending canonical-key order.
    pub fn commands(&self) -> btree_map::Values<'_, String, ResolvedCommand> {
        self.entries.values()
    }
}

/// Two tables are equal when they hold the same rows under the same keys.
impl PartialEq for CommandTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for CommandTable {}

impl Extend<ResolvedCommand> for CommandTable {
    fn extend<I: IntoIterator<Item = ResolvedCommand>>(&mut self, iter: I) {
        for command in iter {
            self.insert(command);
        }
    }
}

impl FromIterator<ResolvedCommand> for CommandTable {
    fn from_iter<I: IntoIterator<Item = ResolvedCommand>>(iter: I) -> Self {
        let mut table = CommandTable::new();
        table.extend(iter);
        table
    }
}

impl<'a> IntoIterator for &'a CommandTable {
    type Item = &'a ResolvedCommand;
    type IntoIter = btree_map::Values<'a, String, ResolvedCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands()
    }
}
