//! Descriptor ingestion for cmdgen
//!
//! Reads command descriptor JSON files and previously emitted command tables,
//! strictly in the order given, and folds them into one [`CommandTable`]:
//! - `*.json` files: one descriptor per entry, resolved and inserted
//! - any other file: `COMMAND(...)` lines inserted as-is
//! - directories: every `*.json` under the commands subdirectory, sorted
//!
//! Later sources override earlier ones per canonical key.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use cmdgen_schema::{
    descriptors_from_str, parse_command_table, resolve_command, CommandDescriptor, CommandTable,
    ResolvedCommand,
};

pub mod sources;

pub use sources::{
    check_file_name, collect_descriptor_files, expand_sources, expected_file_name, Source,
    SourceKind,
};

/// Where descriptor files live inside a server source tree.
pub const DEFAULT_COMMANDS_DIR: &str = "src/commands";

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Relative subdirectory searched when a source path is a directory.
    pub commands_dir: PathBuf,
    /// Require each descriptor file to be named after its command.
    pub check_file_names: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            commands_dir: PathBuf::from(DEFAULT_COMMANDS_DIR),
            check_file_names: false,
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn load_descriptor_file(path: &Path) -> Result<Vec<CommandDescriptor>> {
    let text = read_source(path)?;
    Ok(descriptors_from_str(&path.display().to_string(), &text)?)
}

pub fn load_command_table(path: &Path) -> Result<Vec<ResolvedCommand>> {
    let text = read_source(path)?;
    Ok(parse_command_table(&path.display().to_string(), &text)?)
}

fn ingest_descriptors(
    source: &Source,
    options: &CompileOptions,
    table: &mut CommandTable,
) -> Result<usize> {
    let descriptors = load_descriptor_file(&source.path)?;
    for descriptor in &descriptors {
        let command = resolve_command(descriptor)
            .with_context(|| format!("failed to resolve {}", source.name()))?;
        if options.check_file_names {
            check_file_name(&source.path, &command)?;
        }
        table.insert(command);
    }
    Ok(descriptors.len())
}

/// Builds one table from `sources`, aborting on the first bad input.
pub fn compile_sources(sources: &[Source], options: &CompileOptions) -> Result<CommandTable> {
    let mut table = CommandTable::new();
    for source in sources {
        let count = match source.kind {
            SourceKind::Descriptors => ingest_descriptors(source, options, &mut table)?,
            SourceKind::CommandTable => {
                let commands = load_command_table(&source.path)?;
                let count = commands.len();
                table.extend(commands);
                count
            }
        };
        info!(source = %source.name(), commands = count, "ingested source");
    }
    Ok(table)
}

/// Expands `paths` (see [`expand_sources`]) and compiles them.
pub fn compile_paths(paths: &[PathBuf], options: &CompileOptions) -> Result<CommandTable> {
    let sources = expand_sources(paths, &options.commands_dir)?;
    compile_sources(&sources, options)
}
