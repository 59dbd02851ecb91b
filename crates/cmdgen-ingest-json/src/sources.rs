//! Turning command-line paths into an ordered list of sources.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use cmdgen_schema::ResolvedCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// JSON descriptor file.
    Descriptors,
    /// Previously emitted `COMMAND(...)` table.
    CommandTable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub path: PathBuf,
    pub kind: SourceKind,
}

impl Source {
    /// Classifies a file by extension: `.json` is a descriptor file,
    /// anything else a command table.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = if path.extension().is_some_and(|ext| ext == "json") {
            SourceKind::Descriptors
        } else {
            SourceKind::CommandTable
        };
        Source { path, kind }
    }

    pub fn name(&self) -> String {
        self.path.display().to_string()
    }
}

/// All `*.json` files under `dir`, sorted by path.
pub fn collect_descriptor_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "json")
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Expands `paths` in order. A directory stands for the descriptor files in
/// its `commands_dir` subdirectory.
pub fn expand_sources(paths: &[PathBuf], commands_dir: &Path) -> Result<Vec<Source>> {
    let mut sources = Vec::new();
    for path in paths {
        if path.is_dir() {
            let dir = path.join(commands_dir);
            if !dir.is_dir() {
                bail!(
                    "{} has no {} directory; expected a server source tree",
                    path.display(),
                    commands_dir.display()
                );
            }
            let files = collect_descriptor_files(&dir)?;
            tracing::info!(dir = %dir.display(), files = files.len(), "expanded source directory");
            sources.extend(files.into_iter().map(|path| Source {
                path,
                kind: SourceKind::Descriptors,
            }));
        } else {
            sources.push(Source::from_file(path.clone()));
        }
    }
    Ok(sources)
}

/// The file name a descriptor for `command` is expected to live in:
/// `name.json` or `container-subcommand.json`, lower case.
pub fn expected_file_name(command: &ResolvedCommand) -> String {
    let stem = match &command.subcommand {
        Some(sub) => format!("{}-{}", command.display_name, sub),
        None => command.display_name.clone(),
    };
    format!("{}.json", stem.to_lowercase())
}

/// Fails unless `path` is named after `command`.
pub fn check_file_name(path: &Path, command: &ResolvedCommand) -> Result<()> {
    let expected = expected_file_name(command);
    let actual = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if actual != expected {
        bail!(
            "{}: defines {} but should then be named {}",
            path.display(),
            command.canonical_key(),
            expected
        );
    }
    Ok(())
}
