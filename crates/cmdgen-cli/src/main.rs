//! cmdgen CLI
//!
//! Compiles server command descriptors into the sorted `COMMAND(...)` table
//! a cluster client uses to find the key of each command.
//!
//! ```text
//! cmdgen path/to/server > cmddef.h
//! cmdgen cmddef.h extra/*.json -o cmddef.h
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, Parser, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cmdgen_ingest_json::{compile_paths, CompileOptions, DEFAULT_COMMANDS_DIR};
use cmdgen_schema::{emit_table, CommandTable, ResolvedCommand};

#[derive(Parser)]
#[command(name = "cmdgen")]
#[command(
    author,
    version,
    about = "Compile server command descriptors into a sorted command table"
)]
struct Cli {
    /// Server source trees, `*.json` descriptor files or previously generated tables.
    ///
    /// Sources are read in order; later ones override earlier ones.
    #[arg(required = true, value_name = "SOURCE")]
    sources: Vec<PathBuf>,

    /// Write the table to this file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Subdirectory of a source tree that holds the descriptor files
    #[arg(long, default_value = DEFAULT_COMMANDS_DIR)]
    commands_dir: PathBuf,

    /// Require each descriptor file to be named after the command it defines
    #[arg(long)]
    check_file_names: bool,

    /// Log more (-v: info, -vv: debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `COMMAND(...)` declarations
    Table,
    /// JSON array of resolved commands
    Json,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Help and usage errors both exit non-zero.
            return match err.kind() {
                ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(2),
            };
        }
    };

    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn render(table: &CommandTable, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(emit_table(table)),
        OutputFormat::Json => {
            let commands: Vec<&ResolvedCommand> = table.commands().collect();
            let mut text = serde_json::to_string_pretty(&commands)?;
            text.push('\n');
            Ok(text)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = CompileOptions {
        commands_dir: cli.commands_dir.clone(),
        check_file_names: cli.check_file_names,
    };
    let table = compile_paths(&cli.sources, &options)?;
    tracing::debug!(commands = table.len(), "compiled command table");

    let text = render(&table, cli.format)?;
    match &cli.out {
        Some(out) => {
            fs::write(out, &text).with_context(|| format!("failed to write {}", out.display()))?;
            eprintln!(
                "{} {} ({} commands)",
                "wrote".green().bold(),
                out.display().to_string().bold(),
                table.len()
            );
        }
        None => {
            io::stdout()
                .lock()
                .write_all(text.as_bytes())
                .context("failed to write to stdout")?;
        }
    }
    Ok(())
}
