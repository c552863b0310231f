//! Command-line adapter over the note service.
//!
//! # Responsibility
//! - Map subcommands onto `NoteService` calls against one database file.
//! - Print JSON results to stdout and failures to stderr.
//!
//! # Exit codes
//! - `0` success, `1` storage/config failure, `2` validation, `3` not found.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use zenboard_core::{
    init_logging, ErrorKind, ListParams, NoteId, NoteInput, NoteService, NoteServiceError,
    NoteValidationError, SqliteNoteRepository, ZenboardConfig,
};

#[derive(Debug, Parser)]
#[command(name = "zenboard", version, about = "Sticky note store")]
struct Cli {
    /// Database file; overrides ZENBOARD_DB_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print core linkage information
    Ping,

    /// List notes in creation order
    List(ListArgs),

    /// Create a note from a JSON payload
    Create(PayloadArgs),

    /// Show one note
    Get { id: i64 },

    /// Replace every field of a note
    Update {
        id: i64,
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete a note permanently
    Delete { id: i64 },
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long)]
    skip: Option<u32>,

    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Debug, Args)]
struct PayloadArgs {
    /// Note payload, e.g. '{"content":"hi","x":1,"y":2,"color":"#ff0000"}'
    #[arg(long)]
    json: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ZenboardConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(1);
        }
    };

    if let Some(log_dir) = config.log_dir.as_ref() {
        if let Err(err) = init_logging(config.log_level, log_dir) {
            eprintln!("warning: file logging disabled: {err}");
        }
    }

    if let Commands::Ping = cli.command {
        println!("zenboard_core ping={}", zenboard_core::ping());
        println!("zenboard_core version={}", zenboard_core::core_version());
        return ExitCode::SUCCESS;
    }

    let db_path = cli.db.unwrap_or(config.db_path);
    let repo = match SqliteNoteRepository::open(&db_path) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("error: cannot open `{}`: {err}", db_path.display());
            return ExitCode::from(1);
        }
    };
    let service = NoteService::new(repo);

    match run(&service, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Service(err)) => {
            eprintln!("error: {err}");
            ExitCode::from(exit_code(err.kind()))
        }
        Err(CliError::Output(err)) => {
            eprintln!("error: cannot encode output: {err}");
            ExitCode::from(1)
        }
    }
}

#[derive(Debug)]
enum CliError {
    Service(NoteServiceError),
    Output(serde_json::Error),
}

impl From<NoteServiceError> for CliError {
    fn from(value: NoteServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<NoteValidationError> for CliError {
    fn from(value: NoteValidationError) -> Self {
        Self::Service(value.into())
    }
}

fn run(service: &NoteService<SqliteNoteRepository>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Ping => Ok(()),
        Commands::List(args) => print_json(&service.list_notes(ListParams {
            skip: args.skip,
            limit: args.limit,
        })?),
        Commands::Create(args) => {
            let input = NoteInput::from_json_str(&args.json)?;
            print_json(&service.create_note(&input)?)
        }
        Commands::Get { id } => print_json(&service.get_note(NoteId::new(id))?),
        Commands::Update { id, payload } => {
            let input = NoteInput::from_json_str(&payload.json)?;
            print_json(&service.update_note(NoteId::new(id), &input)?)
        }
        Commands::Delete { id } => print_json(&service.delete_note(NoteId::new(id))?),
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(CliError::Output)?;
    println!("{text}");
    Ok(())
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::StorageUnavailable => 1,
        ErrorKind::Validation => 2,
        ErrorKind::NotFound => 3,
    }
}
