//! Command-line transport for the contact service.
//!
//! # Responsibility
//! - Parse one request from argv, run it against the SQLite store and print
//!   a JSON response.
//! - Map service outcomes to HTTP-equivalent status codes and exit codes.
//!
//! # Invariants
//! - Filter expressions reach the compiler exactly as given; no shell-level
//!   decoding happens here.
//! - Exit code 0 for 2xx, 1 for client errors, 2 for faults.

use clap::{Parser, Subcommand};
use contacts_core::config::DEFAULT_DB_FILE_NAME;
use contacts_core::db::open_db;
use contacts_core::{
    default_log_level, init_logging, Contact, ContactId, ContactPatch, ContactRepository,
    ContactService, DatabaseConfig, LogSettings, LoggingError, PatchOperation, ServiceError,
    SqliteContactRepository,
};
use log::error;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "contacts", version, about = "Manage contact records")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "CONTACTS_DB", default_value = DEFAULT_DB_FILE_NAME)]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "CONTACTS_LOG_DIR")]
    log_dir: Option<String>,

    #[arg(long, env = "CONTACTS_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List contacts in store order.
    List {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List contacts matching a filter expression, e.g. `company == "Acme"`.
    Query {
        expression: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    Get {
        id: ContactId,
    },
    /// Create a contact from a JSON object.
    Create {
        json: String,
    },
    /// Replace all fields of a contact with a JSON object.
    Update {
        id: ContactId,
        json: String,
    },
    /// Merge a JSON object, or apply a JSON-patch operation array.
    Patch {
        id: ContactId,
        json: String,
    },
    Delete {
        id: ContactId,
    },
}

/// Transport-level response: status code plus optional JSON body.
#[derive(Debug, Clone, PartialEq)]
struct Response {
    status: u16,
    body: Option<Value>,
}

impl Response {
    fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    fn created(body: Value) -> Self {
        Self {
            status: 201,
            body: Some(body),
        }
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    fn failure(err: &ServiceError) -> Self {
        Self {
            status: status_code(err),
            body: Some(json!({
                "error": err.code(),
                "message": err.to_string(),
                "retryable": err.is_retryable(),
            })),
        }
    }

    fn exit_code(&self) -> ExitCode {
        match self.status {
            200..=299 => ExitCode::SUCCESS,
            400..=499 => ExitCode::from(1),
            _ => ExitCode::from(2),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let started = log_settings(cli.log_level.as_deref(), log_dir)
            .and_then(|settings| init_logging(&settings));
        if let Err(err) = started {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    }

    let conn = match open_db(&DatabaseConfig::file(&cli.db)) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=cli_start module=cli status=error error={err}");
            let response = Response::failure(&ServiceError::Fault(
                "contact store unavailable".to_string(),
            ));
            return emit(&response);
        }
    };
    let repo = match SqliteContactRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => {
            error!("event=cli_start module=cli status=error error={err}");
            let response = Response::failure(&ServiceError::Fault(
                "contact store unavailable".to_string(),
            ));
            return emit(&response);
        }
    };

    let service = ContactService::new(repo);
    emit(&dispatch(&service, cli.command))
}

/// Builds logging settings from raw flag values; the level defaults per build.
fn log_settings(level: Option<&str>, log_dir: &str) -> Result<LogSettings, LoggingError> {
    let level = level.unwrap_or_else(|| default_log_level().as_str());
    LogSettings::parse(level, log_dir)
}

fn emit(response: &Response) -> ExitCode {
    if let Some(body) = &response.body {
        let rendered = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
        if response.status < 300 {
            println!("{rendered}");
        } else {
            eprintln!("{rendered}");
        }
    }
    response.exit_code()
}

fn dispatch<R: ContactRepository>(service: &ContactService<R>, command: Command) -> Response {
    let outcome = match command {
        Command::List { limit } => service.list(limit).map(|items| Response::ok(json!(items))),
        Command::Query { expression, limit } => service
            .query(&expression, limit)
            .map(|items| Response::ok(json!(items))),
        Command::Get { id } => service.get(id).map(|item| Response::ok(json!(item))),
        Command::Create { json } => parse_contact(&json)
            .and_then(|contact| service.create(&contact))
            .map(|item| Response::created(json!(item))),
        Command::Update { id, json } => parse_contact(&json)
            .and_then(|contact| service.update(id, &contact))
            .map(|item| Response::ok(json!(item))),
        Command::Patch { id, json } => apply_patch(service, id, &json),
        Command::Delete { id } => service.delete(id).map(|()| Response::no_content()),
    };
    outcome.unwrap_or_else(|err| Response::failure(&err))
}

fn apply_patch<R: ContactRepository>(
    service: &ContactService<R>,
    id: ContactId,
    raw: &str,
) -> Result<Response, ServiceError> {
    let value: Value = serde_json::from_str(raw).map_err(invalid_json)?;
    let updated = if value.is_array() {
        let operations: Vec<PatchOperation> =
            serde_json::from_value(value).map_err(invalid_json)?;
        service.patch_operations(id, &operations)?
    } else {
        let patch: ContactPatch = serde_json::from_value(value).map_err(invalid_json)?;
        service.patch(id, &patch)?
    };
    Ok(Response::ok(json!(updated)))
}

fn parse_contact(raw: &str) -> Result<Contact, ServiceError> {
    serde_json::from_str(raw).map_err(invalid_json)
}

fn invalid_json(err: serde_json::Error) -> ServiceError {
    ServiceError::InvalidArgument(format!("malformed JSON body: {err}"))
}

fn status_code(err: &ServiceError) -> u16 {
    match err {
        ServiceError::InvalidArgument(_)
        | ServiceError::Validation(_)
        | ServiceError::Compile(_) => 400,
        ServiceError::NotFound(_) => 404,
        ServiceError::Conflict(_) => 409,
        ServiceError::Fault(_) => 500,
    }
}
