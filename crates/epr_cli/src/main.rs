//! `epr` command-line entry point.
//!
//! # Responsibility
//! - Expose create/read/update/delete/export over the rating store.
//! - Render records as JSON and failures as boundary error payloads.

mod args;

use anyhow::{Context, Result};
use args::{Cli, Command, FieldArgs};
use clap::Parser;
use epr_core::db::migrations::schema_version;
use epr_core::db::open_db;
use epr_core::{
    init_logging, init_stderr_logging, AppConfig, ErrorBody, PdfExporter, RatingFields,
    RatingService, SqliteRatingRepository,
};
use log::error;
use std::fmt::{Display, Formatter};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_CONFIG_FILE: &str = "epr.json";
const STDERR_DEFAULT_LEVEL: &str = "warn";

/// A classified store/export failure; printed as the JSON error payload.
#[derive(Debug)]
struct BoundaryFailure(ErrorBody);

impl Display for BoundaryFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.error.message)
    }
}

impl std::error::Error for BoundaryFailure {}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<BoundaryFailure>() {
            Some(BoundaryFailure(body)) => {
                let payload = serde_json::to_string(body)
                    .unwrap_or_else(|_| format!("{{\"error\":\"{}\"}}", body.error.message));
                eprintln!("{payload}");
                ExitCode::from(2)
            }
            None => {
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = effective_config(&cli)?;
    start_logging(&config)?;

    if matches!(cli.command, Command::Templates) {
        return print_templates(&config);
    }

    let conn = open_db(&config.database_path).with_context(|| {
        format!("failed to open database `{}`", config.database_path.display())
    })?;
    let service = RatingService::new(
        SqliteRatingRepository::try_new(&conn).map_err(|err| boundary(ErrorBody::from(&err)))?,
    );

    match cli.command {
        Command::Init { write_config } => {
            if let Some(path) = write_config {
                config.save(&path)?;
            }
            let version = schema_version(&conn)?;
            print_json(&serde_json::json!({
                "database": config.database_path,
                "schema_version": version,
            }))
        }
        Command::Create(fields) => {
            let fields = collect_fields(fields)?;
            let created = service
                .create_rating(&fields)
                .map_err(|err| boundary(ErrorBody::from(&err)))?;
            print_json(&created)
        }
        Command::Get { id } => {
            let record = service
                .get_rating(id)
                .map_err(|err| boundary(ErrorBody::from(&err)))?
                .ok_or_else(|| boundary(ErrorBody::from(&epr_core::RepoError::NotFound(id))))?;
            print_json(&record)
        }
        Command::List => {
            let records = service
                .list_ratings()
                .map_err(|err| boundary(ErrorBody::from(&err)))?;
            print_json(&records)
        }
        Command::Update { id, fields } => {
            let fields = collect_fields(fields)?;
            let updated = service
                .update_rating(id, &fields)
                .map_err(|err| boundary(ErrorBody::from(&err)))?;
            print_json(&updated)
        }
        Command::Delete { id } => {
            service
                .delete_rating(id)
                .map_err(|err| boundary(ErrorBody::from(&err)))?;
            Ok(())
        }
        Command::Export { id, template, out } => {
            let registry = config.template_registry();
            let exporter = PdfExporter::new(&registry);
            let exported = service
                .export_pdf(&exporter, id, template.as_deref())
                .map_err(|err| {
                    error!("event=cli_export module=cli status=error id={id} error={err}");
                    boundary(ErrorBody::from(&err))
                })?;

            let path = out.unwrap_or_else(|| PathBuf::from(&exported.file_name));
            std::fs::write(&path, &exported.bytes)
                .with_context(|| format!("failed to write `{}`", path.display()))?;
            print_json(&serde_json::json!({
                "file": path,
                "file_name": exported.file_name,
                "template": exported.template_key,
                "content_type": epr_core::ExportedPdf::CONTENT_TYPE,
                "bytes": exported.bytes.len(),
            }))
        }
        Command::Templates => print_templates(&config),
    }
}

fn print_templates(config: &AppConfig) -> Result<()> {
    let registry = config.template_registry();
    let templates: Vec<_> = registry
        .descriptors()
        .map(|descriptor| {
            serde_json::json!({
                "key": descriptor.key,
                "file_name": descriptor.file_name,
                "available": registry.asset_path(descriptor).is_file(),
            })
        })
        .collect();
    print_json(&templates)
}

fn boundary(body: ErrorBody) -> anyhow::Error {
    anyhow::Error::new(BoundaryFailure(body))
}

fn effective_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => AppConfig::load(DEFAULT_CONFIG_FILE)?,
        None => AppConfig::default(),
    };

    if let Some(path) = &cli.database {
        config.database_path = path.clone();
    }
    if let Some(dir) = &cli.template_dir {
        config.template_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = Some(level.clone());
    }
    Ok(config)
}

/// File logging when a log directory is configured, otherwise stderr.
fn start_logging(config: &AppConfig) -> Result<()> {
    let level = effective_log_level(config);
    let result = match &config.log_dir {
        Some(dir) => init_logging(level, &dir.to_string_lossy()),
        None => init_stderr_logging(level),
    };
    result.map_err(anyhow::Error::msg)
}

/// Level used for the logger.
///
/// An explicit level from the flag, env or config file always wins. Without
/// one, file logs use the build-mode default and stderr uses `warn`.
fn effective_log_level(config: &AppConfig) -> &str {
    match (&config.log_level, &config.log_dir) {
        (Some(level), _) => level.as_str(),
        (None, Some(_)) => config.log_level(),
        (None, None) => STDERR_DEFAULT_LEVEL,
    }
}

fn collect_fields(args: FieldArgs) -> Result<RatingFields> {
    let base = match &args.from_json {
        Some(path) if path.as_os_str() == "-" => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read fields from stdin")?;
            serde_json::from_str(&input).context("invalid fields JSON on stdin")?
        }
        Some(path) => {
            let input = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            serde_json::from_str(&input)
                .with_context(|| format!("invalid fields JSON in `{}`", path.display()))?
        }
        None => RatingFields::default(),
    };
    Ok(args.apply_to(base))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
