//! Command-line argument model.

use clap::{Args, Parser, Subcommand};
use epr_core::{RatingField, RatingFields, RatingId};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "epr", version, about = "Employee performance ratings and PDF export")]
pub struct Cli {
    /// JSON config file (defaults to ./epr.json when present).
    #[arg(long, global = true, env = "EPR_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file; overrides the config value.
    #[arg(long, global = true, env = "EPR_DATABASE")]
    pub database: Option<PathBuf>,

    /// Template asset directory; overrides the config value.
    #[arg(long, global = true, env = "EPR_TEMPLATE_DIR")]
    pub template_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, global = true, env = "EPR_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database schema.
    Init {
        /// Also write the effective configuration to this file.
        #[arg(long)]
        write_config: Option<PathBuf>,
    },
    /// Create a rating; omitted fields are stored empty.
    Create(FieldArgs),
    /// Print one rating.
    Get { id: RatingId },
    /// Print all ratings, newest first.
    List,
    /// Update a rating; omitted or empty fields keep their stored value.
    Update {
        id: RatingId,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a rating permanently.
    Delete { id: RatingId },
    /// Export a rating as a filled PDF.
    Export {
        id: RatingId,
        /// Template key; unknown keys use the default template.
        #[arg(long, short)]
        template: Option<String>,
        /// Output file (defaults to the suggested file name).
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// List known template keys and whether their assets exist.
    Templates,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FieldArgs {
    /// Read fields from a JSON object file (`-` for stdin); flags win.
    #[arg(long)]
    pub from_json: Option<PathBuf>,
    #[arg(long)]
    pub employee_name: Option<String>,
    #[arg(long)]
    pub employee_id: Option<String>,
    #[arg(long)]
    pub position: Option<String>,
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub reviewer: Option<String>,
    #[arg(long)]
    pub review_period_start: Option<String>,
    #[arg(long)]
    pub review_period_end: Option<String>,
    #[arg(long)]
    pub overall_rating: Option<String>,
    #[arg(long)]
    pub strengths: Option<String>,
    #[arg(long)]
    pub improvements: Option<String>,
    #[arg(long)]
    pub goals: Option<String>,
}

impl FieldArgs {
    /// Layers the flag values over `base`.
    pub fn apply_to(self, base: RatingFields) -> RatingFields {
        [
            (RatingField::EmployeeName, self.employee_name),
            (RatingField::EmployeeId, self.employee_id),
            (RatingField::Position, self.position),
            (RatingField::Department, self.department),
            (RatingField::Reviewer, self.reviewer),
            (RatingField::ReviewPeriodStart, self.review_period_start),
            (RatingField::ReviewPeriodEnd, self.review_period_end),
            (RatingField::OverallRating, self.overall_rating),
            (RatingField::Strengths, self.strengths),
            (RatingField::Improvements, self.improvements),
            (RatingField::Goals, self.goals),
        ]
        .into_iter()
        .fold(base, |fields, (field, value)| match value {
            Some(value) => fields.with(field, value),
            None => fields,
        })
    }
}
