//! Rating repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the canonical `ratings` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Ids come from `AUTOINCREMENT` and are never reused after deletion.
//! - `created_at == updated_at` right after create; update never moves
//!   `updated_at` backwards.
//! - Update runs its existence check, write and read-back inside one
//!   IMMEDIATE transaction, so a concurrent delete cannot interleave.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::rating::{RatingField, RatingFields, RatingId, RatingRecord};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RATING_SELECT_SQL: &str = "SELECT
    id,
    employee_name,
    employee_id,
    position,
    department,
    reviewer,
    review_period_start,
    review_period_end,
    overall_rating,
    strengths,
    improvements,
    goals,
    created_at,
    updated_at
FROM ratings";

/// Current time in epoch milliseconds, evaluated by SQLite.
const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000.0 AS INTEGER)";

const REQUIRED_COLUMNS: [&str; 14] = [
    "id",
    "employee_name",
    "employee_id",
    "position",
    "department",
    "reviewer",
    "review_period_start",
    "review_period_end",
    "overall_rating",
    "strengths",
    "improvements",
    "goals",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for rating persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(RatingId),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "rating not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for rating CRUD operations.
pub trait RatingRepository {
    /// Inserts a record; absent fields are stored as empty text.
    fn create_rating(&self, fields: &RatingFields) -> RepoResult<RatingRecord>;
    /// Exact id lookup. Absence is `Ok(None)`.
    fn get_rating(&self, id: RatingId) -> RepoResult<Option<RatingRecord>>;
    /// All records, newest `created_at` first.
    fn list_ratings(&self) -> RepoResult<Vec<RatingRecord>>;
    /// Merge-if-non-empty update; `NotFound` when `id` does not exist.
    fn update_rating(&self, id: RatingId, fields: &RatingFields) -> RepoResult<RatingRecord>;
    /// Hard delete; `NotFound` when `id` does not exist.
    fn delete_rating(&self, id: RatingId) -> RepoResult<()>;
}

/// SQLite-backed rating repository.
pub struct SqliteRatingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRatingRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_rating_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RatingRepository for SqliteRatingRepository<'_> {
    fn create_rating(&self, fields: &RatingFields) -> RepoResult<RatingRecord> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            &format!(
                "INSERT INTO ratings (
                    employee_name,
                    employee_id,
                    position,
                    department,
                    reviewer,
                    review_period_start,
                    review_period_end,
                    overall_rating,
                    strengths,
                    improvements,
                    goals,
                    created_at,
                    updated_at
                )
                SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, clock.now_ms, clock.now_ms
                FROM (SELECT {NOW_MS_SQL} AS now_ms) AS clock;"
            ),
            params![
                fields.value_or_empty(RatingField::EmployeeName),
                fields.value_or_empty(RatingField::EmployeeId),
                fields.value_or_empty(RatingField::Position),
                fields.value_or_empty(RatingField::Department),
                fields.value_or_empty(RatingField::Reviewer),
                fields.value_or_empty(RatingField::ReviewPeriodStart),
                fields.value_or_empty(RatingField::ReviewPeriodEnd),
                fields.value_or_empty(RatingField::OverallRating),
                fields.value_or_empty(RatingField::Strengths),
                fields.value_or_empty(RatingField::Improvements),
                fields.value_or_empty(RatingField::Goals),
            ],
        )?;

        let id = tx.last_insert_rowid();
        let created = select_rating(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;
        Ok(created)
    }

    fn get_rating(&self, id: RatingId) -> RepoResult<Option<RatingRecord>> {
        select_rating(self.conn, id)
    }

    fn list_ratings(&self) -> RepoResult<Vec<RatingRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RATING_SELECT_SQL}
             ORDER BY created_at DESC, id DESC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut ratings = Vec::new();
        while let Some(row) = rows.next()? {
            ratings.push(parse_rating_row(row)?);
        }

        Ok(ratings)
    }

    fn update_rating(&self, id: RatingId, fields: &RatingFields) -> RepoResult<RatingRecord> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing = select_rating(&tx, id)?.ok_or(RepoError::NotFound(id))?;

        let merged = |field: RatingField| fields.merged_value(field, existing.field(field));
        tx.execute(
            &format!(
                "UPDATE ratings
                 SET
                    employee_name = ?2,
                    employee_id = ?3,
                    position = ?4,
                    department = ?5,
                    reviewer = ?6,
                    review_period_start = ?7,
                    review_period_end = ?8,
                    overall_rating = ?9,
                    strengths = ?10,
                    improvements = ?11,
                    goals = ?12,
                    updated_at = MAX({NOW_MS_SQL}, updated_at)
                 WHERE id = ?1;"
            ),
            params![
                id,
                merged(RatingField::EmployeeName),
                merged(RatingField::EmployeeId),
                merged(RatingField::Position),
                merged(RatingField::Department),
                merged(RatingField::Reviewer),
                merged(RatingField::ReviewPeriodStart),
                merged(RatingField::ReviewPeriodEnd),
                merged(RatingField::OverallRating),
                merged(RatingField::Strengths),
                merged(RatingField::Improvements),
                merged(RatingField::Goals),
            ],
        )?;

        let updated = select_rating(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_rating(&self, id: RatingId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM ratings WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn select_rating(conn: &Connection, id: RatingId) -> RepoResult<Option<RatingRecord>> {
    let mut stmt = conn.prepare(&format!(
        "{RATING_SELECT_SQL}
         WHERE id = ?1;"
    ))?;

    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_rating_row(row)?));
    }

    Ok(None)
}

fn parse_rating_row(row: &Row<'_>) -> RepoResult<RatingRecord> {
    Ok(RatingRecord {
        id: row.get("id")?,
        employee_name: row.get("employee_name")?,
        employee_id: row.get("employee_id")?,
        position: row.get("position")?,
        department: row.get("department")?,
        reviewer: row.get("reviewer")?,
        review_period_start: row.get("review_period_start")?,
        review_period_end: row.get("review_period_end")?,
        overall_rating: row.get("overall_rating")?,
        strengths: row.get("strengths")?,
        improvements: row.get("improvements")?,
        goals: row.get("goals")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn ensure_rating_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_present: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'ratings';",
            [],
            |row| row.get(0),
        )
        .optional()?;
    if table_present.is_none() {
        return Err(RepoError::MissingRequiredTable("ratings"));
    }

    let present = table_columns(conn, "ratings")?;
    for column in REQUIRED_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "ratings",
                column,
            });
        }
    }

    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get(1)?);
    }
    Ok(columns)
}
