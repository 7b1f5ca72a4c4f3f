//! Rating record domain model.
//!
//! # Responsibility
//! - Define the canonical performance-review record persisted by the store.
//! - Define the partial input mapping used by create and update calls.
//! - Own the merge-if-non-empty law applied on update.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused after deletion.
//! - `created_at <= updated_at` for every persisted record.
//! - Text attributes are free-form; nothing here validates them.

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a rating record.
pub type RatingId = i64;

/// One employee performance review as persisted in `ratings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub id: RatingId,
    pub employee_name: String,
    pub employee_id: String,
    pub position: String,
    pub department: String,
    pub reviewer: String,
    /// Date-like text; not parsed.
    pub review_period_start: String,
    /// Date-like text; not parsed.
    pub review_period_end: String,
    pub overall_rating: String,
    pub strengths: String,
    pub improvements: String,
    pub goals: String,
    /// Unix epoch milliseconds. Set once at creation.
    pub created_at: i64,
    /// Unix epoch milliseconds. Refreshed on every successful update.
    pub updated_at: i64,
}

impl RatingRecord {
    /// Returns the text attributes in storage column order.
    pub fn text_fields(&self) -> [(RatingField, &str); RatingField::COUNT] {
        RatingField::ALL.map(|field| (field, self.field(field)))
    }

    /// Returns the stored value of one text attribute.
    pub fn field(&self, field: RatingField) -> &str {
        match field {
            RatingField::EmployeeName => &self.employee_name,
            RatingField::EmployeeId => &self.employee_id,
            RatingField::Position => &self.position,
            RatingField::Department => &self.department,
            RatingField::Reviewer => &self.reviewer,
            RatingField::ReviewPeriodStart => &self.review_period_start,
            RatingField::ReviewPeriodEnd => &self.review_period_end,
            RatingField::OverallRating => &self.overall_rating,
            RatingField::Strengths => &self.strengths,
            RatingField::Improvements => &self.improvements,
            RatingField::Goals => &self.goals,
        }
    }
}

/// Updatable text attribute of a rating record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RatingField {
    EmployeeName,
    EmployeeId,
    Position,
    Department,
    Reviewer,
    ReviewPeriodStart,
    ReviewPeriodEnd,
    OverallRating,
    Strengths,
    Improvements,
    Goals,
}

impl RatingField {
    pub const COUNT: usize = 11;

    /// All text attributes in storage column order.
    pub const ALL: [RatingField; Self::COUNT] = [
        Self::EmployeeName,
        Self::EmployeeId,
        Self::Position,
        Self::Department,
        Self::Reviewer,
        Self::ReviewPeriodStart,
        Self::ReviewPeriodEnd,
        Self::OverallRating,
        Self::Strengths,
        Self::Improvements,
        Self::Goals,
    ];

    /// Column name in `ratings`, also the serialized field name.
    pub fn column(self) -> &'static str {
        match self {
            Self::EmployeeName => "employee_name",
            Self::EmployeeId => "employee_id",
            Self::Position => "position",
            Self::Department => "department",
            Self::Reviewer => "reviewer",
            Self::ReviewPeriodStart => "review_period_start",
            Self::ReviewPeriodEnd => "review_period_end",
            Self::OverallRating => "overall_rating",
            Self::Strengths => "strengths",
            Self::Improvements => "improvements",
            Self::Goals => "goals",
        }
    }
}

/// Partial text input for create and update calls.
///
/// Every attribute is optional. Create stores absent attributes as empty
/// text. Update follows the merge-if-non-empty law, see [`RatingFields::merged_value`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_period_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_period_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
}

impl RatingFields {
    /// Returns the supplied value for one attribute, if any.
    pub fn get(&self, field: RatingField) -> Option<&str> {
        let value = match field {
            RatingField::EmployeeName => &self.employee_name,
            RatingField::EmployeeId => &self.employee_id,
            RatingField::Position => &self.position,
            RatingField::Department => &self.department,
            RatingField::Reviewer => &self.reviewer,
            RatingField::ReviewPeriodStart => &self.review_period_start,
            RatingField::ReviewPeriodEnd => &self.review_period_end,
            RatingField::OverallRating => &self.overall_rating,
            RatingField::Strengths => &self.strengths,
            RatingField::Improvements => &self.improvements,
            RatingField::Goals => &self.goals,
        };
        value.as_deref()
    }

    /// Sets one attribute, returning `self` for chained construction.
    pub fn with(mut self, field: RatingField, value: impl Into<String>) -> Self {
        let slot = match field {
            RatingField::EmployeeName => &mut self.employee_name,
            RatingField::EmployeeId => &mut self.employee_id,
            RatingField::Position => &mut self.position,
            RatingField::Department => &mut self.department,
            RatingField::Reviewer => &mut self.reviewer,
            RatingField::ReviewPeriodStart => &mut self.review_period_start,
            RatingField::ReviewPeriodEnd => &mut self.review_period_end,
            RatingField::OverallRating => &mut self.overall_rating,
            RatingField::Strengths => &mut self.strengths,
            RatingField::Improvements => &mut self.improvements,
            RatingField::Goals => &mut self.goals,
        };
        *slot = Some(value.into());
        self
    }

    /// Value stored by create: the supplied text, or empty text when absent.
    pub fn value_or_empty(&self, field: RatingField) -> &str {
        self.get(field).unwrap_or("")
    }

    /// Value stored by update under the merge-if-non-empty law.
    ///
    /// An absent or empty input keeps `existing`. Any other input, including
    /// whitespace-only text, replaces it verbatim. Empty text therefore cannot
    /// clear a stored attribute.
    pub fn merged_value<'a>(&'a self, field: RatingField, existing: &'a str) -> &'a str {
        match self.get(field) {
            Some(value) if !value.is_empty() => value,
            _ => existing,
        }
    }

    /// Returns whether no attribute carries a non-empty value.
    pub fn is_noop_update(&self) -> bool {
        RatingField::ALL
            .iter()
            .all(|field| self.get(*field).map_or(true, str::is_empty))
    }
}
