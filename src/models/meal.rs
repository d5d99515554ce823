use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Option code reported for a period that has no stored choice.
pub const NO_CHOICE: i32 = 0;

/// Option code used as the weekday default when a user has none configured.
pub const FALLBACK_OPTION: i32 = 1;

/// The two independently tracked slots of a day.
/// Stored as INTEGER `meal_period` (1 = lunch, 2 = dinner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MealPeriod {
    Lunch,
    Dinner,
}

impl MealPeriod {
    pub fn code(self) -> i32 {
        match self {
            MealPeriod::Lunch => 1,
            MealPeriod::Dinner => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(MealPeriod::Lunch),
            2 => Some(MealPeriod::Dinner),
            _ => None,
        }
    }
}

/// One row of the `meals` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct MealChoice {
    pub user_id: i32,
    pub date: NaiveDate,
    #[sqlx(rename = "meal_period")]
    pub period_code: i32,
    #[sqlx(rename = "meal_option")]
    pub option: i32,
}

impl MealChoice {
    pub fn new(user_id: i32, date: NaiveDate, period: MealPeriod, option: i32) -> Self {
        Self {
            user_id,
            date,
            period_code: period.code(),
            option,
        }
    }

    /// `None` for a period code outside {1, 2}; such rows are ignored by the report.
    pub fn period(&self) -> Option<MealPeriod> {
        MealPeriod::from_code(self.period_code)
    }
}

/// Element of the body for PUT /api/meals/bulk-update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealUpdate {
    pub user_id: i32,
    /// Sent by the frontend alongside the id; not persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub date: NaiveDate,
    pub lunch: i32,
    pub dinner: i32,
}

impl MealUpdate {
    /// The two rows this update writes, lunch first.
    pub fn choices(&self) -> [MealChoice; 2] {
        [
            MealChoice::new(self.user_id, self.date, MealPeriod::Lunch, self.lunch),
            MealChoice::new(self.user_id, self.date, MealPeriod::Dinner, self.dinner),
        ]
    }
}

/// One user's line in a day of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub user_id: i32,
    pub user_name: String,
    pub lunch: i32,
    pub dinner: i32,
    #[serde(rename = "defaultLunch")]
    pub default_lunch: i32,
    #[serde(rename = "defaultDinner")]
    pub default_dinner: i32,
}

/// ISO date (`YYYY-MM-DD`) to entries sorted by `user_id`.
pub type Report = BTreeMap<String, Vec<ReportEntry>>;

/// Query params for GET /api/meals. Kept as raw strings so that
/// parse failures produce our own 400 messages.
#[derive(Debug, Default, Deserialize)]
pub struct MealReportQuery {
    pub date: Option<String>,
    pub days: Option<String>,
}
