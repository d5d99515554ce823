use chrono::{Days, NaiveDate};
use tracing::info;

use crate::{
    db::MealStore,
    error::ApiError,
    models::meal::{MealReportQuery, MealUpdate, Report},
    services::{
        metrics::{MEAL_REPORTS_COUNTER, MEAL_UPSERTS_COUNTER},
        report,
    },
};

/// Validated parameters of a report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    pub start: NaiveDate,
    pub days: u32,
}

impl ReportRange {
    /// `date` must be `YYYY-MM-DD`; `days` a positive integer no larger than `max_days`.
    pub fn parse(query: &MealReportQuery, max_days: u32) -> Result<Self, ApiError> {
        let start = query
            .date
            .as_deref()
            .and_then(parse_iso_date)
            .ok_or_else(|| ApiError::bad_request("Invalid date format. Use YYYY-MM-DD."))?;

        let days = query
            .days
            .as_deref()
            .and_then(|d| d.parse::<u32>().ok())
            .filter(|&d| d >= 1)
            .ok_or_else(|| {
                ApiError::bad_request("Invalid days parameter. Must be a positive integer.")
            })?;

        if days > max_days {
            return Err(ApiError::bad_request(format!(
                "Invalid days parameter. Must not exceed {max_days}."
            )));
        }

        if start.checked_add_days(Days::new(u64::from(days - 1))).is_none() {
            return Err(ApiError::bad_request(
                "Invalid days parameter. Range ends past the last supported date.",
            ));
        }

        Ok(Self { start, days })
    }

    pub fn end(&self) -> NaiveDate {
        report::end_date(self.start, self.days)
    }
}

/// Strict `YYYY-MM-DD`: four-digit year, zero-padded month and day, no sign or padding.
fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let b = s.as_bytes();
    let shaped = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b
            .iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

pub struct MealService;

impl MealService {
    /// Read users, defaults and the range's meal rows, then fold them into a report.
    pub async fn report(store: &dyn MealStore, range: ReportRange) -> anyhow::Result<Report> {
        let result = Self::load_report(store, range).await;
        let status = if result.is_ok() { "ok" } else { "error" };
        MEAL_REPORTS_COUNTER.with_label_values(&[status]).inc();
        result
    }

    async fn load_report(store: &dyn MealStore, range: ReportRange) -> anyhow::Result<Report> {
        let users = store.list_users().await?;
        let defaults = report::index_defaults(&store.list_user_defaults().await?);
        let meals = store.list_meals_between(range.start, range.end()).await?;
        Ok(report::build_report(
            range.start,
            range.days,
            &users,
            &defaults,
            &meals,
        ))
    }

    /// Apply all updates in one transaction.
    pub async fn bulk_update(store: &dyn MealStore, updates: &[MealUpdate]) -> anyhow::Result<()> {
        let written = store.upsert_meals(updates).await?;
        MEAL_UPSERTS_COUNTER.inc_by(written);
        info!("Bulk meal update committed: {} updates, {} rows", updates.len(), written);
        Ok(())
    }
}
