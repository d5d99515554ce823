//! Date-range meal report: dense per-date, per-user view of sparse meal
//! rows with weekday defaults filled in. No I/O happens here.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};

use crate::models::{
    meal::{MealChoice, MealPeriod, Report, ReportEntry, FALLBACK_OPTION, NO_CHOICE},
    user::User,
    user_default::UserDefault,
};

/// `(lunch, dinner)` option pair.
pub type OptionPair = (i32, i32);

/// user_id -> weekday (0 = Sunday) -> default pair.
pub type DefaultsIndex = HashMap<i32, HashMap<u32, OptionPair>>;

/// Inclusive range `[start, start + days - 1]`. Callers validate `days >= 1`.
/// Stops early at `NaiveDate::MAX`.
pub fn date_range(start: NaiveDate, days: u32) -> impl Iterator<Item = NaiveDate> {
    (0..days).map_while(move |i| start.checked_add_days(Days::new(u64::from(i))))
}

/// Last date of the range, clamped to `NaiveDate::MAX`.
pub fn end_date(start: NaiveDate, days: u32) -> NaiveDate {
    start
        .checked_add_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MAX)
}

/// 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Rows with a weekday outside 0..=6 can never match a date and are dropped.
pub fn index_defaults(defaults: &[UserDefault]) -> DefaultsIndex {
    let mut index = DefaultsIndex::new();
    for d in defaults {
        let Ok(weekday) = u32::try_from(d.day_of_week) else {
            continue;
        };
        if weekday > 6 {
            continue;
        }
        index
            .entry(d.user_id)
            .or_default()
            .insert(weekday, (d.lunch, d.dinner));
    }
    index
}

/// `(date, user_id)` -> actual `(lunch, dinner)`. A pair with only one period
/// stored keeps `NO_CHOICE` for the other.
fn index_meals(meals: &[MealChoice]) -> HashMap<(NaiveDate, i32), OptionPair> {
    let mut index: HashMap<(NaiveDate, i32), OptionPair> = HashMap::new();
    for meal in meals {
        let Some(period) = meal.period() else {
            continue;
        };
        let slot = index
            .entry((meal.date, meal.user_id))
            .or_insert((NO_CHOICE, NO_CHOICE));
        match period {
            MealPeriod::Lunch => slot.0 = meal.option,
            MealPeriod::Dinner => slot.1 = meal.option,
        }
    }
    index
}

/// Build the report for `days` consecutive dates from `start`.
///
/// Every date in the range is a key, every user appears once per date, and
/// each date's entries are sorted by ascending `user_id`.
pub fn build_report(
    start: NaiveDate,
    days: u32,
    users: &[User],
    defaults: &DefaultsIndex,
    meals: &[MealChoice],
) -> Report {
    let actual = index_meals(meals);
    let mut report = Report::new();

    for date in date_range(start, days) {
        let weekday = weekday_index(date);
        let mut entries: Vec<ReportEntry> = users
            .iter()
            .map(|user| {
                let (default_lunch, default_dinner) = defaults
                    .get(&user.id)
                    .and_then(|by_day| by_day.get(&weekday))
                    .copied()
                    .unwrap_or((FALLBACK_OPTION, FALLBACK_OPTION));
                let (lunch, dinner) = actual
                    .get(&(date, user.id))
                    .copied()
                    .unwrap_or((NO_CHOICE, NO_CHOICE));
                ReportEntry {
                    user_id: user.id,
                    user_name: user.name.clone(),
                    lunch,
                    dinner,
                    default_lunch,
                    default_dinner,
                }
            })
            .collect();
        entries.sort_by_key(|e| e.user_id);
        report.insert(format_date(date), entries);
    }

    report
}
