use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::MealStore;
use crate::models::{
    meal::{MealChoice, MealUpdate},
    user::User,
    user_default::{UpdateUserDefault, UserDefault},
};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<i32, String>,
    /// (user_id, day_of_week) -> (lunch, dinner)
    defaults: BTreeMap<(i32, i32), (i32, i32)>,
    /// (date, user_id, meal_period) -> meal_option
    meals: BTreeMap<(NaiveDate, i32, i32), i32>,
}

/// Process-local `MealStore`. Writes are staged on a copy of the tables and
/// swapped in only when every statement of the call succeeded.
#[derive(Debug, Default)]
pub struct InMemoryMealStore {
    tables: Mutex<Tables>,
    /// 1-based statement index at which every write call fails.
    fail_statement: Option<usize>,
    unreachable: bool,
}

impl InMemoryMealStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = (i32, S)>,
        S: Into<String>,
    {
        let store = Self::new();
        {
            let mut tables = store.lock();
            for (id, name) in users {
                tables.users.insert(id, name.into());
            }
        }
        store
    }

    /// Make the `n`th statement (1-based) of every write call fail.
    pub fn failing_at_statement(mut self, n: usize) -> Self {
        self.fail_statement = Some(n);
        self
    }

    /// Make `ping` and every query fail.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn insert_user(&self, id: i32, name: impl Into<String>) {
        self.lock().users.insert(id, name.into());
    }

    pub fn insert_default(&self, default: UserDefault) {
        self.lock().defaults.insert(
            (default.user_id, default.day_of_week),
            (default.lunch, default.dinner),
        );
    }

    pub fn insert_meal(&self, meal: MealChoice) {
        self.lock()
            .meals
            .insert((meal.date, meal.user_id, meal.period_code), meal.option);
    }

    /// All meal rows, ordered by `(date, user_id, meal_period)`.
    pub fn meal_rows(&self) -> Vec<MealChoice> {
        self.lock()
            .meals
            .iter()
            .map(|(&(date, user_id, period_code), &option)| MealChoice {
                user_id,
                date,
                period_code,
                option,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // Writes replace the whole table set, so a poisoned guard still holds consistent data.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_reachable(&self) -> anyhow::Result<()> {
        if self.unreachable {
            anyhow::bail!("store unreachable");
        }
        Ok(())
    }

    fn check_statement(&self, index: usize) -> anyhow::Result<()> {
        if self.fail_statement == Some(index) {
            anyhow::bail!("statement {index} failed");
        }
        Ok(())
    }

    /// Run `apply` on a staged copy; publish it only on success.
    fn transaction<F>(&self, apply: F) -> anyhow::Result<u64>
    where
        F: FnOnce(&mut Tables) -> anyhow::Result<u64>,
    {
        self.check_reachable()?;
        let mut tables = self.lock();
        let mut staged = tables.clone();
        let written = apply(&mut staged)?;
        *tables = staged;
        Ok(written)
    }
}

#[async_trait]
impl MealStore for InMemoryMealStore {
    async fn ping(&self) -> anyhow::Result<()> {
        self.check_reachable()
    }

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        self.check_reachable()?;
        Ok(self
            .lock()
            .users
            .iter()
            .map(|(&id, name)| User::new(id, name.clone()))
            .collect())
    }

    async fn list_user_defaults(&self) -> anyhow::Result<Vec<UserDefault>> {
        self.check_reachable()?;
        Ok(self
            .lock()
            .defaults
            .iter()
            .map(|(&(user_id, day_of_week), &(lunch, dinner))| UserDefault {
                user_id,
                day_of_week,
                lunch,
                dinner,
            })
            .collect())
    }

    async fn user_defaults_for(&self, user_id: i32) -> anyhow::Result<Vec<UserDefault>> {
        Ok(self
            .list_user_defaults()
            .await?
            .into_iter()
            .filter(|d| d.user_id == user_id)
            .collect())
    }

    async fn list_meals_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<MealChoice>> {
        self.check_reachable()?;
        Ok(self
            .meal_rows()
            .into_iter()
            .filter(|m| start <= m.date && m.date <= end)
            .collect())
    }

    async fn upsert_meals(&self, updates: &[MealUpdate]) -> anyhow::Result<u64> {
        self.transaction(|tables| {
            let mut written = 0u64;
            for update in updates {
                for choice in update.choices() {
                    self.check_statement(written as usize + 1)?;
                    tables.meals.insert(
                        (choice.date, choice.user_id, choice.period_code),
                        choice.option,
                    );
                    written += 1;
                }
            }
            Ok(written)
        })
    }

    async fn upsert_user_defaults(
        &self,
        user_id: i32,
        defaults: &[UpdateUserDefault],
    ) -> anyhow::Result<u64> {
        self.transaction(|tables| {
            let mut written = 0u64;
            for row in defaults {
                self.check_statement(written as usize + 1)?;
                tables
                    .defaults
                    .insert((user_id, row.day_of_week), (row.lunch, row.dinner));
                written += 1;
            }
            Ok(written)
        })
    }
}
