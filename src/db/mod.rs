pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::{
    meal::{MealChoice, MealUpdate},
    user::User,
    user_default::{UpdateUserDefault, UserDefault},
};

pub use memory::InMemoryMealStore;
pub use postgres::PgMealStore;

pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Read/write access to users, weekday defaults and meal choices.
///
/// Both upserts are all-or-nothing: when any statement fails, none of the
/// rows from that call are visible afterwards.
#[async_trait]
pub trait MealStore: Send + Sync {
    /// Round-trip to the backing store.
    async fn ping(&self) -> anyhow::Result<()>;

    async fn list_users(&self) -> anyhow::Result<Vec<User>>;

    async fn list_user_defaults(&self) -> anyhow::Result<Vec<UserDefault>>;

    /// Defaults of one user ordered by `day_of_week`.
    async fn user_defaults_for(&self, user_id: i32) -> anyhow::Result<Vec<UserDefault>>;

    /// Meal rows with `start <= date <= end`, ordered by `(date, user_id)`.
    async fn list_meals_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<MealChoice>>;

    /// Writes a lunch and a dinner row per update, keyed on
    /// `(user_id, date, meal_period)`. Returns the number of rows written.
    async fn upsert_meals(&self, updates: &[MealUpdate]) -> anyhow::Result<u64>;

    /// Writes one row per element keyed on `(user_id, day_of_week)`.
    async fn upsert_user_defaults(
        &self,
        user_id: i32,
        defaults: &[UpdateUserDefault],
    ) -> anyhow::Result<u64>;
}
