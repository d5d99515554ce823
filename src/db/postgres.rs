use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use super::MealStore;
use crate::models::{
    meal::{MealChoice, MealUpdate},
    user::User,
    user_default::{UpdateUserDefault, UserDefault},
};

const UPSERT_MEAL: &str = r#"
    INSERT INTO meals (user_id, date, meal_period, meal_option)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (user_id, date, meal_period) DO UPDATE SET
        meal_option = EXCLUDED.meal_option"#;

const UPSERT_USER_DEFAULT: &str = r#"
    INSERT INTO user_defaults (user_id, day_of_week, lunch, dinner)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (user_id, day_of_week) DO UPDATE SET
        lunch  = EXCLUDED.lunch,
        dinner = EXCLUDED.dinner"#;

/// `MealStore` over the `users`, `user_defaults` and `meals` tables.
#[derive(Clone)]
pub struct PgMealStore {
    pool: PgPool,
}

impl PgMealStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MealStore for PgMealStore {
    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, name FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_user_defaults(&self) -> anyhow::Result<Vec<UserDefault>> {
        let defaults = sqlx::query_as::<_, UserDefault>(
            "SELECT user_id, day_of_week, lunch, dinner FROM user_defaults",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(defaults)
    }

    async fn user_defaults_for(&self, user_id: i32) -> anyhow::Result<Vec<UserDefault>> {
        let defaults = sqlx::query_as::<_, UserDefault>(
            r#"SELECT user_id, day_of_week, lunch, dinner
               FROM user_defaults
               WHERE user_id = $1
               ORDER BY day_of_week"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(defaults)
    }

    async fn list_meals_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<MealChoice>> {
        let meals = sqlx::query_as::<_, MealChoice>(
            r#"SELECT user_id, date, meal_period, meal_option
               FROM meals
               WHERE date BETWEEN $1 AND $2
               ORDER BY date, user_id"#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(meals)
    }

    async fn upsert_meals(&self, updates: &[MealUpdate]) -> anyhow::Result<u64> {
        // Dropping `tx` on an early return rolls the whole batch back.
        let mut tx = self.pool.begin().await?;
        let mut written = 0u64;
        for update in updates {
            for choice in update.choices() {
                sqlx::query(UPSERT_MEAL)
                    .bind(choice.user_id)
                    .bind(choice.date)
                    .bind(choice.period_code)
                    .bind(choice.option)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| {
                        format!(
                            "upsert meal user_id={} date={} period={}",
                            choice.user_id, choice.date, choice.period_code
                        )
                    })?;
                written += 1;
            }
        }
        tx.commit().await?;
        Ok(written)
    }

    async fn upsert_user_defaults(
        &self,
        user_id: i32,
        defaults: &[UpdateUserDefault],
    ) -> anyhow::Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0u64;
        for row in defaults {
            sqlx::query(UPSERT_USER_DEFAULT)
                .bind(user_id)
                .bind(row.day_of_week)
                .bind(row.lunch)
                .bind(row.dinner)
                .execute(&mut *tx)
                .await
                .with_context(|| {
                    format!(
                        "upsert user default user_id={} day_of_week={}",
                        user_id, row.day_of_week
                    )
                })?;
            written += 1;
        }
        tx.commit().await?;
        Ok(written)
    }
}
