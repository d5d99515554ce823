use tracing::info;

use crate::{
    db::MealStore,
    error::ApiError,
    models::user_default::{UpdateUserDefault, UserDefault},
    services::metrics::USER_DEFAULT_UPSERTS_COUNTER,
};

pub struct UserDefaultService;

impl UserDefaultService {
    pub async fn list(store: &dyn MealStore, user_id: i32) -> anyhow::Result<Vec<UserDefault>> {
        store.user_defaults_for(user_id).await
    }

    /// Upsert every row for `user_id` atomically. Weekdays outside 0..=6 are
    /// rejected before anything is written.
    pub async fn update(
        store: &dyn MealStore,
        user_id: i32,
        rows: &[UpdateUserDefault],
    ) -> Result<(), ApiError> {
        if let Some(bad) = rows.iter().find(|r| !(0..=6).contains(&r.day_of_week)) {
            return Err(ApiError::bad_request(format!(
                "day_of_week must be between 0 (Sunday) and 6 (Saturday), got {}",
                bad.day_of_week
            )));
        }

        let written = store.upsert_user_defaults(user_id, rows).await?;
        USER_DEFAULT_UPSERTS_COUNTER.inc_by(written);
        info!("User defaults updated for user {}: {} rows", user_id, written);
        Ok(())
    }
}
