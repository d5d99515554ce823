use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-user, per-weekday fallback pair. `day_of_week` is 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserDefault {
    pub user_id: i32,
    pub day_of_week: i32,
    pub lunch: i32,
    pub dinner: i32,
}

/// Element of the body for PUT /api/user-defaults/:user_id.
/// The user comes from the path; a `user_id` in the body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserDefault {
    pub day_of_week: i32,
    pub lunch: i32,
    pub dinner: i32,
}

impl UpdateUserDefault {
    pub fn for_user(&self, user_id: i32) -> UserDefault {
        UserDefault {
            user_id,
            day_of_week: self.day_of_week,
            lunch: self.lunch,
            dinner: self.dinner,
        }
    }
}
