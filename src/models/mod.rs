pub mod meal;
pub mod user;
pub mod user_default;
