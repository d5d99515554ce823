pub mod meals;
pub mod metrics;
pub mod report;
pub mod user_defaults;
