use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_int_counter, CounterVec, IntCounter};

lazy_static! {
    pub static ref MEAL_REPORTS_COUNTER: CounterVec = register_counter_vec!(
        "meal_reports_total",
        "Meal report requests by outcome",
        &["status"]
    ).unwrap();

    pub static ref MEAL_UPSERTS_COUNTER: IntCounter = register_int_counter!(
        "meal_upserts_total",
        "Meal rows written by committed bulk updates"
    ).unwrap();

    pub static ref USER_DEFAULT_UPSERTS_COUNTER: IntCounter = register_int_counter!(
        "user_default_upserts_total",
        "Weekday default rows written by committed updates"
    ).unwrap();

    pub static ref API_ERRORS_COUNTER: CounterVec = register_counter_vec!(
        "api_errors_total",
        "Error responses by kind",
        &["kind"]
    ).unwrap();
}
