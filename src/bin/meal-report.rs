//! Print the meal report for a date range as JSON.
//!
//! Usage: meal-report --date 2025-02-16 [--days 7]
//!   Reads DATABASE_URL from the environment (or .env).

use clap::Parser;
use meal_planner_api::{
    db::{self, PgMealStore},
    models::meal::MealReportQuery,
    services::meals::{MealService, ReportRange},
};

#[derive(Parser)]
#[command(name = "meal-report", about = "Print the meal report for a date range")]
struct Args {
    /// First date of the range (YYYY-MM-DD)
    #[arg(long)]
    date: String,

    /// Number of days, including the first
    #[arg(long, default_value_t = 1)]
    days: u32,

    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Largest accepted range
    #[arg(long, env = "REPORT_MAX_DAYS", default_value_t = 366)]
    max_days: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let range = ReportRange::parse(
        &MealReportQuery {
            date: Some(args.date),
            days: Some(args.days.to_string()),
        },
        args.max_days,
    )?;

    let pool = db::create_pool(&args.database_url, 1).await?;
    let store = PgMealStore::new(pool);

    tracing::info!("Building report from {} for {} day(s)", range.start, range.days);
    let report = MealService::report(&store, range).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
