use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meal_planner_api::{
    app,
    config::Config,
    db::{self, MealStore, PgMealStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    let store = PgMealStore::new(pool);
    store.ping().await?;
    info!("Database connected");

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(Arc::new(store), config);
    let router = app(state);

    info!("Meal planner API listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
