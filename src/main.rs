use migration::{Migrator, MigratorTrait};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use game_library::config::Config;
use game_library::{CatalogService, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Starting game library"
    );

    tracing::info!("Connecting to database...");
    let db = game_library::db::connect(&config.database_url, config.max_connections).await?;
    tracing::info!("Database connected");

    tracing::info!("Running database migrations...");
    Migrator::up(&db, None).await?;
    tracing::info!("Migrations applied");

    let store = Store::new(db);
    let games = CatalogService::list_games(&store).await?;
    let genres = CatalogService::list_genres(&store).await?;
    let platforms = CatalogService::list_platforms(&store).await?;
    let developers = CatalogService::list_developers(&store).await?;

    tracing::info!(
        games = games.len(),
        genres = genres.len(),
        platforms = platforms.len(),
        developers = developers.len(),
        "Catalog ready"
    );

    Ok(())
}

/// Initialize the `tracing` subscriber with an environment-based filter.
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("game_library={log_level},sea_orm=warn").into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
