//! Seeds the default instrument universe into the configured database.

use confluence::config::AppConfig;
use confluence::db::{seed_default_instruments, PostgresStore, SignalRepository};
use confluence::logging;
use dotenvy::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    logging::init_logging();

    let config = AppConfig::from_env();
    let database_url = config
        .database_url
        .ok_or("DATABASE_URL must be set to seed instruments")?;

    let store = PostgresStore::connect(&database_url).await?;
    let seeded = seed_default_instruments(&store).await?;

    let active = store.get_active_instruments().await?;
    info!(
        seeded = seeded,
        active = active.len(),
        "Seeded {} default instruments ({} active)",
        seeded,
        active.len()
    );
    for instrument in active {
        info!(symbol = %instrument.symbol, category = instrument.category.as_str(), "{}", instrument.display_name);
    }

    Ok(())
}
