use dotenvy::dotenv;
use lead_tracker::{
    DatabaseStorage, RecordStore, Result,
    config::{self, database},
    core::report::format_report,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load application configuration
    let app_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure the key-value table exists
    let database_url = database::get_database_url(&app_config);
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to {}: {}", database_url, e))?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Hydrate the store and print the indicator report
    let store = RecordStore::load(DatabaseStorage::new(db), &app_config.storage_key).await?;
    let overdue = store
        .overdue_at(chrono::Utc::now(), app_config.alert_threshold_days)
        .len();

    print!("{}", format_report(&store.report()));
    println!(
        "Connected for {}+ days: {}",
        app_config.alert_threshold_days, overdue
    );

    Ok(())
}
