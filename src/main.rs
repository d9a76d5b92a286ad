use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use tutorbook_api::{config::ApiConfig, init_tracing, ApiState};
use tutorbook_db::{create_pool, schema::initialize_database, PgStore};
use tutorbook_mailer::{MailConfig, MailDispatcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    init_tracing(config.log_level)?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url, config.database_max_connections).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    // Booking e-mails; a no-op without mail credentials
    let mailer = MailDispatcher::from_config(&MailConfig::from_env()?)?;

    let state = Arc::new(ApiState {
        store: Arc::new(PgStore::new(db_pool)),
        notifier: Arc::new(mailer),
        booking_horizon_days: config.booking_horizon_days,
    });

    // Start API server
    tutorbook_api::start_server(config, state).await?;

    Ok(())
}
