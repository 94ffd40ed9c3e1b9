#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use foodbridge::{
    bot,
    config::{database, settings},
    core::{auth, promo},
    errors::{Error, Result},
};
use std::{env, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Tracing first so startup failures are logged
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. .env is optional, variables can be set externally
    dotenv().ok();

    // 3. Plans, promo seeds and payment settings
    let config = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load config.toml: {}", e))?;
    info!(
        plans = config.subscription_plans.len(),
        promo_codes = config.promo_codes.len(),
        "Configuration loaded"
    );

    // 4. Database and schema
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established"))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed promo codes from config
    let seeded = promo::seed_promo_codes(&db, &config.promo_codes)
        .await
        .inspect_err(|e| error!("Failed to seed promo codes: {}", e))?;
    if seeded > 0 {
        info!(seeded, "Promo codes seeded");
    }

    // 6. Optional bootstrap admin account
    match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
        (Ok(email), Ok(password)) => {
            auth::ensure_admin(&db, &email, &password)
                .await
                .inspect_err(|e| error!("Failed to create admin account: {}", e))?;
        }
        (Ok(_), Err(_)) => warn!("ADMIN_EMAIL is set without ADMIN_PASSWORD; no admin created"),
        _ => {}
    }

    // 7. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, Arc::new(config), db).await
}
