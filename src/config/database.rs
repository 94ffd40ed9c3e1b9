//! Database configuration module for `FoodBridge`.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust models.
//! Referenced tables are created before the tables that point at them.

use crate::entities::{
    Charity, DeliveryRequest, Factory, FactoryRequest, FoodTicket, Hotel, MoneyDonation,
    Preference, PromoCode, Session, Subscription, User, preference,
};
use crate::errors::{Error, Result};
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityName, EntityTrait, Schema,
    sea_query::Index,
};
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/foodbridge.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    ensure_sqlite_dir(&database_url)?;
    info!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the parent directory of a file-backed `SQLite` URL.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::Config {
            message: format!("Failed to create database directory {}: {e}", parent.display()),
        })?;
    }
    Ok(())
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    debug!("Creating table {}", entity.table_name());
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all marketplace tables if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Charity).await?;
    create_table(db, &schema, Hotel).await?;
    create_table(db, &schema, Factory).await?;
    create_table(db, &schema, FoodTicket).await?;
    create_table(db, &schema, DeliveryRequest).await?;
    create_table(db, &schema, FactoryRequest).await?;
    create_table(db, &schema, PromoCode).await?;
    create_table(db, &schema, MoneyDonation).await?;
    create_table(db, &schema, Subscription).await?;
    create_table(db, &schema, Session).await?;
    create_table(db, &schema, Preference).await?;

    // One value per key and Discord user; `set_preference` upserts against it
    let index = Index::create()
        .name("idx_preferences_discord_id_key")
        .table(Preference)
        .col(preference::Column::DiscordId)
        .col(preference::Column::Key)
        .unique()
        .if_not_exists()
        .to_owned();
    let backend = db.get_database_backend();
    db.execute(backend.build(&index)).await?;

    Ok(())
}
