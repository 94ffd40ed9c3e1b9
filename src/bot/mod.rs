//! Bot layer - Discord-specific interface and command handlers
//!
//! Slash commands play the part of forms, tables and dashboards. Command
//! errors bubble up to [`on_error`], which answers the user privately.

/// Discord command implementations grouped by area
pub mod commands;
/// Autocomplete, access checks and input parsing shared by commands
pub mod handlers;

use crate::{
    config::AppConfig,
    core::payment::PaymentSimulator,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Settings from config.toml
    pub config: Arc<AppConfig>,
    /// Simulated payment gateway
    pub payments: PaymentSimulator,
}

impl BotData {
    /// Creates the shared context; the payment delay comes from `config`.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: Arc<AppConfig>) -> Self {
        let payments = PaymentSimulator::from_config(&config.payment);
        Self {
            database,
            config,
            payments,
        }
    }
}

/// Text shown to the user for a failed command. Internal failures get a
/// generic message; details only go to the log.
#[must_use]
pub fn user_message(error: &Error) -> String {
    match error {
        Error::Database(_)
        | Error::Config { .. }
        | Error::PasswordHash(_)
        | Error::EnvVar(_)
        | Error::Fmt(_)
        | Error::IntConversion(_)
        | Error::Framework(_) => {
            "❌ Something went wrong on our side. Please try again later.".to_string()
        }
        other => format!("❌ {other}"),
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            let reply = poise::CreateReply::default()
                .content(user_message(&error))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// All registered commands.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        // general
        commands::ping(),
        commands::help(),
        commands::dashboard(),
        // account
        commands::signup(),
        commands::signin(),
        commands::signout(),
        commands::whoami(),
        commands::profile_update(),
        commands::delete_account(),
        commands::preference(),
        // tickets
        commands::ticket_create(),
        commands::tickets(),
        commands::ticket_info(),
        commands::ticket_accept(),
        commands::ticket_decline(),
        commands::ticket_sweep(),
        // requests
        commands::delivery_request(),
        commands::delivery_advance(),
        commands::delivery_cancel(),
        commands::deliveries(),
        commands::factory_request(),
        commands::factory_approve(),
        commands::factory_reject(),
        commands::factory_requests(),
        // donations
        commands::donate(),
        commands::plans(),
        commands::subscribe(),
        commands::unsubscribe(),
        commands::subscriptions(),
        // admin
        commands::users(),
        commands::promo(),
        commands::overview(),
        commands::charities(),
    ]
}

/// Builds the poise framework and runs the Discord client until it stops.
#[instrument(skip(token, config, database))]
pub async fn run_bot(
    token: String,
    config: Arc<AppConfig>,
    database: DatabaseConnection,
) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database, config))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
