//! Unified error type for `FoodBridge`.
//!
//! Every core operation returns [`Result`]; the bot layer lets errors bubble up
//! to the framework error hook, which reports them back to the user.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account already exists for {email}")]
    EmailTaken { email: String },

    #[error("You are not signed in. Use `/signin` first.")]
    NotSignedIn,

    #[error("A {role} account cannot {action}")]
    Forbidden { role: String, action: &'static str },

    #[error("Ticket {ticket_id} cannot move from {from} to {to}")]
    InvalidTransition {
        ticket_id: i64,
        from: String,
        to: String,
    },

    #[error("Request {request_id} is {status}: {message}")]
    RequestState {
        request_id: i64,
        status: String,
        message: String,
    },

    #[error("Promo code '{code}' rejected: {reason}")]
    PromoCode { code: String, reason: String },

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Shorthand for a validation failure on a named form field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for a missing row.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
