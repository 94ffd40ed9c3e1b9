//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Sign-up, sign-in, profile and preference commands
pub mod account;

/// Admin commands: accounts, promo codes, platform overview
pub mod admin;

/// Money donations and subscriptions
pub mod donations;

/// General utility commands and the role dashboard
pub mod general;

/// Delivery and factory request commands
pub mod requests;

/// Food ticket commands
pub mod tickets;

// Export commands
pub use account::*;
pub use admin::*;
pub use donations::*;
pub use general::*;
pub use requests::*;
pub use tickets::*;
