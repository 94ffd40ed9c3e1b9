//! Core business logic, independent of Discord.

/// Sign-up, sign-in and account management
pub mod auth;
/// Ticket listing filters and sort orders
pub mod filter;
/// Role landing views
pub mod navigation;
/// Simulated payments and money donations
pub mod payment;
/// Charity, organization and factory profiles
pub mod profile;
/// Promo codes
pub mod promo;
/// Delivery and factory requests
pub mod requests;
/// Sessions and preferences
pub mod session;
/// Dashboard statistics
pub mod stats;
/// Recurring donation subscriptions
pub mod subscription;
/// Food tickets
pub mod ticket;
/// Form validation
pub mod validation;
