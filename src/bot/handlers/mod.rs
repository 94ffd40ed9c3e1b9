//! Discord interaction handlers
//!
//! Autocomplete for command parameters, account and role checks, and parsing
//! of free-text command input.

/// Role and sign-in checks for the invoking Discord user
pub mod access;
/// Autocomplete handlers for roles, statuses, sort orders, plans and charities
pub mod autocomplete;
/// Parsing of dates and other text input
pub mod input;
