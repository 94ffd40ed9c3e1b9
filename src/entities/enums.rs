//! String-backed enums shared by the entity models.
//!
//! Each enum is stored as its lowercase snake-case name so rows stay readable
//! from any SQL client.

use sea_orm::{Iterable, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Account role; decides which dashboard and commands a user gets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Donates money without a profile
    #[sea_orm(string_value = "guest")]
    Guest,
    /// Receives food tickets
    #[sea_orm(string_value = "charity")]
    Charity,
    /// Restaurant, hotel or supermarket posting food tickets
    #[sea_orm(string_value = "organization")]
    Organization,
    /// Platform operator
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Recycles expired food
    #[sea_orm(string_value = "factory")]
    Factory,
}

/// Lifecycle of a food ticket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "declined")]
    Declined,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "converted")]
    Converted,
}

/// Donation tickets go to charities, expiry tickets only to factories.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    #[sea_orm(string_value = "donation")]
    Donation,
    #[sea_orm(string_value = "expiry")]
    Expiry,
}

/// Kind of donor business behind an organization account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum OrganizationKind {
    #[sea_orm(string_value = "restaurant")]
    Restaurant,
    #[sea_orm(string_value = "hotel")]
    Hotel,
    #[sea_orm(string_value = "supermarket")]
    Supermarket,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum FactoryRequestStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Parses the stored string form of any of the enums above, ignoring case and
/// surrounding whitespace. Used for command arguments typed by users.
pub fn parse_enum<T: ActiveEnum<Value = String>>(input: &str) -> Option<T> {
    T::try_from_value(&input.trim().to_lowercase()).ok()
}

/// Stored string form of an enum value, for display.
pub fn enum_label<T: ActiveEnum<Value = String>>(value: &T) -> String {
    value.to_value()
}

/// All stored string forms of an enum, in declaration order.
pub fn enum_labels<T: ActiveEnum<Value = String> + Iterable>() -> Vec<String> {
    T::iter().map(|v| v.to_value()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enum_ignores_case_and_whitespace() {
        assert_eq!(parse_enum::<Role>(" Charity "), Some(Role::Charity));
        assert_eq!(
            parse_enum::<DeliveryStatus>("IN_TRANSIT"),
            Some(DeliveryStatus::InTransit)
        );
        assert_eq!(parse_enum::<Role>("superuser"), None);
    }

    #[test]
    fn test_enum_labels_follow_declaration_order() {
        assert_eq!(
            enum_labels::<TicketKind>(),
            vec!["donation".to_string(), "expiry".to_string()]
        );
        assert_eq!(enum_label(&TicketStatus::Converted), "converted");
    }
}
