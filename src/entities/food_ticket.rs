//! Food ticket entity - A donation listing posted by an organization.
//!
//! `status` moves pending → accepted/declined/expired → converted; see
//! [`TicketStatus::can_transition_to`](crate::core::ticket) for the allowed graph.
//! `charity_id` is set once a charity accepts the ticket.

use super::enums::{TicketKind, TicketStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Food ticket database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "food_tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Donor organization (`hotels.id`)
    pub organization_id: i64,
    /// Charity that accepted the ticket
    pub charity_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    /// Free-form food category (e.g. "bakery", "cooked meals")
    pub food_type: String,
    pub quantity: i32,
    /// Unit for `quantity` (e.g. "kg", "meals")
    pub unit: String,
    pub kind: TicketKind,
    pub status: TicketStatus,
    pub pickup_address: String,
    /// Last day the food is good for donation
    pub expiry_date: Date,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hotel::Entity",
        from = "Column::OrganizationId",
        to = "super::hotel::Column::Id"
    )]
    Organization,
    #[sea_orm(
        belongs_to = "super::charity::Entity",
        from = "Column::CharityId",
        to = "super::charity::Column::Id"
    )]
    Charity,
    #[sea_orm(has_many = "super::delivery_request::Entity")]
    DeliveryRequests,
    #[sea_orm(has_many = "super::factory_request::Entity")]
    FactoryRequests,
}

impl Related<super::hotel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::charity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Charity.def()
    }
}

impl Related<super::delivery_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryRequests.def()
    }
}

impl Related<super::factory_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FactoryRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
