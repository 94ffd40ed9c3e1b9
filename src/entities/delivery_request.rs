//! Delivery request entity - A charity asking for an accepted ticket to be
//! brought from the pickup address to its own.

use super::enums::DeliveryStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub ticket_id: i64,
    pub charity_id: i64,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub status: DeliveryStatus,
    /// Requested pickup time, if the charity gave one
    pub scheduled_for: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::food_ticket::Entity",
        from = "Column::TicketId",
        to = "super::food_ticket::Column::Id"
    )]
    FoodTicket,
    #[sea_orm(
        belongs_to = "super::charity::Entity",
        from = "Column::CharityId",
        to = "super::charity::Column::Id"
    )]
    Charity,
}

impl Related<super::food_ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FoodTicket.def()
    }
}

impl Related<super::charity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Charity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
