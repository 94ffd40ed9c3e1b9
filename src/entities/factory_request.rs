//! Factory request entity - A factory asking to take an expired or
//! expiry-routed ticket for recycling.

use super::enums::FactoryRequestStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Factory request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "factory_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub ticket_id: i64,
    pub factory_id: i64,
    pub status: FactoryRequestStatus,
    /// Optional message from the factory to the organization
    pub note: Option<String>,
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
        belongs_to = "super::factory::Entity",
        from = "Column::FactoryId",
        to = "super::factory::Column::Id"
    )]
    Factory,
}

impl Related<super::food_ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FoodTicket.def()
    }
}

impl Related<super::factory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Factory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
