//! Hotel entity - Profile of a donor organization.
//!
//! The table keeps its historical name but holds restaurants and supermarkets
//! too; `kind` tells them apart.

use super::enums::OrganizationKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Donor organization database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hotels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning account
    pub user_id: i64,
    pub name: String,
    /// Restaurant, hotel or supermarket
    pub kind: OrganizationKind,
    pub address: String,
    pub phone: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Tickets posted by this organization
    #[sea_orm(has_many = "super::food_ticket::Entity")]
    FoodTickets,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::food_ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FoodTickets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
