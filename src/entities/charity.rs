//! Charity entity - Profile of a shelter or charity that accepts food tickets.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Charity database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "charities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning account
    pub user_id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Free-form description shown in charity listings
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Tickets this charity accepted
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
