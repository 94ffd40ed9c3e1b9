//! Factory entity - Profile of a recycler that takes expired food.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Factory database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "factories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub name: String,
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
    #[sea_orm(has_many = "super::factory_request::Entity")]
    FactoryRequests,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::factory_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FactoryRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
