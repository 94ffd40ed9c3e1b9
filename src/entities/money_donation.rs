//! Money donation entity - A one-off card donation, from a guest or a
//! signed-in user, optionally earmarked for a charity.
//!
//! Only the last four card digits are kept.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Money donation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "money_donations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Donor account, `None` for guest donations
    pub user_id: Option<i64>,
    pub donor_name: String,
    /// Earmarked charity, `None` for general donations
    pub charity_id: Option<i64>,
    /// Amount in dollars
    pub amount: f64,
    pub card_last4: String,
    /// Reference returned by the payment simulator
    pub reference: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::charity::Entity",
        from = "Column::CharityId",
        to = "super::charity::Column::Id"
    )]
    Charity,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::charity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Charity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
