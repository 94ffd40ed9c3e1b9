//! Promo code entity - Percentage discounts applied to subscriptions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Promo code database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promo_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Code as typed by users, stored uppercase
    #[sea_orm(unique)]
    pub code: String,
    /// Discount in whole percent (1-100)
    pub discount_percent: i32,
    /// Redemption cap, `None` for unlimited
    pub max_uses: Option<i32>,
    pub uses: i32,
    pub is_active: bool,
    /// Last valid day, `None` for no expiry
    pub expires_at: Option<Date>,
    pub created_at: DateTimeUtc,
}

/// `PromoCode` is referenced by subscriptions but has no outgoing relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
