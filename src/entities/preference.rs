//! Preference entity - Stores key-value settings per Discord user
//! (default ticket sort, dashboard options and the like).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Preference database model - one key/value pair for one Discord user
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "preferences")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Discord user ID owning the setting
    pub discord_id: String,
    /// Setting key (e.g., `"ticket_sort"`)
    pub key: String,
    /// Setting value stored as string
    pub value: String,
    /// When this setting was last modified
    pub updated_at: DateTime,
}

/// `Preference` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
