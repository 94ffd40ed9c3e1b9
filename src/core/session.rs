//! Session and preference persistence.
//!
//! A session binds a Discord user to the account they signed in with, so every
//! later command knows who is acting. Preferences are free-form key/value
//! settings per Discord user, kept across restarts the way a browser keeps
//! local storage.

use crate::{
    entities::{Preference, Session, User, preference, session, user},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::OnConflict};
use tracing::debug;

/// Preference key for the default ticket listing order.
pub const TICKET_SORT_KEY: &str = "ticket_sort";

/// Binds `discord_id` to `user_id`, replacing any earlier binding.
pub async fn sign_in_session(
    db: &DatabaseConnection,
    discord_id: &str,
    user_id: i64,
) -> Result<session::Model> {
    let existing = Session::find()
        .filter(session::Column::DiscordId.eq(discord_id))
        .one(db)
        .await?;

    let now = Utc::now();
    let model = if let Some(existing) = existing {
        let mut active_model: session::ActiveModel = existing.into();
        active_model.user_id = Set(user_id);
        active_model.created_at = Set(now);
        active_model.update(db).await?
    } else {
        session::ActiveModel {
            discord_id: Set(discord_id.to_string()),
            user_id: Set(user_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?
    };

    debug!(discord_id, user_id, "Session bound");
    Ok(model)
}

/// Returns the active account bound to `discord_id`, if any.
pub async fn current_user(
    db: &DatabaseConnection,
    discord_id: &str,
) -> Result<Option<user::Model>> {
    let Some(bound) = Session::find()
        .filter(session::Column::DiscordId.eq(discord_id))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    Ok(User::find_by_id(bound.user_id)
        .one(db)
        .await?
        .filter(|account| !account.is_deleted))
}

/// Removes the binding for `discord_id`. Returns whether one existed.
pub async fn sign_out(db: &DatabaseConnection, discord_id: &str) -> Result<bool> {
    let result = Session::delete_many()
        .filter(session::Column::DiscordId.eq(discord_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Reads one preference value.
pub async fn get_preference(
    db: &DatabaseConnection,
    discord_id: &str,
    key: &str,
) -> Result<Option<String>> {
    Ok(Preference::find()
        .filter(preference::Column::DiscordId.eq(discord_id))
        .filter(preference::Column::Key.eq(key))
        .one(db)
        .await?
        .map(|p| p.value))
}

/// Inserts or overwrites one preference value in a single statement.
pub async fn set_preference(
    db: &DatabaseConnection,
    discord_id: &str,
    key: &str,
    value: &str,
) -> Result<()> {
    let pref = preference::ActiveModel {
        discord_id: Set(discord_id.to_string()),
        key: Set(key.to_string()),
        value: Set(value.to_string()),
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    Preference::insert(pref)
        .on_conflict(
            OnConflict::columns([preference::Column::DiscordId, preference::Column::Key])
                .update_columns([preference::Column::Value, preference::Column::UpdatedAt])
                .to_owned(),
        )
        .exec(db)
        .await?;

    debug!(discord_id, key, "Preference saved");
    Ok(())
}

/// All preferences of one Discord user, sorted by key.
pub async fn list_preferences(
    db: &DatabaseConnection,
    discord_id: &str,
) -> Result<Vec<preference::Model>> {
    Preference::find()
        .filter(preference::Column::DiscordId.eq(discord_id))
        .order_by_asc(preference::Column::Key)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_current_user_without_session() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(current_user(&db, "discord-1").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_in_session_replaces_binding() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_guest(&db, "first@example.org").await?;
        let second = create_test_guest(&db, "second@example.org").await?;

        sign_in_session(&db, "discord-1", first.id).await?;
        assert_eq!(current_user(&db, "discord-1").await?.unwrap().id, first.id);

        sign_in_session(&db, "discord-1", second.id).await?;
        assert_eq!(current_user(&db, "discord-1").await?.unwrap().id, second.id);

        let count = Session::find().count(&db).await?;
        assert_eq!(count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_out() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_guest(&db, "guest@example.org").await?;
        sign_in_session(&db, "discord-1", account.id).await?;

        assert!(sign_out(&db, "discord-1").await?);
        assert!(!sign_out(&db, "discord-1").await?);
        assert!(current_user(&db, "discord-1").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_set_and_get_preference() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(get_preference(&db, "discord-1", TICKET_SORT_KEY).await?.is_none());

        set_preference(&db, "discord-1", TICKET_SORT_KEY, "newest").await?;
        set_preference(&db, "discord-1", TICKET_SORT_KEY, "expiry_soonest").await?;
        set_preference(&db, "discord-1", "language", "ar").await?;
        set_preference(&db, "discord-2", TICKET_SORT_KEY, "oldest").await?;

        assert_eq!(
            get_preference(&db, "discord-1", TICKET_SORT_KEY).await?,
            Some("expiry_soonest".to_string())
        );

        let prefs = list_preferences(&db, "discord-1").await?;
        assert_eq!(prefs.len(), 2);
        assert_eq!(prefs[0].key, "language");
        assert_eq!(prefs[1].key, TICKET_SORT_KEY);

        Ok(())
    }

    #[tokio::test]
    async fn test_preference_key_is_unique_per_user() -> Result<()> {
        let db = setup_test_db().await?;
        set_preference(&db, "discord-1", TICKET_SORT_KEY, "newest").await?;

        // A plain insert that bypasses the upsert is refused by the index
        let duplicate = preference::ActiveModel {
            discord_id: Set("discord-1".to_string()),
            key: Set(TICKET_SORT_KEY.to_string()),
            value: Set("oldest".to_string()),
            updated_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await;
        assert!(duplicate.is_err());

        set_preference(&db, "discord-1", TICKET_SORT_KEY, "quantity_desc").await?;
        let rows = Preference::find()
            .filter(preference::Column::DiscordId.eq("discord-1"))
            .all(&db)
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "quantity_desc");

        Ok(())
    }
}
