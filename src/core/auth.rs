//! Account business logic - sign-up, sign-in, profile updates and account deletion.
//!
//! Passwords are hashed with Argon2id. Sign-up for charity, organization and
//! factory accounts also creates the matching profile row in the same database
//! transaction, so an account never exists without its profile.

use crate::{
    core::{profile, validation},
    entities::{OrganizationKind, Role, Session, User, enums::enum_label, session, user},
    errors::{Error, Result},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// Sign-up form.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: Role,
    /// Required for charity, organization and factory accounts
    pub profile: Option<ProfileDetails>,
}

/// Profile fields collected at sign-up for non-guest accounts.
#[derive(Debug, Clone)]
pub struct ProfileDetails {
    /// Public name; defaults to the display name when blank
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Only used for organization accounts
    pub organization_kind: Option<OrganizationKind>,
    pub description: Option<String>,
}

/// Fields a user may change on their own account. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Hashes a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// Checks a password against a stored Argon2 PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Finds an account by email, including deleted ones.
pub async fn get_user_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active account by ID.
pub async fn get_user(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    Ok(User::find_by_id(user_id)
        .one(db)
        .await?
        .filter(|u| !u.is_deleted))
}

/// Creates a new account, and its profile for roles that have one.
#[instrument(skip(db, form), fields(email = %form.email, role = ?form.role))]
pub async fn sign_up(db: &DatabaseConnection, form: SignUp) -> Result<user::Model> {
    let email = validation::validate_email(&form.email)?;
    validation::validate_password(&form.password)?;
    let display_name = validation::validate_required("display name", &form.display_name)?;
    let phone = form
        .phone
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(validation::validate_mobile)
        .transpose()?;

    if form.role == Role::Admin {
        return Err(Error::Forbidden {
            role: enum_label(&form.role),
            action: "be created through sign-up",
        });
    }

    let needs_profile = matches!(
        form.role,
        Role::Charity | Role::Organization | Role::Factory
    );
    let details = match (&form.profile, needs_profile) {
        (Some(details), true) => Some(details),
        (None, true) => {
            return Err(Error::validation(
                "profile",
                "address and phone are required for this account type",
            ));
        }
        (_, false) => None,
    };

    let txn = db.begin().await?;

    if get_user_by_email(&txn, &email).await?.is_some() {
        return Err(Error::EmailTaken { email });
    }

    let now = chrono::Utc::now();
    let new_user = user::ActiveModel {
        email: Set(email),
        password_hash: Set(hash_password(&form.password)?),
        display_name: Set(display_name.clone()),
        phone: Set(phone),
        role: Set(form.role),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if let Some(details) = details {
        let name = if details.name.trim().is_empty() {
            display_name
        } else {
            details.name.clone()
        };
        let contact = profile::Contact {
            name,
            address: details.address.clone(),
            phone: details.phone.clone(),
        };
        match form.role {
            Role::Charity => {
                profile::create_charity(&txn, new_user.id, contact, details.description.clone())
                    .await?;
            }
            Role::Organization => {
                let kind = details
                    .organization_kind
                    .unwrap_or(OrganizationKind::Restaurant);
                profile::create_hotel(&txn, new_user.id, contact, kind).await?;
            }
            Role::Factory => {
                profile::create_factory(&txn, new_user.id, contact).await?;
            }
            Role::Guest | Role::Admin => {}
        }
    }

    txn.commit().await?;
    info!(user_id = new_user.id, "Account created");
    Ok(new_user)
}

/// Checks credentials. Unknown email, deleted account and wrong password all
/// produce the same `InvalidCredentials` error.
#[instrument(skip(db, password))]
pub async fn sign_in(db: &DatabaseConnection, email: &str, password: &str) -> Result<user::Model> {
    let Some(account) = get_user_by_email(db, email).await? else {
        return Err(Error::InvalidCredentials);
    };

    if account.is_deleted || !verify_password(password, &account.password_hash)? {
        warn!("Rejected sign-in attempt");
        return Err(Error::InvalidCredentials);
    }

    Ok(account)
}

/// Applies a [`UserUpdate`] to an active account.
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    update: UserUpdate,
) -> Result<user::Model> {
    let account = get_user(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))?;

    let mut active_model: user::ActiveModel = account.into();

    if let Some(name) = update.display_name {
        active_model.display_name = Set(validation::validate_required("display name", &name)?);
    }
    if let Some(phone) = update.phone {
        let phone = if phone.trim().is_empty() {
            None
        } else {
            Some(validation::validate_mobile(&phone)?)
        };
        active_model.phone = Set(phone);
    }
    if let Some(password) = update.password {
        validation::validate_password(&password)?;
        active_model.password_hash = Set(hash_password(&password)?);
    }
    active_model.updated_at = Set(chrono::Utc::now());

    active_model.update(db).await.map_err(Into::into)
}

/// Email stored on a deleted account. `#` never passes email validation, so the
/// tombstone cannot collide with a live address.
fn deleted_email(email: &str, user_id: i64) -> String {
    format!("{email}#deleted-{user_id}")
}

/// Soft-deletes an account and signs it out everywhere. Tickets, requests and
/// donations referencing the account are kept. The email is released so the
/// same person can sign up again.
#[instrument(skip(db))]
pub async fn delete_account(db: &DatabaseConnection, user_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let account = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .filter(|u| !u.is_deleted)
        .ok_or_else(|| Error::not_found("User", user_id))?;

    let released = deleted_email(&account.email, user_id);
    let mut active_model: user::ActiveModel = account.into();
    active_model.email = Set(released);
    active_model.is_deleted = Set(true);
    active_model.updated_at = Set(chrono::Utc::now());
    active_model.update(&txn).await?;

    Session::delete_many()
        .filter(session::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    info!(user_id, "Account deleted");
    Ok(())
}

/// Lists active accounts, optionally restricted to one role, newest first.
pub async fn list_users(db: &DatabaseConnection, role: Option<Role>) -> Result<Vec<user::Model>> {
    let mut query = User::find().filter(user::Column::IsDeleted.eq(false));
    if let Some(role) = role {
        query = query.filter(user::Column::Role.eq(role));
    }
    query
        .order_by_desc(user::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts active accounts per role. Roles without accounts are absent.
pub async fn count_users_by_role(db: &DatabaseConnection) -> Result<BTreeMap<String, usize>> {
    let mut counts = BTreeMap::new();
    for account in list_users(db, None).await? {
        *counts.entry(enum_label(&account.role)).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Creates an admin account directly, bypassing the sign-up restriction.
/// Used for bootstrapping from the environment.
pub async fn ensure_admin(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    let email = validation::validate_email(email)?;
    if let Some(existing) = get_user_by_email(db, &email).await? {
        return Ok(existing);
    }
    validation::validate_password(password)?;

    let now = chrono::Utc::now();
    let admin = user::ActiveModel {
        email: Set(email),
        password_hash: Set(hash_password(password)?),
        display_name: Set("Administrator".to_string()),
        phone: Set(None),
        role: Set(Role::Admin),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(user_id = admin.id, "Admin account created");
    Ok(admin)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_sign_up_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut form = guest_sign_up("not-an-email");
        let result = sign_up(&db, form.clone()).await;
        assert!(matches!(result, Err(Error::Validation { field: "email", .. })));

        form.email = "guest@example.org".to_string();
        form.password = "123".to_string();
        let result = sign_up(&db, form.clone()).await;
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "password",
                ..
            })
        ));

        form.password = "longenough".to_string();
        form.role = Role::Charity;
        let result = sign_up(&db, form.clone()).await;
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "profile",
                ..
            })
        ));

        form.role = Role::Admin;
        let result = sign_up(&db, form).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_up_and_sign_in() -> Result<()> {
        let db = setup_test_db().await?;

        let created = sign_up(&db, guest_sign_up("Guest@Example.org")).await?;
        assert_eq!(created.email, "guest@example.org");
        assert_eq!(created.role, Role::Guest);

        let signed_in = sign_in(&db, "GUEST@example.org", "password1").await?;
        assert_eq!(signed_in.id, created.id);

        let wrong = sign_in(&db, "guest@example.org", "password2").await;
        assert!(matches!(wrong, Err(Error::InvalidCredentials)));

        let unknown = sign_in(&db, "nobody@example.org", "password1").await;
        assert!(matches!(unknown, Err(Error::InvalidCredentials)));

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_up_rejects_taken_email() -> Result<()> {
        let db = setup_test_db().await?;

        sign_up(&db, guest_sign_up("guest@example.org")).await?;
        let duplicate = sign_up(&db, guest_sign_up("guest@example.org")).await;
        assert!(matches!(duplicate, Err(Error::EmailTaken { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_up_creates_profiles() -> Result<()> {
        let db = setup_test_db().await?;

        let charity_user = create_test_charity(&db, "Soup Kitchen").await?.0;
        let charity = profile::get_charity_by_user(&db, charity_user.id).await?;
        assert_eq!(charity.unwrap().name, "Soup Kitchen");

        let org_user = create_test_organization(&db, "Grand Hotel").await?.0;
        let hotel = profile::get_hotel_by_user(&db, org_user.id).await?.unwrap();
        assert_eq!(hotel.kind, OrganizationKind::Hotel);

        let factory_user = create_test_factory(&db, "Green Compost").await?.0;
        assert!(
            profile::get_factory_by_user(&db, factory_user.id)
                .await?
                .is_some()
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_update_user() -> Result<()> {
        let db = setup_test_db().await?;
        let account = sign_up(&db, guest_sign_up("guest@example.org")).await?;

        let updated = update_user(
            &db,
            account.id,
            UserUpdate {
                display_name: Some("Generous Guest".to_string()),
                phone: Some("+20 100 123 4567".to_string()),
                password: Some("newpassword".to_string()),
            },
        )
        .await?;
        assert_eq!(updated.display_name, "Generous Guest");
        assert_eq!(updated.phone.as_deref(), Some("+201001234567"));

        sign_in(&db, "guest@example.org", "newpassword").await?;

        let bad_phone = update_user(
            &db,
            account.id,
            UserUpdate {
                phone: Some("123".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(bad_phone.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_account_blocks_sign_in() -> Result<()> {
        let db = setup_test_db().await?;
        let account = sign_up(&db, guest_sign_up("guest@example.org")).await?;
        crate::core::session::sign_in_session(&db, "discord-1", account.id).await?;

        delete_account(&db, account.id).await?;

        let result = sign_in(&db, "guest@example.org", "password1").await;
        assert!(matches!(result, Err(Error::InvalidCredentials)));
        assert!(
            crate::core::session::current_user(&db, "discord-1")
                .await?
                .is_none()
        );
        assert!(get_user(&db, account.id).await?.is_none());

        let again = delete_account(&db, account.id).await;
        assert!(matches!(again, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_email_can_sign_up_again() -> Result<()> {
        let db = setup_test_db().await?;
        let old = sign_up(&db, guest_sign_up("guest@example.org")).await?;
        delete_account(&db, old.id).await?;

        let new = sign_up(&db, guest_sign_up("guest@example.org")).await?;
        assert_ne!(new.id, old.id);
        assert_eq!(sign_in(&db, "guest@example.org", "password1").await?.id, new.id);

        // The old row is kept under a tombstone address
        let tombstone = User::find_by_id(old.id).one(&db).await?.unwrap();
        assert!(tombstone.is_deleted);
        assert_eq!(tombstone.email, deleted_email("guest@example.org", old.id));
        assert!(validation::validate_email(&tombstone.email).is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_and_count_users() -> Result<()> {
        let db = setup_test_db().await?;
        sign_up(&db, guest_sign_up("a@example.org")).await?;
        sign_up(&db, guest_sign_up("b@example.org")).await?;
        create_test_charity(&db, "Shelter").await?;

        assert_eq!(list_users(&db, Some(Role::Guest)).await?.len(), 2);
        assert_eq!(list_users(&db, None).await?.len(), 3);

        let counts = count_users_by_role(&db).await?;
        assert_eq!(counts.get("guest"), Some(&2));
        assert_eq!(counts.get("charity"), Some(&1));
        assert_eq!(counts.get("factory"), None);

        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let first = ensure_admin(&db, "admin@example.org", "adminpass").await?;
        let second = ensure_admin(&db, "ADMIN@example.org", "ignored").await?;
        assert_eq!(first.id, second.id);
        assert_eq!(first.role, Role::Admin);
        Ok(())
    }
}
