//! Profile business logic - charities, donor organizations and factories.
//!
//! Each non-guest account owns exactly one profile row. Profiles are created at
//! sign-up (see [`crate::core::auth::sign_up`]) and carry the public contact
//! details shown on tickets and requests.

use crate::{
    core::validation,
    entities::{Charity, Factory, Hotel, OrganizationKind, charity, factory, hotel},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Public contact details shared by all profile kinds.
#[derive(Debug, Clone)]
pub struct Contact {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl Contact {
    /// Validates and normalizes the contact fields.
    pub fn validated(&self) -> Result<Self> {
        Ok(Self {
            name: validation::validate_required("name", &self.name)?,
            address: validation::validate_required("address", &self.address)?,
            phone: validation::validate_mobile(&self.phone)?,
        })
    }
}

/// Contact fields to change; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl ContactUpdate {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none() && self.phone.is_none()
    }

    fn apply(&self, current: &Contact) -> Result<Contact> {
        Contact {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            address: self
                .address
                .clone()
                .unwrap_or_else(|| current.address.clone()),
            phone: self.phone.clone().unwrap_or_else(|| current.phone.clone()),
        }
        .validated()
    }
}

pub async fn create_charity<C>(
    db: &C,
    user_id: i64,
    contact: Contact,
    description: Option<String>,
) -> Result<charity::Model>
where
    C: ConnectionTrait,
{
    let contact = contact.validated()?;
    charity::ActiveModel {
        user_id: Set(user_id),
        name: Set(contact.name),
        address: Set(contact.address),
        phone: Set(contact.phone),
        description: Set(description.filter(|d| !d.trim().is_empty())),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

pub async fn create_hotel<C>(
    db: &C,
    user_id: i64,
    contact: Contact,
    kind: OrganizationKind,
) -> Result<hotel::Model>
where
    C: ConnectionTrait,
{
    let contact = contact.validated()?;
    hotel::ActiveModel {
        user_id: Set(user_id),
        name: Set(contact.name),
        kind: Set(kind),
        address: Set(contact.address),
        phone: Set(contact.phone),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

pub async fn create_factory<C>(db: &C, user_id: i64, contact: Contact) -> Result<factory::Model>
where
    C: ConnectionTrait,
{
    let contact = contact.validated()?;
    factory::ActiveModel {
        user_id: Set(user_id),
        name: Set(contact.name),
        address: Set(contact.address),
        phone: Set(contact.phone),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

pub async fn get_charity_by_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Option<charity::Model>> {
    Charity::find()
        .filter(charity::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn get_hotel_by_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Option<hotel::Model>> {
    Hotel::find()
        .filter(hotel::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn get_factory_by_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Option<factory::Model>> {
    Factory::find()
        .filter(factory::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn get_charity(db: &DatabaseConnection, id: i64) -> Result<Option<charity::Model>> {
    Charity::find_by_id(id).one(db).await.map_err(Into::into)
}

pub async fn get_hotel(db: &DatabaseConnection, id: i64) -> Result<Option<hotel::Model>> {
    Hotel::find_by_id(id).one(db).await.map_err(Into::into)
}

pub async fn get_factory(db: &DatabaseConnection, id: i64) -> Result<Option<factory::Model>> {
    Factory::find_by_id(id).one(db).await.map_err(Into::into)
}

/// All charities, alphabetically.
pub async fn list_charities(db: &DatabaseConnection) -> Result<Vec<charity::Model>> {
    Charity::find()
        .order_by_asc(charity::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All donor organizations, alphabetically.
pub async fn list_hotels(db: &DatabaseConnection) -> Result<Vec<hotel::Model>> {
    Hotel::find()
        .order_by_asc(hotel::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All factories, alphabetically.
pub async fn list_factories(db: &DatabaseConnection) -> Result<Vec<factory::Model>> {
    Factory::find()
        .order_by_asc(factory::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Case-insensitive search over charity names and addresses. A blank query
/// returns every charity.
pub async fn search_charities(db: &DatabaseConnection, query: &str) -> Result<Vec<charity::Model>> {
    let needle = query.trim().to_lowercase();
    let charities = list_charities(db).await?;
    if needle.is_empty() {
        return Ok(charities);
    }

    Ok(charities
        .into_iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&needle) || c.address.to_lowercase().contains(&needle)
        })
        .collect())
}

/// Updates the contact details of a charity.
pub async fn update_charity_contact(
    db: &DatabaseConnection,
    charity_id: i64,
    update: &ContactUpdate,
) -> Result<charity::Model> {
    let current = get_charity(db, charity_id)
        .await?
        .ok_or_else(|| Error::not_found("Charity", charity_id))?;
    if update.is_empty() {
        return Ok(current);
    }

    let contact = update.apply(&Contact {
        name: current.name.clone(),
        address: current.address.clone(),
        phone: current.phone.clone(),
    })?;

    let mut active_model: charity::ActiveModel = current.into();
    active_model.name = Set(contact.name);
    active_model.address = Set(contact.address);
    active_model.phone = Set(contact.phone);
    active_model.update(db).await.map_err(Into::into)
}

/// Updates the contact details of a donor organization.
pub async fn update_hotel_contact(
    db: &DatabaseConnection,
    hotel_id: i64,
    update: &ContactUpdate,
) -> Result<hotel::Model> {
    let current = get_hotel(db, hotel_id)
        .await?
        .ok_or_else(|| Error::not_found("Organization", hotel_id))?;
    if update.is_empty() {
        return Ok(current);
    }

    let contact = update.apply(&Contact {
        name: current.name.clone(),
        address: current.address.clone(),
        phone: current.phone.clone(),
    })?;

    let mut active_model: hotel::ActiveModel = current.into();
    active_model.name = Set(contact.name);
    active_model.address = Set(contact.address);
    active_model.phone = Set(contact.phone);
    active_model.update(db).await.map_err(Into::into)
}

/// Updates the contact details of a factory.
pub async fn update_factory_contact(
    db: &DatabaseConnection,
    factory_id: i64,
    update: &ContactUpdate,
) -> Result<factory::Model> {
    let current = get_factory(db, factory_id)
        .await?
        .ok_or_else(|| Error::not_found("Factory", factory_id))?;
    if update.is_empty() {
        return Ok(current);
    }

    let contact = update.apply(&Contact {
        name: current.name.clone(),
        address: current.address.clone(),
        phone: current.phone.clone(),
    })?;

    let mut active_model: factory::ActiveModel = current.into();
    active_model.name = Set(contact.name);
    active_model.address = Set(contact.address);
    active_model.phone = Set(contact.phone);
    active_model.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_contact_validation() {
        let contact = Contact {
            name: "  ".to_string(),
            address: "1 Nile St".to_string(),
            phone: "01001234567".to_string(),
        };
        assert!(matches!(
            contact.validated(),
            Err(Error::Validation { field: "name", .. })
        ));

        let contact = Contact {
            name: "Shelter".to_string(),
            address: "1 Nile St".to_string(),
            phone: "not a phone".to_string(),
        };
        assert!(matches!(
            contact.validated(),
            Err(Error::Validation {
                field: "mobile number",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_search_charities() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_charity(&db, "Soup Kitchen").await?;
        create_test_charity(&db, "Night Shelter").await?;

        let found = search_charities(&db, "soup").await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Soup Kitchen");

        // Address matches too; test charities live on "Charity Street"
        assert_eq!(search_charities(&db, "charity street").await?.len(), 2);
        assert_eq!(search_charities(&db, "").await?.len(), 2);
        assert!(search_charities(&db, "bakery").await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_charity_contact() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, charity) = create_test_charity(&db, "Soup Kitchen").await?;

        let updated = update_charity_contact(
            &db,
            charity.id,
            &ContactUpdate {
                address: Some("5 Harbour Road".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.address, "5 Harbour Road");
        assert_eq!(updated.name, "Soup Kitchen");

        let invalid = update_charity_contact(
            &db,
            charity.id,
            &ContactUpdate {
                phone: Some("42".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(invalid.is_err());

        let missing = update_charity_contact(&db, 999, &ContactUpdate::default()).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_listings_are_alphabetical() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_organization(&db, "Zeta Market").await?;
        create_test_organization(&db, "Alpha Bistro").await?;
        create_test_factory(&db, "Compost Co").await?;

        let hotels = list_hotels(&db).await?;
        assert_eq!(hotels[0].name, "Alpha Bistro");
        assert_eq!(hotels[1].name, "Zeta Market");
        assert_eq!(list_factories(&db).await?.len(), 1);

        Ok(())
    }
}
