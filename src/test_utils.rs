//! Shared test utilities for `FoodBridge`.
//!
//! Helpers set up an in-memory database and create accounts, profiles and
//! tickets with sensible defaults. Accounts are inserted directly with a fixed
//! password hash so tests do not pay for Argon2 on every fixture.

use crate::{
    core::{
        auth::SignUp,
        profile::{self, Contact},
        ticket::{self, NewTicket},
        validation::CardDetails,
    },
    entities::{OrganizationKind, Role, charity, factory, food_ticket, hotel, user},
    errors::Result,
};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Guest sign-up form with password `password1`.
#[must_use]
pub fn guest_sign_up(email: &str) -> SignUp {
    SignUp {
        email: email.to_string(),
        password: "password1".to_string(),
        display_name: "Test Guest".to_string(),
        phone: None,
        role: Role::Guest,
        profile: None,
    }
}

async fn insert_user(db: &DatabaseConnection, email: &str, role: Role) -> Result<user::Model> {
    let now = Utc::now();
    user::ActiveModel {
        email: Set(email.to_lowercase()),
        password_hash: Set("test-hash".to_string()),
        display_name: Set("Test User".to_string()),
        phone: Set(None),
        role: Set(role),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

fn test_contact(name: &str, street: &str) -> Contact {
    Contact {
        name: name.to_string(),
        address: format!("12 {street}"),
        phone: "01001234567".to_string(),
    }
}

pub async fn create_test_guest(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
    insert_user(db, email, Role::Guest).await
}

/// Charity account and profile. The address is on "Charity Street".
pub async fn create_test_charity(
    db: &DatabaseConnection,
    name: &str,
) -> Result<(user::Model, charity::Model)> {
    let email = format!("charity.{}@example.org", slug(name));
    let account = insert_user(db, &email, Role::Charity).await?;
    let charity = profile::create_charity(
        db,
        account.id,
        test_contact(name, "Charity Street"),
        Some("Test charity".to_string()),
    )
    .await?;
    Ok((account, charity))
}

/// Organization account and profile of kind hotel.
pub async fn create_test_organization(
    db: &DatabaseConnection,
    name: &str,
) -> Result<(user::Model, hotel::Model)> {
    let account = insert_user(
        db,
        &format!("organization.{}@example.org", slug(name)),
        Role::Organization,
    )
    .await?;
    let hotel = profile::create_hotel(
        db,
        account.id,
        test_contact(name, "Market Street"),
        OrganizationKind::Hotel,
    )
    .await?;
    Ok((account, hotel))
}

pub async fn create_test_factory(
    db: &DatabaseConnection,
    name: &str,
) -> Result<(user::Model, factory::Model)> {
    let email = format!("factory.{}@example.org", slug(name));
    let account = insert_user(db, &email, Role::Factory).await?;
    let factory =
        profile::create_factory(db, account.id, test_contact(name, "Industrial Road")).await?;
    Ok((account, factory))
}

/// Fresh database with one organization.
pub async fn setup_with_organization() -> Result<(DatabaseConnection, hotel::Model)> {
    let db = setup_test_db().await?;
    let (_, hotel) = create_test_organization(&db, "Test Hotel").await?;
    Ok((db, hotel))
}

/// Donation ticket form expiring one week after `today`.
#[must_use]
pub fn sample_ticket_form(today: NaiveDate) -> NewTicket {
    NewTicket {
        title: "Leftover buffet".to_string(),
        description: Some("Rice, grilled vegetables and bread".to_string()),
        food_type: "cooked meals".to_string(),
        quantity: 25,
        unit: "portions".to_string(),
        expiry_date: today + Duration::days(7),
        pickup_address: None,
        for_factories: false,
    }
}

/// Pending donation ticket.
pub async fn create_test_ticket(
    db: &DatabaseConnection,
    organization_id: i64,
) -> Result<food_ticket::Model> {
    ticket::create_ticket(db, organization_id, sample_ticket_form(today()), today()).await
}

/// Pending ticket routed to factories.
pub async fn create_test_expiry_ticket(
    db: &DatabaseConnection,
    organization_id: i64,
) -> Result<food_ticket::Model> {
    let form = NewTicket {
        for_factories: true,
        ..sample_ticket_form(today())
    };
    ticket::create_ticket(db, organization_id, form, today()).await
}

/// A card that passes validation for years to come.
#[must_use]
pub fn test_card() -> CardDetails {
    CardDetails {
        number: "4111 1111 1111 1111".to_string(),
        expiry: "12/49".to_string(),
        cvv: "123".to_string(),
        holder: "Test Donor".to_string(),
    }
}
