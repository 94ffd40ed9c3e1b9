//! Food ticket business logic - creation, listing and status transitions.
//!
//! Allowed transitions:
//!
//! ```text
//! pending ──► accepted | declined | expired | converted
//! expired ──► converted
//! ```
//!
//! Every transition is written as a conditional update that only matches the
//! status the caller observed, so two charities racing to accept the same
//! ticket cannot both succeed: the second one gets `InvalidTransition`.

use crate::{
    core::{profile, validation},
    entities::{
        FoodTicket, TicketKind, TicketStatus, enums::enum_label, food_ticket,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

impl TicketStatus {
    /// Whether a ticket in this status may move to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Pending,
                Self::Accepted | Self::Declined | Self::Expired | Self::Converted
            ) | (Self::Expired, Self::Converted)
        )
    }

    /// Accepted, declined and converted tickets never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Declined | Self::Converted)
    }
}

/// Expiry tickets and tickets that expired unclaimed go to factories only.
#[must_use]
pub fn is_factory_routable(ticket: &food_ticket::Model) -> bool {
    ticket.kind == TicketKind::Expiry || ticket.status == TicketStatus::Expired
}

/// Ticket form filled in by an organization.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: Option<String>,
    pub food_type: String,
    pub quantity: i32,
    pub unit: String,
    pub expiry_date: NaiveDate,
    /// Blank means the organization's own address
    pub pickup_address: Option<String>,
    /// Route straight to factories instead of charities
    pub for_factories: bool,
}

fn invalid_transition(ticket: &food_ticket::Model, to: TicketStatus) -> Error {
    Error::InvalidTransition {
        ticket_id: ticket.id,
        from: enum_label(&ticket.status),
        to: enum_label(&to),
    }
}

/// Creates a pending ticket for an organization.
///
/// A ticket whose expiry date has already passed is routed to factories even
/// if the organization did not ask for it.
#[instrument(skip(db, form), fields(title = %form.title))]
pub async fn create_ticket(
    db: &DatabaseConnection,
    organization_id: i64,
    form: NewTicket,
    today: NaiveDate,
) -> Result<food_ticket::Model> {
    let title = validation::validate_required("title", &form.title)?;
    let food_type = validation::validate_required("food type", &form.food_type)?;
    let unit = validation::validate_required("unit", &form.unit)?;
    if form.quantity <= 0 {
        return Err(Error::validation("quantity", "must be greater than zero"));
    }

    let organization = profile::get_hotel(db, organization_id)
        .await?
        .ok_or_else(|| Error::not_found("Organization", organization_id))?;

    let pickup_address = form
        .pickup_address
        .filter(|a| !a.trim().is_empty())
        .map_or(organization.address, |a| a.trim().to_string());

    let kind = if form.for_factories || form.expiry_date < today {
        TicketKind::Expiry
    } else {
        TicketKind::Donation
    };

    let now = Utc::now();
    let ticket = food_ticket::ActiveModel {
        organization_id: Set(organization_id),
        charity_id: Set(None),
        title: Set(title),
        description: Set(form.description.filter(|d| !d.trim().is_empty())),
        food_type: Set(food_type),
        quantity: Set(form.quantity),
        unit: Set(unit),
        kind: Set(kind),
        status: Set(TicketStatus::Pending),
        pickup_address: Set(pickup_address),
        expiry_date: Set(form.expiry_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(ticket_id = ticket.id, organization_id, kind = ?ticket.kind, "Ticket created");
    Ok(ticket)
}

pub async fn get_ticket<C>(db: &C, ticket_id: i64) -> Result<Option<food_ticket::Model>>
where
    C: ConnectionTrait,
{
    FoodTicket::find_by_id(ticket_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_ticket<C>(db: &C, ticket_id: i64) -> Result<food_ticket::Model>
where
    C: ConnectionTrait,
{
    get_ticket(db, ticket_id)
        .await?
        .ok_or_else(|| Error::not_found("Ticket", ticket_id))
}

/// Every ticket, newest first.
pub async fn list_tickets(db: &DatabaseConnection) -> Result<Vec<food_ticket::Model>> {
    FoodTicket::find()
        .order_by_desc(food_ticket::Column::CreatedAt)
        .order_by_desc(food_ticket::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Tickets posted by one organization, newest first.
pub async fn list_for_organization(
    db: &DatabaseConnection,
    organization_id: i64,
) -> Result<Vec<food_ticket::Model>> {
    FoodTicket::find()
        .filter(food_ticket::Column::OrganizationId.eq(organization_id))
        .order_by_desc(food_ticket::Column::CreatedAt)
        .order_by_desc(food_ticket::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Tickets accepted by one charity, newest first.
pub async fn list_for_charity(
    db: &DatabaseConnection,
    charity_id: i64,
) -> Result<Vec<food_ticket::Model>> {
    FoodTicket::find()
        .filter(food_ticket::Column::CharityId.eq(charity_id))
        .order_by_desc(food_ticket::Column::CreatedAt)
        .order_by_desc(food_ticket::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves `ticket` to `to`, but only if it is still in the status it was read with.
async fn transition<C>(
    db: &C,
    ticket: &food_ticket::Model,
    to: TicketStatus,
    charity_id: Option<i64>,
) -> Result<food_ticket::Model>
where
    C: ConnectionTrait,
{
    if !ticket.status.can_transition_to(to) {
        return Err(invalid_transition(ticket, to));
    }

    let mut changes = food_ticket::ActiveModel {
        status: Set(to),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    if let Some(charity_id) = charity_id {
        changes.charity_id = Set(Some(charity_id));
    }

    let result = FoodTicket::update_many()
        .set(changes)
        .filter(food_ticket::Column::Id.eq(ticket.id))
        .filter(food_ticket::Column::Status.eq(ticket.status))
        .exec(db)
        .await?;

    let current = require_ticket(db, ticket.id).await?;
    if result.rows_affected == 0 {
        // Someone else moved the ticket first
        return Err(invalid_transition(&current, to));
    }
    Ok(current)
}

/// Loads a donation ticket a charity is about to answer. A pending ticket
/// already past its expiry date is expired on the spot and refused, since
/// it now belongs to factories.
async fn require_charity_ticket(
    db: &DatabaseConnection,
    ticket_id: i64,
    to: TicketStatus,
    action: &'static str,
    today: NaiveDate,
) -> Result<food_ticket::Model> {
    let ticket = require_ticket(db, ticket_id).await?;
    if ticket.kind == TicketKind::Expiry {
        return Err(Error::Forbidden {
            role: "charity".to_string(),
            action,
        });
    }

    if ticket.status == TicketStatus::Pending && ticket.expiry_date < today {
        let expired = transition(db, &ticket, TicketStatus::Expired, None).await?;
        info!(ticket_id, "Overdue ticket expired on access");
        return Err(invalid_transition(&expired, to));
    }
    Ok(ticket)
}

/// A charity claims a pending donation ticket that has not passed its
/// expiry date.
#[instrument(skip(db))]
pub async fn accept_ticket(
    db: &DatabaseConnection,
    ticket_id: i64,
    charity_id: i64,
    today: NaiveDate,
) -> Result<food_ticket::Model> {
    let ticket = require_charity_ticket(
        db,
        ticket_id,
        TicketStatus::Accepted,
        "accept a ticket routed to factories",
        today,
    )
    .await?;

    let accepted = transition(db, &ticket, TicketStatus::Accepted, Some(charity_id)).await?;
    info!(ticket_id, charity_id, "Ticket accepted");
    Ok(accepted)
}

/// A charity turns down a pending donation ticket.
#[instrument(skip(db))]
pub async fn decline_ticket(
    db: &DatabaseConnection,
    ticket_id: i64,
    today: NaiveDate,
) -> Result<food_ticket::Model> {
    let ticket = require_charity_ticket(
        db,
        ticket_id,
        TicketStatus::Declined,
        "decline a ticket routed to factories",
        today,
    )
    .await?;
    transition(db, &ticket, TicketStatus::Declined, None).await
}

/// Marks a factory-routable ticket as recycled.
pub async fn convert_ticket<C>(db: &C, ticket_id: i64) -> Result<food_ticket::Model>
where
    C: ConnectionTrait,
{
    let ticket = require_ticket(db, ticket_id).await?;
    if !is_factory_routable(&ticket) {
        return Err(invalid_transition(&ticket, TicketStatus::Converted));
    }
    transition(db, &ticket, TicketStatus::Converted, None).await
}

/// Moves every pending ticket whose expiry date is before `today` to expired.
/// Returns how many tickets changed.
#[instrument(skip(db))]
pub async fn expire_overdue(db: &DatabaseConnection, today: NaiveDate) -> Result<u64> {
    let result = FoodTicket::update_many()
        .set(food_ticket::ActiveModel {
            status: Set(TicketStatus::Expired),
            updated_at: Set(Utc::now()),
            ..Default::default()
        })
        .filter(food_ticket::Column::Status.eq(TicketStatus::Pending))
        .filter(food_ticket::Column::ExpiryDate.lt(today))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        info!(count = result.rows_affected, "Expired overdue tickets");
    }
    Ok(result.rows_affected)
}
