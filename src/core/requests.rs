//! Delivery and factory request business logic.
//!
//! Delivery requests move accepted food from the organization to the charity
//! that accepted it. Factory requests let recyclers claim tickets that can no
//! longer go to charities; approving one converts the ticket.

use crate::{
    core::{profile, ticket},
    entities::{
        DeliveryRequest, DeliveryStatus, FactoryRequest, FactoryRequestStatus, TicketStatus,
        delivery_request, enums::enum_label, factory_request, food_ticket,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

fn request_state(request_id: i64, status: String, message: &str) -> Error {
    Error::RequestState {
        request_id,
        status,
        message: message.to_string(),
    }
}

impl DeliveryStatus {
    /// Next step in the delivery flow, `None` once delivered or cancelled.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::InTransit),
            Self::InTransit => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InTransit)
    }
}

/// A charity asks for delivery of a ticket it accepted. Drop-off defaults to
/// the charity's own address.
#[instrument(skip(db))]
pub async fn create_delivery_request(
    db: &DatabaseConnection,
    ticket_id: i64,
    charity_id: i64,
    dropoff_address: Option<String>,
    scheduled_for: Option<DateTimeUtc>,
) -> Result<delivery_request::Model> {
    let food = ticket::get_ticket(db, ticket_id)
        .await?
        .ok_or_else(|| Error::not_found("Ticket", ticket_id))?;

    if food.status != TicketStatus::Accepted || food.charity_id != Some(charity_id) {
        return Err(Error::Forbidden {
            role: "charity".to_string(),
            action: "request delivery of a ticket it has not accepted",
        });
    }

    let open = DeliveryRequest::find()
        .filter(delivery_request::Column::TicketId.eq(ticket_id))
        .filter(
            delivery_request::Column::Status
                .is_in([DeliveryStatus::Pending, DeliveryStatus::InTransit]),
        )
        .one(db)
        .await?;
    if let Some(open) = open {
        return Err(request_state(
            open.id,
            enum_label(&open.status),
            "a delivery is already open for this ticket",
        ));
    }

    let charity = profile::get_charity(db, charity_id)
        .await?
        .ok_or_else(|| Error::not_found("Charity", charity_id))?;
    let dropoff = dropoff_address
        .filter(|a| !a.trim().is_empty())
        .map_or(charity.address, |a| a.trim().to_string());

    let now = Utc::now();
    let request = delivery_request::ActiveModel {
        ticket_id: Set(ticket_id),
        charity_id: Set(charity_id),
        pickup_address: Set(food.pickup_address),
        dropoff_address: Set(dropoff),
        status: Set(DeliveryStatus::Pending),
        scheduled_for: Set(scheduled_for),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(request_id = request.id, ticket_id, "Delivery requested");
    Ok(request)
}

pub async fn get_delivery_request(
    db: &DatabaseConnection,
    request_id: i64,
) -> Result<Option<delivery_request::Model>> {
    DeliveryRequest::find_by_id(request_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn set_delivery_status(
    db: &DatabaseConnection,
    request: delivery_request::Model,
    status: DeliveryStatus,
) -> Result<delivery_request::Model> {
    let mut active_model: delivery_request::ActiveModel = request.into();
    active_model.status = Set(status);
    active_model.updated_at = Set(Utc::now());
    active_model.update(db).await.map_err(Into::into)
}

/// Moves a delivery one step: pending → in transit → delivered.
pub async fn advance_delivery(
    db: &DatabaseConnection,
    request_id: i64,
) -> Result<delivery_request::Model> {
    let request = get_delivery_request(db, request_id)
        .await?
        .ok_or_else(|| Error::not_found("Delivery request", request_id))?;

    let Some(next) = request.status.next() else {
        return Err(request_state(
            request.id,
            enum_label(&request.status),
            "the delivery is already closed",
        ));
    };

    set_delivery_status(db, request, next).await
}

/// Cancels a delivery that has not left yet.
pub async fn cancel_delivery(
    db: &DatabaseConnection,
    request_id: i64,
) -> Result<delivery_request::Model> {
    let request = get_delivery_request(db, request_id)
        .await?
        .ok_or_else(|| Error::not_found("Delivery request", request_id))?;

    if request.status != DeliveryStatus::Pending {
        return Err(request_state(
            request.id,
            enum_label(&request.status),
            "only pending deliveries can be cancelled",
        ));
    }

    set_delivery_status(db, request, DeliveryStatus::Cancelled).await
}

/// Deliveries requested by one charity, newest first.
pub async fn list_deliveries_for_charity(
    db: &DatabaseConnection,
    charity_id: i64,
) -> Result<Vec<delivery_request::Model>> {
    DeliveryRequest::find()
        .filter(delivery_request::Column::CharityId.eq(charity_id))
        .order_by_desc(delivery_request::Column::CreatedAt)
        .order_by_desc(delivery_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deliveries picking up from one organization, newest first.
pub async fn list_deliveries_for_organization(
    db: &DatabaseConnection,
    organization_id: i64,
) -> Result<Vec<delivery_request::Model>> {
    let ticket_ids: Vec<i64> = ticket::list_for_organization(db, organization_id)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    DeliveryRequest::find()
        .filter(delivery_request::Column::TicketId.is_in(ticket_ids))
        .order_by_desc(delivery_request::Column::CreatedAt)
        .order_by_desc(delivery_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every delivery, newest first.
pub async fn list_deliveries(db: &DatabaseConnection) -> Result<Vec<delivery_request::Model>> {
    DeliveryRequest::find()
        .order_by_desc(delivery_request::Column::CreatedAt)
        .order_by_desc(delivery_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A factory asks to take a ticket routed to factories.
#[instrument(skip(db, note))]
pub async fn create_factory_request(
    db: &DatabaseConnection,
    ticket_id: i64,
    factory_id: i64,
    note: Option<String>,
) -> Result<factory_request::Model> {
    let food = ticket::get_ticket(db, ticket_id)
        .await?
        .ok_or_else(|| Error::not_found("Ticket", ticket_id))?;

    if !ticket::is_factory_routable(&food) || food.status.is_terminal() {
        return Err(Error::Forbidden {
            role: "factory".to_string(),
            action: "request a ticket that is not available to factories",
        });
    }

    let duplicate = FactoryRequest::find()
        .filter(factory_request::Column::TicketId.eq(ticket_id))
        .filter(factory_request::Column::FactoryId.eq(factory_id))
        .filter(factory_request::Column::Status.eq(FactoryRequestStatus::Pending))
        .one(db)
        .await?;
    if let Some(duplicate) = duplicate {
        return Err(request_state(
            duplicate.id,
            enum_label(&duplicate.status),
            "this factory already asked for the ticket",
        ));
    }

    let now = Utc::now();
    let request = factory_request::ActiveModel {
        ticket_id: Set(ticket_id),
        factory_id: Set(factory_id),
        status: Set(FactoryRequestStatus::Pending),
        note: Set(note.filter(|n| !n.trim().is_empty())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(request_id = request.id, ticket_id, factory_id, "Factory request created");
    Ok(request)
}

pub async fn get_factory_request(
    db: &DatabaseConnection,
    request_id: i64,
) -> Result<Option<factory_request::Model>> {
    FactoryRequest::find_by_id(request_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads a factory request together with its ticket.
pub async fn get_factory_request_with_ticket(
    db: &DatabaseConnection,
    request_id: i64,
) -> Result<(factory_request::Model, food_ticket::Model)> {
    let request = get_factory_request(db, request_id)
        .await?
        .ok_or_else(|| Error::not_found("Factory request", request_id))?;
    let food = ticket::get_ticket(db, request.ticket_id)
        .await?
        .ok_or_else(|| Error::not_found("Ticket", request.ticket_id))?;
    Ok((request, food))
}

/// The organization hands a ticket to a factory: the request is approved, the
/// ticket converted and competing pending requests rejected, all or nothing.
#[instrument(skip(db))]
pub async fn approve_factory_request(
    db: &DatabaseConnection,
    request_id: i64,
) -> Result<factory_request::Model> {
    let txn = db.begin().await?;

    let request = FactoryRequest::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Factory request", request_id))?;

    if request.status != FactoryRequestStatus::Pending {
        return Err(request_state(
            request.id,
            enum_label(&request.status),
            "only pending requests can be approved",
        ));
    }

    ticket::convert_ticket(&txn, request.ticket_id).await?;

    let now = Utc::now();
    FactoryRequest::update_many()
        .set(factory_request::ActiveModel {
            status: Set(FactoryRequestStatus::Rejected),
            updated_at: Set(now),
            ..Default::default()
        })
        .filter(factory_request::Column::TicketId.eq(request.ticket_id))
        .filter(factory_request::Column::Status.eq(FactoryRequestStatus::Pending))
        .filter(factory_request::Column::Id.ne(request.id))
        .exec(&txn)
        .await?;

    let mut active_model: factory_request::ActiveModel = request.into();
    active_model.status = Set(FactoryRequestStatus::Approved);
    active_model.updated_at = Set(now);
    let approved = active_model.update(&txn).await?;

    txn.commit().await?;
    info!(request_id, ticket_id = approved.ticket_id, "Factory request approved");
    Ok(approved)
}

pub async fn reject_factory_request(
    db: &DatabaseConnection,
    request_id: i64,
) -> Result<factory_request::Model> {
    let request = get_factory_request(db, request_id)
        .await?
        .ok_or_else(|| Error::not_found("Factory request", request_id))?;

    if request.status != FactoryRequestStatus::Pending {
        return Err(request_state(
            request.id,
            enum_label(&request.status),
            "only pending requests can be rejected",
        ));
    }

    let mut active_model: factory_request::ActiveModel = request.into();
    active_model.status = Set(FactoryRequestStatus::Rejected);
    active_model.updated_at = Set(Utc::now());
    active_model.update(db).await.map_err(Into::into)
}

/// Requests made by one factory, newest first.
pub async fn list_factory_requests_for_factory(
    db: &DatabaseConnection,
    factory_id: i64,
) -> Result<Vec<factory_request::Model>> {
    FactoryRequest::find()
        .filter(factory_request::Column::FactoryId.eq(factory_id))
        .order_by_desc(factory_request::Column::CreatedAt)
        .order_by_desc(factory_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Requests for tickets posted by one organization, newest first.
pub async fn list_factory_requests_for_organization(
    db: &DatabaseConnection,
    organization_id: i64,
) -> Result<Vec<factory_request::Model>> {
    let ticket_ids: Vec<i64> = ticket::list_for_organization(db, organization_id)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    FactoryRequest::find()
        .filter(factory_request::Column::TicketId.is_in(ticket_ids))
        .order_by_desc(factory_request::Column::CreatedAt)
        .order_by_desc(factory_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every factory request, newest first.
pub async fn list_factory_requests(db: &DatabaseConnection) -> Result<Vec<factory_request::Model>> {
    FactoryRequest::find()
        .order_by_desc(factory_request::Column::CreatedAt)
        .order_by_desc(factory_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
