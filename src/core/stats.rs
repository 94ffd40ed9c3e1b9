//! Dashboard statistics and formatting.
//!
//! Numbers are computed from fetched rows; the bot layer only lays them out.

use crate::{
    core::{auth, filter::TicketFilter, payment, profile, requests, subscription, ticket},
    entities::{
        DeliveryStatus, FactoryRequestStatus, Role, TicketStatus, charity, enums::enum_label,
        factory, food_ticket, hotel, money_donation,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, Iterable};
use std::collections::BTreeMap;

/// `part` as a share of `total`, in percent with one decimal. Zero when
/// `total` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Count and share of tickets in one status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusCount {
    pub status: TicketStatus,
    pub count: usize,
    pub percent: f64,
}

/// One entry per ticket status, in declaration order, zero counts included.
#[must_use]
pub fn status_breakdown(tickets: &[food_ticket::Model]) -> Vec<StatusCount> {
    let total = tickets.len();
    TicketStatus::iter()
        .map(|status| {
            let count = tickets.iter().filter(|t| t.status == status).count();
            StatusCount {
                status,
                count,
                percent: percentage(count, total),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationSummary {
    pub count: usize,
    pub total: f64,
    pub average: f64,
    pub largest: f64,
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn donation_summary(donations: &[money_donation::Model]) -> DonationSummary {
    if donations.is_empty() {
        return DonationSummary::default();
    }

    let total: f64 = donations.iter().map(|d| d.amount).sum();
    let largest = donations.iter().map(|d| d.amount).fold(0.0, f64::max);

    DonationSummary {
        count: donations.len(),
        total,
        average: total / donations.len() as f64,
        largest,
    }
}

/// Text progress bar like `[████████░░] 80.0%`.
#[must_use]
pub fn format_progress_bar(percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = percent.clamp(0.0, 100.0);

    // clamped is in [0, 100] and length is small
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!("[{}{}] {percent:.1}%", "█".repeat(filled), "░".repeat(empty))
}

/// One breakdown line: `pending: 3 [████░░░░░░] 37.5%`.
#[must_use]
pub fn format_status_row(entry: &StatusCount) -> String {
    format!(
        "{}: {} {}",
        enum_label(&entry.status),
        entry.count,
        format_progress_bar(entry.percent, Some(10))
    )
}

#[must_use]
pub fn format_amount(amount: f64) -> String {
    format!("${amount:.2}")
}

/// One-line ticket description used in listings.
#[must_use]
pub fn format_ticket_summary(ticket: &food_ticket::Model) -> String {
    format!(
        "#{} | {} | {} {} {} | {} | expires {}",
        ticket.id,
        ticket.title,
        ticket.quantity,
        ticket.unit,
        ticket.food_type,
        enum_label(&ticket.status),
        ticket.expiry_date.format("%Y-%m-%d"),
    )
}

/// Landing numbers for a donor organization.
#[derive(Debug, Clone)]
pub struct OrganizationDashboard {
    pub organization: hotel::Model,
    pub tickets_total: usize,
    pub breakdown: Vec<StatusCount>,
    /// Share of decided tickets that charities accepted
    pub acceptance_rate: f64,
    pub open_deliveries: usize,
    pub pending_factory_requests: usize,
}

pub async fn organization_dashboard(
    db: &DatabaseConnection,
    organization_id: i64,
) -> Result<OrganizationDashboard> {
    let organization = profile::get_hotel(db, organization_id)
        .await?
        .ok_or_else(|| Error::not_found("Organization", organization_id))?;
    let tickets = ticket::list_for_organization(db, organization_id).await?;

    let accepted = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Accepted)
        .count();
    let declined = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Declined)
        .count();

    let open_deliveries = requests::list_deliveries_for_organization(db, organization_id)
        .await?
        .iter()
        .filter(|d| d.status.is_open())
        .count();
    let pending_factory_requests =
        requests::list_factory_requests_for_organization(db, organization_id)
            .await?
            .iter()
            .filter(|r| r.status == FactoryRequestStatus::Pending)
            .count();

    Ok(OrganizationDashboard {
        organization,
        tickets_total: tickets.len(),
        breakdown: status_breakdown(&tickets),
        acceptance_rate: percentage(accepted, accepted + declined),
        open_deliveries,
        pending_factory_requests,
    })
}

/// Landing numbers for a charity.
#[derive(Debug, Clone)]
pub struct CharityDashboard {
    pub charity: charity::Model,
    /// Donation tickets currently open to charities
    pub available_tickets: usize,
    pub accepted_tickets: usize,
    pub open_deliveries: usize,
    pub delivered: usize,
    pub donations: DonationSummary,
}

/// Available tickets leave out pending tickets already past their date on
/// `today`.
pub async fn charity_dashboard(
    db: &DatabaseConnection,
    charity_id: i64,
    today: NaiveDate,
) -> Result<CharityDashboard> {
    let charity = profile::get_charity(db, charity_id)
        .await?
        .ok_or_else(|| Error::not_found("Charity", charity_id))?;

    let available_tickets = TicketFilter::visible_to(Role::Charity)
        .excluding_overdue(today)
        .apply(ticket::list_tickets(db).await?)
        .len();
    let accepted_tickets = ticket::list_for_charity(db, charity_id).await?.len();

    let deliveries = requests::list_deliveries_for_charity(db, charity_id).await?;
    let open_deliveries = deliveries.iter().filter(|d| d.status.is_open()).count();
    let delivered = deliveries
        .iter()
        .filter(|d| d.status == DeliveryStatus::Delivered)
        .count();

    let donations = donation_summary(&payment::list_donations_for_charity(db, charity_id).await?);

    Ok(CharityDashboard {
        charity,
        available_tickets,
        accepted_tickets,
        open_deliveries,
        delivered,
        donations,
    })
}

/// Landing numbers for a factory.
#[derive(Debug, Clone)]
pub struct FactoryDashboard {
    pub factory: factory::Model,
    pub available_tickets: usize,
    pub pending_requests: usize,
    pub approved_requests: usize,
    /// Share of decided requests that were approved
    pub approval_rate: f64,
}

pub async fn factory_dashboard(
    db: &DatabaseConnection,
    factory_id: i64,
) -> Result<FactoryDashboard> {
    let factory = profile::get_factory(db, factory_id)
        .await?
        .ok_or_else(|| Error::not_found("Factory", factory_id))?;

    let available_tickets = TicketFilter::visible_to(Role::Factory)
        .apply(ticket::list_tickets(db).await?)
        .len();

    let own = requests::list_factory_requests_for_factory(db, factory_id).await?;
    let count = |status: FactoryRequestStatus| own.iter().filter(|r| r.status == status).count();
    let pending_requests = count(FactoryRequestStatus::Pending);
    let approved_requests = count(FactoryRequestStatus::Approved);
    let rejected = count(FactoryRequestStatus::Rejected);

    Ok(FactoryDashboard {
        factory,
        available_tickets,
        pending_requests,
        approved_requests,
        approval_rate: percentage(approved_requests, approved_requests + rejected),
    })
}

/// Platform-wide numbers for admins.
#[derive(Debug, Clone)]
pub struct AdminOverview {
    pub users_by_role: BTreeMap<String, usize>,
    pub tickets: Vec<StatusCount>,
    pub tickets_total: usize,
    pub donations: DonationSummary,
    pub active_subscriptions: usize,
    /// Sum of active subscription amounts per billing period
    pub recurring_total: f64,
}

pub async fn admin_overview(db: &DatabaseConnection) -> Result<AdminOverview> {
    let tickets = ticket::list_tickets(db).await?;
    let active = subscription::list_active(db).await?;

    Ok(AdminOverview {
        users_by_role: auth::count_users_by_role(db).await?,
        tickets_total: tickets.len(),
        tickets: status_breakdown(&tickets),
        donations: donation_summary(&payment::list_donations(db).await?),
        active_subscriptions: active.len(),
        recurring_total: active.iter().map(|s| s.amount).sum(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp, clippy::unwrap_used)]
    use super::*;
    use crate::core::{payment::Donation, payment::PaymentSimulator};
    use crate::test_utils::*;
    use chrono::Utc;
    use std::time::Duration;

    fn donation(amount: f64) -> money_donation::Model {
        money_donation::Model {
            id: 1,
            user_id: None,
            donor_name: "Anonymous".to_string(),
            charity_id: None,
            amount,
            card_last4: "1111".to_string(),
            reference: "PAY-1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(5, 5), 100.0);
        assert_eq!(percentage(0, 4), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
    }

    #[test]
    fn test_donation_summary() {
        assert_eq!(donation_summary(&[]), DonationSummary::default());

        let summary = donation_summary(&[donation(10.0), donation(30.0), donation(5.0)]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total, 45.0);
        assert_eq!(summary.average, 15.0);
        assert_eq!(summary.largest, 30.0);
    }

    #[test]
    fn test_format_progress_bar() {
        assert_eq!(format_progress_bar(100.0, Some(10)), "[██████████] 100.0%");
        assert_eq!(format_progress_bar(50.0, Some(10)), "[█████░░░░░] 50.0%");
        assert_eq!(format_progress_bar(0.0, None), "[░░░░░░░░░░] 0.0%");
        assert_eq!(format_progress_bar(33.3, Some(4)), "[█░░░] 33.3%");
    }

    #[test]
    fn test_format_status_row_shows_percent_once() {
        let entry = StatusCount {
            status: TicketStatus::Accepted,
            count: 3,
            percent: 37.5,
        };
        let row = format_status_row(&entry);
        assert_eq!(row, "accepted: 3 [████░░░░░░] 37.5%");
        assert_eq!(row.matches('%').count(), 1);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(9.5), "$9.50");
        assert_eq!(format_amount(1234.567), "$1234.57");
    }

    #[tokio::test]
    async fn test_status_breakdown_and_organization_dashboard() -> Result<()> {
        let (db, org) = setup_with_organization().await?;
        let (_, charity) = create_test_charity(&db, "Charity").await?;

        let first = create_test_ticket(&db, org.id).await?;
        let second = create_test_ticket(&db, org.id).await?;
        create_test_ticket(&db, org.id).await?;
        create_test_ticket(&db, org.id).await?;
        ticket::accept_ticket(&db, first.id, charity.id, today()).await?;
        ticket::decline_ticket(&db, second.id, today()).await?;
        requests::create_delivery_request(&db, first.id, charity.id, None, None).await?;

        let dashboard = organization_dashboard(&db, org.id).await?;
        assert_eq!(dashboard.tickets_total, 4);
        assert_eq!(dashboard.acceptance_rate, 50.0);
        assert_eq!(dashboard.open_deliveries, 1);
        assert_eq!(dashboard.pending_factory_requests, 0);

        let pending = &dashboard.breakdown[0];
        assert_eq!(pending.status, TicketStatus::Pending);
        assert_eq!(pending.count, 2);
        assert_eq!(pending.percent, 50.0);
        assert_eq!(dashboard.breakdown.len(), TicketStatus::iter().count());

        let missing = organization_dashboard(&db, 999).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_charity_and_factory_dashboards() -> Result<()> {
        let (db, org) = setup_with_organization().await?;
        let (_, charity) = create_test_charity(&db, "Charity").await?;
        let (_, factory) = create_test_factory(&db, "Compost Co").await?;

        let accepted = create_test_ticket(&db, org.id).await?;
        create_test_ticket(&db, org.id).await?;
        ticket::accept_ticket(&db, accepted.id, charity.id, today()).await?;

        // Posted long ago and never answered
        let posted_on = today() - chrono::Duration::days(40);
        let mut stale = sample_ticket_form(posted_on);
        stale.expiry_date = today() - chrono::Duration::days(30);
        ticket::create_ticket(&db, org.id, stale, posted_on).await?;

        let expiry = create_test_expiry_ticket(&db, org.id).await?;
        let request = requests::create_factory_request(&db, expiry.id, factory.id, None).await?;
        requests::approve_factory_request(&db, request.id).await?;

        let charity_view = charity_dashboard(&db, charity.id, today()).await?;
        assert_eq!(charity_view.available_tickets, 1);
        assert_eq!(charity_view.accepted_tickets, 1);
        assert_eq!(charity_view.open_deliveries, 0);

        let factory_view = factory_dashboard(&db, factory.id).await?;
        assert_eq!(factory_view.available_tickets, 0);
        assert_eq!(factory_view.approved_requests, 1);
        assert_eq!(factory_view.approval_rate, 100.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_overview() -> Result<()> {
        let (db, org) = setup_with_organization().await?;
        create_test_ticket(&db, org.id).await?;
        let payments = PaymentSimulator::new(Duration::ZERO);
        payment::donate(
            &db,
            &payments,
            Donation {
                user_id: None,
                donor_name: "Anonymous".to_string(),
                charity_id: None,
                amount: 20.0,
                card: test_card(),
            },
            today(),
        )
        .await?;

        let overview = admin_overview(&db).await?;
        assert_eq!(overview.tickets_total, 1);
        assert_eq!(overview.users_by_role.get("organization"), Some(&1));
        assert_eq!(overview.donations.total, 20.0);
        assert_eq!(overview.active_subscriptions, 0);

        Ok(())
    }
}
