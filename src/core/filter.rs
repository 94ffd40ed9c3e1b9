//! In-memory filtering and sorting of fetched ticket rows.
//!
//! Listings fetch tickets once and narrow them here, so the same rules apply
//! whether the rows came from a charity, factory or organization view.

use crate::entities::{Role, TicketKind, TicketStatus, enums::parse_enum, food_ticket};
use chrono::NaiveDate;
use std::cmp::Reverse;

/// Listing order for tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TicketSort {
    #[default]
    Newest,
    Oldest,
    ExpirySoonest,
    QuantityDesc,
}

impl TicketSort {
    /// All orders with their user-facing keys.
    pub const ALL: [(Self, &'static str); 4] = [
        (Self::Newest, "newest"),
        (Self::Oldest, "oldest"),
        (Self::ExpirySoonest, "expiry_soonest"),
        (Self::QuantityDesc, "quantity_desc"),
    ];

    /// Parses a user-facing key, ignoring case.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let key = input.trim().to_lowercase();
        Self::ALL
            .iter()
            .find(|(_, name)| *name == key)
            .map(|(sort, _)| *sort)
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(sort, _)| *sort == self)
            .map_or("newest", |(_, name)| *name)
    }
}

/// Criteria for narrowing a ticket listing. Unset criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub kind: Option<TicketKind>,
    pub organization_id: Option<i64>,
    pub charity_id: Option<i64>,
    /// Case-insensitive text matched against title, description, food type
    /// and pickup address
    pub search: Option<String>,
    /// Hide tickets that are already converted
    pub exclude_converted: bool,
    /// Only tickets that factories may take
    pub factory_routable: bool,
    /// Hide pending tickets whose expiry date is before this day
    pub overdue_as_of: Option<NaiveDate>,
    pub sort: TicketSort,
}

impl TicketFilter {
    /// Default view for a role: charities see open donation tickets, factories
    /// see open tickets routed to them, everyone else sees everything.
    #[must_use]
    pub fn visible_to(role: Role) -> Self {
        match role {
            Role::Charity => Self {
                status: Some(TicketStatus::Pending),
                kind: Some(TicketKind::Donation),
                ..Self::default()
            },
            Role::Factory => Self {
                factory_routable: true,
                exclude_converted: true,
                sort: TicketSort::ExpirySoonest,
                ..Self::default()
            },
            Role::Organization | Role::Admin | Role::Guest => Self::default(),
        }
    }

    /// Sets the status criterion from user text; unknown text is ignored.
    #[must_use]
    pub fn with_status_text(mut self, status: Option<&str>) -> Self {
        if let Some(status) = status.and_then(parse_enum::<TicketStatus>) {
            self.status = Some(status);
        }
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|s| !s.trim().is_empty());
        self
    }

    /// Hides pending tickets that are already past their date on `today`,
    /// even before the expiry sweep has marked them.
    #[must_use]
    pub const fn excluding_overdue(mut self, today: NaiveDate) -> Self {
        self.overdue_as_of = Some(today);
        self
    }

    #[must_use]
    pub const fn with_sort(mut self, sort: TicketSort) -> Self {
        self.sort = sort;
        self
    }

    /// Whether one ticket satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, ticket: &food_ticket::Model) -> bool {
        if self.status.is_some_and(|s| s != ticket.status) {
            return false;
        }
        if self.kind.is_some_and(|k| k != ticket.kind) {
            return false;
        }
        if self
            .organization_id
            .is_some_and(|id| id != ticket.organization_id)
        {
            return false;
        }
        if self
            .charity_id
            .is_some_and(|id| Some(id) != ticket.charity_id)
        {
            return false;
        }
        if self.exclude_converted && ticket.status == TicketStatus::Converted {
            return false;
        }
        if self.factory_routable && !crate::core::ticket::is_factory_routable(ticket) {
            return false;
        }
        if self
            .overdue_as_of
            .is_some_and(|day| ticket.status == TicketStatus::Pending && ticket.expiry_date < day)
        {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            let haystacks = [
                Some(ticket.title.as_str()),
                ticket.description.as_deref(),
                Some(ticket.food_type.as_str()),
                Some(ticket.pickup_address.as_str()),
            ];
            if !haystacks
                .iter()
                .flatten()
                .any(|text| text.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }

    /// Keeps matching tickets and orders them. Ties keep newest id first.
    #[must_use]
    pub fn apply(&self, tickets: Vec<food_ticket::Model>) -> Vec<food_ticket::Model> {
        let mut matching: Vec<_> = tickets.into_iter().filter(|t| self.matches(t)).collect();

        match self.sort {
            TicketSort::Newest => {
                matching.sort_by_key(|t| Reverse((t.created_at, t.id)));
            }
            TicketSort::Oldest => {
                matching.sort_by_key(|t| (t.created_at, t.id));
            }
            TicketSort::ExpirySoonest => {
                matching.sort_by_key(|t| (t.expiry_date, Reverse(t.id)));
            }
            TicketSort::QuantityDesc => {
                matching.sort_by_key(|t| (Reverse(t.quantity), Reverse(t.id)));
            }
        }

        matching
    }
}
