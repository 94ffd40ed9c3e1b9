//! Role-based landing views.
//!
//! Each role lands on its own dashboard offering the commands that role may
//! use. Guests only get public commands and money donations.

use crate::entities::Role;

/// A landing view: a title and the commands offered on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub title: &'static str,
    pub summary: &'static str,
    /// `(command, description)` pairs in display order
    pub commands: &'static [(&'static str, &'static str)],
}

const GUEST: Dashboard = Dashboard {
    title: "Welcome to FoodBridge",
    summary: "Donate money as a guest, or sign up to join as a charity, organization or factory.",
    commands: &[
        ("/donate", "Make a one-off card donation"),
        ("/plans", "See recurring donation plans"),
        ("/signup", "Create an account"),
        ("/signin", "Sign in to your account"),
    ],
};

const CHARITY: Dashboard = Dashboard {
    title: "Charity dashboard",
    summary: "Claim donated food and arrange its delivery.",
    commands: &[
        ("/tickets", "Browse open donation tickets"),
        ("/ticket_accept", "Accept a ticket"),
        ("/ticket_decline", "Decline a ticket"),
        ("/delivery_request", "Ask for delivery of an accepted ticket"),
        ("/deliveries", "Track your deliveries"),
        ("/profile_update", "Edit your contact details"),
    ],
};

const ORGANIZATION: Dashboard = Dashboard {
    title: "Organization dashboard",
    summary: "Post surplus food and hand expired food to factories.",
    commands: &[
        ("/ticket_create", "Post a food ticket"),
        ("/tickets", "List your tickets"),
        ("/deliveries", "Deliveries picking up from you"),
        ("/factory_requests", "Factory requests for your tickets"),
        ("/factory_approve", "Hand a ticket to a factory"),
        ("/factory_reject", "Turn a factory request down"),
        ("/profile_update", "Edit your contact details"),
    ],
};

const FACTORY: Dashboard = Dashboard {
    title: "Factory dashboard",
    summary: "Collect expired food for recycling.",
    commands: &[
        ("/tickets", "Browse tickets routed to factories"),
        ("/factory_request", "Request a ticket"),
        ("/factory_requests", "Track your requests"),
        ("/profile_update", "Edit your contact details"),
    ],
};

const ADMIN: Dashboard = Dashboard {
    title: "Admin dashboard",
    summary: "Oversee accounts, tickets, donations and promo codes.",
    commands: &[
        ("/overview", "Platform statistics"),
        ("/users", "List accounts"),
        ("/charities", "Search charities"),
        ("/tickets", "All tickets"),
        ("/ticket_sweep", "Expire overdue tickets"),
        ("/promo", "Manage promo codes"),
    ],
};

impl Dashboard {
    /// Landing view for `role`.
    #[must_use]
    pub const fn for_role(role: Role) -> &'static Self {
        match role {
            Role::Guest => &GUEST,
            Role::Charity => &CHARITY,
            Role::Organization => &ORGANIZATION,
            Role::Factory => &FACTORY,
            Role::Admin => &ADMIN,
        }
    }

    /// Whether `command` is offered on this view.
    #[must_use]
    pub fn offers(&self, command: &str) -> bool {
        self.commands.iter().any(|(name, _)| *name == command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_every_role_has_a_dashboard() {
        for role in Role::iter() {
            let dashboard = Dashboard::for_role(role);
            assert!(!dashboard.commands.is_empty());
            assert!(dashboard.commands.iter().all(|(name, _)| name.starts_with('/')));
        }
    }

    #[test]
    fn test_role_specific_commands() {
        assert!(Dashboard::for_role(Role::Organization).offers("/ticket_create"));
        assert!(!Dashboard::for_role(Role::Charity).offers("/ticket_create"));
        assert!(Dashboard::for_role(Role::Factory).offers("/factory_request"));
        assert!(Dashboard::for_role(Role::Guest).offers("/donate"));
        assert!(!Dashboard::for_role(Role::Guest).offers("/tickets"));
        assert!(Dashboard::for_role(Role::Admin).offers("/overview"));
    }
}
