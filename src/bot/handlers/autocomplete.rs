//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions are filtered case-insensitively by what the user typed so far
//! and capped at Discord's limit of 25 entries.

use crate::{
    bot::BotData,
    core::{filter::TicketSort, profile},
    entities::{OrganizationKind, Role, TicketStatus, enums::enum_labels},
    errors::Error,
};

/// Discord autocomplete limit
const MAX_SUGGESTIONS: usize = 25;

fn matching<I>(options: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let partial_lower = partial.to_lowercase();
    options
        .into_iter()
        .filter(|option| option.to_lowercase().contains(&partial_lower))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Roles open to sign-up. Admin accounts are never offered.
pub async fn autocomplete_role(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let roles = enum_labels::<Role>()
        .into_iter()
        .filter(|role| role != "admin");
    matching(roles, partial)
}

pub async fn autocomplete_organization_kind(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(enum_labels::<OrganizationKind>(), partial)
}

pub async fn autocomplete_ticket_status(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(enum_labels::<TicketStatus>(), partial)
}

pub async fn autocomplete_sort(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(
        TicketSort::ALL.iter().map(|(_, key)| (*key).to_string()),
        partial,
    )
}

/// Plans configured in config.toml.
pub async fn autocomplete_plan(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let plans = ctx
        .data()
        .config
        .subscription_plans
        .iter()
        .map(|plan| plan.name.clone());
    matching(plans, partial)
}

/// Charity names, alphabetically.
pub async fn autocomplete_charity(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(charities) = profile::search_charities(&ctx.data().database, partial).await else {
        return Vec::new();
    };

    charities
        .into_iter()
        .map(|charity| charity.name)
        .take(MAX_SUGGESTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_is_case_insensitive_and_capped() {
        let options = ["Pending", "Accepted", "Expired"].map(str::to_string);
        assert_eq!(matching(options.clone(), "ED"), vec!["Accepted", "Expired"]);
        assert_eq!(matching(options, "").len(), 3);

        let many = (0..40).map(|i| format!("option {i}"));
        assert_eq!(matching(many, "option").len(), MAX_SUGGESTIONS);
    }
}
