//! Ticket Discord commands - posting, browsing, accepting and declining food.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{access, autocomplete, input},
        },
        core::{
            filter::{TicketFilter, TicketSort},
            profile, session, stats,
            ticket::{self, NewTicket},
        },
        entities::{Role, TicketStatus, enums::enum_label, enums::parse_enum},
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Most tickets shown in one listing
    const LIST_LIMIT: usize = 20;

    /// Posts a food ticket for charities, or for factories when the food is
    /// past its date.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command)]
    pub async fn ticket_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Short title (e.g. 'Leftover buffet')"] title: String,
        #[description = "Type of food (e.g. 'cooked meals', 'bakery')"] food_type: String,
        #[description = "Quantity"] quantity: i32,
        #[description = "Unit (e.g. 'kg', 'portions')"] unit: String,
        #[description = "Expiry date, YYYY-MM-DD"] expiry_date: String,
        #[description = "Details for the charity"] description: Option<String>,
        #[description = "Pickup address (defaults to your address)"] pickup_address: Option<
            String,
        >,
        #[description = "Route to recycling factories instead of charities"]
        for_factories: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let org = access::require_organization(ctx, "post food tickets").await?;
        let expiry_date = input::parse_date("expiry date", &expiry_date)?;

        let created = ticket::create_ticket(
            db,
            org.id,
            NewTicket {
                title,
                description: input::non_blank(description),
                food_type,
                quantity,
                unit,
                expiry_date,
                pickup_address: input::non_blank(pickup_address),
                for_factories: for_factories.unwrap_or(false),
            },
            Utc::now().date_naive(),
        )
        .await?;

        let audience = if ticket::is_factory_routable(&created) {
            "factories"
        } else {
            "charities"
        };
        ctx.say(format!(
            "✅ Ticket #{} posted and visible to {audience}.\n{}",
            created.id,
            stats::format_ticket_summary(&created)
        ))
        .await?;
        Ok(())
    }

    /// Lists the tickets relevant to your role.
    #[poise::command(slash_command)]
    pub async fn tickets(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only tickets with this status"]
        #[autocomplete = "autocomplete::autocomplete_ticket_status"]
        status: Option<String>,
        #[description = "Text to look for in title, description, food type or address"]
        search: Option<String>,
        #[description = "Sort order (defaults to your saved preference)"]
        #[autocomplete = "autocomplete::autocomplete_sort"]
        sort: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let account = access::require_user(ctx).await?;
        ticket::expire_overdue(db, Utc::now().date_naive()).await?;

        let status = input::non_blank(status);
        if let Some(text) = &status {
            if parse_enum::<TicketStatus>(text).is_none() {
                return Err(Error::validation("status", format!("unknown status '{text}'")));
            }
        }

        let mut filter = TicketFilter::visible_to(account.role)
            .with_status_text(status.as_deref())
            .with_search(search);

        match account.role {
            Role::Charity => {
                let charity = access::require_charity(ctx, "browse tickets").await?;
                // Claimed tickets are private to the charity that took them
                if filter.status.is_some_and(|s| s != TicketStatus::Pending) {
                    filter.kind = None;
                    filter.charity_id = Some(charity.id);
                }
                filter = filter.excluding_overdue(Utc::now().date_naive());
            }
            Role::Organization => {
                let org = access::require_organization(ctx, "browse tickets").await?;
                filter.organization_id = Some(org.id);
            }
            Role::Factory | Role::Admin => {}
            Role::Guest => {
                return Err(Error::Forbidden {
                    role: enum_label(&account.role),
                    action: "browse food tickets",
                });
            }
        }

        let requested_sort = match input::non_blank(sort) {
            Some(text) => Some(
                TicketSort::parse(&text)
                    .ok_or_else(|| Error::validation("sort", format!("unknown sort '{text}'")))?,
            ),
            None => session::get_preference(db, &access::discord_id(ctx), session::TICKET_SORT_KEY)
                .await?
                .and_then(|saved| TicketSort::parse(&saved)),
        };
        if let Some(sort) = requested_sort {
            filter = filter.with_sort(sort);
        }

        let rows = match filter.organization_id {
            Some(org_id) => ticket::list_for_organization(db, org_id).await?,
            None => ticket::list_tickets(db).await?,
        };
        let found = filter.apply(rows);

        if found.is_empty() {
            ctx.say("📭 No tickets match.").await?;
            return Ok(());
        }

        let mut description = String::new();
        for t in found.iter().take(LIST_LIMIT) {
            writeln!(description, "{}", stats::format_ticket_summary(t))?;
        }

        let embed = serenity::CreateEmbed::default()
            .title("🍲 Food tickets")
            .description(description)
            .color(0x00E6_7E22)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Showing {} of {} | sorted by {}",
                found.len().min(LIST_LIMIT),
                found.len(),
                filter.sort.key()
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows one ticket in full.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ticket_info(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ticket number"] ticket_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        access::require_role(
            ctx,
            &[Role::Charity, Role::Organization, Role::Factory, Role::Admin],
            "view food tickets",
        )
        .await?;

        let found = ticket::get_ticket(db, ticket_id)
            .await?
            .ok_or_else(|| Error::not_found("Ticket", ticket_id))?;

        let mut response = format!("📋 **Ticket #{}: {}**\n\n", found.id, found.title);
        writeln!(
            response,
            "🥘 {} {} of {}",
            found.quantity, found.unit, found.food_type
        )?;
        if let Some(details) = &found.description {
            writeln!(response, "📝 {details}")?;
        }
        writeln!(response, "📍 Pickup: {}", found.pickup_address)?;
        writeln!(response, "⏳ Expires: {}", found.expiry_date.format("%Y-%m-%d"))?;
        writeln!(
            response,
            "🏷️ Status: {} ({})",
            enum_label(&found.status),
            enum_label(&found.kind)
        )?;
        if let Some(org) = profile::get_hotel(db, found.organization_id).await? {
            writeln!(response, "🏨 From: {} · {}", org.name, org.phone)?;
        }
        if let Some(charity_id) = found.charity_id {
            if let Some(charity) = profile::get_charity(db, charity_id).await? {
                writeln!(response, "🏠 Accepted by: {}", charity.name)?;
            }
        }
        writeln!(
            response,
            "🕒 Posted: {}",
            found.created_at.format("%Y-%m-%d %H:%M UTC")
        )?;

        ctx.say(response).await?;
        Ok(())
    }

    /// Accepts a donation ticket for your charity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ticket_accept(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ticket number"] ticket_id: i64,
    ) -> Result<()> {
        let charity = access::require_charity(ctx, "accept tickets").await?;
        let today = Utc::now().date_naive();
        let accepted =
            ticket::accept_ticket(&ctx.data().database, ticket_id, charity.id, today).await?;

        ctx.say(format!(
            "✅ Ticket #{} accepted by {}. Pick it up at {} or use `/delivery_request`.",
            accepted.id, charity.name, accepted.pickup_address
        ))
        .await?;
        Ok(())
    }

    /// Declines a donation ticket.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ticket_decline(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ticket number"] ticket_id: i64,
    ) -> Result<()> {
        access::require_charity(ctx, "decline tickets").await?;
        let today = Utc::now().date_naive();
        let declined = ticket::decline_ticket(&ctx.data().database, ticket_id, today).await?;

        ctx.say(format!("🚫 Ticket #{} declined.", declined.id))
            .await?;
        Ok(())
    }

    /// Marks every pending ticket past its expiry date as expired.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ticket_sweep(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        access::require_role(
            ctx,
            &[Role::Organization, Role::Admin],
            "expire overdue tickets",
        )
        .await?;

        let count = ticket::expire_overdue(&ctx.data().database, Utc::now().date_naive()).await?;
        if count == 0 {
            ctx.say("ℹ️ No overdue tickets.").await?;
        } else {
            ctx.say(format!(
                "⏳ {count} overdue ticket(s) expired. Factories can now request them."
            ))
            .await?;
        }
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
