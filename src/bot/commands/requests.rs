//! Request Discord commands - deliveries for charities, pickups for factories.
//!
//! Organizations move deliveries along and decide on factory requests for
//! their own tickets; admins may act on any of them.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{access, input},
        },
        core::{profile, requests, ticket},
        entities::{Role, delivery_request, enums::enum_label, factory_request},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Most requests shown in one listing
    const LIST_LIMIT: usize = 20;

    /// Checks that the invoking user is an admin or the organization that
    /// posted `ticket_id`.
    async fn require_ticket_owner(
        ctx: poise::Context<'_, BotData, Error>,
        ticket_id: i64,
        action: &'static str,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let account = access::require_role(ctx, &[Role::Organization, Role::Admin], action).await?;
        if account.role == Role::Admin {
            return Ok(());
        }

        let org = access::require_organization(ctx, action).await?;
        let food = ticket::get_ticket(db, ticket_id)
            .await?
            .ok_or_else(|| Error::not_found("Ticket", ticket_id))?;
        if food.organization_id == org.id {
            Ok(())
        } else {
            Err(Error::Forbidden {
                role: enum_label(&account.role),
                action,
            })
        }
    }

    fn delivery_line(d: &delivery_request::Model) -> String {
        let mut line = format!(
            "#{} | ticket #{} | {} | {} → {}",
            d.id,
            d.ticket_id,
            enum_label(&d.status),
            d.pickup_address,
            d.dropoff_address
        );
        if let Some(at) = d.scheduled_for {
            line.push_str(&format!(" | {}", at.format("%Y-%m-%d %H:%M")));
        }
        line
    }

    fn factory_request_line(r: &factory_request::Model) -> String {
        let mut line = format!(
            "#{} | ticket #{} | factory #{} | {}",
            r.id,
            r.ticket_id,
            r.factory_id,
            enum_label(&r.status)
        );
        if let Some(note) = &r.note {
            line.push_str(&format!(" | {note}"));
        }
        line
    }

    /// Asks for delivery of a ticket your charity accepted.
    #[poise::command(slash_command)]
    pub async fn delivery_request(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Accepted ticket number"] ticket_id: i64,
        #[description = "Drop-off address (defaults to your address)"] dropoff_address: Option<
            String,
        >,
        #[description = "Preferred time, YYYY-MM-DD HH:MM (UTC)"] scheduled_for: Option<String>,
    ) -> Result<()> {
        let charity = access::require_charity(ctx, "request deliveries").await?;
        let scheduled_for = input::non_blank(scheduled_for)
            .map(|text| input::parse_datetime("scheduled for", &text))
            .transpose()?;

        let request = requests::create_delivery_request(
            &ctx.data().database,
            ticket_id,
            charity.id,
            input::non_blank(dropoff_address),
            scheduled_for,
        )
        .await?;

        ctx.say(format!(
            "🚚 Delivery #{} requested.\n{}",
            request.id,
            delivery_line(&request)
        ))
        .await?;
        Ok(())
    }

    /// Moves a delivery to its next step: pending → in transit → delivered.
    #[poise::command(slash_command, prefix_command)]
    pub async fn delivery_advance(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Delivery number"] request_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let request = requests::get_delivery_request(db, request_id)
            .await?
            .ok_or_else(|| Error::not_found("Delivery request", request_id))?;
        require_ticket_owner(ctx, request.ticket_id, "update this delivery").await?;

        let updated = requests::advance_delivery(db, request_id).await?;
        ctx.say(format!(
            "✅ Delivery #{} is now {}.",
            updated.id,
            enum_label(&updated.status)
        ))
        .await?;
        Ok(())
    }

    /// Cancels a delivery that has not left yet.
    #[poise::command(slash_command, prefix_command)]
    pub async fn delivery_cancel(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Delivery number"] request_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let account =
            access::require_role(ctx, &[Role::Charity, Role::Admin], "cancel deliveries").await?;
        let request = requests::get_delivery_request(db, request_id)
            .await?
            .ok_or_else(|| Error::not_found("Delivery request", request_id))?;

        if account.role == Role::Charity {
            let charity = access::require_charity(ctx, "cancel deliveries").await?;
            if request.charity_id != charity.id {
                return Err(Error::Forbidden {
                    role: enum_label(&account.role),
                    action: "cancel another charity's delivery",
                });
            }
        }

        let cancelled = requests::cancel_delivery(db, request_id).await?;
        ctx.say(format!("🚫 Delivery #{} cancelled.", cancelled.id))
            .await?;
        Ok(())
    }

    /// Lists the deliveries that concern you.
    #[poise::command(slash_command, prefix_command)]
    pub async fn deliveries(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let account = access::require_role(
            ctx,
            &[Role::Charity, Role::Organization, Role::Admin],
            "view deliveries",
        )
        .await?;

        let rows = match account.role {
            Role::Charity => {
                let charity = access::require_charity(ctx, "view deliveries").await?;
                requests::list_deliveries_for_charity(db, charity.id).await?
            }
            Role::Organization => {
                let org = access::require_organization(ctx, "view deliveries").await?;
                requests::list_deliveries_for_organization(db, org.id).await?
            }
            _ => requests::list_deliveries(db).await?,
        };

        if rows.is_empty() {
            ctx.say("📭 No deliveries yet.").await?;
            return Ok(());
        }

        let mut response = "🚚 **Deliveries**\n".to_string();
        for d in rows.iter().take(LIST_LIMIT) {
            writeln!(response, "{}", delivery_line(d))?;
        }
        ctx.say(response).await?;
        Ok(())
    }

    /// Asks for an expired or factory-routed ticket.
    #[poise::command(slash_command)]
    pub async fn factory_request(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ticket number"] ticket_id: i64,
        #[description = "Note for the organization (e.g. pickup window)"] note: Option<String>,
    ) -> Result<()> {
        let factory = access::require_factory(ctx, "request tickets").await?;
        let request = requests::create_factory_request(
            &ctx.data().database,
            ticket_id,
            factory.id,
            input::non_blank(note),
        )
        .await?;

        ctx.say(format!(
            "♻️ Request #{} sent for ticket #{}. The organization will approve or reject it.",
            request.id, request.ticket_id
        ))
        .await?;
        Ok(())
    }

    /// Hands a ticket to the requesting factory. Competing requests are rejected.
    #[poise::command(slash_command, prefix_command)]
    pub async fn factory_approve(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Factory request number"] request_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let (request, _) = requests::get_factory_request_with_ticket(db, request_id).await?;
        require_ticket_owner(ctx, request.ticket_id, "approve this request").await?;

        let approved = requests::approve_factory_request(db, request_id).await?;
        let factory_name = profile::get_factory(db, approved.factory_id)
            .await?
            .map_or_else(|| format!("factory #{}", approved.factory_id), |f| f.name);

        ctx.say(format!(
            "✅ Ticket #{} goes to {factory_name} for recycling.",
            approved.ticket_id
        ))
        .await?;
        Ok(())
    }

    /// Turns a factory request down.
    #[poise::command(slash_command, prefix_command)]
    pub async fn factory_reject(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Factory request number"] request_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let (request, _) = requests::get_factory_request_with_ticket(db, request_id).await?;
        require_ticket_owner(ctx, request.ticket_id, "reject this request").await?;

        let rejected = requests::reject_factory_request(db, request_id).await?;
        ctx.say(format!("🚫 Factory request #{} rejected.", rejected.id))
            .await?;
        Ok(())
    }

    /// Lists the factory requests that concern you.
    #[poise::command(slash_command, prefix_command)]
    pub async fn factory_requests(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let account = access::require_role(
            ctx,
            &[Role::Factory, Role::Organization, Role::Admin],
            "view factory requests",
        )
        .await?;

        let rows = match account.role {
            Role::Factory => {
                let factory = access::require_factory(ctx, "view factory requests").await?;
                requests::list_factory_requests_for_factory(db, factory.id).await?
            }
            Role::Organization => {
                let org = access::require_organization(ctx, "view factory requests").await?;
                requests::list_factory_requests_for_organization(db, org.id).await?
            }
            _ => requests::list_factory_requests(db).await?,
        };

        if rows.is_empty() {
            ctx.say("📭 No factory requests yet.").await?;
            return Ok(());
        }

        let mut response = "♻️ **Factory requests**\n".to_string();
        for r in rows.iter().take(LIST_LIMIT) {
            writeln!(response, "{}", factory_request_line(r))?;
        }
        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
