//! General Discord commands - ping, help and the role dashboard.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::access},
        core::{navigation::Dashboard, profile, stats},
        entities::{Role, enums::enum_label},
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**FoodBridge Help**\n\
        Surplus food goes from organizations to charities, expired food to factories.\n\n\
        **Account**\n\
        • `/signup` `/signin` `/signout` `/whoami` - Manage your session.\n\
        • `/profile_update` `/delete_account` - Edit or remove your account.\n\
        • `/preference set|list` - Remember settings such as your ticket sort order.\n\n\
        **Food**\n\
        • `/ticket_create` - Organizations post surplus food.\n\
        • `/tickets` `/ticket_info` - Browse tickets visible to your role.\n\
        • `/ticket_accept` `/ticket_decline` - Charities answer donation tickets.\n\
        • `/delivery_request` `/deliveries` - Arrange and track deliveries.\n\
        • `/factory_request` `/factory_requests` - Factories claim expired food.\n\n\
        **Money**\n\
        • `/donate` - One-off card donation, no account needed.\n\
        • `/plans` `/subscribe` `/subscriptions` - Recurring donations.\n\n\
        **Utility**\n\
        • `/dashboard` - Your landing view.\n\
        • `/ping` - Checks if the bot is responsive.";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows the landing view for your role with your current numbers.
    #[allow(clippy::too_many_lines)] // One section per role
    #[poise::command(slash_command)]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let account = access::current_user(ctx).await?;
        let role = account.as_ref().map_or(Role::Guest, |a| a.role);
        let view = Dashboard::for_role(role);

        let mut numbers = String::new();
        if let Some(account) = &account {
            match role {
                Role::Organization => {
                    if let Some(org) = profile::get_hotel_by_user(db, account.id).await? {
                        let d = stats::organization_dashboard(db, org.id).await?;
                        writeln!(numbers, "**Tickets posted:** {}", d.tickets_total)?;
                        for entry in d.breakdown.iter().filter(|e| e.count > 0) {
                            writeln!(
                                numbers,
                                "• {}: {} ({:.1}%)",
                                enum_label(&entry.status),
                                entry.count,
                                entry.percent
                            )?;
                        }
                        writeln!(
                            numbers,
                            "**Accepted:** {}",
                            stats::format_progress_bar(d.acceptance_rate, Some(10))
                        )?;
                        writeln!(numbers, "**Open deliveries:** {}", d.open_deliveries)?;
                        writeln!(
                            numbers,
                            "**Factory requests waiting:** {}",
                            d.pending_factory_requests
                        )?;
                    }
                }
                Role::Charity => {
                    if let Some(charity) = profile::get_charity_by_user(db, account.id).await? {
                        let today = Utc::now().date_naive();
                        let d = stats::charity_dashboard(db, charity.id, today).await?;
                        writeln!(numbers, "**Tickets open to you:** {}", d.available_tickets)?;
                        writeln!(numbers, "**Tickets accepted:** {}", d.accepted_tickets)?;
                        writeln!(
                            numbers,
                            "**Deliveries:** {} open, {} delivered",
                            d.open_deliveries, d.delivered
                        )?;
                        writeln!(
                            numbers,
                            "**Money received:** {} from {} donation(s)",
                            stats::format_amount(d.donations.total),
                            d.donations.count
                        )?;
                    }
                }
                Role::Factory => {
                    if let Some(factory) = profile::get_factory_by_user(db, account.id).await? {
                        let d = stats::factory_dashboard(db, factory.id).await?;
                        writeln!(numbers, "**Tickets available:** {}", d.available_tickets)?;
                        writeln!(
                            numbers,
                            "**Requests:** {} pending, {} approved",
                            d.pending_requests, d.approved_requests
                        )?;
                        writeln!(
                            numbers,
                            "**Approved:** {}",
                            stats::format_progress_bar(d.approval_rate, Some(10))
                        )?;
                    }
                }
                Role::Admin => {
                    let d = stats::admin_overview(db).await?;
                    writeln!(numbers, "**Tickets:** {}", d.tickets_total)?;
                    writeln!(
                        numbers,
                        "**Donations:** {} total",
                        stats::format_amount(d.donations.total)
                    )?;
                    writeln!(
                        numbers,
                        "**Active subscriptions:** {}",
                        d.active_subscriptions
                    )?;
                }
                Role::Guest => {}
            }
        }

        let commands: Vec<String> = view
            .commands
            .iter()
            .map(|(name, description)| format!("`{name}` - {description}"))
            .collect();

        let mut embed = serenity::CreateEmbed::default()
            .title(view.title)
            .description(view.summary)
            .color(0x0027_AE60)
            .field("Commands", commands.join("\n"), false);
        if !numbers.is_empty() {
            embed = embed.field("Your numbers", numbers, false);
        }
        if let Some(account) = &account {
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "Signed in as {}",
                account.display_name
            )));
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
