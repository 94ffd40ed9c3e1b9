//! Admin Discord commands - accounts, charities, promo codes and the overview.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{access, autocomplete, input},
        },
        core::{auth, profile, promo, stats},
        entities::{Role, enums::enum_label, enums::parse_enum},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Most rows shown in one listing
    const LIST_LIMIT: usize = 25;

    /// Lists accounts, optionally only those with one role.
    #[poise::command(slash_command, ephemeral)]
    pub async fn users(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only accounts with this role"]
        #[autocomplete = "autocomplete::autocomplete_role"]
        role: Option<String>,
    ) -> Result<()> {
        access::require_admin(ctx, "list accounts").await?;

        let role = match input::non_blank(role) {
            Some(text) => Some(
                parse_enum::<Role>(&text)
                    .ok_or_else(|| Error::validation("role", format!("unknown role '{text}'")))?,
            ),
            None => None,
        };

        let accounts = auth::list_users(&ctx.data().database, role).await?;
        if accounts.is_empty() {
            ctx.say("📭 No accounts found.").await?;
            return Ok(());
        }

        let mut response = format!("👥 **Accounts** ({})\n", accounts.len());
        for u in accounts.iter().take(LIST_LIMIT) {
            writeln!(
                response,
                "#{} | {} | {} | {}",
                u.id,
                u.display_name,
                u.email,
                enum_label(&u.role)
            )?;
        }
        if accounts.len() > LIST_LIMIT {
            writeln!(response, "…and {} more", accounts.len() - LIST_LIMIT)?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Lists charities, optionally filtered by name or address.
    #[poise::command(slash_command, prefix_command)]
    pub async fn charities(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Text to look for in the name or address"] search: Option<String>,
    ) -> Result<()> {
        access::require_admin(ctx, "list charities").await?;
        let db = &ctx.data().database;

        let found = match input::non_blank(search) {
            Some(query) => profile::search_charities(db, &query).await?,
            None => profile::list_charities(db).await?,
        };
        if found.is_empty() {
            ctx.say("📭 No charities found.").await?;
            return Ok(());
        }

        let mut response = "🏠 **Charities**\n".to_string();
        for c in found.iter().take(LIST_LIMIT) {
            writeln!(response, "#{} | {} | {} | {}", c.id, c.name, c.address, c.phone)?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Platform-wide numbers.
    #[poise::command(slash_command)]
    pub async fn overview(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        access::require_admin(ctx, "view the platform overview").await?;
        let data = stats::admin_overview(&ctx.data().database).await?;

        let mut accounts = String::new();
        for (role, count) in &data.users_by_role {
            writeln!(accounts, "{role}: {count}")?;
        }
        if accounts.is_empty() {
            accounts.push_str("No accounts yet");
        }

        let mut tickets = String::new();
        for entry in &data.tickets {
            writeln!(tickets, "{}", stats::format_status_row(entry))?;
        }

        let money = format!(
            "{} donation(s), {} total, {} average\n{} active subscription(s), {} per period",
            data.donations.count,
            stats::format_amount(data.donations.total),
            stats::format_amount(data.donations.average),
            data.active_subscriptions,
            stats::format_amount(data.recurring_total)
        );

        let embed = serenity::CreateEmbed::default()
            .title("📊 Platform overview")
            .field("Accounts", accounts, true)
            .field(format!("Tickets ({})", data.tickets_total), tickets, false)
            .field("Money", money, false)
            .color(0x0034_98DB);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Parent command for promo code management.
    #[poise::command(
        slash_command,
        subcommands("promo_add", "promo_list", "promo_disable")
    )]
    pub async fn promo(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Promo code commands. Available subcommands:\n\
            `/promo add` - Create a code\n\
            `/promo list` - Show all codes\n\
            `/promo disable` - Stop a code from being redeemed";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Creates a promo code for subscriptions.
    #[poise::command(slash_command, rename = "add", ephemeral)]
    pub async fn promo_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Code (letters and digits)"] code: String,
        #[description = "Discount percent, 1-100"] discount_percent: i32,
        #[description = "How many times it can be used (blank for unlimited)"] max_uses: Option<
            i32,
        >,
        #[description = "Last valid day, YYYY-MM-DD"] expires_at: Option<String>,
    ) -> Result<()> {
        access::require_admin(ctx, "create promo codes").await?;
        let expires_at = input::non_blank(expires_at)
            .map(|text| input::parse_date("expires at", &text))
            .transpose()?;

        let created = promo::create_promo_code(
            &ctx.data().database,
            &code,
            discount_percent,
            max_uses,
            expires_at,
        )
        .await?;

        ctx.say(format!(
            "🏷️ Promo code `{}` created: {}% off.",
            created.code, created.discount_percent
        ))
        .await?;
        Ok(())
    }

    /// Lists every promo code and its usage.
    #[poise::command(slash_command, rename = "list", ephemeral)]
    pub async fn promo_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        access::require_admin(ctx, "list promo codes").await?;
        let codes = promo::list_promo_codes(&ctx.data().database).await?;

        if codes.is_empty() {
            ctx.say("ℹ️ No promo codes yet. Create one with `/promo add`.")
                .await?;
            return Ok(());
        }

        let mut response = "🏷️ **Promo codes**\n".to_string();
        for p in &codes {
            let uses = p.max_uses.map_or_else(
                || format!("{} uses", p.uses),
                |max| format!("{}/{max} uses", p.uses),
            );
            let expiry = p.expires_at.map_or_else(
                || "no expiry".to_string(),
                |d| format!("until {}", d.format("%Y-%m-%d")),
            );
            let state = if p.is_active { "active" } else { "disabled" };
            writeln!(
                response,
                "`{}` | {}% | {uses} | {expiry} | {state}",
                p.code, p.discount_percent
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Disables a promo code.
    #[poise::command(slash_command, rename = "disable", ephemeral)]
    pub async fn promo_disable(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Code to disable"] code: String,
    ) -> Result<()> {
        access::require_admin(ctx, "disable promo codes").await?;
        let disabled = promo::deactivate(&ctx.data().database, &code).await?;

        ctx.say(format!("🚫 Promo code `{}` disabled.", disabled.code))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
