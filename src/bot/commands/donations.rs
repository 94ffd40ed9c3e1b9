//! Donation Discord commands - one-off card donations and subscriptions.
//!
//! Card details only ever appear in ephemeral replies, masked to the last four
//! digits.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{access, autocomplete, input},
        },
        core::{
            payment::{self, Donation},
            profile, stats,
            subscription::{self, NewSubscription},
            validation::{self, CardDetails},
        },
        entities::{SubscriptionStatus, enums::enum_label},
        errors::{Error, Result},
    };
    use chrono::Utc;
    use std::fmt::Write;

    /// Makes a one-off card donation. No account needed.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, ephemeral)]
    pub async fn donate(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Amount in dollars"] amount: f64,
        #[description = "16-digit card number"] card_number: String,
        #[description = "Card expiry, MM/YY"] expiry: String,
        #[description = "Security code"] cvv: String,
        #[description = "Name on the card"] card_holder: String,
        #[description = "Charity to support (optional)"]
        #[autocomplete = "autocomplete::autocomplete_charity"]
        charity: Option<String>,
        #[description = "Name to show on the donation"] donor_name: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let account = access::current_user(ctx).await?;

        let charity = match input::non_blank(charity) {
            Some(name) => Some(
                profile::list_charities(db)
                    .await?
                    .into_iter()
                    .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
                    .ok_or_else(|| Error::not_found("Charity", name))?,
            ),
            None => None,
        };

        let donor_name = input::non_blank(donor_name)
            .or_else(|| account.as_ref().map(|a| a.display_name.clone()))
            .unwrap_or_else(|| "Anonymous guest".to_string());

        // The simulated payment takes a moment
        ctx.defer_ephemeral().await?;

        let recorded = payment::donate(
            db,
            &ctx.data().payments,
            Donation {
                user_id: account.as_ref().map(|a| a.id),
                donor_name,
                charity_id: charity.as_ref().map(|c| c.id),
                amount,
                card: CardDetails {
                    number: card_number,
                    expiry,
                    cvv,
                    holder: card_holder,
                },
            },
            Utc::now().date_naive(),
        )
        .await?;

        let mut response = format!(
            "💚 Thank you, {}! Your donation of {} was received.\n",
            recorded.donor_name,
            stats::format_amount(recorded.amount)
        );
        if let Some(charity) = &charity {
            writeln!(response, "🏠 It goes to {}.", charity.name)?;
        }
        writeln!(
            response,
            "💳 Card {} | Reference `{}`",
            validation::mask_card_number(&recorded.card_last4),
            recorded.reference
        )?;

        ctx.say(response).await?;
        Ok(())
    }

    /// Lists the recurring donation plans.
    #[poise::command(slash_command, prefix_command)]
    pub async fn plans(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let config = &ctx.data().config;
        if config.subscription_plans.is_empty() {
            ctx.say("ℹ️ No subscription plans are offered right now.")
                .await?;
            return Ok(());
        }

        let mut response = "🔁 **Donation plans**\n".to_string();
        for plan in &config.subscription_plans {
            writeln!(
                response,
                "• **{}** - {} every {} month(s)",
                plan.name,
                stats::format_amount(plan.amount),
                plan.interval_months
            )?;
        }
        response.push_str("\nSubscribe with `/subscribe`; promo codes apply to the first charge.");

        ctx.say(response).await?;
        Ok(())
    }

    /// Starts a recurring donation.
    #[poise::command(slash_command, ephemeral)]
    pub async fn subscribe(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Plan name"]
        #[autocomplete = "autocomplete::autocomplete_plan"]
        plan: String,
        #[description = "16-digit card number"] card_number: String,
        #[description = "Card expiry, MM/YY"] expiry: String,
        #[description = "Security code"] cvv: String,
        #[description = "Name on the card"] card_holder: String,
        #[description = "Promo code"] promo_code: Option<String>,
    ) -> Result<()> {
        let account = access::require_user(ctx).await?;
        ctx.defer_ephemeral().await?;

        let created = subscription::subscribe(
            &ctx.data().database,
            &ctx.data().payments,
            &ctx.data().config,
            NewSubscription {
                user_id: account.id,
                plan,
                promo_code: input::non_blank(promo_code),
                card: CardDetails {
                    number: card_number,
                    expiry,
                    cvv,
                    holder: card_holder,
                },
            },
            Utc::now().date_naive(),
        )
        .await?;

        let mut response = format!(
            "🔁 Subscribed to **{}** (#{}) at {} per period.\n",
            created.plan,
            created.id,
            stats::format_amount(created.amount)
        );
        if created.discount_percent > 0 {
            writeln!(response, "🏷️ {}% promo discount applied.", created.discount_percent)?;
        }
        writeln!(
            response,
            "📅 Next billing date: {}",
            created.next_billing_date.format("%Y-%m-%d")
        )?;

        ctx.say(response).await?;
        Ok(())
    }

    /// Cancels one of your subscriptions.
    #[poise::command(slash_command, prefix_command)]
    pub async fn unsubscribe(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Subscription number (see /subscriptions)"] subscription_id: i64,
    ) -> Result<()> {
        let account = access::require_user(ctx).await?;
        let cancelled =
            subscription::cancel_subscription(&ctx.data().database, account.id, subscription_id)
                .await?;

        ctx.say(format!(
            "✅ Subscription #{} ({}) cancelled. No further charges.",
            cancelled.id, cancelled.plan
        ))
        .await?;
        Ok(())
    }

    /// Lists your subscriptions.
    #[poise::command(slash_command, prefix_command)]
    pub async fn subscriptions(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let account = access::require_user(ctx).await?;
        let rows = subscription::list_for_user(&ctx.data().database, account.id).await?;

        if rows.is_empty() {
            ctx.say("ℹ️ You have no subscriptions. See `/plans`.").await?;
            return Ok(());
        }

        let mut response = "🔁 **Your subscriptions**\n".to_string();
        for s in &rows {
            let next = if s.status == SubscriptionStatus::Active {
                format!("next {}", s.next_billing_date.format("%Y-%m-%d"))
            } else {
                "no further charges".to_string()
            };
            writeln!(
                response,
                "#{} | {} | {} | {} | {next}",
                s.id,
                s.plan,
                stats::format_amount(s.amount),
                enum_label(&s.status)
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
