//! Recurring donation subscriptions.
//!
//! Plans come from `config.toml`. Subscribing charges the first period through
//! the payment simulator, optionally discounted by a promo code.

use crate::{
    config::AppConfig,
    core::{
        payment::PaymentSimulator,
        promo::{self, apply_discount},
        validation::CardDetails,
    },
    entities::{Subscription, SubscriptionStatus, subscription},
    errors::{Error, Result},
};
use chrono::{Months, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Subscription form.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: i64,
    pub plan: String,
    pub promo_code: Option<String>,
    pub card: CardDetails,
}

/// First billing date after `start` for a plan billed every `interval_months`.
pub fn next_billing_date(start: NaiveDate, interval_months: u32) -> Result<NaiveDate> {
    start
        .checked_add_months(Months::new(interval_months))
        .ok_or_else(|| Error::validation("plan", "billing date out of range"))
}

/// Subscribes a user to a configured plan.
#[instrument(skip(db, payments, config, form), fields(user_id = form.user_id, plan = %form.plan))]
pub async fn subscribe(
    db: &DatabaseConnection,
    payments: &PaymentSimulator,
    config: &AppConfig,
    form: NewSubscription,
    today: NaiveDate,
) -> Result<subscription::Model> {
    let plan = config
        .plan(&form.plan)
        .ok_or_else(|| Error::validation("plan", format!("unknown plan '{}'", form.plan.trim())))?;

    let already = Subscription::find()
        .filter(subscription::Column::UserId.eq(form.user_id))
        .filter(subscription::Column::Plan.eq(plan.name.as_str()))
        .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
        .one(db)
        .await?;
    if already.is_some() {
        return Err(Error::validation(
            "plan",
            format!("already subscribed to {}", plan.name),
        ));
    }

    let code = form.promo_code.filter(|c| !c.trim().is_empty());
    let next_billing = next_billing_date(today, plan.interval_months)?;

    // The code is reserved and the row written before the card is charged;
    // a failed charge drops the transaction and rolls both back.
    let txn = db.begin().await?;
    let (promo_code_id, discount_percent) = match &code {
        Some(code) => {
            let promo = promo::redeem(&txn, code, today).await?;
            (Some(promo.id), promo.discount_percent)
        }
        None => (None, 0),
    };
    let amount = apply_discount(plan.amount, discount_percent);

    let model = subscription::ActiveModel {
        user_id: Set(form.user_id),
        plan: Set(plan.name.clone()),
        amount: Set(amount),
        discount_percent: Set(discount_percent),
        status: Set(SubscriptionStatus::Active),
        promo_code_id: Set(promo_code_id),
        started_at: Set(Utc::now()),
        next_billing_date: Set(next_billing),
        cancelled_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    // A fully discounted period has nothing to charge, but the card on file
    // must still be valid for later periods.
    let reference = if amount > 0.0 {
        Some(payments.charge(&form.card, amount, today).await?.reference)
    } else {
        form.card.validate(today)?;
        None
    };

    txn.commit().await.inspect_err(|e| {
        warn!(?reference, error = %e, "Subscription not saved after a successful charge");
    })?;

    info!(subscription_id = model.id, amount, "Subscription started");
    Ok(model)
}

/// Cancels one of the user's active subscriptions.
pub async fn cancel_subscription(
    db: &DatabaseConnection,
    user_id: i64,
    subscription_id: i64,
) -> Result<subscription::Model> {
    let current = Subscription::find_by_id(subscription_id)
        .filter(subscription::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Subscription", subscription_id))?;

    if current.status == SubscriptionStatus::Cancelled {
        return Err(Error::validation("subscription", "is already cancelled"));
    }

    let mut active_model: subscription::ActiveModel = current.into();
    active_model.status = Set(SubscriptionStatus::Cancelled);
    active_model.cancelled_at = Set(Some(Utc::now()));
    let cancelled = active_model.update(db).await?;

    info!(subscription_id, user_id, "Subscription cancelled");
    Ok(cancelled)
}

/// A user's subscriptions, newest first.
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<subscription::Model>> {
    Subscription::find()
        .filter(subscription::Column::UserId.eq(user_id))
        .order_by_desc(subscription::Column::StartedAt)
        .order_by_desc(subscription::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every active subscription.
pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<subscription::Model>> {
    Subscription::find()
        .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
        .order_by_desc(subscription::Column::StartedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp, clippy::unwrap_used)]
    use super::*;
    use crate::config::settings::parse_config;
    use crate::test_utils::*;
    use std::time::Duration;

    fn form(user_id: i64, plan: &str, promo_code: Option<&str>) -> NewSubscription {
        NewSubscription {
            user_id,
            plan: plan.to_string(),
            promo_code: promo_code.map(str::to_string),
            card: test_card(),
        }
    }

    #[test]
    fn test_next_billing_date_clamps_month_end() {
        let jan_31 = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        assert_eq!(
            next_billing_date(jan_31, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
        assert_eq!(
            next_billing_date(jan_31, 12).unwrap(),
            NaiveDate::from_ymd_opt(2027, 1, 31).unwrap()
        );
    }

    #[tokio::test]
    async fn test_subscribe_with_promo_code() -> Result<()> {
        let db = setup_test_db().await?;
        let payments = PaymentSimulator::new(Duration::ZERO);
        let config = AppConfig::default();
        let user = create_test_guest(&db, "donor@example.org").await?;
        promo::create_promo_code(&db, "WELCOME10", 10, Some(1), None).await?;

        let monthly = form(user.id, "Monthly", Some("welcome10"));
        let sub = subscribe(&db, &payments, &config, monthly, today()).await?;
        assert_eq!(sub.plan, "monthly");
        assert_eq!(sub.amount, 9.0);
        assert_eq!(sub.discount_percent, 10);
        assert!(sub.promo_code_id.is_some());
        assert_eq!(sub.next_billing_date, next_billing_date(today(), 1)?);

        // The single use is spent
        let yearly = form(user.id, "yearly", Some("WELCOME10"));
        let result = subscribe(&db, &payments, &config, yearly, today()).await;
        assert!(matches!(result, Err(Error::PromoCode { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_subscribe_with_full_discount_skips_charge() -> Result<()> {
        let db = setup_test_db().await?;
        let payments = PaymentSimulator::new(Duration::ZERO);
        let config = AppConfig::default();
        let user = create_test_guest(&db, "donor@example.org").await?;
        promo::create_promo_code(&db, "FREE", 100, None, None).await?;

        let free = form(user.id, "monthly", Some("FREE"));
        let sub = subscribe(&db, &payments, &config, free, today()).await?;
        assert_eq!(sub.amount, 0.0);
        assert_eq!(sub.discount_percent, 100);
        assert_eq!(promo::find_by_code(&db, "FREE").await?.unwrap().uses, 1);

        // The card is still checked even though nothing is charged
        let mut bad_card = form(user.id, "yearly", Some("FREE"));
        bad_card.card.number = "4111 1111 1111 111".to_string();
        let result = subscribe(&db, &payments, &config, bad_card, today()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_declined_card_keeps_promo_code_unused() -> Result<()> {
        let db = setup_test_db().await?;
        let payments = PaymentSimulator::new(Duration::ZERO);
        let config = AppConfig::default();
        let user = create_test_guest(&db, "donor@example.org").await?;
        promo::create_promo_code(&db, "ONCE", 50, Some(1), None).await?;

        let mut declined = form(user.id, "monthly", Some("ONCE"));
        declined.card.cvv = "12".to_string();
        let result = subscribe(&db, &payments, &config, declined, today()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        assert_eq!(promo::find_by_code(&db, "ONCE").await?.unwrap().uses, 0);
        assert!(list_for_user(&db, user.id).await?.is_empty());

        // The code is still available for a valid card
        let valid = form(user.id, "monthly", Some("ONCE"));
        let sub = subscribe(&db, &payments, &config, valid, today()).await?;
        assert_eq!(sub.amount, 5.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_subscribe_rejects_unknown_and_duplicate_plans() -> Result<()> {
        let db = setup_test_db().await?;
        let payments = PaymentSimulator::new(Duration::ZERO);
        let config = parse_config(
            r#"
            [[subscription_plans]]
            name = "weekly"
            amount = 3.0
            interval_months = 1
            "#,
        )?;
        let user = create_test_guest(&db, "donor@example.org").await?;

        let unknown = form(user.id, "monthly", None);
        let result = subscribe(&db, &payments, &config, unknown, today()).await;
        assert!(matches!(result, Err(Error::Validation { field: "plan", .. })));

        let weekly = form(user.id, "weekly", None);
        let sub = subscribe(&db, &payments, &config, weekly.clone(), today()).await?;
        assert_eq!(sub.amount, 3.0);
        assert_eq!(sub.discount_percent, 0);

        let result = subscribe(&db, &payments, &config, weekly, today()).await;
        assert!(matches!(result, Err(Error::Validation { field: "plan", .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_subscription() -> Result<()> {
        let db = setup_test_db().await?;
        let payments = PaymentSimulator::new(Duration::ZERO);
        let config = AppConfig::default();
        let owner = create_test_guest(&db, "owner@example.org").await?;
        let other = create_test_guest(&db, "other@example.org").await?;

        let monthly = form(owner.id, "monthly", None);
        let sub = subscribe(&db, &payments, &config, monthly.clone(), today()).await?;

        let not_mine = cancel_subscription(&db, other.id, sub.id).await;
        assert!(matches!(not_mine, Err(Error::NotFound { .. })));

        let cancelled = cancel_subscription(&db, owner.id, sub.id).await?;
        assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
        assert!(cancelled.cancelled_at.is_some());

        let again = cancel_subscription(&db, owner.id, sub.id).await;
        assert!(again.is_err());

        assert_eq!(list_for_user(&db, owner.id).await?.len(), 1);
        assert!(list_active(&db).await?.is_empty());

        // Cancelling frees the plan for a new subscription
        subscribe(&db, &payments, &config, monthly, today()).await?;

        Ok(())
    }
}
