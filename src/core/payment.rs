//! Simulated card payments and one-off money donations.
//!
//! There is no real gateway: [`PaymentSimulator`] validates the card form,
//! waits a fixed delay and hands back a receipt.

use crate::{
    config::settings::PaymentConfig,
    core::{profile, validation},
    entities::{MoneyDonation, money_donation},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{info, instrument};

static NEXT_REFERENCE: AtomicU64 = AtomicU64::new(1);

/// Rejects amounts that are not finite or not positive.
pub fn validate_amount(amount: f64) -> Result<f64> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount { amount })
    }
}

/// Proof of a simulated charge.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub reference: String,
    pub card_last4: String,
    pub amount: f64,
}

/// Stand-in for a payment gateway.
#[derive(Debug, Clone, Copy)]
pub struct PaymentSimulator {
    delay: Duration,
}

impl PaymentSimulator {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    #[must_use]
    pub const fn from_config(config: &PaymentConfig) -> Self {
        Self::new(config.delay())
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Validates the card and amount, then waits the configured delay.
    #[instrument(skip(self, card))]
    pub async fn charge(
        &self,
        card: &validation::CardDetails,
        amount: f64,
        today: NaiveDate,
    ) -> Result<PaymentReceipt> {
        let amount = validate_amount(amount)?;
        let card = card.validate(today)?;

        tokio::time::sleep(self.delay).await;

        let reference = format!(
            "PAY-{}-{:04}",
            Utc::now().format("%Y%m%d%H%M%S"),
            NEXT_REFERENCE.fetch_add(1, Ordering::Relaxed)
        );
        info!(%reference, amount, "Simulated payment approved");

        Ok(PaymentReceipt {
            reference,
            card_last4: validation::last_four(&card.number),
            amount,
        })
    }
}

/// One-off donation form. `user_id` is `None` for guests.
#[derive(Debug, Clone)]
pub struct Donation {
    pub user_id: Option<i64>,
    pub donor_name: String,
    pub charity_id: Option<i64>,
    pub amount: f64,
    pub card: validation::CardDetails,
}

/// Charges the card and records the donation.
#[instrument(skip(db, payments, donation), fields(amount = donation.amount))]
pub async fn donate(
    db: &DatabaseConnection,
    payments: &PaymentSimulator,
    donation: Donation,
    today: NaiveDate,
) -> Result<money_donation::Model> {
    let amount = validate_amount(donation.amount)?;
    let donor_name = validation::validate_required("donor name", &donation.donor_name)?;

    if let Some(charity_id) = donation.charity_id {
        profile::get_charity(db, charity_id)
            .await?
            .ok_or_else(|| Error::not_found("Charity", charity_id))?;
    }

    let receipt = payments.charge(&donation.card, amount, today).await?;

    let model = money_donation::ActiveModel {
        user_id: Set(donation.user_id),
        donor_name: Set(donor_name),
        charity_id: Set(donation.charity_id),
        amount: Set(receipt.amount),
        card_last4: Set(receipt.card_last4),
        reference: Set(receipt.reference),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(donation_id = model.id, "Donation recorded");
    Ok(model)
}

/// Every donation, newest first.
pub async fn list_donations(db: &DatabaseConnection) -> Result<Vec<money_donation::Model>> {
    MoneyDonation::find()
        .order_by_desc(money_donation::Column::CreatedAt)
        .order_by_desc(money_donation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn list_donations_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<money_donation::Model>> {
    MoneyDonation::find()
        .filter(money_donation::Column::UserId.eq(user_id))
        .order_by_desc(money_donation::Column::CreatedAt)
        .order_by_desc(money_donation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn list_donations_for_charity(
    db: &DatabaseConnection,
    charity_id: i64,
) -> Result<Vec<money_donation::Model>> {
    MoneyDonation::find()
        .filter(money_donation::Column::CharityId.eq(charity_id))
        .order_by_desc(money_donation::Column::CreatedAt)
        .order_by_desc(money_donation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use std::time::Instant;

    #[test]
    fn test_validate_amount() {
        assert_eq!(validate_amount(12.5).ok(), Some(12.5));
        assert!(matches!(validate_amount(0.0), Err(Error::InvalidAmount { .. })));
        assert!(matches!(validate_amount(-3.0), Err(Error::InvalidAmount { .. })));
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
    }

    #[tokio::test]
    async fn test_charge_waits_and_returns_receipt() -> Result<()> {
        let payments = PaymentSimulator::new(Duration::from_millis(20));

        let started = Instant::now();
        let receipt = payments.charge(&test_card(), 25.0, today()).await?;
        assert!(started.elapsed() >= Duration::from_millis(20));

        assert_eq!(receipt.card_last4, "1111");
        assert_eq!(receipt.amount, 25.0);
        assert!(receipt.reference.starts_with("PAY-"));

        let second = payments.charge(&test_card(), 25.0, today()).await?;
        assert_ne!(receipt.reference, second.reference);

        Ok(())
    }

    #[tokio::test]
    async fn test_charge_rejects_bad_card() {
        let payments = PaymentSimulator::new(Duration::ZERO);
        let mut card = test_card();
        card.cvv = "12".to_string();

        let result = payments.charge(&card, 10.0, today()).await;
        assert!(matches!(result, Err(Error::Validation { field: "CVV", .. })));
    }

    #[tokio::test]
    async fn test_guest_and_user_donations() -> Result<()> {
        let db = setup_test_db().await?;
        let payments = PaymentSimulator::new(Duration::ZERO);
        let donor = create_test_guest(&db, "donor@example.org").await?;
        let (_, charity) = create_test_charity(&db, "Soup Kitchen").await?;

        let guest = donate(
            &db,
            &payments,
            Donation {
                user_id: None,
                donor_name: "Anonymous".to_string(),
                charity_id: None,
                amount: 5.0,
                card: test_card(),
            },
            today(),
        )
        .await?;
        assert!(guest.user_id.is_none());
        assert_eq!(guest.card_last4, "1111");

        donate(
            &db,
            &payments,
            Donation {
                user_id: Some(donor.id),
                donor_name: donor.display_name.clone(),
                charity_id: Some(charity.id),
                amount: 40.0,
                card: test_card(),
            },
            today(),
        )
        .await?;

        assert_eq!(list_donations(&db).await?.len(), 2);
        assert_eq!(list_donations_for_user(&db, donor.id).await?.len(), 1);
        let earmarked = list_donations_for_charity(&db, charity.id).await?;
        assert_eq!(earmarked.len(), 1);
        assert_eq!(earmarked[0].amount, 40.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_donation_checks_before_charging() -> Result<()> {
        let db = setup_test_db().await?;
        let payments = PaymentSimulator::new(Duration::ZERO);

        let base = Donation {
            user_id: None,
            donor_name: "Anonymous".to_string(),
            charity_id: None,
            amount: 5.0,
            card: test_card(),
        };

        let result = donate(
            &db,
            &payments,
            Donation {
                amount: -1.0,
                ..base.clone()
            },
            today(),
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let result = donate(
            &db,
            &payments,
            Donation {
                charity_id: Some(404),
                ..base
            },
            today(),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        assert!(list_donations(&db).await?.is_empty());
        Ok(())
    }
}
