//! Promo code business logic.
//!
//! Codes are stored uppercase and matched case-insensitively. A code is
//! usable while it is active, not past its last valid day and under its
//! redemption cap.

use crate::{
    config::settings::PromoCodeConfig,
    core::validation,
    entities::{PromoCode, promo_code},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument};

fn rejected(code: &str, reason: &str) -> Error {
    Error::PromoCode {
        code: code.to_string(),
        reason: reason.to_string(),
    }
}

fn normalize_code(code: &str) -> Result<String> {
    let code = validation::validate_required("promo code", code)?;
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::validation("promo code", "letters and digits only"));
    }
    Ok(code.to_ascii_uppercase())
}

/// Price after a percentage discount, rounded to cents.
#[must_use]
pub fn apply_discount(amount: f64, percent: i32) -> f64 {
    let percent = f64::from(percent.clamp(0, 100));
    (amount * (100.0 - percent) / 100.0 * 100.0).round() / 100.0
}

/// Why `promo` cannot be used on `today`, if anything.
fn unusable_reason(promo: &promo_code::Model, today: NaiveDate) -> Option<&'static str> {
    if !promo.is_active {
        return Some("the code is disabled");
    }
    if promo.expires_at.is_some_and(|last_day| today > last_day) {
        return Some("the code has expired");
    }
    if promo.max_uses.is_some_and(|max| promo.uses >= max) {
        return Some("the code has been used up");
    }
    None
}

#[instrument(skip(db))]
pub async fn create_promo_code(
    db: &DatabaseConnection,
    code: &str,
    discount_percent: i32,
    max_uses: Option<i32>,
    expires_at: Option<NaiveDate>,
) -> Result<promo_code::Model> {
    let code = normalize_code(code)?;
    if !(1..=100).contains(&discount_percent) {
        return Err(Error::validation("discount", "must be between 1 and 100"));
    }
    if max_uses.is_some_and(|max| max <= 0) {
        return Err(Error::validation("max uses", "must be greater than zero"));
    }

    if find_by_code(db, &code).await?.is_some() {
        return Err(rejected(&code, "the code already exists"));
    }

    let promo = promo_code::ActiveModel {
        code: Set(code),
        discount_percent: Set(discount_percent),
        max_uses: Set(max_uses),
        uses: Set(0),
        is_active: Set(true),
        expires_at: Set(expires_at),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(code = %promo.code, discount_percent, "Promo code created");
    Ok(promo)
}

pub async fn find_by_code<C>(db: &C, code: &str) -> Result<Option<promo_code::Model>>
where
    C: ConnectionTrait,
{
    PromoCode::find()
        .filter(promo_code::Column::Code.eq(code.trim().to_ascii_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Looks up a code and checks it can be used on `today`.
pub async fn find_active<C>(db: &C, code: &str, today: NaiveDate) -> Result<promo_code::Model>
where
    C: ConnectionTrait,
{
    let promo = find_by_code(db, code)
        .await?
        .ok_or_else(|| rejected(code, "no such code"))?;

    match unusable_reason(&promo, today) {
        Some(reason) => Err(rejected(&promo.code, reason)),
        None => Ok(promo),
    }
}

/// Counts one use of a code. The increment only applies if nobody redeemed
/// the code since it was read, so a cap of N never admits N + 1 uses.
#[instrument(skip(db))]
pub async fn redeem<C>(db: &C, code: &str, today: NaiveDate) -> Result<promo_code::Model>
where
    C: ConnectionTrait,
{
    let promo = find_active(db, code, today).await?;

    let result = PromoCode::update_many()
        .col_expr(
            promo_code::Column::Uses,
            Expr::col(promo_code::Column::Uses).add(1),
        )
        .filter(promo_code::Column::Id.eq(promo.id))
        .filter(promo_code::Column::Uses.eq(promo.uses))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(rejected(&promo.code, "the code was redeemed concurrently, try again"));
    }

    debug!(code = %promo.code, uses = promo.uses + 1, "Promo code redeemed");
    Ok(promo_code::Model {
        uses: promo.uses + 1,
        ..promo
    })
}

/// Disables a code so it can no longer be redeemed.
pub async fn deactivate(db: &DatabaseConnection, code: &str) -> Result<promo_code::Model> {
    let promo = find_by_code(db, code)
        .await?
        .ok_or_else(|| Error::not_found("Promo code", code.trim().to_ascii_uppercase()))?;

    let mut active_model: promo_code::ActiveModel = promo.into();
    active_model.is_active = Set(false);
    let promo = active_model.update(db).await?;

    info!(code = %promo.code, "Promo code disabled");
    Ok(promo)
}

/// Every code, alphabetically.
pub async fn list_promo_codes(db: &DatabaseConnection) -> Result<Vec<promo_code::Model>> {
    PromoCode::find()
        .order_by_asc(promo_code::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts configured codes that do not exist yet. Returns how many were added.
pub async fn seed_promo_codes(db: &DatabaseConnection, codes: &[PromoCodeConfig]) -> Result<usize> {
    let mut created = 0;
    for entry in codes {
        if find_by_code(db, &entry.code).await?.is_some() {
            continue;
        }
        create_promo_code(
            db,
            &entry.code,
            entry.discount_percent,
            entry.max_uses,
            entry.expires_at,
        )
        .await?;
        created += 1;
    }

    if created > 0 {
        info!(created, "Seeded promo codes from configuration");
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_apply_discount() {
        assert_eq!(apply_discount(100.0, 10), 90.0);
        assert_eq!(apply_discount(27.0, 25), 20.25);
        assert_eq!(apply_discount(10.0, 0), 10.0);
        assert_eq!(apply_discount(10.0, 100), 0.0);
        assert_eq!(apply_discount(10.0, 150), 0.0);
        assert_eq!(apply_discount(9.99, 33), 6.69);
    }

    #[tokio::test]
    async fn test_create_promo_code_normalizes_and_rejects_duplicates() -> Result<()> {
        let db = setup_test_db().await?;

        let promo = create_promo_code(&db, " welcome10 ", 10, None, None).await?;
        assert_eq!(promo.code, "WELCOME10");
        assert!(promo.is_active);

        let duplicate = create_promo_code(&db, "Welcome10", 5, None, None).await;
        assert!(matches!(duplicate, Err(Error::PromoCode { .. })));

        let bad_percent = create_promo_code(&db, "HALF", 0, None, None).await;
        assert!(matches!(bad_percent, Err(Error::Validation { .. })));

        let bad_code = create_promo_code(&db, "TEN OFF", 10, None, None).await;
        assert!(matches!(bad_code, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_respects_cap() -> Result<()> {
        let db = setup_test_db().await?;
        create_promo_code(&db, "ONCE", 50, Some(1), None).await?;

        let redeemed = redeem(&db, "once", today()).await?;
        assert_eq!(redeemed.uses, 1);

        let again = redeem(&db, "ONCE", today()).await;
        assert!(matches!(again, Err(Error::PromoCode { .. })));

        let unknown = redeem(&db, "NOPE", today()).await;
        assert!(matches!(unknown, Err(Error::PromoCode { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_expired_and_disabled_codes() -> Result<()> {
        let db = setup_test_db().await?;
        let last_day = today();
        create_promo_code(&db, "LASTDAY", 20, None, Some(last_day)).await?;
        create_promo_code(&db, "OFF", 20, None, None).await?;

        assert!(find_active(&db, "LASTDAY", last_day).await.is_ok());
        let tomorrow = last_day.succ_opt().unwrap_or(last_day);
        assert!(find_active(&db, "LASTDAY", tomorrow).await.is_err());

        let disabled = deactivate(&db, "off").await?;
        assert!(!disabled.is_active);
        assert!(matches!(
            find_active(&db, "OFF", today()).await,
            Err(Error::PromoCode { .. })
        ));

        let missing = deactivate(&db, "GHOST").await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_promo_codes_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let codes = vec![
            PromoCodeConfig {
                code: "WELCOME10".to_string(),
                discount_percent: 10,
                max_uses: Some(500),
                expires_at: None,
            },
            PromoCodeConfig {
                code: "RAMADAN25".to_string(),
                discount_percent: 25,
                max_uses: None,
                expires_at: None,
            },
        ];

        assert_eq!(seed_promo_codes(&db, &codes).await?, 2);
        assert_eq!(seed_promo_codes(&db, &codes).await?, 0);

        let listed = list_promo_codes(&db).await?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].code, "RAMADAN25");

        Ok(())
    }
}
