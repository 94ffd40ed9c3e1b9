//! Resolves the account behind a Discord user and checks what it may do.

use crate::{
    bot::BotData,
    core::{profile, session},
    entities::{Role, charity, enums::enum_label, factory, hotel, user},
    errors::{Error, Result},
};

type Context<'a> = poise::Context<'a, BotData, Error>;

/// Discord ID of the invoking user, as stored in sessions.
#[must_use]
pub fn discord_id(ctx: Context<'_>) -> String {
    ctx.author().id.to_string()
}

/// Fails with `Forbidden` unless `account` has one of `roles`.
pub fn check_role(account: &user::Model, roles: &[Role], action: &'static str) -> Result<()> {
    if roles.contains(&account.role) {
        Ok(())
    } else {
        Err(Error::Forbidden {
            role: enum_label(&account.role),
            action,
        })
    }
}

/// Signed-in account, if any.
pub async fn current_user(ctx: Context<'_>) -> Result<Option<user::Model>> {
    session::current_user(&ctx.data().database, &discord_id(ctx)).await
}

pub async fn require_user(ctx: Context<'_>) -> Result<user::Model> {
    current_user(ctx).await?.ok_or(Error::NotSignedIn)
}

pub async fn require_role(
    ctx: Context<'_>,
    roles: &[Role],
    action: &'static str,
) -> Result<user::Model> {
    let account = require_user(ctx).await?;
    check_role(&account, roles, action)?;
    Ok(account)
}

pub async fn require_admin(ctx: Context<'_>, action: &'static str) -> Result<user::Model> {
    require_role(ctx, &[Role::Admin], action).await
}

pub async fn require_charity(ctx: Context<'_>, action: &'static str) -> Result<charity::Model> {
    let account = require_role(ctx, &[Role::Charity], action).await?;
    profile::get_charity_by_user(&ctx.data().database, account.id)
        .await?
        .ok_or_else(|| Error::not_found("Charity profile", account.id))
}

pub async fn require_organization(ctx: Context<'_>, action: &'static str) -> Result<hotel::Model> {
    let account = require_role(ctx, &[Role::Organization], action).await?;
    profile::get_hotel_by_user(&ctx.data().database, account.id)
        .await?
        .ok_or_else(|| Error::not_found("Organization profile", account.id))
}

pub async fn require_factory(ctx: Context<'_>, action: &'static str) -> Result<factory::Model> {
    let account = require_role(ctx, &[Role::Factory], action).await?;
    profile::get_factory_by_user(&ctx.data().database, account.id)
        .await?
        .ok_or_else(|| Error::not_found("Factory profile", account.id))
}
