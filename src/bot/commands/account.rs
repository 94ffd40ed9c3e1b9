//! Account Discord commands - sign-up, sign-in, profile and preferences.
//!
//! Replies that echo credentials are ephemeral so only the invoking user sees
//! them.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{access, autocomplete, input::non_blank},
        },
        core::{
            auth::{self, ProfileDetails, SignUp, UserUpdate},
            filter::TicketSort,
            profile::{self, ContactUpdate},
            session,
        },
        entities::{OrganizationKind, Role, enums::enum_label, enums::parse_enum},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    async fn reply_private(ctx: poise::Context<'_, BotData, Error>, text: String) -> Result<()> {
        ctx.send(
            poise::CreateReply::default()
                .content(text)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Creates an account and signs you in.
    ///
    /// Charity, organization and factory accounts also need an address and a
    /// contact phone for their public profile.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, ephemeral)]
    pub async fn signup(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Email address"] email: String,
        #[description = "Password (at least 6 characters)"] password: String,
        #[description = "Your name"] display_name: String,
        #[description = "Account type (defaults to guest)"]
        #[autocomplete = "autocomplete::autocomplete_role"]
        role: Option<String>,
        #[description = "Your mobile number"] phone: Option<String>,
        #[description = "Public name of your charity, organization or factory"]
        organization_name: Option<String>,
        #[description = "Public address"] address: Option<String>,
        #[description = "Public contact phone (defaults to your mobile number)"]
        contact_phone: Option<String>,
        #[description = "Organization type"]
        #[autocomplete = "autocomplete::autocomplete_organization_kind"]
        organization_kind: Option<String>,
        #[description = "Short description of your charity"] description: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let role = match non_blank(role) {
            Some(text) => parse_enum::<Role>(&text)
                .ok_or_else(|| Error::validation("role", format!("unknown role '{text}'")))?,
            None => Role::Guest,
        };
        let organization_kind = match non_blank(organization_kind) {
            Some(text) => Some(parse_enum::<OrganizationKind>(&text).ok_or_else(|| {
                Error::validation("organization type", format!("unknown type '{text}'"))
            })?),
            None => None,
        };

        let profile = non_blank(address).map(|address| ProfileDetails {
            name: organization_name.unwrap_or_default(),
            address,
            phone: non_blank(contact_phone)
                .or_else(|| phone.clone())
                .unwrap_or_default(),
            organization_kind,
            description: non_blank(description),
        });

        let account = auth::sign_up(
            db,
            SignUp {
                email,
                password,
                display_name,
                phone: non_blank(phone),
                role,
                profile,
            },
        )
        .await?;
        session::sign_in_session(db, &access::discord_id(ctx), account.id).await?;

        reply_private(
            ctx,
            format!(
                "✅ Welcome, {}! Your {} account for {} is ready and you are signed in.\n\
                 Use `/dashboard` to get started.",
                account.display_name,
                enum_label(&account.role),
                account.email
            ),
        )
        .await
    }

    /// Signs you in with your email and password.
    #[poise::command(slash_command, ephemeral)]
    pub async fn signin(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Email address"] email: String,
        #[description = "Password"] password: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let account = auth::sign_in(db, &email, &password).await?;
        session::sign_in_session(db, &access::discord_id(ctx), account.id).await?;

        reply_private(
            ctx,
            format!(
                "✅ Signed in as {} ({}).",
                account.display_name,
                enum_label(&account.role)
            ),
        )
        .await
    }

    /// Signs you out.
    #[poise::command(slash_command, prefix_command)]
    pub async fn signout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        if session::sign_out(db, &access::discord_id(ctx)).await? {
            ctx.say("👋 You are signed out.").await?;
        } else {
            ctx.say("ℹ️ You were not signed in.").await?;
        }
        Ok(())
    }

    /// Shows the account you are signed in with.
    #[poise::command(slash_command, ephemeral)]
    pub async fn whoami(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let account = access::require_user(ctx).await?;

        let mut response = format!("👤 **{}**\n", account.display_name);
        writeln!(response, "📧 {}", account.email)?;
        writeln!(response, "🏷️ Role: {}", enum_label(&account.role))?;
        if let Some(phone) = &account.phone {
            writeln!(response, "📱 {phone}")?;
        }

        match account.role {
            Role::Charity => {
                if let Some(c) = profile::get_charity_by_user(db, account.id).await? {
                    writeln!(response, "\n🏠 **{}** (charity #{})", c.name, c.id)?;
                    writeln!(response, "{} · {}", c.address, c.phone)?;
                    if let Some(description) = &c.description {
                        writeln!(response, "{description}")?;
                    }
                }
            }
            Role::Organization => {
                if let Some(h) = profile::get_hotel_by_user(db, account.id).await? {
                    writeln!(
                        response,
                        "\n🏨 **{}** ({} #{})",
                        h.name,
                        enum_label(&h.kind),
                        h.id
                    )?;
                    writeln!(response, "{} · {}", h.address, h.phone)?;
                }
            }
            Role::Factory => {
                if let Some(f) = profile::get_factory_by_user(db, account.id).await? {
                    writeln!(response, "\n🏭 **{}** (factory #{})", f.name, f.id)?;
                    writeln!(response, "{} · {}", f.address, f.phone)?;
                }
            }
            Role::Guest | Role::Admin => {}
        }

        reply_private(ctx, response).await
    }

    /// Updates your account and public profile. Leave a field empty to keep it.
    #[poise::command(slash_command, ephemeral)]
    pub async fn profile_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "New display name"] display_name: Option<String>,
        #[description = "New mobile number (blank clears it)"] phone: Option<String>,
        #[description = "New password"] password: Option<String>,
        #[description = "New public name"] name: Option<String>,
        #[description = "New public address"] address: Option<String>,
        #[description = "New public contact phone"] contact_phone: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let account = access::require_user(ctx).await?;

        let mut changed = Vec::new();
        if display_name.is_some() || phone.is_some() || password.is_some() {
            if password.is_some() {
                changed.push("password");
            }
            if display_name.is_some() || phone.is_some() {
                changed.push("account details");
            }
            auth::update_user(
                db,
                account.id,
                UserUpdate {
                    display_name,
                    phone,
                    password,
                },
            )
            .await?;
        }

        let contact = ContactUpdate {
            name: non_blank(name),
            address: non_blank(address),
            phone: non_blank(contact_phone),
        };
        if contact.name.is_some() || contact.address.is_some() || contact.phone.is_some() {
            match account.role {
                Role::Charity => {
                    let charity = access::require_charity(ctx, "update a profile").await?;
                    profile::update_charity_contact(db, charity.id, &contact).await?;
                }
                Role::Organization => {
                    let org = access::require_organization(ctx, "update a profile").await?;
                    profile::update_hotel_contact(db, org.id, &contact).await?;
                }
                Role::Factory => {
                    let factory = access::require_factory(ctx, "update a profile").await?;
                    profile::update_factory_contact(db, factory.id, &contact).await?;
                }
                Role::Guest | Role::Admin => {
                    return Err(Error::Forbidden {
                        role: enum_label(&account.role),
                        action: "have a public profile",
                    });
                }
            }
            changed.push("public profile");
        }

        if changed.is_empty() {
            reply_private(ctx, "ℹ️ Nothing to update.".to_string()).await
        } else {
            reply_private(ctx, format!("✅ Updated your {}.", changed.join(" and "))).await
        }
    }

    /// Deletes your account. Tickets and donations you made are kept.
    #[poise::command(slash_command, ephemeral)]
    pub async fn delete_account(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Set to true to confirm"] confirm: bool,
    ) -> Result<()> {
        let account = access::require_user(ctx).await?;
        if !confirm {
            return reply_private(
                ctx,
                "⚠️ Run `/delete_account confirm:true` to delete your account.".to_string(),
            )
            .await;
        }

        auth::delete_account(&ctx.data().database, account.id).await?;
        reply_private(
            ctx,
            "🗑️ Your account was deleted and you are signed out. \
             You can sign up again with the same email."
                .to_string(),
        )
        .await
    }

    /// Parent command for your saved preferences.
    #[poise::command(
        slash_command,
        subcommands("preference_set", "preference_list")
    )]
    pub async fn preference(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Preference commands. Available subcommands:\n\
            `/preference set` - Save a preference\n\
            `/preference list` - Show your preferences";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Saves a preference, such as your default ticket sort order.
    #[poise::command(slash_command, rename = "set", ephemeral)]
    pub async fn preference_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Preference name (e.g. ticket_sort)"] key: String,
        #[description = "Value to store"] value: String,
    ) -> Result<()> {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return Err(Error::validation("preference", "name cannot be empty"));
        }

        let value = if key == session::TICKET_SORT_KEY {
            TicketSort::parse(&value)
                .ok_or_else(|| {
                    Error::validation(
                        "ticket_sort",
                        "use newest, oldest, expiry_soonest or quantity_desc",
                    )
                })?
                .key()
                .to_string()
        } else {
            value.trim().to_string()
        };

        session::set_preference(&ctx.data().database, &access::discord_id(ctx), &key, &value)
            .await?;
        reply_private(ctx, format!("✅ Saved `{key}` = `{value}`.")).await
    }

    /// Lists your saved preferences.
    #[poise::command(slash_command, rename = "list", ephemeral)]
    pub async fn preference_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let prefs =
            session::list_preferences(&ctx.data().database, &access::discord_id(ctx)).await?;
        if prefs.is_empty() {
            return reply_private(ctx, "ℹ️ No preferences saved yet.".to_string()).await;
        }

        let mut response = "⚙️ **Your preferences**\n".to_string();
        for pref in prefs {
            writeln!(response, "• `{}` = `{}`", pref.key, pref.value)?;
        }
        reply_private(ctx, response).await
    }
}

// Re-export all commands
pub use inner::*;
