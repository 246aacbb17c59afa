//! # Message Components
//!
//! Buttons, select menus and modals for the verification flow, plus the
//! small reply helpers they share.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial verification components

mod open_application;
mod start_verification;
mod verify_application;
mod verify_referral;

use std::sync::Arc;

use anyhow::Result;
use serenity::model::application::component::ActionRowComponent;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;

use crate::interactions::{Button, Modal, SelectMenu};

pub use open_application::OpenApplication;
pub use start_verification::StartVerification;
pub use verify_application::VerifyApplication;
pub use verify_referral::VerifyReferral;

/// customIds of the verification components; doubling as their registry
/// keys
pub const START_VERIFICATION: &str = "startVerification";
pub const OPEN_APPLICATION: &str = "openApplication";
pub const VERIFY_REFERRAL: &str = "verifyReferral";
pub const VERIFY_APPLICATION: &str = "verifyApplication";

/// Choices offered by the verifyReferral select menu as (value, label)
pub const REFERRAL_CHOICES: &[(&str, &str)] = &[
    ("friend", "A friend invited me"),
    ("search", "Found it searching"),
    ("social", "Social media"),
    ("other", "Somewhere else"),
];

/// Every built-in button
pub fn buttons() -> Vec<Arc<dyn Button>> {
    vec![Arc::new(StartVerification), Arc::new(OpenApplication)]
}

/// Every built-in select menu
pub fn select_menus() -> Vec<Arc<dyn SelectMenu>> {
    vec![Arc::new(VerifyReferral)]
}

/// Every built-in modal
pub fn modals() -> Vec<Arc<dyn Modal>> {
    vec![Arc::new(VerifyApplication)]
}

/// Reply to a component interaction with an ephemeral message
pub async fn component_reply(
    serenity_ctx: &Context,
    interaction: &MessageComponentInteraction,
    content: &str,
) -> Result<()> {
    interaction
        .create_interaction_response(&serenity_ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(content).ephemeral(true))
        })
        .await?;
    Ok(())
}

/// Reply to a modal submit with an ephemeral message
pub async fn modal_reply(
    serenity_ctx: &Context,
    interaction: &ModalSubmitInteraction,
    content: &str,
) -> Result<()> {
    interaction
        .create_interaction_response(&serenity_ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(content).ephemeral(true))
        })
        .await?;
    Ok(())
}

/// Pull one text input's value out of a submitted modal
pub fn modal_input(interaction: &ModalSubmitInteraction, custom_id: &str) -> Option<String> {
    for row in &interaction.data.components {
        for component in &row.components {
            if let ActionRowComponent::InputText(input) = component {
                if input.custom_id == custom_id {
                    return Some(input.value.clone());
                }
            }
        }
    }
    None
}
