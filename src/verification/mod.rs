//! # Feature: Verification Tickets
//!
//! Tracks the verification process for joining members. Each user gets at
//! most one open ticket, backed by a private thread in the configured
//! verification channel. Uses DashMap for thread-safe concurrent access.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Record referral answers on the ticket
//! - 1.0.0: Initial ticket store with private-thread creation

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::info;
use serenity::http::Http;
use serenity::model::id::{ChannelId, GuildId, UserId};
use thiserror::Error;

use crate::core::truncate;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("you already have an open verification ticket")]
    AlreadyOpen { thread_id: ChannelId },

    #[error("no verification channel is configured for this server")]
    NotConfigured,

    #[error("no open verification ticket for this user")]
    NoTicket,

    #[error("could not create the verification thread: {0}")]
    Discord(String),
}

/// Where a ticket is in the verification flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketState {
    /// Thread created, waiting for the member to submit the application
    AwaitingApplication,
    /// Application submitted, waiting for staff review
    PendingReview,
}

impl std::fmt::Display for TicketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketState::AwaitingApplication => f.write_str("awaiting application"),
            TicketState::PendingReview => f.write_str("pending review"),
        }
    }
}

/// One open verification ticket
#[derive(Debug, Clone)]
pub struct Ticket {
    pub thread_id: ChannelId,
    pub guild_id: GuildId,
    pub user_id: UserId,
    pub opened_at: DateTime<Utc>,
    pub referral: Option<String>,
    pub state: TicketState,
}

impl Ticket {
    /// Deep link to the ticket's thread
    pub fn thread_url(&self) -> String {
        format!(
            "https://discord.com/channels/{}/{}",
            self.guild_id.0, self.thread_id.0
        )
    }
}

/// Owner of all open verification tickets, keyed by user id
#[derive(Default)]
pub struct VerificationManager {
    tickets: DashMap<u64, Ticket>,
}

impl VerificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a user into the verification process: creates a private thread
    /// under the verification channel and records the ticket. A user with
    /// an open ticket is rejected, not given a second one.
    pub async fn open_ticket(
        &self,
        http: &Http,
        guild_id: GuildId,
        verification_channel: ChannelId,
        user_id: UserId,
        user_tag: &str,
    ) -> Result<Ticket, VerificationError> {
        if let Some(existing) = self.tickets.get(&user_id.0) {
            return Err(VerificationError::AlreadyOpen {
                thread_id: existing.thread_id,
            });
        }

        let thread_name = truncate(&format!("verify-{user_tag}"), 100);
        let thread = verification_channel
            .create_private_thread(http, |t| t.name(&thread_name))
            .await
            .map_err(|e| VerificationError::Discord(e.to_string()))?;

        let ticket = Ticket {
            thread_id: thread.id,
            guild_id,
            user_id,
            opened_at: Utc::now(),
            referral: None,
            state: TicketState::AwaitingApplication,
        };
        self.insert(ticket.clone())?;

        info!(
            "Opened verification ticket {} for user {user_id} in guild {guild_id}",
            thread.id
        );
        Ok(ticket)
    }

    /// Record the ticket, refusing a second open ticket for the same user.
    /// Split out from `open_ticket` so the uniqueness contract is testable
    /// without a live HTTP client.
    fn insert(&self, ticket: Ticket) -> Result<(), VerificationError> {
        use dashmap::mapref::entry::Entry;

        match self.tickets.entry(ticket.user_id.0) {
            Entry::Occupied(existing) => Err(VerificationError::AlreadyOpen {
                thread_id: existing.get().thread_id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(ticket);
                Ok(())
            }
        }
    }

    /// The user's open ticket, if any
    pub fn ticket_for(&self, user_id: UserId) -> Option<Ticket> {
        self.tickets.get(&user_id.0).map(|t| t.clone())
    }

    /// Record how the user found the community
    pub fn record_referral(&self, user_id: UserId, referral: &str) -> Result<(), VerificationError> {
        let mut ticket = self
            .tickets
            .get_mut(&user_id.0)
            .ok_or(VerificationError::NoTicket)?;
        ticket.referral = Some(referral.to_string());
        Ok(())
    }

    /// Mark the application submitted; the ticket moves to staff review
    pub fn submit_application(&self, user_id: UserId) -> Result<Ticket, VerificationError> {
        let mut ticket = self
            .tickets
            .get_mut(&user_id.0)
            .ok_or(VerificationError::NoTicket)?;
        ticket.state = TicketState::PendingReview;
        Ok(ticket.clone())
    }

    /// Close and drop the user's ticket
    pub fn close_ticket(&self, user_id: UserId) -> Result<Ticket, VerificationError> {
        self.tickets
            .remove(&user_id.0)
            .map(|(_, ticket)| ticket)
            .ok_or(VerificationError::NoTicket)
    }

    /// Number of open tickets
    pub fn open_count(&self) -> usize {
        self.tickets.len()
    }
}
