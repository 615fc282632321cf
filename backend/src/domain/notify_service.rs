//! Duty reminders for the provisional assignee.
//!
//! The service only builds the message and a click-to-chat link; actual
//! delivery goes through a [`Notifier`], and a delivery failure never fails
//! the calling operation.

use chrono::NaiveDate;
use log::warn;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::storage::memory::{EventRepository, MemberRepository, MemoryConnection};
use crate::storage::traits::{EventStorage, MemberStorage};

/// A reminder ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct DutyReminder {
    pub member_id: String,
    pub message: String,
    /// WhatsApp click-to-chat link carrying the prefilled message.
    pub whatsapp_url: String,
}

/// Delivery channel for reminders.
pub trait Notifier: Send + Sync {
    fn send(&self, reminder: &DutyReminder) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct NotifyService {
    member_repository: MemberRepository,
    event_repository: EventRepository,
}

impl NotifyService {
    pub fn new(connection: Arc<MemoryConnection>) -> Self {
        Self {
            member_repository: MemberRepository::new(connection.clone()),
            event_repository: EventRepository::new(connection),
        }
    }

    /// Build the reminder for the provisional assignee of the match on
    /// `date`.
    pub fn duty_reminder(&self, date: NaiveDate) -> DomainResult<DutyReminder> {
        let event = self
            .event_repository
            .get_event(date)?
            .ok_or(DomainError::EventNotFound(date))?;
        let member_id = event.provisional_assignee.ok_or_else(|| {
            DomainError::Validation(format!("no provisional assignee for the match on {}", date))
        })?;
        let member = self
            .member_repository
            .get_member(&member_id)?
            .ok_or_else(|| DomainError::MemberNotFound(member_id.clone()))?;

        let message = format!(
            "Hi {}, this is a reminder that you are provisionally assigned for \
             kit duty for the match on {}. Please log in to the app to confirm \
             or decline.",
            member.name, date
        );
        // wa.me wants the number without the leading "+".
        let whatsapp_url = format!(
            "https://wa.me/{}?text={}",
            member.phone_number.trim_start_matches('+'),
            urlencoding::encode(&message)
        );

        Ok(DutyReminder {
            member_id,
            message,
            whatsapp_url,
        })
    }

    /// Build and dispatch the reminder. Delivery failures are logged and
    /// swallowed so an unreachable channel cannot block duty workflows.
    pub fn send_duty_reminder(
        &self,
        notifier: &dyn Notifier,
        date: NaiveDate,
    ) -> DomainResult<DutyReminder> {
        let reminder = self.duty_reminder(date)?;
        if let Err(err) = notifier.send(&reminder) {
            warn!("Failed to deliver duty reminder for {}: {:#}", date, err);
        }
        Ok(reminder)
    }
}
