//! # Storage Traits
//!
//! Storage abstraction traits that allow different backends to be used
//! interchangeably by the domain layer. All operations are synchronous; a
//! caller embedding the engine in a multi-user server must serialize writes
//! per affected event.

use anyhow::Result;
use chrono::NaiveDate;

use crate::domain::models::{Arrival, KitEvent, Member};

/// Interface for roster storage operations.
pub trait MemberStorage: Send + Sync {
    /// Store a new member.
    fn store_member(&self, member: &Member) -> Result<()>;

    /// Retrieve a specific member by ID.
    fn get_member(&self, member_id: &str) -> Result<Option<Member>>;

    /// List all members in roster insertion order.
    fn list_members(&self) -> Result<Vec<Member>>;

    /// Update an existing member.
    fn update_member(&self, member: &Member) -> Result<()>;

    /// Update several members at once (round resets touch the whole roster).
    fn update_members(&self, members: &[Member]) -> Result<()>;

    /// Delete a member by ID. Returns true if the member existed.
    fn delete_member(&self, member_id: &str) -> Result<bool>;

    /// Highest rotation order currently on the roster, 0 when empty.
    fn max_order(&self) -> Result<i32>;
}

/// Interface for kit event storage operations. Events are keyed by date.
pub trait EventStorage: Send + Sync {
    /// Store a new event.
    fn store_event(&self, event: &KitEvent) -> Result<()>;

    /// Retrieve the event on a specific date.
    fn get_event(&self, date: NaiveDate) -> Result<Option<KitEvent>>;

    /// List all events ordered by date ascending.
    fn list_events(&self) -> Result<Vec<KitEvent>>;

    /// Update an existing event.
    fn update_event(&self, event: &KitEvent) -> Result<()>;

    /// Update several events at once (used by the status sweep).
    fn update_events(&self, events: &[KitEvent]) -> Result<()>;

    /// Delete the event on a date. Returns true if it existed.
    fn delete_event(&self, date: NaiveDate) -> Result<bool>;
}

/// Interface for arrival storage operations.
pub trait AttendanceStorage: Send + Sync {
    /// Insert or overwrite the arrival for an (event, member) pair.
    fn upsert_arrival(&self, arrival: &Arrival) -> Result<()>;

    /// Retrieve the arrival for an (event, member) pair.
    fn get_arrival(&self, event_date: NaiveDate, member_id: &str) -> Result<Option<Arrival>>;

    /// List all arrivals recorded against an event.
    fn list_arrivals_for_event(&self, event_date: NaiveDate) -> Result<Vec<Arrival>>;

    /// Delete all arrivals for an event. Returns the number removed.
    fn delete_arrivals_for_event(&self, event_date: NaiveDate) -> Result<u32>;

    /// Delete all arrivals for a member. Returns the number removed.
    fn delete_arrivals_for_member(&self, member_id: &str) -> Result<u32>;
}
