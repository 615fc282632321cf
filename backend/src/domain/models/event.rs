//! Domain model for a kit event (one scheduled match, keyed by date).

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use shared::{AssignmentReason, EventStatus, GeoPoint};

/// A single match occurrence. At most one event exists per calendar date, so
/// `date` doubles as the event's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitEvent {
    pub date: NaiveDate,
    /// Rotation/logistics due date; never earlier than `date`.
    pub due_date: NaiveDate,
    pub location: GeoPoint,
    pub geo_radius_meters: f64,
    /// Time of day after which an arrival counts as late.
    pub cutoff_time: NaiveTime,
    /// Member tentatively scheduled for duty. May go stale if the member is
    /// later deactivated; a stale reference means "needs reassignment".
    pub provisional_assignee: Option<String>,
    /// Member who actually ends up performing duty.
    pub responsible: Option<String>,
    /// Who was originally due, when `responsible` differs because of a swap.
    pub on_behalf_of: Option<String>,
    /// Member whose turn was bumped by a penalty and is owed a future slot.
    pub deferred_member_id: Option<String>,
    pub status: EventStatus,
    pub reason: AssignmentReason,
    /// Consecutive-occurrence counter for the current responsible member,
    /// computed when the event completes.
    pub weeks_held: u32,
    /// Set when the admin confirms the match on; optionally gates check-in.
    pub match_started: bool,
    pub notes: String,
}

impl KitEvent {
    /// Whether the event has reached a terminal state.
    pub fn is_finalized(&self) -> bool {
        self.status.is_terminal()
    }
}
