//! Domain model for a roster member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::MemberStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    /// Only consumed by the notifier when building a duty reminder.
    pub phone_number: String,
    pub status: MemberStatus,
    /// Excludes a member from ever being auto-assigned (e.g. no transport).
    pub rotation_eligible: bool,
    /// Whether this member can be assigned duty as a late-arrival penalty.
    pub penalty_eligible: bool,
    /// Base rotation sequence, ascending. Ties keep roster insertion order.
    pub order: i32,
    /// True once the member has carried duty in the current rotation cycle.
    /// Mutated only by handover confirmation and round reset.
    pub completed_in_round: bool,
    pub owns_car: bool,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Generate a unique ID for a member.
    pub fn generate_id(timestamp_millis: u64) -> String {
        shared::generate_member_id(timestamp_millis)
    }

    /// Whether this member participates in automatic rotation right now.
    pub fn is_rotation_candidate(&self) -> bool {
        self.status == MemberStatus::Active && self.rotation_eligible
    }
}
