use serde::{Deserialize, Serialize};
use std::fmt;

/// Activity status for a roster member. Only `Active` members take part in
/// rotation and attendance tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Active,
    Injured,
    Bench,
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberStatus::Active => write!(f, "Active"),
            MemberStatus::Injured => write!(f, "Injured"),
            MemberStatus::Bench => write!(f, "Bench"),
        }
    }
}

/// Lifecycle state of a kit event.
///
/// `Scheduled → Upcoming → {Completed | Missed | NoPlay}`; the last three are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Scheduled,
    Upcoming,
    Completed,
    Missed,
    NoPlay,
}

impl EventStatus {
    /// Terminal states never transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventStatus::Completed | EventStatus::Missed | EventStatus::NoPlay
        )
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStatus::Scheduled => write!(f, "Scheduled"),
            EventStatus::Upcoming => write!(f, "Upcoming"),
            EventStatus::Completed => write!(f, "Completed"),
            EventStatus::Missed => write!(f, "Missed"),
            EventStatus::NoPlay => write!(f, "No Play"),
        }
    }
}

/// How the responsible member for an event was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentReason {
    /// Normal round-robin turn.
    Rotation,
    /// Assigned as a late-arrival penalty.
    PenaltyLate,
    /// Re-inserted after their turn was deferred by a penalty.
    Deferred,
    /// Swapped or reassigned by an admin or a decline.
    Reassigned,
}

impl fmt::Display for AssignmentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentReason::Rotation => write!(f, "Rotation"),
            AssignmentReason::PenaltyLate => write!(f, "Penalty: Late"),
            AssignmentReason::Deferred => write!(f, "Deferred"),
            AssignmentReason::Reassigned => write!(f, "Reassigned"),
        }
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both coordinates are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Tunable rotation behavior. Defaults match the behavior of the production
/// deployment; both flags exist because different teams run different rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// When true, a `Reassigned` handover also marks the responsible member's
    /// round as completed. Off by default: a swap is not your own fair turn.
    pub count_reassigned_as_completed: bool,
    /// When true, check-in additionally requires the admin to have confirmed
    /// the match on (not just an `Upcoming` status).
    pub require_match_started: bool,
    /// Gap, in days, used when the engine has to create a follow-up event to
    /// carry a deferred member's turn.
    pub deferral_period_days: i64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            count_reassigned_as_completed: false,
            require_match_started: false,
            deferral_period_days: 7,
        }
    }
}

/// Generate a member ID from a creation timestamp.
pub fn generate_member_id(epoch_millis: u64) -> String {
    format!("member::{}", epoch_millis)
}

/// Parse a member ID back into its creation timestamp.
pub fn parse_member_id(id: &str) -> Result<u64, MemberIdError> {
    let parts: Vec<&str> = id.split("::").collect();
    if parts.len() != 2 || parts[0] != "member" {
        return Err(MemberIdError::InvalidFormat);
    }

    parts[1]
        .parse::<u64>()
        .map_err(|_| MemberIdError::InvalidTimestamp)
}

/// Deterministic arrival ID for an (event, member) pair. One record per pair
/// by construction, so a repeat check-in overwrites rather than duplicates.
pub fn arrival_id(member_id: &str, event_date: &str) -> String {
    format!("arr-{}-{}", member_id, event_date)
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberIdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for MemberIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberIdError::InvalidFormat => write!(f, "Invalid member ID format"),
            MemberIdError::InvalidTimestamp => write!(f, "Invalid timestamp in member ID"),
        }
    }
}

impl std::error::Error for MemberIdError {}
