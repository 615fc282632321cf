//! Error taxonomy for the rotation engine.
//!
//! Every engine operation fails fast and leaves state unmodified; the variant
//! tells the caller whether the problem is malformed input, a state machine
//! violation, a missing eligibility flag, an unknown id, or a storage-adapter
//! failure (always retryable).

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("due date {due_date} is before the match date {date}")]
    InvalidDateRange { date: NaiveDate, due_date: NaiveDate },

    #[error("a match already exists on {0}")]
    DuplicateEvent(NaiveDate),

    #[error("no match found on {0}")]
    EventNotFound(NaiveDate),

    #[error("member not found: {0}")]
    MemberNotFound(String),

    #[error("no rotation-eligible members available")]
    NoEligibleMembers,

    #[error("no eligible replacement available")]
    NoEligibleReplacement,

    #[error("{0} is not eligible for rotation")]
    NotRotationEligible(String),

    #[error("only the provisional assignee can act on this duty")]
    NotProvisionalAssignee,

    #[error("kit duty for {0} already has a responsible member")]
    AlreadyAssigned(NaiveDate),

    #[error("the match on {0} is already finalized")]
    EventFinalized(NaiveDate),

    #[error("the match on {0} is not open for duty actions")]
    EventNotLive(NaiveDate),

    #[error("no responsible member set for the match on {0}")]
    NoResponsibleSet(NaiveDate),

    #[error("{member_id} did not arrive after the cutoff on {date}")]
    NotLate { member_id: String, date: NaiveDate },

    #[error("{0} is not penalty eligible")]
    NotPenaltyEligible(String),

    /// Carries the measured distance so the UI can say "you are N meters
    /// away from the ground".
    #[error("you are {distance:.0} meters away from the ground (allowed {radius:.0} m)")]
    OutOfGeofence { distance: f64, radius: f64 },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
