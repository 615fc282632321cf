//! Domain-level command and result types.
//!
//! These structs are the inputs and outputs of the domain services. Results
//! describe what happened (who was assigned and why, whether a round reset)
//! so the caller can decide whether and how to notify; the services
//! themselves never perform delivery.

pub mod members {
    use shared::MemberStatus;

    use crate::domain::models::Member;

    /// Input for creating a roster member.
    #[derive(Debug, Clone)]
    pub struct CreateMemberCommand {
        pub name: String,
        pub phone_number: String,
        pub status: Option<MemberStatus>,
        pub rotation_eligible: bool,
        pub penalty_eligible: bool,
        /// When None, the member is appended after the current highest order.
        pub order: Option<i32>,
        pub owns_car: bool,
        pub notes: String,
    }

    /// Result of deleting a member, including what the cascade touched.
    #[derive(Debug, Clone)]
    pub struct DeleteMemberResult {
        pub member: Member,
        /// Events whose provisional/responsible/deferred references were
        /// cleared.
        pub cleared_events: usize,
        /// Arrival records purged.
        pub purged_arrivals: u32,
    }
}

pub mod events {
    use chrono::{NaiveDate, NaiveTime};
    use shared::GeoPoint;

    use crate::domain::models::KitEvent;

    /// Input for creating a kit event.
    #[derive(Debug, Clone)]
    pub struct CreateEventCommand {
        pub date: NaiveDate,
        /// Defaults to the event date when None.
        pub due_date: Option<NaiveDate>,
        pub location: GeoPoint,
        pub geo_radius_meters: f64,
        pub cutoff_time: NaiveTime,
        pub notes: String,
    }

    /// Result of creating an event.
    #[derive(Debug, Clone)]
    pub struct CreateEventResult {
        pub event: KitEvent,
        /// Date of the penalized event whose deferral this creation resolved,
        /// when the provisional assignment repaid a deferral debt.
        pub resolved_deferral_from: Option<NaiveDate>,
    }

    /// Input for updating an event's logistics fields.
    #[derive(Debug, Clone)]
    pub struct UpdateEventCommand {
        pub date: NaiveDate,
        pub due_date: NaiveDate,
        pub location: GeoPoint,
        pub geo_radius_meters: f64,
        pub cutoff_time: NaiveTime,
        pub notes: String,
    }
}

pub mod rotation {
    use chrono::NaiveDate;

    use crate::domain::models::KitEvent;

    /// Result of a decline: who took over.
    #[derive(Debug, Clone)]
    pub struct DeclineDutyResult {
        pub event: KitEvent,
        pub replacement_id: String,
    }

    /// Result of applying a late penalty.
    #[derive(Debug, Clone)]
    pub struct ApplyPenaltyResult {
        pub event: KitEvent,
        /// The member whose turn was bumped, if any.
        pub deferred_member_id: Option<String>,
        /// Follow-up event created to carry the deferral when no later event
        /// existed.
        pub follow_up_event: Option<KitEvent>,
    }

    /// Result of confirming a handover.
    #[derive(Debug, Clone)]
    pub struct ConfirmHandoverResult {
        pub event: KitEvent,
        /// Member whose `completed_in_round` flag was set by this handover.
        pub completed_member_id: Option<String>,
        /// Whether this handover completed the round and reset the roster.
        pub round_reset: bool,
    }

    /// Result of the periodic status sweep.
    #[derive(Debug, Clone)]
    pub struct SweepResult {
        pub completed: Vec<NaiveDate>,
        pub missed: Vec<NaiveDate>,
    }
}

pub mod attendance {
    use chrono::{DateTime, NaiveDate, Utc};
    use shared::GeoPoint;

    /// Input for a member check-in.
    #[derive(Debug, Clone)]
    pub struct CheckInCommand {
        pub event_date: NaiveDate,
        pub member_id: String,
        pub location: GeoPoint,
        pub now: DateTime<Utc>,
    }

    /// Input for an admin arrival correction (bypasses the geofence).
    #[derive(Debug, Clone)]
    pub struct RecordArrivalCommand {
        pub event_date: NaiveDate,
        pub member_id: String,
        pub arrival_time: Option<DateTime<Utc>>,
        pub check_in_location: Option<GeoPoint>,
    }
}
