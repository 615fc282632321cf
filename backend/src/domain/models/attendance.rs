//! Domain model for per-event, per-member arrival records.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use shared::GeoPoint;

/// One arrival record per (event, member) pair. The deterministic ID enforces
/// that invariant: a repeat check-in overwrites the existing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrival {
    pub id: String,
    pub event_date: NaiveDate,
    pub member_id: String,
    /// None means "not yet arrived".
    pub arrival_time: Option<DateTime<Utc>>,
    pub check_in_location: Option<GeoPoint>,
}

impl Arrival {
    /// Generate the deterministic ID for an (event, member) pair.
    pub fn generate_id(member_id: &str, event_date: NaiveDate) -> String {
        shared::arrival_id(member_id, &event_date.format("%Y-%m-%d").to_string())
    }

    /// An empty record seeded at event creation, before any check-in.
    pub fn stub(event_date: NaiveDate, member_id: &str) -> Self {
        Self {
            id: Self::generate_id(member_id, event_date),
            event_date,
            member_id: member_id.to_string(),
            arrival_time: None,
            check_in_location: None,
        }
    }

    /// Lateness is derived, never stored: arrived on the event date with a
    /// time of day strictly after the cutoff.
    pub fn is_late(&self, cutoff_time: NaiveTime) -> bool {
        match self.arrival_time {
            Some(arrived) => {
                arrived.date_naive() == self.event_date && arrived.time() > cutoff_time
            }
            None => false,
        }
    }
}
