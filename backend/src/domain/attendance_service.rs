//! Arrival tracking: geofenced self check-in plus admin corrections.

use chrono::NaiveDate;
use log::info;
use std::sync::Arc;

use crate::domain::commands::attendance::{CheckInCommand, RecordArrivalCommand};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::geo;
use crate::domain::models::Arrival;
use crate::storage::memory::{AttendanceRepository, EventRepository, MemberRepository, MemoryConnection};
use crate::storage::traits::{AttendanceStorage, EventStorage, MemberStorage};
use shared::{EventStatus, RotationConfig};

#[derive(Clone)]
pub struct AttendanceService {
    member_repository: MemberRepository,
    event_repository: EventRepository,
    attendance_repository: AttendanceRepository,
    config: RotationConfig,
}

impl AttendanceService {
    pub fn new(connection: Arc<MemoryConnection>, config: RotationConfig) -> Self {
        Self {
            member_repository: MemberRepository::new(connection.clone()),
            event_repository: EventRepository::new(connection.clone()),
            attendance_repository: AttendanceRepository::new(connection),
            config,
        }
    }

    /// Member checks in from the ground. The position must fall inside the
    /// event's geofence; a rejected check-in writes nothing, so the member
    /// can move closer and retry. Repeat check-ins overwrite (last wins).
    pub fn check_in(&self, command: CheckInCommand) -> DomainResult<Arrival> {
        let event = self
            .event_repository
            .get_event(command.event_date)?
            .ok_or(DomainError::EventNotFound(command.event_date))?;
        self.member_repository
            .get_member(&command.member_id)?
            .ok_or_else(|| DomainError::MemberNotFound(command.member_id.clone()))?;

        if event.status != EventStatus::Upcoming {
            return Err(DomainError::EventNotLive(command.event_date));
        }
        if self.config.require_match_started && !event.match_started {
            return Err(DomainError::EventNotLive(command.event_date));
        }
        if !command.location.is_valid() {
            return Err(DomainError::InvalidCoordinates {
                lat: command.location.lat,
                lng: command.location.lng,
            });
        }

        let distance = geo::distance_meters(command.location, event.location);
        if !geo::is_within_geofence(command.location, event.location, event.geo_radius_meters) {
            return Err(DomainError::OutOfGeofence {
                distance,
                radius: event.geo_radius_meters,
            });
        }

        let arrival = Arrival {
            id: Arrival::generate_id(&command.member_id, command.event_date),
            event_date: command.event_date,
            member_id: command.member_id.clone(),
            arrival_time: Some(command.now),
            check_in_location: Some(command.location),
        };
        self.attendance_repository.upsert_arrival(&arrival)?;
        info!(
            "{} checked in for {} from {:.0} m out",
            command.member_id, command.event_date, distance
        );
        Ok(arrival)
    }

    /// Admin correction of an arrival record. No geofence check; setting
    /// `arrival_time` to None reverts the member to "not arrived".
    pub fn record_arrival(&self, command: RecordArrivalCommand) -> DomainResult<Arrival> {
        self.event_repository
            .get_event(command.event_date)?
            .ok_or(DomainError::EventNotFound(command.event_date))?;
        self.member_repository
            .get_member(&command.member_id)?
            .ok_or_else(|| DomainError::MemberNotFound(command.member_id.clone()))?;

        let arrival = Arrival {
            id: Arrival::generate_id(&command.member_id, command.event_date),
            event_date: command.event_date,
            member_id: command.member_id.clone(),
            arrival_time: command.arrival_time,
            check_in_location: command.check_in_location,
        };
        self.attendance_repository.upsert_arrival(&arrival)?;
        info!(
            "Arrival for {} on {} set by admin",
            command.member_id, command.event_date
        );
        Ok(arrival)
    }

    pub fn get_arrival(
        &self,
        event_date: NaiveDate,
        member_id: &str,
    ) -> DomainResult<Option<Arrival>> {
        Ok(self.attendance_repository.get_arrival(event_date, member_id)?)
    }

    /// All arrival records for an event, stubs included.
    pub fn list_arrivals(&self, event_date: NaiveDate) -> DomainResult<Vec<Arrival>> {
        Ok(self.attendance_repository.list_arrivals_for_event(event_date)?)
    }
}
