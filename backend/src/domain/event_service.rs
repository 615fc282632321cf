//! Kit event administration: creation, logistics updates, match status
//! confirmation, and deletion.

use chrono::NaiveDate;
use log::info;
use std::sync::Arc;

use crate::domain::commands::events::{CreateEventCommand, CreateEventResult, UpdateEventCommand};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Arrival, KitEvent};
use crate::domain::rotation;
use crate::storage::memory::{AttendanceRepository, EventRepository, MemberRepository, MemoryConnection};
use crate::storage::traits::{AttendanceStorage, EventStorage, MemberStorage};
use shared::{AssignmentReason, EventStatus, MemberStatus};

#[derive(Clone)]
pub struct EventService {
    member_repository: MemberRepository,
    event_repository: EventRepository,
    attendance_repository: AttendanceRepository,
}

impl EventService {
    pub fn new(connection: Arc<MemoryConnection>) -> Self {
        Self {
            member_repository: MemberRepository::new(connection.clone()),
            event_repository: EventRepository::new(connection.clone()),
            attendance_repository: AttendanceRepository::new(connection),
        }
    }

    /// Create an event and compute its provisional assignee. A pending
    /// deferral is repaid here: the deferred member is assigned ahead of
    /// rotation order and the debt on the penalized event is cleared.
    pub fn create_event(&self, command: CreateEventCommand) -> DomainResult<CreateEventResult> {
        if !command.location.is_valid() {
            return Err(DomainError::InvalidCoordinates {
                lat: command.location.lat,
                lng: command.location.lng,
            });
        }
        let due_date = command.due_date.unwrap_or(command.date);
        if due_date < command.date {
            return Err(DomainError::InvalidDateRange {
                date: command.date,
                due_date,
            });
        }
        if self.event_repository.get_event(command.date)?.is_some() {
            return Err(DomainError::DuplicateEvent(command.date));
        }

        let roster = self.member_repository.list_members()?;
        let events = self.event_repository.list_events()?;

        let assignee = rotation::select_next_assignee(&roster, &events, command.date)
            .ok_or(DomainError::NoEligibleMembers)?;

        let mut resolved_deferral_from = None;
        let mut reason = AssignmentReason::Rotation;
        if let Some((source_date, deferred)) =
            rotation::pending_deferral(&roster, &events, command.date)
        {
            if deferred == assignee {
                reason = AssignmentReason::Deferred;
                self.clear_deferral(source_date)?;
                resolved_deferral_from = Some(source_date);
            }
        }

        let event = KitEvent {
            date: command.date,
            due_date,
            location: command.location,
            geo_radius_meters: command.geo_radius_meters,
            cutoff_time: command.cutoff_time,
            provisional_assignee: Some(assignee.clone()),
            responsible: None,
            on_behalf_of: None,
            deferred_member_id: None,
            status: EventStatus::Scheduled,
            reason,
            weeks_held: 0,
            match_started: false,
            notes: command.notes,
        };
        self.event_repository.store_event(&event)?;
        self.seed_arrival_stubs(&event)?;

        info!(
            "Created match on {} provisionally assigned to {} ({})",
            event.date, assignee, event.reason
        );
        Ok(CreateEventResult {
            event,
            resolved_deferral_from,
        })
    }

    pub fn get_event(&self, date: NaiveDate) -> DomainResult<KitEvent> {
        self.event_repository
            .get_event(date)?
            .ok_or(DomainError::EventNotFound(date))
    }

    pub fn list_events(&self) -> DomainResult<Vec<KitEvent>> {
        Ok(self.event_repository.list_events()?)
    }

    /// The earliest non-finalized event: the single target for user-facing
    /// duty actions.
    pub fn current_event(&self) -> DomainResult<Option<KitEvent>> {
        Ok(self
            .event_repository
            .list_events()?
            .into_iter()
            .find(|e| !e.is_finalized()))
    }

    /// Update logistics fields only; assignment and status are owned by the
    /// rotation engine.
    pub fn update_event(&self, command: UpdateEventCommand) -> DomainResult<KitEvent> {
        let mut event = self.get_event(command.date)?;
        if !command.location.is_valid() {
            return Err(DomainError::InvalidCoordinates {
                lat: command.location.lat,
                lng: command.location.lng,
            });
        }
        if command.due_date < event.date {
            return Err(DomainError::InvalidDateRange {
                date: event.date,
                due_date: command.due_date,
            });
        }

        event.due_date = command.due_date;
        event.location = command.location;
        event.geo_radius_meters = command.geo_radius_meters;
        event.cutoff_time = command.cutoff_time;
        event.notes = command.notes;
        self.event_repository.update_event(&event)?;
        Ok(event)
    }

    /// Delete an event and its arrival records.
    pub fn delete_event(&self, date: NaiveDate) -> DomainResult<KitEvent> {
        let event = self.get_event(date)?;
        let purged = self.attendance_repository.delete_arrivals_for_event(date)?;
        self.event_repository.delete_event(date)?;
        info!("Deleted match on {} and {} arrival record(s)", date, purged);
        Ok(event)
    }

    /// Admin confirmation of whether the match is on. Confirm-on moves a
    /// `Scheduled` event to `Upcoming` (filling the provisional assignee if
    /// it is missing or stale); confirm-off parks it as `NoPlay`.
    pub fn confirm_match_status(&self, date: NaiveDate, play_on: bool) -> DomainResult<KitEvent> {
        let mut event = self.get_event(date)?;
        if event.is_finalized() {
            return Err(DomainError::EventFinalized(date));
        }

        if play_on {
            let roster = self.member_repository.list_members()?;
            let needs_assignee = match &event.provisional_assignee {
                None => true,
                Some(id) => !roster
                    .iter()
                    .any(|m| &m.id == id && m.is_rotation_candidate()),
            };
            if needs_assignee {
                let events = self.event_repository.list_events()?;
                let assignee = rotation::select_next_assignee(&roster, &events, date)
                    .ok_or(DomainError::NoEligibleMembers)?;
                if let Some((source_date, deferred)) =
                    rotation::pending_deferral(&roster, &events, date)
                {
                    if deferred == assignee {
                        event.reason = AssignmentReason::Deferred;
                        self.clear_deferral(source_date)?;
                    }
                }
                event.provisional_assignee = Some(assignee);
            }
            event.status = EventStatus::Upcoming;
            event.match_started = true;
        } else {
            event.status = EventStatus::NoPlay;
            event.match_started = false;
        }

        self.event_repository.update_event(&event)?;
        info!("Match on {} confirmed as {}", date, event.status);
        Ok(event)
    }

    /// Admin override of the provisional assignment. The member is removed
    /// as provisional from any other event first, mirroring a roster-board
    /// drag between columns.
    pub fn assign_member_to_event(&self, member_id: &str, date: NaiveDate) -> DomainResult<KitEvent> {
        let member = self
            .member_repository
            .get_member(member_id)?
            .ok_or_else(|| DomainError::MemberNotFound(member_id.to_string()))?;
        if !member.is_rotation_candidate() {
            return Err(DomainError::NotRotationEligible(member_id.to_string()));
        }
        let mut target = self.get_event(date)?;
        if target.is_finalized() {
            return Err(DomainError::EventFinalized(date));
        }

        let mut touched = Vec::new();
        for mut event in self.event_repository.list_events()? {
            if event.date != date && event.provisional_assignee.as_deref() == Some(member_id) {
                event.provisional_assignee = None;
                touched.push(event);
            }
        }
        self.event_repository.update_events(&touched)?;

        target.provisional_assignee = Some(member_id.to_string());
        target.reason = AssignmentReason::Rotation;
        self.event_repository.update_event(&target)?;
        info!("Assigned {} as provisional for {}", member_id, date);
        Ok(target)
    }

    /// One stub arrival per active member, so match-day screens can show who
    /// has not arrived yet.
    fn seed_arrival_stubs(&self, event: &KitEvent) -> DomainResult<()> {
        for member in self.member_repository.list_members()? {
            if member.status == MemberStatus::Active {
                self.attendance_repository
                    .upsert_arrival(&Arrival::stub(event.date, &member.id))?;
            }
        }
        Ok(())
    }

    fn clear_deferral(&self, source_date: NaiveDate) -> DomainResult<()> {
        if let Some(mut source) = self.event_repository.get_event(source_date)? {
            source.deferred_member_id = None;
            self.event_repository.update_event(&source)?;
        }
        Ok(())
    }
}
