//! Roster administration.

use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::members::{CreateMemberCommand, DeleteMemberResult};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Member;
use crate::storage::memory::{AttendanceRepository, EventRepository, MemberRepository, MemoryConnection};
use crate::storage::traits::{AttendanceStorage, EventStorage, MemberStorage};
use shared::MemberStatus;

/// Service for managing the roster.
#[derive(Clone)]
pub struct MemberService {
    member_repository: MemberRepository,
    event_repository: EventRepository,
    attendance_repository: AttendanceRepository,
}

impl MemberService {
    pub fn new(connection: Arc<MemoryConnection>) -> Self {
        Self {
            member_repository: MemberRepository::new(connection.clone()),
            event_repository: EventRepository::new(connection.clone()),
            attendance_repository: AttendanceRepository::new(connection),
        }
    }

    /// Create a new roster member. New members join at the end of the
    /// rotation order unless an explicit order is given.
    pub fn create_member(&self, command: CreateMemberCommand) -> DomainResult<Member> {
        if command.name.trim().is_empty() {
            return Err(DomainError::Validation("member name cannot be empty".to_string()));
        }

        let order = match command.order {
            Some(order) => order,
            None => self.member_repository.max_order()? + 1,
        };

        let now = Utc::now();
        // Two creations inside the same millisecond would collide on the
        // timestamp-based id; bump until free.
        let mut millis = now.timestamp_millis() as u64;
        while self
            .member_repository
            .get_member(&Member::generate_id(millis))?
            .is_some()
        {
            millis += 1;
        }
        let member = Member {
            id: Member::generate_id(millis),
            name: command.name.trim().to_string(),
            phone_number: command.phone_number,
            status: command.status.unwrap_or(MemberStatus::Active),
            rotation_eligible: command.rotation_eligible,
            penalty_eligible: command.penalty_eligible,
            order,
            completed_in_round: false,
            owns_car: command.owns_car,
            notes: command.notes,
            created_at: now,
            updated_at: now,
        };

        self.member_repository.store_member(&member)?;
        info!("Created member {} ({}) at order {}", member.name, member.id, member.order);
        Ok(member)
    }

    pub fn get_member(&self, member_id: &str) -> DomainResult<Member> {
        self.member_repository
            .get_member(member_id)?
            .ok_or_else(|| DomainError::MemberNotFound(member_id.to_string()))
    }

    pub fn list_members(&self) -> DomainResult<Vec<Member>> {
        Ok(self.member_repository.list_members()?)
    }

    /// Replace a member's record. `completed_in_round` is carried over from
    /// the stored record; only the rotation engine may change it.
    pub fn update_member(&self, mut member: Member) -> DomainResult<Member> {
        let existing = self.get_member(&member.id)?;
        member.completed_in_round = existing.completed_in_round;
        member.created_at = existing.created_at;
        member.updated_at = Utc::now();
        self.member_repository.update_member(&member)?;
        info!("Updated member {}", member.id);
        Ok(member)
    }

    /// Delete a member and cascade: null out every event reference to them
    /// and purge their arrival records.
    pub fn delete_member(&self, member_id: &str) -> DomainResult<DeleteMemberResult> {
        let member = self.get_member(member_id)?;

        let mut cleared_events = 0;
        let mut touched = Vec::new();
        for mut event in self.event_repository.list_events()? {
            let mut changed = false;
            if event.provisional_assignee.as_deref() == Some(member_id) {
                event.provisional_assignee = None;
                changed = true;
            }
            if event.responsible.as_deref() == Some(member_id) {
                event.responsible = None;
                changed = true;
            }
            if event.on_behalf_of.as_deref() == Some(member_id) {
                event.on_behalf_of = None;
                changed = true;
            }
            if event.deferred_member_id.as_deref() == Some(member_id) {
                event.deferred_member_id = None;
                changed = true;
            }
            if changed {
                cleared_events += 1;
                touched.push(event);
            }
        }
        self.event_repository.update_events(&touched)?;

        let purged_arrivals = self.attendance_repository.delete_arrivals_for_member(member_id)?;
        self.member_repository.delete_member(member_id)?;

        if cleared_events > 0 {
            warn!(
                "Deleted member {} and cleared references on {} event(s)",
                member_id, cleared_events
            );
        } else {
            info!("Deleted member {}", member_id);
        }

        Ok(DeleteMemberResult {
            member,
            cleared_events,
            purged_arrivals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Arrival, KitEvent};
    use chrono::{NaiveDate, NaiveTime};
    use shared::{AssignmentReason, EventStatus, GeoPoint};

    fn setup_test() -> (MemberService, Arc<MemoryConnection>) {
        let conn = Arc::new(MemoryConnection::new());
        (MemberService::new(conn.clone()), conn)
    }

    fn create(service: &MemberService, name: &str) -> Member {
        service
            .create_member(CreateMemberCommand {
                name: name.to_string(),
                phone_number: "+971501111111".to_string(),
                status: None,
                rotation_eligible: true,
                penalty_eligible: true,
                order: None,
                owns_car: true,
                notes: String::new(),
            })
            .expect("Failed to create member")
    }

    #[test]
    fn test_create_member_defaults() {
        let (service, _) = setup_test();
        let member = create(&service, "Alex");

        assert_eq!(member.status, MemberStatus::Active);
        assert!(!member.completed_in_round);
        assert_eq!(member.order, 1);
        assert!(member.id.starts_with("member::"));
    }

    #[test]
    fn test_create_member_appends_after_max_order() {
        let (service, _) = setup_test();
        create(&service, "Alex");
        let second = service
            .create_member(CreateMemberCommand {
                name: "Ben".to_string(),
                phone_number: "+971502222222".to_string(),
                status: None,
                rotation_eligible: true,
                penalty_eligible: true,
                order: Some(10),
                owns_car: false,
                notes: String::new(),
            })
            .expect("Failed to create member");
        assert_eq!(second.order, 10);

        let third = create(&service, "Charlie");
        assert_eq!(third.order, 11);
    }

    #[test]
    fn test_create_member_rejects_empty_name() {
        let (service, _) = setup_test();
        let result = service.create_member(CreateMemberCommand {
            name: "   ".to_string(),
            phone_number: String::new(),
            status: None,
            rotation_eligible: false,
            penalty_eligible: false,
            order: None,
            owns_car: false,
            notes: String::new(),
        });
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_update_member_preserves_round_flag() {
        let (service, conn) = setup_test();
        let mut member = create(&service, "Alex");

        // The engine marked the round complete out of band.
        {
            let mut members = conn.members.write().unwrap();
            members[0].completed_in_round = true;
        }

        member.name = "Alexandra".to_string();
        member.completed_in_round = false; // caller cannot clear it
        let updated = service.update_member(member).expect("Failed to update");
        assert_eq!(updated.name, "Alexandra");
        assert!(updated.completed_in_round);
    }

    #[test]
    fn test_delete_member_cascades() {
        let (service, conn) = setup_test();
        let member = create(&service, "Alex");
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

        {
            let mut events = conn.events.write().unwrap();
            events.push(KitEvent {
                date,
                due_date: date,
                location: GeoPoint::new(25.0763, 55.1886),
                geo_radius_meters: 250.0,
                cutoff_time: NaiveTime::from_hms_opt(22, 45, 0).unwrap(),
                provisional_assignee: Some(member.id.clone()),
                responsible: Some(member.id.clone()),
                on_behalf_of: None,
                deferred_member_id: Some(member.id.clone()),
                status: EventStatus::Upcoming,
                reason: AssignmentReason::Rotation,
                weeks_held: 0,
                match_started: false,
                notes: String::new(),
            });
            let mut arrivals = conn.arrivals.write().unwrap();
            arrivals.push(Arrival::stub(date, &member.id));
        }

        let result = service.delete_member(&member.id).expect("Failed to delete");
        assert_eq!(result.cleared_events, 1);
        assert_eq!(result.purged_arrivals, 1);

        let events = conn.events.read().unwrap();
        assert!(events[0].provisional_assignee.is_none());
        assert!(events[0].responsible.is_none());
        assert!(events[0].deferred_member_id.is_none());
        assert!(conn.arrivals.read().unwrap().is_empty());
        assert!(conn.members.read().unwrap().is_empty());
    }

    #[test]
    fn test_delete_unknown_member_fails() {
        let (service, _) = setup_test();
        let result = service.delete_member("member::404");
        assert!(matches!(result, Err(DomainError::MemberNotFound(_))));
    }
}
