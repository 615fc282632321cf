//! Duty lifecycle operations: confirm/decline, late penalties, handover, and
//! the periodic status sweep.
//!
//! This service owns every write to `responsible`, `reason`, `weeks_held`,
//! and the roster's `completed_in_round` flags; the pure rules live in
//! [`crate::domain::rotation`].

use chrono::{Duration, NaiveDate};
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::rotation::{
    ApplyPenaltyResult, ConfirmHandoverResult, DeclineDutyResult, SweepResult,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Arrival, KitEvent, Member};
use crate::domain::rotation;
use crate::storage::memory::{AttendanceRepository, EventRepository, MemberRepository, MemoryConnection};
use crate::storage::traits::{AttendanceStorage, EventStorage, MemberStorage};
use shared::{AssignmentReason, EventStatus, MemberStatus, RotationConfig};

#[derive(Clone)]
pub struct RotationService {
    member_repository: MemberRepository,
    event_repository: EventRepository,
    attendance_repository: AttendanceRepository,
    config: RotationConfig,
}

impl RotationService {
    pub fn new(connection: Arc<MemoryConnection>, config: RotationConfig) -> Self {
        Self {
            member_repository: MemberRepository::new(connection.clone()),
            event_repository: EventRepository::new(connection.clone()),
            attendance_repository: AttendanceRepository::new(connection),
            config,
        }
    }

    /// Who the rotation would assign to a match on `as_of`, without writing
    /// anything. None when no one is eligible.
    pub fn select_next_assignee(&self, as_of: NaiveDate) -> DomainResult<Option<String>> {
        let roster = self.member_repository.list_members()?;
        let events = self.event_repository.list_events()?;
        Ok(rotation::select_next_assignee(&roster, &events, as_of))
    }

    /// Provisional assignee accepts the duty and becomes responsible.
    pub fn confirm_duty(&self, date: NaiveDate, member_id: &str) -> DomainResult<KitEvent> {
        let mut event = self.live_event(date)?;
        if event.responsible.is_some() {
            return Err(DomainError::AlreadyAssigned(date));
        }
        if event.provisional_assignee.as_deref() != Some(member_id) {
            return Err(DomainError::NotProvisionalAssignee);
        }

        event.responsible = Some(member_id.to_string());
        self.event_repository.update_event(&event)?;
        info!("{} confirmed kit duty for {}", member_id, date);
        Ok(event)
    }

    /// Provisional assignee declines; the rotation picks a replacement from
    /// the rest of the roster and assigns them outright.
    pub fn decline_duty(&self, date: NaiveDate, member_id: &str) -> DomainResult<DeclineDutyResult> {
        let mut event = self.live_event(date)?;
        if event.responsible.is_some() {
            return Err(DomainError::AlreadyAssigned(date));
        }
        if event.provisional_assignee.as_deref() != Some(member_id) {
            return Err(DomainError::NotProvisionalAssignee);
        }

        let roster = self.member_repository.list_members()?;
        let events = self.event_repository.list_events()?;
        let remainder: Vec<Member> = roster
            .iter()
            .filter(|m| m.id != member_id)
            .cloned()
            .collect();
        let replacement = rotation::select_next_assignee(&remainder, &events, date)
            .ok_or(DomainError::NoEligibleReplacement)?;

        // A decline can be the moment a deferred member gets their slot back.
        if let Some((source_date, deferred)) = rotation::pending_deferral(&remainder, &events, date)
        {
            if deferred == replacement {
                self.clear_deferral(source_date)?;
            }
        }

        event.provisional_assignee = Some(replacement.clone());
        event.responsible = Some(replacement.clone());
        event.on_behalf_of = Some(member_id.to_string());
        event.reason = AssignmentReason::Reassigned;
        self.event_repository.update_event(&event)?;

        info!("{} declined duty for {}; {} takes over", member_id, date, replacement);
        Ok(DeclineDutyResult {
            event,
            replacement_id: replacement,
        })
    }

    /// Admin hands the duty to a specific member, recording who it was
    /// originally meant for.
    pub fn reassign_responsible(&self, date: NaiveDate, member_id: &str) -> DomainResult<KitEvent> {
        let mut event = self.live_event(date)?;
        self.member_repository
            .get_member(member_id)?
            .ok_or_else(|| DomainError::MemberNotFound(member_id.to_string()))?;

        if event.on_behalf_of.is_none() {
            match &event.provisional_assignee {
                Some(original) if original != member_id => {
                    event.on_behalf_of = Some(original.clone());
                }
                _ => {}
            }
        }
        event.responsible = Some(member_id.to_string());
        event.reason = AssignmentReason::Reassigned;
        self.event_repository.update_event(&event)?;
        info!("Reassigned kit duty for {} to {}", date, member_id);
        Ok(event)
    }

    /// The member to penalize for arriving last after the cutoff, if any.
    pub fn find_late_candidate(&self, date: NaiveDate) -> DomainResult<Option<Member>> {
        let event = self
            .event_repository
            .get_event(date)?
            .ok_or(DomainError::EventNotFound(date))?;
        let arrivals = self.attendance_repository.list_arrivals_for_event(date)?;
        let roster = self.member_repository.list_members()?;
        Ok(rotation::find_late_candidate(&event, &arrivals, &roster).cloned())
    }

    /// Hand the duty to `member_id` as a late-arrival penalty. The bumped
    /// provisional assignee is owed the next slot: either the next still
    /// `Scheduled` event is handed to them on the spot, or a follow-up event
    /// is created to carry their turn.
    pub fn apply_late_penalty(
        &self,
        date: NaiveDate,
        member_id: &str,
    ) -> DomainResult<ApplyPenaltyResult> {
        let mut event = self.live_event(date)?;
        let member = self
            .member_repository
            .get_member(member_id)?
            .ok_or_else(|| DomainError::MemberNotFound(member_id.to_string()))?;
        if !member.penalty_eligible {
            return Err(DomainError::NotPenaltyEligible(member_id.to_string()));
        }
        let arrival = self.attendance_repository.get_arrival(date, member_id)?;
        let arrived_late = arrival
            .map(|a| a.is_late(event.cutoff_time))
            .unwrap_or(false);
        if !arrived_late {
            return Err(DomainError::NotLate {
                member_id: member_id.to_string(),
                date,
            });
        }

        let deferred_member_id = event
            .provisional_assignee
            .clone()
            .filter(|bumped| bumped != member_id);

        event.responsible = Some(member_id.to_string());
        event.reason = AssignmentReason::PenaltyLate;
        event.deferred_member_id = deferred_member_id.clone();
        self.event_repository.update_event(&event)?;
        warn!("Late penalty on {}: {} takes kit duty", date, member_id);

        let mut follow_up_event = None;
        if let Some(bumped) = &deferred_member_id {
            follow_up_event = self.reinsert_deferred(&mut event, bumped)?;
        }

        Ok(ApplyPenaltyResult {
            event,
            deferred_member_id,
            follow_up_event,
        })
    }

    /// Admin confirms the kit was actually handed over. Finalizes the event,
    /// computes the consecutive-weeks counter, credits the round, and resets
    /// the round when this was the last turn outstanding.
    pub fn confirm_handover(&self, date: NaiveDate) -> DomainResult<ConfirmHandoverResult> {
        let mut event = self
            .event_repository
            .get_event(date)?
            .ok_or(DomainError::EventNotFound(date))?;
        if event.is_finalized() {
            return Err(DomainError::EventFinalized(date));
        }
        let responsible = event
            .responsible
            .clone()
            .ok_or(DomainError::NoResponsibleSet(date))?;

        let events = self.event_repository.list_events()?;
        event.weeks_held = rotation::weeks_held_for(&events, date, &responsible);
        event.status = EventStatus::Completed;
        self.event_repository.update_event(&event)?;

        // A deferred handover is the member's own (postponed) turn and counts;
        // a penalty never does.
        let counts_for_round = match event.reason {
            AssignmentReason::Rotation | AssignmentReason::Deferred => true,
            AssignmentReason::Reassigned => self.config.count_reassigned_as_completed,
            AssignmentReason::PenaltyLate => false,
        };

        let mut completed_member_id = None;
        let mut round_reset = false;
        if counts_for_round {
            if let Some(mut member) = self.member_repository.get_member(&responsible)? {
                member.completed_in_round = true;
                self.member_repository.update_member(&member)?;
                completed_member_id = Some(responsible.clone());
            }

            let mut roster = self.member_repository.list_members()?;
            if rotation::round_complete(&roster) {
                rotation::reset_round(&mut roster);
                self.member_repository.update_members(&roster)?;
                round_reset = true;
                info!("Round complete after {}; rotation flags reset", date);
            }
        }

        info!(
            "Handover confirmed for {}: {} held the kit {} week(s)",
            date, responsible, event.weeks_held
        );
        Ok(ConfirmHandoverResult {
            event,
            completed_member_id,
            round_reset,
        })
    }

    /// Resolve every past `Upcoming` event: `Completed` when someone was
    /// responsible, `Missed` otherwise. A past event still `Scheduled` is
    /// left alone; the confirm-match-status decision stays with the admin.
    /// Safe to run repeatedly.
    pub fn sweep_statuses(&self, today: NaiveDate) -> DomainResult<SweepResult> {
        let events = self.event_repository.list_events()?;
        let mut snapshot = events.clone();
        let mut completed = Vec::new();
        let mut missed = Vec::new();
        let mut changed = Vec::new();

        // Ascending date order so weeks_held chains across events resolved in
        // the same sweep.
        for (index, event) in events.iter().enumerate() {
            if event.status != EventStatus::Upcoming || event.date >= today {
                continue;
            }
            let mut updated = event.clone();
            match &event.responsible {
                Some(responsible) => {
                    updated.weeks_held = rotation::weeks_held_for(&snapshot, event.date, responsible);
                    updated.status = EventStatus::Completed;
                    completed.push(event.date);
                }
                None => {
                    updated.status = EventStatus::Missed;
                    missed.push(event.date);
                }
            }
            snapshot[index] = updated.clone();
            changed.push(updated);
        }

        self.event_repository.update_events(&changed)?;
        if !changed.is_empty() {
            info!(
                "Status sweep: {} completed, {} missed",
                completed.len(),
                missed.len()
            );
        }
        Ok(SweepResult { completed, missed })
    }

    /// An event open for duty actions: exists, `Upcoming`, not finalized.
    fn live_event(&self, date: NaiveDate) -> DomainResult<KitEvent> {
        let event = self
            .event_repository
            .get_event(date)?
            .ok_or(DomainError::EventNotFound(date))?;
        if event.is_finalized() {
            return Err(DomainError::EventFinalized(date));
        }
        if event.status != EventStatus::Upcoming {
            return Err(DomainError::EventNotLive(date));
        }
        Ok(event)
    }

    /// Give the bumped member their slot back. Prefer the next `Scheduled`
    /// event; create a follow-up one deferral period out when none exists.
    /// Either way the debt on the penalized event is cleared.
    fn reinsert_deferred(
        &self,
        penalized: &mut KitEvent,
        bumped: &str,
    ) -> DomainResult<Option<KitEvent>> {
        let events = self.event_repository.list_events()?;
        let next_scheduled = events
            .into_iter()
            .find(|e| e.date > penalized.date && e.status == EventStatus::Scheduled);

        if let Some(mut next) = next_scheduled {
            next.provisional_assignee = Some(bumped.to_string());
            next.reason = AssignmentReason::Deferred;
            self.event_repository.update_event(&next)?;
            penalized.deferred_member_id = None;
            self.event_repository.update_event(penalized)?;
            info!("Deferred {} re-inserted on {}", bumped, next.date);
            return Ok(None);
        }

        let follow_up_date = penalized.date + Duration::days(self.config.deferral_period_days);
        if self.event_repository.get_event(follow_up_date)?.is_some() {
            // An Upcoming or finalized event occupies the slot; leave the debt
            // on the penalized event for a later creation to repay.
            return Ok(None);
        }

        let follow_up = KitEvent {
            date: follow_up_date,
            due_date: follow_up_date,
            location: penalized.location,
            geo_radius_meters: penalized.geo_radius_meters,
            cutoff_time: penalized.cutoff_time,
            provisional_assignee: Some(bumped.to_string()),
            responsible: None,
            on_behalf_of: None,
            deferred_member_id: None,
            status: EventStatus::Scheduled,
            reason: AssignmentReason::Deferred,
            weeks_held: 0,
            match_started: false,
            notes: String::new(),
        };
        self.event_repository.store_event(&follow_up)?;
        for member in self.member_repository.list_members()? {
            if member.status == MemberStatus::Active {
                self.attendance_repository
                    .upsert_arrival(&Arrival::stub(follow_up.date, &member.id))?;
            }
        }

        penalized.deferred_member_id = None;
        self.event_repository.update_event(penalized)?;
        info!(
            "Created follow-up match on {} for deferred member {}",
            follow_up.date, bumped
        );
        Ok(Some(follow_up))
    }

    fn clear_deferral(&self, source_date: NaiveDate) -> DomainResult<()> {
        if let Some(mut source) = self.event_repository.get_event(source_date)? {
            source.deferred_member_id = None;
            self.event_repository.update_event(&source)?;
        }
        Ok(())
    }
}
