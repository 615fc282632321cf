//! Pure rotation rules.
//!
//! Everything here is a synchronous transformation over roster/event
//! snapshots; services load state, call these functions, and write the result
//! back. The `completed_in_round` flag set is the primary pointer for who is
//! still owed a turn; the most recent completed event only orders candidates
//! within the current round.

use chrono::NaiveDate;
use shared::EventStatus;

use crate::domain::models::{Arrival, KitEvent, Member};

/// Active, rotation-eligible members in rotation sequence. The sort is
/// stable, so members sharing an `order` value keep roster insertion order.
pub fn eligible_members(roster: &[Member]) -> Vec<&Member> {
    let mut eligible: Vec<&Member> = roster
        .iter()
        .filter(|m| m.is_rotation_candidate())
        .collect();
    eligible.sort_by_key(|m| m.order);
    eligible
}

/// The earliest unresolved deferral before `as_of`: an event whose penalty
/// bumped a member who is still eligible. The operation that re-inserts the
/// member clears the debt on the source event.
pub fn pending_deferral(
    roster: &[Member],
    events: &[KitEvent],
    as_of: NaiveDate,
) -> Option<(NaiveDate, String)> {
    let mut deferred: Vec<&KitEvent> = events
        .iter()
        .filter(|e| e.date < as_of && e.deferred_member_id.is_some())
        .collect();
    deferred.sort_by_key(|e| e.date);

    for event in deferred {
        if let Some(member_id) = &event.deferred_member_id {
            let still_eligible = roster
                .iter()
                .any(|m| &m.id == member_id && m.is_rotation_candidate());
            if still_eligible {
                return Some((event.date, member_id.clone()));
            }
        }
    }
    None
}

/// Rotation order of the member responsible for the most recent completed
/// event before `as_of`. An event whose responsible member has since been
/// deleted is skipped in favor of the next most recent one.
fn anchor_order(roster: &[Member], events: &[KitEvent], as_of: NaiveDate) -> Option<i32> {
    let mut completed: Vec<&KitEvent> = events
        .iter()
        .filter(|e| e.status == EventStatus::Completed && e.date < as_of)
        .collect();
    completed.sort_by_key(|e| e.date);

    for event in completed.iter().rev() {
        if let Some(responsible) = &event.responsible {
            if let Some(member) = roster.iter().find(|m| &m.id == responsible) {
                return Some(member.order);
            }
        }
    }
    None
}

/// Who is provisionally assigned to an event on `as_of`.
///
/// A pending deferral wins outright; otherwise members who have not completed
/// the current round are considered, starting strictly after the anchor's
/// order and wrapping to the front. Returns None only when no one is
/// eligible at all.
pub fn select_next_assignee(
    roster: &[Member],
    events: &[KitEvent],
    as_of: NaiveDate,
) -> Option<String> {
    if let Some((_, member_id)) = pending_deferral(roster, events, as_of) {
        return Some(member_id);
    }

    let eligible = eligible_members(roster);
    if eligible.is_empty() {
        return None;
    }

    let mut candidates: Vec<&Member> = eligible
        .iter()
        .copied()
        .filter(|m| !m.completed_in_round)
        .collect();
    if candidates.is_empty() {
        // Everyone is flagged complete; the reset should have run, but a
        // stale snapshot must still produce an assignment.
        candidates = eligible;
    }

    let picked = match anchor_order(roster, events, as_of) {
        Some(order) => candidates
            .iter()
            .copied()
            .find(|m| m.order > order)
            .or_else(|| candidates.first().copied()),
        None => candidates.first().copied(),
    };

    picked.map(|m| m.id.clone())
}

/// Whether every active, rotation-eligible member has completed this round.
pub fn round_complete(roster: &[Member]) -> bool {
    let eligible: Vec<&Member> = roster
        .iter()
        .filter(|m| m.is_rotation_candidate())
        .collect();
    !eligible.is_empty() && eligible.iter().all(|m| m.completed_in_round)
}

/// Start a new round: clear the completion flag on every eligible member.
pub fn reset_round(roster: &mut [Member]) {
    for member in roster.iter_mut() {
        if member.is_rotation_candidate() {
            member.completed_in_round = false;
        }
    }
}

/// Consecutive-occurrence count for `responsible` completing the event on
/// `date`: one more than the immediately preceding completed event when the
/// same member held it, otherwise 1.
pub fn weeks_held_for(events: &[KitEvent], date: NaiveDate, responsible: &str) -> u32 {
    let mut completed: Vec<&KitEvent> = events
        .iter()
        .filter(|e| e.status == EventStatus::Completed && e.date < date)
        .collect();
    completed.sort_by_key(|e| e.date);

    match completed.last() {
        Some(previous) if previous.responsible.as_deref() == Some(responsible) => {
            previous.weeks_held + 1
        }
        _ => 1,
    }
}

/// The member to penalize for an event: the penalty-eligible member with the
/// latest arrival after the cutoff. Identical timestamps break by ascending
/// rotation order.
pub fn find_late_candidate<'a>(
    event: &KitEvent,
    arrivals: &[Arrival],
    roster: &'a [Member],
) -> Option<&'a Member> {
    let mut late: Vec<(&Arrival, &'a Member)> = arrivals
        .iter()
        .filter(|a| a.event_date == event.date && a.is_late(event.cutoff_time))
        .filter_map(|a| {
            roster
                .iter()
                .find(|m| m.id == a.member_id && m.penalty_eligible)
                .map(|m| (a, m))
        })
        .collect();

    // Sort so the latest arrival lands last; among equal timestamps the
    // lowest order lands last and wins.
    late.sort_by(|(a1, m1), (a2, m2)| {
        a1.arrival_time
            .cmp(&a2.arrival_time)
            .then(m2.order.cmp(&m1.order))
    });

    late.last().map(|(_, m)| *m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone, Utc};
    use shared::{AssignmentReason, GeoPoint, MemberStatus};

    fn member(id: &str, order: i32) -> Member {
        Member {
            id: id.to_string(),
            name: id.to_uppercase(),
            phone_number: "+971500000000".to_string(),
            status: MemberStatus::Active,
            rotation_eligible: true,
            penalty_eligible: true,
            order,
            completed_in_round: false,
            owns_car: true,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn event(date: NaiveDate) -> KitEvent {
        KitEvent {
            date,
            due_date: date,
            location: GeoPoint::new(25.0763, 55.1886),
            geo_radius_meters: 250.0,
            cutoff_time: NaiveTime::from_hms_opt(22, 45, 0).unwrap(),
            provisional_assignee: None,
            responsible: None,
            on_behalf_of: None,
            deferred_member_id: None,
            status: EventStatus::Scheduled,
            reason: AssignmentReason::Rotation,
            weeks_held: 0,
            match_started: false,
            notes: String::new(),
        }
    }

    fn completed(date: NaiveDate, responsible: &str, weeks_held: u32) -> KitEvent {
        let mut e = event(date);
        e.status = EventStatus::Completed;
        e.provisional_assignee = Some(responsible.to_string());
        e.responsible = Some(responsible.to_string());
        e.weeks_held = weeks_held;
        e
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).expect("valid date")
    }

    #[test]
    fn test_no_history_picks_first_by_order() {
        let roster = vec![member("b", 2), member("a", 1), member("c", 3)];
        let picked = select_next_assignee(&roster, &[], d(10));
        assert_eq!(picked.as_deref(), Some("a"));
    }

    #[test]
    fn test_order_ties_keep_insertion_order() {
        let roster = vec![member("first", 5), member("second", 5)];
        let picked = select_next_assignee(&roster, &[], d(10));
        assert_eq!(picked.as_deref(), Some("first"));
    }

    #[test]
    fn test_anchor_advances_past_last_completed() {
        let roster = vec![member("a", 1), member("b", 2), member("c", 3)];
        let events = vec![completed(d(1), "a", 1)];
        let picked = select_next_assignee(&roster, &events, d(8));
        assert_eq!(picked.as_deref(), Some("b"));
    }

    #[test]
    fn test_wraps_after_last_in_sequence() {
        let mut roster = vec![member("a", 1), member("b", 2), member("c", 3)];
        // A fresh round has just been reset; c completed the last event.
        for m in roster.iter_mut() {
            m.completed_in_round = false;
        }
        let events = vec![completed(d(1), "c", 1)];
        let picked = select_next_assignee(&roster, &events, d(8));
        assert_eq!(picked.as_deref(), Some("a"));
    }

    #[test]
    fn test_completed_members_skipped_within_round() {
        let mut roster = vec![member("a", 1), member("b", 2), member("c", 3)];
        roster[0].completed_in_round = true;
        roster[1].completed_in_round = true;
        let events = vec![completed(d(1), "a", 1), completed(d(8), "b", 1)];
        let picked = select_next_assignee(&roster, &events, d(15));
        assert_eq!(picked.as_deref(), Some("c"));
    }

    #[test]
    fn test_inactive_and_ineligible_filtered() {
        let mut roster = vec![member("a", 1), member("b", 2), member("c", 3)];
        roster[0].status = MemberStatus::Injured;
        roster[1].rotation_eligible = false;
        let picked = select_next_assignee(&roster, &[], d(10));
        assert_eq!(picked.as_deref(), Some("c"));
    }

    #[test]
    fn test_empty_roster_yields_none() {
        assert_eq!(select_next_assignee(&[], &[], d(10)), None);

        let mut roster = vec![member("a", 1)];
        roster[0].rotation_eligible = false;
        assert_eq!(select_next_assignee(&roster, &[], d(10)), None);
    }

    #[test]
    fn test_deferral_takes_priority_over_order() {
        let roster = vec![member("a", 1), member("b", 2), member("c", 3)];
        let mut penalized = completed(d(1), "b", 1);
        penalized.deferred_member_id = Some("c".to_string());
        let events = vec![penalized];

        // Plain rotation after b would pick c anyway; move the debt to a to
        // prove the deferral wins regardless of order.
        let mut events2 = events.clone();
        events2[0].deferred_member_id = Some("a".to_string());
        assert_eq!(
            select_next_assignee(&roster, &events2, d(8)).as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_deferral_ignored_when_member_no_longer_eligible() {
        let mut roster = vec![member("a", 1), member("b", 2)];
        roster[0].status = MemberStatus::Injured;
        let mut penalized = completed(d(1), "b", 1);
        penalized.deferred_member_id = Some("a".to_string());
        let picked = select_next_assignee(&roster, &[penalized], d(8));
        assert_eq!(picked.as_deref(), Some("b"));
    }

    #[test]
    fn test_anchor_tolerates_deleted_responsible() {
        let roster = vec![member("a", 1), member("b", 2)];
        // The most recent completed event references a member who has been
        // removed from the roster; the older one anchors instead.
        let events = vec![completed(d(1), "a", 1), completed(d(8), "ghost", 1)];
        let picked = select_next_assignee(&roster, &events, d(15));
        assert_eq!(picked.as_deref(), Some("b"));
    }

    #[test]
    fn test_round_complete_and_reset() {
        let mut roster = vec![member("a", 1), member("b", 2), member("c", 3)];
        assert!(!round_complete(&roster));

        for m in roster.iter_mut() {
            m.completed_in_round = true;
        }
        assert!(round_complete(&roster));

        reset_round(&mut roster);
        assert!(roster.iter().all(|m| !m.completed_in_round));
        assert!(!round_complete(&roster));
    }

    #[test]
    fn test_round_complete_ignores_ineligible_members() {
        let mut roster = vec![member("a", 1), member("b", 2)];
        roster[0].completed_in_round = true;
        roster[1].rotation_eligible = false;
        assert!(round_complete(&roster));
    }

    #[test]
    fn test_round_complete_false_for_empty_roster() {
        assert!(!round_complete(&[]));
    }

    #[test]
    fn test_weeks_held_chains_for_same_member() {
        let events = vec![completed(d(1), "a", 2)];
        assert_eq!(weeks_held_for(&events, d(8), "a"), 3);
        assert_eq!(weeks_held_for(&events, d(8), "b"), 1);
        assert_eq!(weeks_held_for(&[], d(8), "a"), 1);
    }

    #[test]
    fn test_weeks_held_uses_immediately_preceding_event() {
        let events = vec![completed(d(1), "a", 1), completed(d(8), "b", 1)];
        // b held it last, so a starts over even with older history.
        assert_eq!(weeks_held_for(&events, d(15), "a"), 1);
        assert_eq!(weeks_held_for(&events, d(15), "b"), 2);
    }

    #[test]
    fn test_full_round_coverage() {
        // Simulate N confirm+handover cycles: every member assigned exactly
        // once before any repeats, flags reset after the Nth.
        let mut roster = vec![member("a", 1), member("b", 2), member("c", 3)];
        let mut events: Vec<KitEvent> = Vec::new();
        let mut assigned: Vec<String> = Vec::new();

        for week in 0..3 {
            let date = d(1 + week * 7);
            let picked = select_next_assignee(&roster, &events, date).expect("someone eligible");
            assigned.push(picked.clone());

            let weeks = weeks_held_for(&events, date, &picked);
            let mut e = completed(date, &picked, 0);
            e.weeks_held = weeks;
            events.push(e);

            if let Some(m) = roster.iter_mut().find(|m| m.id == picked) {
                m.completed_in_round = true;
            }
            if round_complete(&roster) {
                reset_round(&mut roster);
            }
        }

        assert_eq!(assigned, vec!["a", "b", "c"]);
        assert!(roster.iter().all(|m| !m.completed_in_round));

        // The next pick wraps back to the start of the order.
        let next = select_next_assignee(&roster, &events, d(22));
        assert_eq!(next.as_deref(), Some("a"));
    }

    #[test]
    fn test_find_late_candidate_picks_last_to_arrive() {
        let roster = vec![member("a", 1), member("b", 2), member("c", 3)];
        let e = event(d(15));
        let arrive = |id: &str, h: u32, m: u32| {
            let mut a = Arrival::stub(d(15), id);
            a.arrival_time = Some(Utc.with_ymd_and_hms(2025, 6, 15, h, m, 0).unwrap());
            a
        };

        let arrivals = vec![arrive("a", 22, 30), arrive("b", 23, 10), arrive("c", 22, 50)];
        let candidate = find_late_candidate(&e, &arrivals, &roster).expect("late arrivals");
        assert_eq!(candidate.id, "b");
    }

    #[test]
    fn test_find_late_candidate_tie_breaks_by_order() {
        let roster = vec![member("b", 2), member("a", 1)];
        let e = event(d(15));
        let mut first = Arrival::stub(d(15), "b");
        first.arrival_time = Some(Utc.with_ymd_and_hms(2025, 6, 15, 23, 0, 0).unwrap());
        let mut second = Arrival::stub(d(15), "a");
        second.arrival_time = Some(Utc.with_ymd_and_hms(2025, 6, 15, 23, 0, 0).unwrap());

        let candidate = find_late_candidate(&e, &[first, second], &roster).expect("late arrivals");
        assert_eq!(candidate.id, "a");
    }

    #[test]
    fn test_find_late_candidate_skips_penalty_exempt() {
        let mut roster = vec![member("a", 1), member("b", 2)];
        roster[1].penalty_eligible = false;
        let e = event(d(15));
        let mut late = Arrival::stub(d(15), "b");
        late.arrival_time = Some(Utc.with_ymd_and_hms(2025, 6, 15, 23, 30, 0).unwrap());
        let mut earlier = Arrival::stub(d(15), "a");
        earlier.arrival_time = Some(Utc.with_ymd_and_hms(2025, 6, 15, 23, 0, 0).unwrap());

        let candidate = find_late_candidate(&e, &[late, earlier], &roster).expect("late arrivals");
        assert_eq!(candidate.id, "a");
    }

    #[test]
    fn test_find_late_candidate_none_when_punctual() {
        let roster = vec![member("a", 1)];
        let e = event(d(15));
        let mut on_time = Arrival::stub(d(15), "a");
        on_time.arrival_time = Some(Utc.with_ymd_and_hms(2025, 6, 15, 22, 0, 0).unwrap());
        assert!(find_late_candidate(&e, &[on_time], &roster).is_none());
    }
}
