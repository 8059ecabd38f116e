//! Progress-driven replanning.
//!
//! One progress event moves a single planned session to its terminal state,
//! rolls the executed hours into the owning deliverable, discards the entire
//! future planned set and regenerates it from the day after execution. The
//! coordinator itself is a pure function over [`PlanStore`]; each store wraps
//! it in its own atomic unit (SQLite transaction, in-memory snapshot) so a
//! failure partway leaves prior state observably unchanged.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::error::{CoreError, NotFoundError, ValidationError};
use crate::model::{PlannedSession, ProgressEvent, SessionStatus};
use crate::planner;
use crate::store::PlanStore;

/// Result of one applied progress event.
#[derive(Debug, Clone, Serialize)]
pub struct ReplanSummary {
    pub session_id: String,
    pub deliverable_id: String,
    pub status: SessionStatus,
    /// Hours rolled into the deliverable's completed counter
    pub recorded_hours: f64,
    /// First day of the regenerated plan
    pub replanned_from: NaiveDate,
    pub new_sessions: Vec<PlannedSession>,
}

/// Hours to record for an event, per status.
///
/// `completed` always records the allocated hours and ignores any caller
/// value; `partial` requires one; `missed` records zero (the completed
/// counter is never decremented, a missed session just adds nothing).
fn resolve_actual_hours(event: &ProgressEvent, allocated_hours: f64) -> Result<f64, CoreError> {
    match event.status {
        SessionStatus::Completed => Ok(allocated_hours),
        SessionStatus::Partial => {
            let hours = event
                .actual_hours
                .ok_or(ValidationError::MissingActualHours)?;
            if hours < 0.0 {
                return Err(ValidationError::OutOfRange {
                    field: "actual_hours",
                    message: format!("must be non-negative, got {hours}"),
                }
                .into());
            }
            Ok(hours)
        }
        SessionStatus::Missed => Ok(0.0),
        SessionStatus::Planned => Err(ValidationError::InvalidProgressStatus.into()),
    }
}

/// Apply one progress event and regenerate the future plan.
///
/// `on_date` is the execution date; the regenerated plan starts the next
/// day. All validation happens before the first write, so the store wrapper
/// only has to roll back failures from the write path.
///
/// # Errors
/// [`NotFoundError::Session`] if the session does not exist,
/// [`ValidationError`] for a non-terminal target status, a re-reported
/// session, or `partial` without `actual_hours`.
pub fn apply_progress<S: PlanStore + ?Sized>(
    store: &S,
    user_id: &str,
    event: &ProgressEvent,
    on_date: NaiveDate,
) -> Result<ReplanSummary, CoreError> {
    let session = store
        .get_session(&event.session_id)?
        .ok_or_else(|| NotFoundError::Session(event.session_id.clone()))?;

    if session.status != SessionStatus::Planned {
        return Err(ValidationError::SessionNotPlanned {
            session_id: session.id,
            status: session.status.as_str().to_string(),
        }
        .into());
    }

    let recorded_hours = resolve_actual_hours(event, session.allocated_hours)?;

    store.update_session_progress(&session.id, event.status, recorded_hours)?;
    store.increment_completed_hours(&session.deliverable_id, recorded_hours)?;

    // Invalidate the whole future plan, not just this deliverable's share.
    let replan_start = on_date + Days::new(1);
    let new_sessions = planner::generate_plan(store, user_id, replan_start)?;

    Ok(ReplanSummary {
        session_id: session.id,
        deliverable_id: session.deliverable_id,
        status: event.status,
        recorded_hours,
        replanned_from: replan_start,
        new_sessions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Deliverable, WeekAvailability};
    use crate::store::MemoryStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2025-03-09 is a Sunday.
    fn sunday() -> NaiveDate {
        date(2025, 3, 9)
    }

    fn deliverable(course_id: &str, due: NaiveDate, estimated: f64) -> Deliverable {
        let now = Utc::now();
        Deliverable {
            id: Uuid::new_v4().to_string(),
            course_id: course_id.to_string(),
            name: "Essay draft".to_string(),
            kind: "assignment".to_string(),
            due_date: due,
            grade_weight: 25.0,
            estimated_hours: estimated,
            hours_completed: 0.0,
            score: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Store with one course, one 8h deliverable due Saturday, 2h every day,
    /// and a plan generated from Sunday.
    fn seeded_store() -> (MemoryStore, String) {
        let store = MemoryStore::new();
        let course = store.add_course("alice", "Physics", Some("PHY-101"));
        store.add_deliverable(deliverable(&course, sunday() + Days::new(6), 8.0));
        store.set_availability("alice", WeekAvailability::new([2.0; 7]).unwrap());
        let sessions = planner::generate_plan(&store, "alice", sunday()).unwrap();
        assert_eq!(sessions.len(), 4);
        let first_id = store
            .sessions()
            .iter()
            .find(|s| s.scheduled_date == sunday())
            .unwrap()
            .id
            .clone();
        (store, first_id)
    }

    #[test]
    fn completed_records_allocated_hours_and_ignores_caller_value() {
        let (store, session_id) = seeded_store();
        let event = ProgressEvent {
            session_id: session_id.clone(),
            status: SessionStatus::Completed,
            actual_hours: Some(99.0),
        };

        let summary = store.apply_progress("alice", &event, sunday()).unwrap();
        assert_eq!(summary.recorded_hours, 2.0);

        let session = store.get_session(&session_id).unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.actual_hours, Some(2.0));

        let d = store.deliverable(&summary.deliverable_id).unwrap();
        assert_eq!(d.hours_completed, 2.0);
    }

    #[test]
    fn partial_requires_actual_hours() {
        let (store, session_id) = seeded_store();
        let before = store.sessions();
        let event = ProgressEvent {
            session_id,
            status: SessionStatus::Partial,
            actual_hours: None,
        };

        let err = store.apply_progress("alice", &event, sunday()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MissingActualHours)
        ));
        // Nothing moved.
        assert_eq!(store.sessions().len(), before.len());
        assert!(store
            .sessions()
            .iter()
            .all(|s| s.status == SessionStatus::Planned));
    }

    #[test]
    fn partial_records_caller_hours() {
        let (store, session_id) = seeded_store();
        let event = ProgressEvent {
            session_id,
            status: SessionStatus::Partial,
            actual_hours: Some(0.5),
        };

        let summary = store.apply_progress("alice", &event, sunday()).unwrap();
        assert_eq!(summary.recorded_hours, 0.5);
        assert_eq!(
            store.deliverable(&summary.deliverable_id).unwrap().hours_completed,
            0.5
        );
    }

    #[test]
    fn missed_records_zero_and_never_decrements() {
        let (store, session_id) = seeded_store();
        let event = ProgressEvent {
            session_id,
            status: SessionStatus::Missed,
            actual_hours: None,
        };

        let summary = store.apply_progress("alice", &event, sunday()).unwrap();
        assert_eq!(summary.recorded_hours, 0.0);

        let d = store.deliverable(&summary.deliverable_id).unwrap();
        assert_eq!(d.hours_completed, 0.0);
        // All 8 hours still owed; the new plan re-spreads them from Monday.
        let replanned: f64 = summary.new_sessions.iter().map(|s| s.allocated_hours).sum();
        assert_eq!(replanned, 8.0);
    }

    #[test]
    fn future_plan_is_fully_replaced_from_the_next_day() {
        let (store, session_id) = seeded_store();
        let event = ProgressEvent {
            session_id: session_id.clone(),
            status: SessionStatus::Completed,
            actual_hours: None,
        };

        let summary = store.apply_progress("alice", &event, sunday()).unwrap();

        assert_eq!(summary.replanned_from, sunday() + Days::new(1));
        let sessions = store.sessions();
        // The executed session survives; every planned session is new and
        // dated after the execution date.
        for s in &sessions {
            if s.id == session_id {
                assert_eq!(s.status, SessionStatus::Completed);
            } else {
                assert_eq!(s.status, SessionStatus::Planned);
                assert!(s.scheduled_date > sunday());
            }
        }
        // 6 hours left at 2h/day.
        assert_eq!(summary.new_sessions.len(), 3);
    }

    #[test]
    fn nonexistent_session_is_not_found_and_leaves_store_unchanged() {
        let (store, _) = seeded_store();
        let sessions_before = store.sessions().len();
        let event = ProgressEvent {
            session_id: "no-such-session".to_string(),
            status: SessionStatus::Completed,
            actual_hours: None,
        };

        let err = store.apply_progress("alice", &event, sunday()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(NotFoundError::Session(_))));
        assert_eq!(store.sessions().len(), sessions_before);
    }

    #[test]
    fn progress_transition_is_terminal() {
        let (store, session_id) = seeded_store();
        let event = ProgressEvent {
            session_id: session_id.clone(),
            status: SessionStatus::Completed,
            actual_hours: None,
        };
        store.apply_progress("alice", &event, sunday()).unwrap();

        let err = store.apply_progress("alice", &event, sunday()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::SessionNotPlanned { .. })
        ));
    }

    #[test]
    fn planned_is_not_a_valid_progress_status() {
        let (store, session_id) = seeded_store();
        let event = ProgressEvent {
            session_id,
            status: SessionStatus::Planned,
            actual_hours: None,
        };
        let err = store.apply_progress("alice", &event, sunday()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidProgressStatus)
        ));
    }

    #[test]
    fn completing_the_last_hours_drops_the_deliverable_from_the_plan() {
        let store = MemoryStore::new();
        let course = store.add_course("alice", "Physics", None);
        store.add_deliverable(deliverable(&course, sunday() + Days::new(6), 2.0));
        store.set_availability("alice", WeekAvailability::new([2.0; 7]).unwrap());
        planner::generate_plan(&store, "alice", sunday()).unwrap();
        let session_id = store.sessions()[0].id.clone();

        let summary = store
            .apply_progress(
                "alice",
                &ProgressEvent {
                    session_id,
                    status: SessionStatus::Completed,
                    actual_hours: None,
                },
                sunday(),
            )
            .unwrap();

        // Deliverable is done; the regenerated plan is empty.
        assert!(summary.new_sessions.is_empty());
        assert_eq!(
            store
                .sessions()
                .iter()
                .filter(|s| s.status == SessionStatus::Planned)
                .count(),
            0
        );
    }
}
