//! Greedy study-time allocation over a 7-day horizon.
//!
//! Given scored deliverables and a weekly availability budget, the planner
//! walks the horizon day by day and fills each day's budget with the
//! highest-priority work that is still due:
//! - Priorities are computed once against the run's start date and shared by
//!   every day in the horizon (intentionally not re-evaluated per day).
//! - Allocation is an explicit greedy heuristic, not an optimal solver.
//! - Work that cannot fit before its due date is silently left unscheduled;
//!   under-allocation surfaces through schedule review, not as an error.

pub mod priority;

use std::cmp::Ordering;

use chrono::{Days, NaiveDate};

use crate::error::{ConfigurationError, CoreError};
use crate::model::{Deliverable, PlannedSession, WeekAvailability};
use crate::store::PlanStore;

/// Number of days a single planning run covers.
pub const HORIZON_DAYS: u64 = 7;

/// Per-deliverable working state for one planning run.
///
/// The planner never mutates caller records; remaining hours are tracked in
/// this engine-owned copy and discarded on return.
struct WorkingItem<'a> {
    deliverable: &'a Deliverable,
    priority: f64,
    remaining_hours: f64,
}

/// Produce a 7-day plan starting at `start`.
///
/// `deliverables` is expected pre-filtered to not-done items due on or after
/// `start` (the store contract does this); the planner does not re-filter.
/// Sessions come back in day-then-priority order and are not yet persisted.
///
/// # Errors
/// Returns [`ConfigurationError::AvailabilityNotSet`] when no weekday has a
/// nonzero budget. An empty deliverable list is not an error and short-cuts
/// to an empty plan.
pub fn plan(
    start: NaiveDate,
    deliverables: &[Deliverable],
    availability: &WeekAvailability,
) -> Result<Vec<PlannedSession>, CoreError> {
    if deliverables.is_empty() {
        return Ok(Vec::new());
    }
    if !availability.has_any_hours() {
        return Err(ConfigurationError::AvailabilityNotSet.into());
    }

    // One shared reference date for the whole horizon.
    let mut items: Vec<WorkingItem> = deliverables
        .iter()
        .map(|d| WorkingItem {
            deliverable: d,
            priority: priority::priority_score(d, start),
            remaining_hours: d.remaining_hours(),
        })
        .collect();

    // Stable sort: equal priorities keep the caller's due-date ordering,
    // which makes plans reproducible for identical inputs.
    items.sort_by(|a, b| {
        b.priority
            .partial_cmp(&a.priority)
            .unwrap_or(Ordering::Equal)
    });

    let mut sessions = Vec::new();

    for day_offset in 0..HORIZON_DAYS {
        let current_date = start + Days::new(day_offset);
        let mut available_hours = availability.hours_on(current_date);

        for item in &mut items {
            if available_hours <= 0.0 {
                break;
            }
            if item.remaining_hours <= 0.0 {
                continue;
            }
            // Never schedule past the due date; leftover hours stay unplanned.
            if current_date > item.deliverable.due_date {
                continue;
            }

            let hours_to_allocate = item.remaining_hours.min(available_hours);
            sessions.push(PlannedSession {
                deliverable_id: item.deliverable.id.clone(),
                scheduled_date: current_date,
                allocated_hours: hours_to_allocate,
            });
            item.remaining_hours -= hours_to_allocate;
            available_hours -= hours_to_allocate;
        }
    }

    Ok(sessions)
}

/// Plan from the store's view of a user and atomically install the result as
/// the new future plan from `start` forward.
///
/// This is the on-demand entry point; the replanning coordinator drives the
/// same path with a day-after-execution start date.
pub fn generate_plan<S: PlanStore + ?Sized>(
    store: &S,
    user_id: &str,
    start: NaiveDate,
) -> Result<Vec<PlannedSession>, CoreError> {
    let deliverables = store.load_incomplete_deliverables(user_id, start)?;
    let availability = store.load_availability(user_id)?;
    let sessions = plan(start, &deliverables, &availability)?;
    store.replace_future_plan(user_id, start, &sessions)?;
    Ok(sessions)
}
