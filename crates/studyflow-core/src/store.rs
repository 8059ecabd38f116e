//! Store contract between the planning engine and persistence.
//!
//! The engine never talks to SQL directly; every read and write goes through
//! [`PlanStore`]. The SQLite implementation lives in [`crate::storage`];
//! [`MemoryStore`] is the in-process implementation used by engine tests and
//! as the reference for the atomicity contract: a multi-step replan either
//! applies fully or leaves the store observably unchanged.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{CoreError, NotFoundError};
use crate::model::{
    Course, Deliverable, PlannedSession, ProgressEvent, ScheduleSession, SessionStatus,
    WeekAvailability,
};
use crate::replan::{self, ReplanSummary};

/// Persistence operations the planning engine depends on.
///
/// Methods take `&self`; implementations use interior mutability (rusqlite
/// connections and [`MemoryStore`] both do). Every operation is scoped to an
/// explicit user id so multi-tenant callers need no engine changes.
pub trait PlanStore {
    /// Not-done deliverables due on or after `not_before` for the user's
    /// courses, ordered by due date ascending.
    fn load_incomplete_deliverables(
        &self,
        user_id: &str,
        not_before: NaiveDate,
    ) -> Result<Vec<Deliverable>, CoreError>;

    /// The user's weekly availability; an unset week comes back all-zero.
    fn load_availability(&self, user_id: &str) -> Result<WeekAvailability, CoreError>;

    /// Atomically delete every planned session dated on or after `cutover`
    /// and insert `sessions` as the new planned set. Executed history is
    /// never touched.
    fn replace_future_plan(
        &self,
        user_id: &str,
        cutover: NaiveDate,
        sessions: &[PlannedSession],
    ) -> Result<(), CoreError>;

    fn get_session(&self, session_id: &str) -> Result<Option<ScheduleSession>, CoreError>;

    /// Single terminal transition of one session out of the planned state.
    fn update_session_progress(
        &self,
        session_id: &str,
        status: SessionStatus,
        actual_hours: f64,
    ) -> Result<(), CoreError>;

    /// Add executed hours to a deliverable's completed counter.
    fn increment_completed_hours(
        &self,
        deliverable_id: &str,
        hours: f64,
    ) -> Result<(), CoreError>;

    /// All deliverables of one course, due date ascending.
    fn load_course_deliverables(&self, course_id: &str) -> Result<Vec<Deliverable>, CoreError>;
}

#[derive(Debug, Clone, Default)]
struct MemoryInner {
    courses: Vec<Course>,
    deliverables: Vec<Deliverable>,
    availability: HashMap<String, WeekAvailability>,
    sessions: Vec<ScheduleSession>,
}

/// In-memory [`PlanStore`].
///
/// Backs engine tests and doubles as a worked example of the atomicity
/// contract: [`MemoryStore::apply_progress`] snapshots the whole state and
/// restores it when the coordinator fails partway.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RefCell<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a course and return its id.
    pub fn add_course(&self, user_id: &str, name: &str, code: Option<&str>) -> String {
        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            code: code.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        let id = course.id.clone();
        self.inner.borrow_mut().courses.push(course);
        id
    }

    /// Insert a deliverable and return its id.
    pub fn add_deliverable(&self, deliverable: Deliverable) -> String {
        let id = deliverable.id.clone();
        self.inner.borrow_mut().deliverables.push(deliverable);
        id
    }

    pub fn set_availability(&self, user_id: &str, availability: WeekAvailability) {
        self.inner
            .borrow_mut()
            .availability
            .insert(user_id.to_string(), availability);
    }

    /// Snapshot of every stored session, any status.
    pub fn sessions(&self) -> Vec<ScheduleSession> {
        self.inner.borrow().sessions.clone()
    }

    pub fn deliverable(&self, id: &str) -> Option<Deliverable> {
        self.inner
            .borrow()
            .deliverables
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    /// Run the replanning coordinator as one atomic unit.
    ///
    /// The state is snapshotted before the coordinator runs and restored on
    /// any failure, so a rejected event leaves sessions and deliverable hours
    /// exactly as they were.
    pub fn apply_progress(
        &self,
        user_id: &str,
        event: &ProgressEvent,
        on_date: NaiveDate,
    ) -> Result<ReplanSummary, CoreError> {
        let snapshot = self.inner.borrow().clone();
        match replan::apply_progress(self, user_id, event, on_date) {
            Ok(summary) => Ok(summary),
            Err(err) => {
                *self.inner.borrow_mut() = snapshot;
                Err(err)
            }
        }
    }

    fn user_course_ids(inner: &MemoryInner, user_id: &str) -> Vec<String> {
        inner
            .courses
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.id.clone())
            .collect()
    }
}

impl PlanStore for MemoryStore {
    fn load_incomplete_deliverables(
        &self,
        user_id: &str,
        not_before: NaiveDate,
    ) -> Result<Vec<Deliverable>, CoreError> {
        let inner = self.inner.borrow();
        let course_ids = Self::user_course_ids(&inner, user_id);
        let mut out: Vec<Deliverable> = inner
            .deliverables
            .iter()
            .filter(|d| course_ids.contains(&d.course_id))
            .filter(|d| !d.is_done() && d.due_date >= not_before)
            .cloned()
            .collect();
        out.sort_by_key(|d| d.due_date);
        Ok(out)
    }

    fn load_availability(&self, user_id: &str) -> Result<WeekAvailability, CoreError> {
        Ok(self
            .inner
            .borrow()
            .availability
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn replace_future_plan(
        &self,
        _user_id: &str,
        cutover: NaiveDate,
        sessions: &[PlannedSession],
    ) -> Result<(), CoreError> {
        let mut inner = self.inner.borrow_mut();
        inner
            .sessions
            .retain(|s| s.status != SessionStatus::Planned || s.scheduled_date < cutover);
        let now = Utc::now();
        for planned in sessions {
            inner.sessions.push(ScheduleSession {
                id: Uuid::new_v4().to_string(),
                deliverable_id: planned.deliverable_id.clone(),
                scheduled_date: planned.scheduled_date,
                allocated_hours: planned.allocated_hours,
                status: SessionStatus::Planned,
                actual_hours: None,
                created_at: now,
                updated_at: now,
            });
        }
        Ok(())
    }

    fn get_session(&self, session_id: &str) -> Result<Option<ScheduleSession>, CoreError> {
        Ok(self
            .inner
            .borrow()
            .sessions
            .iter()
            .find(|s| s.id == session_id)
            .cloned())
    }

    fn update_session_progress(
        &self,
        session_id: &str,
        status: SessionStatus,
        actual_hours: f64,
    ) -> Result<(), CoreError> {
        let mut inner = self.inner.borrow_mut();
        let session = inner
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| NotFoundError::Session(session_id.to_string()))?;
        session.status = status;
        session.actual_hours = Some(actual_hours);
        session.updated_at = Utc::now();
        Ok(())
    }

    fn increment_completed_hours(
        &self,
        deliverable_id: &str,
        hours: f64,
    ) -> Result<(), CoreError> {
        let mut inner = self.inner.borrow_mut();
        let deliverable = inner
            .deliverables
            .iter_mut()
            .find(|d| d.id == deliverable_id)
            .ok_or_else(|| NotFoundError::Deliverable(deliverable_id.to_string()))?;
        deliverable.hours_completed += hours;
        deliverable.updated_at = Utc::now();
        Ok(())
    }

    fn load_course_deliverables(&self, course_id: &str) -> Result<Vec<Deliverable>, CoreError> {
        let mut out: Vec<Deliverable> = self
            .inner
            .borrow()
            .deliverables
            .iter()
            .filter(|d| d.course_id == course_id)
            .cloned()
            .collect();
        out.sort_by_key(|d| d.due_date);
        Ok(out)
    }
}
