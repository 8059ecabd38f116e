//! Data model for the study planning engine.
//!
//! Record types shared by the planner, the replanning coordinator, the grade
//! engine and the stores:
//! - [`Deliverable`]: a gradeable unit of coursework
//! - [`WeekAvailability`]: weekly study-hour budget, one entry per weekday
//! - [`ScheduleSession`] / [`PlannedSession`]: executed and not-yet-persisted
//!   study blocks
//! - [`ProgressEvent`]: one report against a planned session

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A course a user is enrolled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Short course code, e.g. "CS-341"
    pub code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A gradeable unit of coursework with a due date, weight and effort estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deliverable {
    pub id: String,
    pub course_id: String,
    pub name: String,
    /// Free-form kind, e.g. "assignment", "exam", "project"
    pub kind: String,
    /// Due date, no time component
    pub due_date: NaiveDate,
    /// Share of the course grade, 0-100
    pub grade_weight: f64,
    /// Estimated total effort in hours, positive
    pub estimated_hours: f64,
    /// Cumulative executed hours, never decremented
    pub hours_completed: f64,
    /// Score out of 100 once graded
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deliverable {
    /// Hours of work left, clamped at zero.
    ///
    /// The completed counter can overshoot the estimate when a partial
    /// progress report records more hours than planned; that still counts
    /// as fully done.
    pub fn remaining_hours(&self) -> f64 {
        (self.estimated_hours - self.hours_completed).max(0.0)
    }

    /// A deliverable is done once completed hours reach the estimate.
    pub fn is_done(&self) -> bool {
        self.hours_completed >= self.estimated_hours
    }
}

/// Weekly study-hour budget, indexed by day of week (0 = Sunday .. 6 = Saturday).
///
/// Absent days default to 0. Read-only input to the planner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekAvailability {
    hours: [f64; 7],
}

impl WeekAvailability {
    /// Build from per-day hours, Sunday first.
    ///
    /// # Errors
    /// Returns [`ValidationError::OutOfRange`] if any day is outside 0-24.
    pub fn new(hours: [f64; 7]) -> Result<Self, ValidationError> {
        for (day, &h) in hours.iter().enumerate() {
            if !(0.0..=24.0).contains(&h) {
                return Err(ValidationError::OutOfRange {
                    field: "hours",
                    message: format!("day {day}: hours must be between 0 and 24, got {h}"),
                });
            }
        }
        Ok(Self { hours })
    }

    /// Budget for the weekday of `date`.
    pub fn hours_on(&self, date: NaiveDate) -> f64 {
        self.hours[date.weekday().num_days_from_sunday() as usize]
    }

    /// Budget for a raw day-of-week index (0 = Sunday).
    pub fn hours_for_day(&self, day_of_week: usize) -> f64 {
        self.hours.get(day_of_week).copied().unwrap_or(0.0)
    }

    /// Whether any day has a nonzero budget.
    pub fn has_any_hours(&self) -> bool {
        self.hours.iter().any(|&h| h > 0.0)
    }

    /// Total budget across the week.
    pub fn total_hours(&self) -> f64 {
        self.hours.iter().sum()
    }

    /// Per-day hours, Sunday first.
    pub fn as_array(&self) -> [f64; 7] {
        self.hours
    }
}

/// Lifecycle state of a schedule session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Part of the current future plan; the only state that is ever regenerated
    Planned,
    /// Executed for the full allocated hours
    Completed,
    /// Executed for fewer (or other) hours than allocated
    Partial,
    /// Skipped entirely
    Missed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Planned => "planned",
            SessionStatus::Completed => "completed",
            SessionStatus::Partial => "partial",
            SessionStatus::Missed => "missed",
        }
    }

    /// Parse from storage representation; unknown strings fall back to planned.
    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => SessionStatus::Completed,
            "partial" => SessionStatus::Partial,
            "missed" => SessionStatus::Missed,
            _ => SessionStatus::Planned,
        }
    }
}

/// Planner output before persistence: one planned block of study time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedSession {
    pub deliverable_id: String,
    pub scheduled_date: NaiveDate,
    pub allocated_hours: f64,
}

/// A persisted schedule session, planned or executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSession {
    pub id: String,
    pub deliverable_id: String,
    pub scheduled_date: NaiveDate,
    pub allocated_hours: f64,
    pub status: SessionStatus,
    /// Present once the session has left the planned state
    pub actual_hours: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One progress report against a planned session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub session_id: String,
    /// Target status; must not be `planned`
    pub status: SessionStatus,
    /// Required for `partial`, ignored for `completed`, unused for `missed`
    pub actual_hours: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deliverable(estimated: f64, completed: f64) -> Deliverable {
        let now = Utc::now();
        Deliverable {
            id: "d1".to_string(),
            course_id: "c1".to_string(),
            name: "Problem set 3".to_string(),
            kind: "assignment".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            grade_weight: 20.0,
            estimated_hours: estimated,
            hours_completed: completed,
            score: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn remaining_hours_clamps_at_zero() {
        let d = deliverable(5.0, 7.5);
        assert_eq!(d.remaining_hours(), 0.0);
        assert!(d.is_done());
    }

    #[test]
    fn remaining_hours_subtracts_completed() {
        let d = deliverable(5.0, 2.0);
        assert_eq!(d.remaining_hours(), 3.0);
        assert!(!d.is_done());
    }

    #[test]
    fn availability_rejects_out_of_range_hours() {
        assert!(WeekAvailability::new([0.0, 25.0, 0.0, 0.0, 0.0, 0.0, 0.0]).is_err());
        assert!(WeekAvailability::new([0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0]).is_err());
        assert!(WeekAvailability::new([0.0; 7]).is_ok());
    }

    #[test]
    fn availability_indexes_sunday_first() {
        let avail = WeekAvailability::new([1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 7.0]).unwrap();
        // 2025-03-09 is a Sunday
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(avail.hours_on(sunday), 1.0);
        assert_eq!(avail.hours_on(sunday.succ_opt().unwrap()), 2.0);
        assert_eq!(avail.hours_on(sunday + chrono::Days::new(6)), 7.0);
        assert_eq!(avail.total_hours(), 10.0);
        assert!(avail.has_any_hours());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            SessionStatus::Planned,
            SessionStatus::Completed,
            SessionStatus::Partial,
            SessionStatus::Missed,
        ] {
            assert_eq!(SessionStatus::parse(status.as_str()), status);
        }
        assert_eq!(SessionStatus::parse("garbage"), SessionStatus::Planned);
    }
}
