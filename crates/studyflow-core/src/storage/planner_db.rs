//! SQLite-backed storage for courses, deliverables, availability and
//! schedule sessions.
//!
//! [`PlannerDb`] implements [`PlanStore`], so the planning engine runs
//! against it directly. The replanning coordinator's multi-step mutation is
//! wrapped in a single rusqlite transaction by [`PlannerDb::apply_progress`]:
//! commit on success, full rollback on any failure.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{data_dir, migrations};
use crate::error::{CoreError, NotFoundError, StoreError, ValidationError};
use crate::model::{
    Course, Deliverable, PlannedSession, ProgressEvent, ScheduleSession, SessionStatus,
    WeekAvailability,
};
use crate::replan::{self, ReplanSummary};
use crate::store::PlanStore;

// === Helper Functions ===

/// Format a calendar date for storage.
fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a stored calendar date with fallback to today.
fn parse_date_fallback(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap_or_else(|_| Utc::now().date_naive())
}

/// Parse a stored timestamp with fallback to the current time.
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Build a Course from a row of `SELECT id, user_id, name, code, created_at, updated_at`.
fn row_to_course(row: &rusqlite::Row) -> Result<Course, rusqlite::Error> {
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;
    Ok(Course {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        code: row.get(3)?,
        created_at: parse_datetime_fallback(&created_at),
        updated_at: parse_datetime_fallback(&updated_at),
    })
}

/// Build a Deliverable from a row in the canonical column order.
fn row_to_deliverable(row: &rusqlite::Row) -> Result<Deliverable, rusqlite::Error> {
    let due_date: String = row.get(4)?;
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;
    Ok(Deliverable {
        id: row.get(0)?,
        course_id: row.get(1)?,
        name: row.get(2)?,
        kind: row.get(3)?,
        due_date: parse_date_fallback(&due_date),
        grade_weight: row.get(5)?,
        estimated_hours: row.get(6)?,
        hours_completed: row.get(7)?,
        score: row.get(8)?,
        created_at: parse_datetime_fallback(&created_at),
        updated_at: parse_datetime_fallback(&updated_at),
    })
}

const DELIVERABLE_COLUMNS: &str = "id, course_id, name, kind, due_date, grade_weight, \
     estimated_hours, hours_completed, score, created_at, updated_at";

/// Build a ScheduleSession from a row in the canonical column order.
fn row_to_session(row: &rusqlite::Row) -> Result<ScheduleSession, rusqlite::Error> {
    let scheduled_date: String = row.get(2)?;
    let status: String = row.get(4)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(ScheduleSession {
        id: row.get(0)?,
        deliverable_id: row.get(1)?,
        scheduled_date: parse_date_fallback(&scheduled_date),
        allocated_hours: row.get(3)?,
        status: SessionStatus::parse(&status),
        actual_hours: row.get(5)?,
        created_at: parse_datetime_fallback(&created_at),
        updated_at: parse_datetime_fallback(&updated_at),
    })
}

const SESSION_COLUMNS: &str = "id, deliverable_id, scheduled_date, allocated_hours, status, \
     actual_hours, created_at, updated_at";

// === Input and View Types ===

/// Caller input for creating a deliverable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverableInput {
    pub course_id: String,
    pub name: String,
    pub kind: String,
    pub due_date: NaiveDate,
    pub grade_weight: f64,
    pub estimated_hours: f64,
    pub score: Option<f64>,
}

impl DeliverableInput {
    /// Type/range validation; anything richer belongs to the caller.
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName("deliverable name"));
        }
        if !(0.0..=100.0).contains(&self.grade_weight) {
            return Err(ValidationError::OutOfRange {
                field: "grade_weight",
                message: format!("must be between 0 and 100, got {}", self.grade_weight),
            });
        }
        if self.estimated_hours <= 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "estimated_hours",
                message: format!("must be positive, got {}", self.estimated_hours),
            });
        }
        if let Some(score) = self.score {
            if !(0.0..=100.0).contains(&score) {
                return Err(ValidationError::OutOfRange {
                    field: "score",
                    message: format!("must be between 0 and 100, got {score}"),
                });
            }
        }
        Ok(())
    }
}

/// One schedule session joined with its deliverable and course names, for
/// the week view.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub deliverable_id: String,
    pub deliverable_name: String,
    pub deliverable_kind: String,
    pub course_name: String,
    pub course_code: Option<String>,
    pub scheduled_date: NaiveDate,
    pub allocated_hours: f64,
    pub status: SessionStatus,
    pub actual_hours: Option<f64>,
}

// === PlanStore row operations ===
//
// Shared by the direct `PlanStore` impl and the transactional wrapper, so a
// replan sees exactly the same queries inside its transaction.

fn load_incomplete_deliverables(
    conn: &Connection,
    user_id: &str,
    not_before: NaiveDate,
) -> Result<Vec<Deliverable>, CoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {cols} FROM deliverables
         WHERE hours_completed < estimated_hours
           AND due_date >= ?1
           AND course_id IN (SELECT id FROM courses WHERE user_id = ?2)
         ORDER BY due_date ASC",
        cols = DELIVERABLE_COLUMNS
    ))?;
    let rows = stmt.query_map(params![format_date(not_before), user_id], row_to_deliverable)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn load_availability(conn: &Connection, user_id: &str) -> Result<WeekAvailability, CoreError> {
    let mut stmt =
        conn.prepare("SELECT day_of_week, hours FROM availability WHERE user_id = ?1")?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
    })?;

    let mut hours = [0.0f64; 7];
    for row in rows {
        let (day, h) = row?;
        if (0..7).contains(&day) {
            hours[day as usize] = h;
        }
    }
    Ok(WeekAvailability::new(hours)?)
}

fn replace_future_plan(
    conn: &Connection,
    user_id: &str,
    cutover: NaiveDate,
    sessions: &[PlannedSession],
) -> Result<(), CoreError> {
    conn.execute(
        "DELETE FROM schedule_sessions
         WHERE status = 'planned'
           AND scheduled_date >= ?1
           AND deliverable_id IN (
               SELECT d.id FROM deliverables d
               JOIN courses c ON c.id = d.course_id
               WHERE c.user_id = ?2)",
        params![format_date(cutover), user_id],
    )?;

    let now = Utc::now().to_rfc3339();
    for session in sessions {
        conn.execute(
            "INSERT INTO schedule_sessions
                 (id, deliverable_id, scheduled_date, allocated_hours, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 'planned', ?5, ?5)",
            params![
                Uuid::new_v4().to_string(),
                session.deliverable_id,
                format_date(session.scheduled_date),
                session.allocated_hours,
                now,
            ],
        )?;
    }
    Ok(())
}

fn get_session(conn: &Connection, session_id: &str) -> Result<Option<ScheduleSession>, CoreError> {
    let session = conn
        .query_row(
            &format!("SELECT {SESSION_COLUMNS} FROM schedule_sessions WHERE id = ?1"),
            params![session_id],
            row_to_session,
        )
        .optional()?;
    Ok(session)
}

fn update_session_progress(
    conn: &Connection,
    session_id: &str,
    status: SessionStatus,
    actual_hours: f64,
) -> Result<(), CoreError> {
    let updated = conn.execute(
        "UPDATE schedule_sessions
         SET status = ?1, actual_hours = ?2, updated_at = ?3
         WHERE id = ?4",
        params![
            status.as_str(),
            actual_hours,
            Utc::now().to_rfc3339(),
            session_id
        ],
    )?;
    if updated == 0 {
        return Err(NotFoundError::Session(session_id.to_string()).into());
    }
    Ok(())
}

fn increment_completed_hours(
    conn: &Connection,
    deliverable_id: &str,
    hours: f64,
) -> Result<(), CoreError> {
    let updated = conn.execute(
        "UPDATE deliverables
         SET hours_completed = hours_completed + ?1, updated_at = ?2
         WHERE id = ?3",
        params![hours, Utc::now().to_rfc3339(), deliverable_id],
    )?;
    if updated == 0 {
        return Err(NotFoundError::Deliverable(deliverable_id.to_string()).into());
    }
    Ok(())
}

fn load_course_deliverables(
    conn: &Connection,
    course_id: &str,
) -> Result<Vec<Deliverable>, CoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DELIVERABLE_COLUMNS} FROM deliverables WHERE course_id = ?1 ORDER BY due_date ASC"
    ))?;
    let rows = stmt.query_map(params![course_id], row_to_deliverable)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

// A bare connection satisfies the store contract, which lets the replanning
// coordinator run unchanged against either the database or a transaction
// (rusqlite's `Transaction` derefs to `Connection`).
impl PlanStore for Connection {
    fn load_incomplete_deliverables(
        &self,
        user_id: &str,
        not_before: NaiveDate,
    ) -> Result<Vec<Deliverable>, CoreError> {
        load_incomplete_deliverables(self, user_id, not_before)
    }

    fn load_availability(&self, user_id: &str) -> Result<WeekAvailability, CoreError> {
        load_availability(self, user_id)
    }

    fn replace_future_plan(
        &self,
        user_id: &str,
        cutover: NaiveDate,
        sessions: &[PlannedSession],
    ) -> Result<(), CoreError> {
        replace_future_plan(self, user_id, cutover, sessions)
    }

    fn get_session(&self, session_id: &str) -> Result<Option<ScheduleSession>, CoreError> {
        get_session(self, session_id)
    }

    fn update_session_progress(
        &self,
        session_id: &str,
        status: SessionStatus,
        actual_hours: f64,
    ) -> Result<(), CoreError> {
        update_session_progress(self, session_id, status, actual_hours)
    }

    fn increment_completed_hours(
        &self,
        deliverable_id: &str,
        hours: f64,
    ) -> Result<(), CoreError> {
        increment_completed_hours(self, deliverable_id, hours)
    }

    fn load_course_deliverables(&self, course_id: &str) -> Result<Vec<Deliverable>, CoreError> {
        load_course_deliverables(self, course_id)
    }
}

impl PlanStore for PlannerDb {
    fn load_incomplete_deliverables(
        &self,
        user_id: &str,
        not_before: NaiveDate,
    ) -> Result<Vec<Deliverable>, CoreError> {
        load_incomplete_deliverables(&self.conn, user_id, not_before)
    }

    fn load_availability(&self, user_id: &str) -> Result<WeekAvailability, CoreError> {
        load_availability(&self.conn, user_id)
    }

    fn replace_future_plan(
        &self,
        user_id: &str,
        cutover: NaiveDate,
        sessions: &[PlannedSession],
    ) -> Result<(), CoreError> {
        replace_future_plan(&self.conn, user_id, cutover, sessions)
    }

    fn get_session(&self, session_id: &str) -> Result<Option<ScheduleSession>, CoreError> {
        get_session(&self.conn, session_id)
    }

    fn update_session_progress(
        &self,
        session_id: &str,
        status: SessionStatus,
        actual_hours: f64,
    ) -> Result<(), CoreError> {
        update_session_progress(&self.conn, session_id, status, actual_hours)
    }

    fn increment_completed_hours(
        &self,
        deliverable_id: &str,
        hours: f64,
    ) -> Result<(), CoreError> {
        increment_completed_hours(&self.conn, deliverable_id, hours)
    }

    fn load_course_deliverables(&self, course_id: &str) -> Result<Vec<Deliverable>, CoreError> {
        load_course_deliverables(&self.conn, course_id)
    }
}

// === PlannerDb ===

/// SQLite database for the study planner.
pub struct PlannerDb {
    conn: Connection,
}

impl PlannerDb {
    /// Open the database at `data_dir()/studyflow.db`, creating and
    /// migrating it as needed.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir().map_err(CoreError::Store)?.join("studyflow.db");
        Self::open_at(&path)
    }

    /// Open (and migrate) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::Query)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, CoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(StoreError::Query)?;
        migrations::migrate(&conn)
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // --- Courses ---

    pub fn create_course(
        &self,
        user_id: &str,
        name: &str,
        code: Option<&str>,
    ) -> Result<Course, CoreError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName("course name").into());
        }
        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            code: code.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        self.conn.execute(
            "INSERT INTO courses (id, user_id, name, code, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                course.id,
                course.user_id,
                course.name,
                course.code,
                course.created_at.to_rfc3339(),
                course.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(course)
    }

    pub fn list_courses(&self, user_id: &str) -> Result<Vec<Course>, CoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name, code, created_at, updated_at
             FROM courses WHERE user_id = ?1 ORDER BY name ASC",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_course)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn get_course(&self, course_id: &str) -> Result<Option<Course>, CoreError> {
        let course = self
            .conn
            .query_row(
                "SELECT id, user_id, name, code, created_at, updated_at
                 FROM courses WHERE id = ?1",
                params![course_id],
                row_to_course,
            )
            .optional()?;
        Ok(course)
    }

    pub fn delete_course(&self, course_id: &str) -> Result<(), CoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM courses WHERE id = ?1", params![course_id])?;
        if deleted == 0 {
            return Err(NotFoundError::Course(course_id.to_string()).into());
        }
        Ok(())
    }

    // --- Deliverables ---

    pub fn create_deliverable(&self, input: &DeliverableInput) -> Result<Deliverable, CoreError> {
        input.validate()?;
        if self.get_course(&input.course_id)?.is_none() {
            return Err(NotFoundError::Course(input.course_id.clone()).into());
        }
        let now = Utc::now();
        let deliverable = Deliverable {
            id: Uuid::new_v4().to_string(),
            course_id: input.course_id.clone(),
            name: input.name.clone(),
            kind: input.kind.clone(),
            due_date: input.due_date,
            grade_weight: input.grade_weight,
            estimated_hours: input.estimated_hours,
            hours_completed: 0.0,
            score: input.score,
            created_at: now,
            updated_at: now,
        };
        self.conn.execute(
            "INSERT INTO deliverables
                 (id, course_id, name, kind, due_date, grade_weight, estimated_hours,
                  hours_completed, score, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                deliverable.id,
                deliverable.course_id,
                deliverable.name,
                deliverable.kind,
                format_date(deliverable.due_date),
                deliverable.grade_weight,
                deliverable.estimated_hours,
                deliverable.hours_completed,
                deliverable.score,
                deliverable.created_at.to_rfc3339(),
                deliverable.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(deliverable)
    }

    pub fn list_deliverables(
        &self,
        user_id: &str,
        course_id: Option<&str>,
    ) -> Result<Vec<Deliverable>, CoreError> {
        match course_id {
            Some(course_id) => load_course_deliverables(&self.conn, course_id),
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {cols} FROM deliverables
                     WHERE course_id IN (SELECT id FROM courses WHERE user_id = ?1)
                     ORDER BY due_date ASC",
                    cols = DELIVERABLE_COLUMNS
                ))?;
                let rows = stmt.query_map(params![user_id], row_to_deliverable)?;
                let mut out = Vec::new();
                for row in rows {
                    out.push(row?);
                }
                Ok(out)
            }
        }
    }

    pub fn get_deliverable(&self, deliverable_id: &str) -> Result<Option<Deliverable>, CoreError> {
        let deliverable = self
            .conn
            .query_row(
                &format!("SELECT {DELIVERABLE_COLUMNS} FROM deliverables WHERE id = ?1"),
                params![deliverable_id],
                row_to_deliverable,
            )
            .optional()?;
        Ok(deliverable)
    }

    /// Record a score (0-100) for a deliverable.
    pub fn set_score(&self, deliverable_id: &str, score: f64) -> Result<(), CoreError> {
        if !(0.0..=100.0).contains(&score) {
            return Err(ValidationError::OutOfRange {
                field: "score",
                message: format!("must be between 0 and 100, got {score}"),
            }
            .into());
        }
        let updated = self.conn.execute(
            "UPDATE deliverables SET score = ?1, updated_at = ?2 WHERE id = ?3",
            params![score, Utc::now().to_rfc3339(), deliverable_id],
        )?;
        if updated == 0 {
            return Err(NotFoundError::Deliverable(deliverable_id.to_string()).into());
        }
        Ok(())
    }

    pub fn delete_deliverable(&self, deliverable_id: &str) -> Result<(), CoreError> {
        let deleted = self.conn.execute(
            "DELETE FROM deliverables WHERE id = ?1",
            params![deliverable_id],
        )?;
        if deleted == 0 {
            return Err(NotFoundError::Deliverable(deliverable_id.to_string()).into());
        }
        Ok(())
    }

    // --- Availability ---

    /// Replace the user's whole weekly availability in one shot.
    pub fn set_availability(
        &self,
        user_id: &str,
        availability: &WeekAvailability,
    ) -> Result<(), CoreError> {
        self.conn.execute(
            "DELETE FROM availability WHERE user_id = ?1",
            params![user_id],
        )?;
        for (day, hours) in availability.as_array().iter().enumerate() {
            self.conn.execute(
                "INSERT INTO availability (user_id, day_of_week, hours) VALUES (?1, ?2, ?3)",
                params![user_id, day as i64, hours],
            )?;
        }
        Ok(())
    }

    // --- Schedule views ---

    /// Sessions in `[start, start + 7 days)` joined with deliverable and
    /// course names, ordered by date then course name.
    pub fn week_sessions(
        &self,
        user_id: &str,
        start: NaiveDate,
    ) -> Result<Vec<SessionView>, CoreError> {
        let end = start + chrono::Days::new(7);
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.deliverable_id, d.name, d.kind, c.name, c.code,
                    s.scheduled_date, s.allocated_hours, s.status, s.actual_hours
             FROM schedule_sessions s
             JOIN deliverables d ON d.id = s.deliverable_id
             JOIN courses c ON c.id = d.course_id
             WHERE c.user_id = ?1
               AND s.scheduled_date >= ?2 AND s.scheduled_date < ?3
             ORDER BY s.scheduled_date ASC, c.name ASC",
        )?;
        let rows = stmt.query_map(
            params![user_id, format_date(start), format_date(end)],
            |row| {
                let scheduled_date: String = row.get(6)?;
                let status: String = row.get(8)?;
                Ok(SessionView {
                    id: row.get(0)?,
                    deliverable_id: row.get(1)?,
                    deliverable_name: row.get(2)?,
                    deliverable_kind: row.get(3)?,
                    course_name: row.get(4)?,
                    course_code: row.get(5)?,
                    scheduled_date: parse_date_fallback(&scheduled_date),
                    allocated_hours: row.get(7)?,
                    status: SessionStatus::parse(&status),
                    actual_hours: row.get(9)?,
                })
            },
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Executed sessions for one deliverable, newest first.
    pub fn progress_history(
        &self,
        deliverable_id: &str,
    ) -> Result<Vec<ScheduleSession>, CoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM schedule_sessions
             WHERE deliverable_id = ?1 AND status != 'planned'
             ORDER BY scheduled_date DESC"
        ))?;
        let rows = stmt.query_map(params![deliverable_id], row_to_session)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // --- Replanning ---

    /// Run the replanning coordinator inside one transaction.
    ///
    /// Either every step applies (status update, completed-hours increment,
    /// future-plan replacement) or the database is left untouched.
    pub fn apply_progress(
        &mut self,
        user_id: &str,
        event: &ProgressEvent,
        on_date: NaiveDate,
    ) -> Result<ReplanSummary, CoreError> {
        let tx = self.conn.transaction().map_err(StoreError::Query)?;
        let summary = replan::apply_progress::<Connection>(&tx, user_id, event, on_date)?;
        tx.commit().map_err(StoreError::Query)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner;
    use chrono::Days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2025-03-09 is a Sunday.
    fn sunday() -> NaiveDate {
        date(2025, 3, 9)
    }

    fn input(course_id: &str, due: NaiveDate, estimated: f64) -> DeliverableInput {
        DeliverableInput {
            course_id: course_id.to_string(),
            name: "Problem set".to_string(),
            kind: "assignment".to_string(),
            due_date: due,
            grade_weight: 20.0,
            estimated_hours: estimated,
            score: None,
        }
    }

    fn full_week(db: &PlannerDb, hours: f64) {
        db.set_availability("alice", &WeekAvailability::new([hours; 7]).unwrap())
            .unwrap();
    }

    #[test]
    fn course_crud_round_trip() {
        let db = PlannerDb::open_memory().unwrap();
        let course = db.create_course("alice", "Physics", Some("PHY-101")).unwrap();

        let listed = db.list_courses("alice").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Physics");
        assert_eq!(listed[0].code.as_deref(), Some("PHY-101"));

        assert!(db.list_courses("bob").unwrap().is_empty());

        db.delete_course(&course.id).unwrap();
        assert!(db.list_courses("alice").unwrap().is_empty());
        assert!(matches!(
            db.delete_course(&course.id).unwrap_err(),
            CoreError::NotFound(NotFoundError::Course(_))
        ));
    }

    #[test]
    fn deliverable_input_is_validated() {
        let db = PlannerDb::open_memory().unwrap();
        let course = db.create_course("alice", "Physics", None).unwrap();

        let mut bad = input(&course.id, sunday(), 5.0);
        bad.grade_weight = 120.0;
        assert!(matches!(
            db.create_deliverable(&bad).unwrap_err(),
            CoreError::Validation(ValidationError::OutOfRange { field: "grade_weight", .. })
        ));

        let mut bad = input(&course.id, sunday(), 5.0);
        bad.estimated_hours = 0.0;
        assert!(matches!(
            db.create_deliverable(&bad).unwrap_err(),
            CoreError::Validation(ValidationError::OutOfRange { field: "estimated_hours", .. })
        ));

        let missing_course = input("no-such-course", sunday(), 5.0);
        assert!(matches!(
            db.create_deliverable(&missing_course).unwrap_err(),
            CoreError::NotFound(NotFoundError::Course(_))
        ));
    }

    #[test]
    fn incomplete_load_filters_done_and_past_due_rows() {
        let db = PlannerDb::open_memory().unwrap();
        let course = db.create_course("alice", "Physics", None).unwrap();

        let wanted = db
            .create_deliverable(&input(&course.id, sunday() + Days::new(3), 5.0))
            .unwrap();
        let done = db
            .create_deliverable(&input(&course.id, sunday() + Days::new(2), 2.0))
            .unwrap();
        increment_completed_hours(&db.conn, &done.id, 2.0).unwrap();
        db.create_deliverable(&input(&course.id, sunday() - Days::new(1), 5.0))
            .unwrap();

        let loaded = db.load_incomplete_deliverables("alice", sunday()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, wanted.id);
    }

    #[test]
    fn availability_set_replaces_the_previous_week() {
        let db = PlannerDb::open_memory().unwrap();
        full_week(&db, 2.0);
        db.set_availability("alice", &WeekAvailability::new([0.0, 4.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap())
            .unwrap();

        let loaded = db.load_availability("alice").unwrap();
        assert_eq!(loaded.hours_for_day(0), 0.0);
        assert_eq!(loaded.hours_for_day(1), 4.0);
        assert_eq!(loaded.total_hours(), 4.0);
    }

    #[test]
    fn generate_plan_persists_planned_sessions() {
        let db = PlannerDb::open_memory().unwrap();
        let course = db.create_course("alice", "Physics", None).unwrap();
        db.create_deliverable(&input(&course.id, sunday() + Days::new(6), 6.0))
            .unwrap();
        full_week(&db, 2.0);

        let sessions = planner::generate_plan(&db, "alice", sunday()).unwrap();
        assert_eq!(sessions.len(), 3);

        let week = db.week_sessions("alice", sunday()).unwrap();
        assert_eq!(week.len(), 3);
        assert!(week.iter().all(|s| s.status == SessionStatus::Planned));
        assert_eq!(week[0].course_name, "Physics");
        assert_eq!(week[0].deliverable_name, "Problem set");
    }

    #[test]
    fn apply_progress_commits_all_steps() {
        let mut db = PlannerDb::open_memory().unwrap();
        let course = db.create_course("alice", "Physics", None).unwrap();
        let deliverable = db
            .create_deliverable(&input(&course.id, sunday() + Days::new(6), 8.0))
            .unwrap();
        full_week(&db, 2.0);
        planner::generate_plan(&db, "alice", sunday()).unwrap();
        let first = db.week_sessions("alice", sunday()).unwrap()[0].clone();

        let summary = db
            .apply_progress(
                "alice",
                &ProgressEvent {
                    session_id: first.id.clone(),
                    status: SessionStatus::Completed,
                    actual_hours: None,
                },
                sunday(),
            )
            .unwrap();

        assert_eq!(summary.recorded_hours, 2.0);
        let session = get_session(&db.conn, &first.id).unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.actual_hours, Some(2.0));

        let refreshed = db.get_deliverable(&deliverable.id).unwrap().unwrap();
        assert_eq!(refreshed.hours_completed, 2.0);

        // Replanned tail starts Monday; the completed session is the only
        // Sunday entry.
        let week = db.week_sessions("alice", sunday()).unwrap();
        for s in &week {
            if s.id == first.id {
                assert_eq!(s.scheduled_date, sunday());
            } else {
                assert_eq!(s.status, SessionStatus::Planned);
                assert!(s.scheduled_date > sunday());
            }
        }
    }

    #[test]
    fn apply_progress_rolls_back_on_missing_session() {
        let mut db = PlannerDb::open_memory().unwrap();
        let course = db.create_course("alice", "Physics", None).unwrap();
        let deliverable = db
            .create_deliverable(&input(&course.id, sunday() + Days::new(6), 8.0))
            .unwrap();
        full_week(&db, 2.0);
        planner::generate_plan(&db, "alice", sunday()).unwrap();
        let before = db.week_sessions("alice", sunday()).unwrap();

        let err = db
            .apply_progress(
                "alice",
                &ProgressEvent {
                    session_id: "no-such-session".to_string(),
                    status: SessionStatus::Completed,
                    actual_hours: None,
                },
                sunday(),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(NotFoundError::Session(_))));

        // Schedule and deliverable hours are untouched.
        let after = db.week_sessions("alice", sunday()).unwrap();
        assert_eq!(after.len(), before.len());
        assert!(after.iter().all(|s| s.status == SessionStatus::Planned));
        assert_eq!(
            db.get_deliverable(&deliverable.id).unwrap().unwrap().hours_completed,
            0.0
        );
    }

    #[test]
    fn progress_history_lists_executed_sessions_newest_first() {
        let mut db = PlannerDb::open_memory().unwrap();
        let course = db.create_course("alice", "Physics", None).unwrap();
        let deliverable = db
            .create_deliverable(&input(&course.id, sunday() + Days::new(6), 10.0))
            .unwrap();
        full_week(&db, 2.0);
        planner::generate_plan(&db, "alice", sunday()).unwrap();

        // Execute Sunday's and Monday's sessions on consecutive days.
        for (offset, status) in [(0u64, SessionStatus::Missed), (1, SessionStatus::Completed)] {
            let day = sunday() + Days::new(offset);
            let session = db
                .week_sessions("alice", sunday())
                .unwrap()
                .into_iter()
                .find(|s| s.scheduled_date == day && s.status == SessionStatus::Planned)
                .unwrap();
            db.apply_progress(
                "alice",
                &ProgressEvent {
                    session_id: session.id,
                    status,
                    actual_hours: None,
                },
                day,
            )
            .unwrap();
        }

        let history = db.progress_history(&deliverable.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, SessionStatus::Completed);
        assert_eq!(history[0].actual_hours, Some(2.0));
        assert_eq!(history[1].status, SessionStatus::Missed);
        assert_eq!(history[1].actual_hours, Some(0.0));
    }

    #[test]
    fn deleting_a_course_cascades_to_deliverables_and_sessions() {
        let db = PlannerDb::open_memory().unwrap();
        let course = db.create_course("alice", "Physics", None).unwrap();
        let deliverable = db
            .create_deliverable(&input(&course.id, sunday() + Days::new(3), 4.0))
            .unwrap();
        full_week(&db, 2.0);
        planner::generate_plan(&db, "alice", sunday()).unwrap();

        db.delete_course(&course.id).unwrap();

        assert!(db.get_deliverable(&deliverable.id).unwrap().is_none());
        assert!(db.week_sessions("alice", sunday()).unwrap().is_empty());
    }

    #[test]
    fn score_is_range_checked() {
        let db = PlannerDb::open_memory().unwrap();
        let course = db.create_course("alice", "Physics", None).unwrap();
        let deliverable = db
            .create_deliverable(&input(&course.id, sunday() + Days::new(3), 4.0))
            .unwrap();

        assert!(db.set_score(&deliverable.id, 101.0).is_err());
        db.set_score(&deliverable.id, 88.5).unwrap();
        assert_eq!(
            db.get_deliverable(&deliverable.id).unwrap().unwrap().score,
            Some(88.5)
        );
    }
}
