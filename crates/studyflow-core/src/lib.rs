//! # Studyflow Core Library
//!
//! Core business logic for Studyflow, a weekly study planner for a single
//! user juggling graded coursework. All operations are available through the
//! standalone CLI binary, which is a thin layer over this library.
//!
//! ## Architecture
//!
//! - **Planner**: priority scoring plus greedy allocation of daily study
//!   hours across a 7-day horizon
//! - **Replanning**: progress events retire one planned session, then the
//!   whole future plan is discarded and regenerated from the next day
//! - **Grades**: course grade projection and target-score solving over the
//!   same deliverable records
//! - **Storage**: SQLite-backed records behind the [`PlanStore`] seam, plus
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`planner::plan`] / [`planner::generate_plan`]: plan generation
//! - [`replan::apply_progress`]: the replanning coordinator
//! - [`grades::project`] / [`grades::solve_target`]: grade engine
//! - [`PlannerDb`]: persistence
//! - [`Config`]: application configuration

pub mod error;
pub mod grades;
pub mod model;
pub mod planner;
pub mod replan;
pub mod storage;
pub mod store;

pub use error::{ConfigurationError, CoreError, NotFoundError, StoreError, ValidationError};
pub use grades::{CourseGradeSnapshot, GradeLine, TargetOutcome};
pub use model::{
    Course, Deliverable, PlannedSession, ProgressEvent, ScheduleSession, SessionStatus,
    WeekAvailability,
};
pub use replan::ReplanSummary;
pub use storage::{Config, PlannerDb, SessionView};
pub use store::{MemoryStore, PlanStore};
