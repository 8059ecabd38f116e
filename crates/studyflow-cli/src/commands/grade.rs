//! Grade projection and target commands.

use clap::Subcommand;
use studyflow_core::error::NotFoundError;
use studyflow_core::{grades, Config, PlanStore};

use super::common;

#[derive(Subcommand)]
pub enum GradeAction {
    /// Show current and projected grade for a course
    Show {
        /// Course ID
        course_id: String,
    },
    /// Solve for the average needed on remaining work to hit a target
    Target {
        /// Course ID
        course_id: String,
        /// Target grade, 0-100
        target: f64,
    },
}

pub fn run(action: GradeAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = common::open_db(&config)?;

    match action {
        GradeAction::Show { course_id } => {
            if db.get_course(&course_id)?.is_none() {
                return Err(NotFoundError::Course(course_id).into());
            }
            let deliverables = db.load_course_deliverables(&course_id)?;
            let snapshot = grades::project(&deliverables);
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        GradeAction::Target { course_id, target } => {
            if db.get_course(&course_id)?.is_none() {
                return Err(NotFoundError::Course(course_id).into());
            }
            let deliverables = db.load_course_deliverables(&course_id)?;
            let outcome = grades::solve_target(&deliverables, target);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}
