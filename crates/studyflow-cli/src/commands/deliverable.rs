//! Deliverable management commands.

use chrono::NaiveDate;
use clap::Subcommand;
use studyflow_core::storage::planner_db::DeliverableInput;
use studyflow_core::Config;

use super::common;

#[derive(Subcommand)]
pub enum DeliverableAction {
    /// Add a deliverable to a course
    Add {
        /// Course ID
        course_id: String,
        /// Deliverable name
        name: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: NaiveDate,
        /// Share of the course grade, 0-100
        #[arg(long)]
        weight: f64,
        /// Estimated effort in hours
        #[arg(long)]
        hours: f64,
        /// Kind: assignment, exam, project, ... (default: assignment)
        #[arg(long, default_value = "assignment")]
        kind: String,
        /// Score out of 100, if already graded
        #[arg(long)]
        score: Option<f64>,
    },
    /// List deliverables
    List {
        /// Filter by course ID
        #[arg(long)]
        course: Option<String>,
    },
    /// Record a score for a deliverable
    Score {
        /// Deliverable ID
        id: String,
        /// Score out of 100
        score: f64,
    },
    /// Remove a deliverable
    Remove {
        /// Deliverable ID
        id: String,
    },
}

pub fn run(action: DeliverableAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = common::open_db(&config)?;

    match action {
        DeliverableAction::Add {
            course_id,
            name,
            due,
            weight,
            hours,
            kind,
            score,
        } => {
            let deliverable = db.create_deliverable(&DeliverableInput {
                course_id,
                name,
                kind,
                due_date: due,
                grade_weight: weight,
                estimated_hours: hours,
                score,
            })?;
            println!("{}", serde_json::to_string_pretty(&deliverable)?);
        }
        DeliverableAction::List { course } => {
            let deliverables = db.list_deliverables(&config.user, course.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&deliverables)?);
        }
        DeliverableAction::Score { id, score } => {
            db.set_score(&id, score)?;
            println!("score recorded");
        }
        DeliverableAction::Remove { id } => {
            db.delete_deliverable(&id)?;
            println!("deliverable removed");
        }
    }
    Ok(())
}
